//! Map link composition from lookup results.

use url::form_urlencoded;

use mapslink_shared::{LookupResult, MapLink};

/// Base of every composed link; the place id goes in the `q` parameter.
pub const MAPS_PLACE_URL: &str = "https://www.google.com/maps/place/";

/// Build the output link for a lookup result. Pure, no I/O.
pub fn compose(result: &LookupResult) -> MapLink {
    match result {
        LookupResult::Found { place_id } => {
            let encoded: String = form_urlencoded::byte_serialize(place_id.as_bytes()).collect();
            MapLink::Url(format!("{MAPS_PLACE_URL}?q=place_id:{encoded}"))
        }
        LookupResult::NotFound => MapLink::NotFound,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(id: &str) -> LookupResult {
        LookupResult::Found {
            place_id: id.into(),
        }
    }

    #[test]
    fn found_builds_place_url() {
        assert_eq!(
            compose(&found("ABC123")),
            MapLink::Url("https://www.google.com/maps/place/?q=place_id:ABC123".into())
        );
    }

    #[test]
    fn real_place_ids_pass_through_unchanged() {
        let link = compose(&found("ChIJLU7jZClu5kcR4PcOOO6p3I0"));
        assert_eq!(
            link.cell_text(),
            "https://www.google.com/maps/place/?q=place_id:ChIJLU7jZClu5kcR4PcOOO6p3I0"
        );
    }

    #[test]
    fn reserved_characters_are_encoded() {
        let link = compose(&found("a&b=c d"));
        assert_eq!(
            link.cell_text(),
            "https://www.google.com/maps/place/?q=place_id:a%26b%3Dc+d"
        );
    }

    #[test]
    fn same_id_same_url() {
        assert_eq!(compose(&found("XYZ")), compose(&found("XYZ")));
    }

    #[test]
    fn not_found_is_sentinel() {
        let link = compose(&LookupResult::NotFound);
        assert_eq!(link, MapLink::NotFound);
        assert_eq!(link.cell_text(), "Not Found");
    }
}
