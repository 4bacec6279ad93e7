//! Per-row resolution with failure isolation.

use tracing::{debug, error, warn};

use mapslink_lookup::PlaceLookup;
use mapslink_shared::{Credentials, LookupQuery, MapLink};

use crate::link::compose;

/// Resolve one row's location text to the value for its output cell.
///
/// Never fails: lookup errors become [`MapLink::LookupFailed`] so one bad row
/// cannot abort a batch. Blank text is [`MapLink::NotFound`] without a lookup.
/// Errors outside the per-row kinds (see
/// [`MapsLinkError::is_lookup_failure`](mapslink_shared::MapsLinkError::is_lookup_failure))
/// still mark only this row, but are logged at `error` level.
pub async fn resolve_row(
    lookup: &dyn PlaceLookup,
    location_text: &str,
    credentials: &Credentials,
) -> MapLink {
    let query = LookupQuery::new(location_text);
    if query.is_blank() {
        debug!("blank location, skipping lookup");
        return MapLink::NotFound;
    }

    match lookup.find_place(&query, credentials).await {
        Ok(result) => compose(&result),
        Err(e) => {
            if e.is_lookup_failure() {
                warn!(query = %query, error = %e, "lookup failed, marking row");
            } else {
                error!(query = %query, error = %e, "unexpected lookup error, marking row");
            }
            MapLink::LookupFailed {
                reason: e.to_string(),
            }
        }
    }
}
