//! Find Place From Text response parsing.

use serde::Deserialize;

use mapslink_shared::{LookupResult, MapsLinkError, Result};

/// Statuses whose `candidates` array is authoritative.
const USABLE_STATUSES: &[&str] = &["OK", "ZERO_RESULTS"];

#[derive(Debug, Deserialize)]
struct FindPlaceResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    place_id: String,
}

/// Interpret a response body.
///
/// The first candidate is the provider-ranked top result and is taken as-is.
/// An empty candidate list is [`LookupResult::NotFound`]. A status other than
/// `OK`/`ZERO_RESULTS` is a [`MapsLinkError::Provider`] error.
pub(crate) fn interpret(body: &str) -> Result<LookupResult> {
    let parsed: FindPlaceResponse = serde_json::from_str(body)
        .map_err(|e| MapsLinkError::malformed(format!("unexpected response body: {e}")))?;

    if let Some(status) = parsed.status.as_deref() {
        if !USABLE_STATUSES.contains(&status) {
            return Err(MapsLinkError::Provider {
                status: status.to_string(),
                message: parsed.error_message,
            });
        }
    }

    Ok(match parsed.candidates.into_iter().next() {
        Some(candidate) => LookupResult::Found {
            place_id: candidate.place_id,
        },
        None => LookupResult::NotFound,
    })
}
