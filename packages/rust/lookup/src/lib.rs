//! Place lookup against the Google Places "Find Place From Text" endpoint.
//!
//! One free-text query becomes one GET request asking only for `place_id`.
//! The provider ranks candidates; we take the first one. No retries and no
//! caching happen here, so duplicate queries cost duplicate calls.

mod payload;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, instrument};
use url::Url;

use mapslink_shared::{
    Credentials, GoogleConfig, LookupQuery, LookupResult, MapsLinkError, Result,
};

/// Search mode sent as `inputtype`.
const INPUT_TYPE: &str = "textquery";

/// Only the place identifier is requested.
const FIELDS: &str = "place_id";

/// User-Agent string for lookup requests.
const USER_AGENT: &str = concat!("mapslink/", env!("CARGO_PKG_VERSION"));

// ---------------------------------------------------------------------------
// PlaceLookup
// ---------------------------------------------------------------------------

/// Resolves free text to a provider place identifier.
///
/// Errors are `Transport`, `MalformedResponse` or `Provider`; callers decide
/// whether they are fatal.
#[async_trait]
pub trait PlaceLookup: Send + Sync {
    async fn find_place(
        &self,
        query: &LookupQuery,
        credentials: &Credentials,
    ) -> Result<LookupResult>;
}

// ---------------------------------------------------------------------------
// Lookup options
// ---------------------------------------------------------------------------

/// Configuration for [`GooglePlacesClient`].
#[derive(Debug, Clone)]
pub struct LookupOptions {
    /// Find Place From Text endpoint.
    pub endpoint: Url,
    /// Timeout for each request in seconds.
    pub timeout_secs: u64,
}

impl LookupOptions {
    /// Build options from the `[google]` config section.
    pub fn from_config(config: &GoogleConfig) -> Result<Self> {
        Ok(Self {
            endpoint: config.endpoint_url()?,
            timeout_secs: config.timeout_secs,
        })
    }
}

// ---------------------------------------------------------------------------
// GooglePlacesClient
// ---------------------------------------------------------------------------

/// HTTP implementation of [`PlaceLookup`].
#[derive(Debug, Clone)]
pub struct GooglePlacesClient {
    client: Client,
    endpoint: Url,
}

impl GooglePlacesClient {
    pub fn new(opts: &LookupOptions) -> Result<Self> {
        Ok(Self {
            client: build_client(opts)?,
            endpoint: opts.endpoint.clone(),
        })
    }
}

#[async_trait]
impl PlaceLookup for GooglePlacesClient {
    #[instrument(skip_all, fields(query = %query))]
    async fn find_place(
        &self,
        query: &LookupQuery,
        credentials: &Credentials,
    ) -> Result<LookupResult> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("input", query.as_str()),
                ("inputtype", INPUT_TYPE),
                ("fields", FIELDS),
                ("key", credentials.expose()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(MapsLinkError::Transport(format!("HTTP {status}")));
        }

        let body = response.text().await.map_err(transport_error)?;
        let result = payload::interpret(&body)?;

        debug!(found = matches!(result, LookupResult::Found { .. }), "lookup completed");
        Ok(result)
    }
}

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Build a reqwest client with appropriate settings.
fn build_client(opts: &LookupOptions) -> Result<Client> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(Duration::from_secs(opts.timeout_secs))
        .build()
        .map_err(|e| MapsLinkError::Transport(format!("failed to build HTTP client: {e}")))
}

/// Map a reqwest error, dropping the request URL since it carries the API key.
fn transport_error(err: reqwest::Error) -> MapsLinkError {
    let kind = if err.is_timeout() {
        "request timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    MapsLinkError::Transport(format!("{kind}: {}", err.without_url()))
}
