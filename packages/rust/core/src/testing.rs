//! Scripted in-process lookup for tests.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use mapslink_lookup::PlaceLookup;
use mapslink_shared::{Credentials, LookupQuery, LookupResult, MapsLinkError, Result};

/// Canned answer for one query text.
#[derive(Debug, Clone)]
pub(crate) enum Scripted {
    Found(&'static str),
    NotFound,
    Malformed,
    Transport,
    Provider(&'static str),
    /// An error outside the per-row lookup kinds.
    Unexpected,
}

/// Answers from a fixed script and counts calls. Unknown queries are `NotFound`.
#[derive(Default)]
pub(crate) struct ScriptedLookup {
    script: HashMap<String, Scripted>,
    delays: HashMap<String, Duration>,
    calls: AtomicUsize,
}

impl ScriptedLookup {
    pub(crate) fn new(entries: &[(&str, Scripted)]) -> Self {
        Self {
            script: entries
                .iter()
                .map(|(q, s)| (q.to_string(), s.clone()))
                .collect(),
            ..Self::default()
        }
    }

    /// Delay the answer for `query` by `ms` milliseconds.
    pub(crate) fn with_delay(mut self, query: &str, ms: u64) -> Self {
        self.delays
            .insert(query.to_string(), Duration::from_millis(ms));
        self
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PlaceLookup for ScriptedLookup {
    async fn find_place(
        &self,
        query: &LookupQuery,
        _credentials: &Credentials,
    ) -> Result<LookupResult> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(query.as_str()) {
            tokio::time::sleep(*delay).await;
        }

        match self.script.get(query.as_str()) {
            Some(Scripted::Found(id)) => Ok(LookupResult::Found {
                place_id: (*id).to_string(),
            }),
            Some(Scripted::NotFound) | None => Ok(LookupResult::NotFound),
            Some(Scripted::Malformed) => Err(MapsLinkError::malformed("expected JSON object")),
            Some(Scripted::Transport) => Err(MapsLinkError::Transport("connection reset".into())),
            Some(Scripted::Provider(status)) => Err(MapsLinkError::Provider {
                status: (*status).to_string(),
                message: None,
            }),
            Some(Scripted::Unexpected) => Err(MapsLinkError::config("endpoint vanished")),
        }
    }
}

pub(crate) fn test_credentials() -> Credentials {
    Credentials::new("test-key").expect("non-empty key")
}
