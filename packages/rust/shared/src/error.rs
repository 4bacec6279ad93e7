//! Error types for mapslink.
//!
//! Library crates use [`MapsLinkError`] via `thiserror`.
//! The CLI wraps this with `color-eyre` for rich diagnostics.

use std::path::PathBuf;

/// Top-level error type for all mapslink operations.
///
/// `Transport`, `MalformedResponse` and `Provider` are per-row lookup
/// failures: the row resolver turns them into a degraded cell instead of
/// letting them abort a batch. Everything else stops the run.
#[derive(Debug, thiserror::Error)]
pub enum MapsLinkError {
    /// Configuration loading or validation error.
    #[error("config error: {message}")]
    Config { message: String },

    /// No API key was supplied for the run.
    #[error("missing credentials: {message}")]
    MissingCredentials { message: String },

    /// The selected location column is not in the dataset header.
    #[error("column '{column}' not found (available: {})", .available.join(", "))]
    InvalidColumn {
        column: String,
        available: Vec<String>,
    },

    /// Network failure, timeout, or non-2xx status during a lookup.
    #[error("transport error: {0}")]
    Transport(String),

    /// Lookup response body was not the expected JSON shape.
    #[error("malformed response: {message}")]
    MalformedResponse { message: String },

    /// The provider answered with a non-OK status (e.g. `REQUEST_DENIED`).
    #[error("provider returned {status}{}", .message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Provider {
        status: String,
        message: Option<String>,
    },

    /// Workbook decoding or encoding error.
    #[error("spreadsheet error: {0}")]
    Sheet(String),

    /// Filesystem I/O error.
    #[error("I/O error at {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Data validation error (empty sheet, ragged rows, etc.).
    #[error("validation error: {message}")]
    Validation { message: String },
}

/// Convenience alias used throughout the codebase.
pub type Result<T> = std::result::Result<T, MapsLinkError>;

impl MapsLinkError {
    /// Create a config error from any displayable message.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config {
            message: msg.into(),
        }
    }

    /// Create a missing-credentials error from any displayable message.
    pub fn missing_credentials(msg: impl Into<String>) -> Self {
        Self::MissingCredentials {
            message: msg.into(),
        }
    }

    /// Create a malformed-response error from any displayable message.
    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: msg.into(),
        }
    }

    /// Create a validation error from any displayable message.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation {
            message: msg.into(),
        }
    }

    /// Wrap a `std::io::Error` with a path for context.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Whether this error belongs to a single row's lookup and should be
    /// isolated to that row rather than abort the run.
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::MalformedResponse { .. } | Self::Provider { .. }
        )
    }
}
