//! Shared types, error model, and configuration for mapslink.
//!
//! This crate is the foundation depended on by all other mapslink crates.
//! It provides:
//! - [`MapsLinkError`]: the unified error type
//! - Domain types ([`Dataset`], [`CellValue`], [`LookupResult`], [`MapLink`], [`Credentials`])
//! - Configuration ([`AppConfig`], config loading, credential resolution)

pub mod config;
pub mod error;
pub mod types;

// Re-export public API at crate root for ergonomic imports.
pub use config::{
    AppConfig, DefaultsConfig, GoogleConfig, MAX_CONCURRENCY, config_dir, config_file_path,
    init_config, load_config, load_config_from, resolve_credentials,
};
pub use error::{MapsLinkError, Result};
pub use types::{
    CellValue, Credentials, Dataset, LOOKUP_FAILED_SENTINEL, LookupQuery, LookupResult, MapLink,
    NOT_FOUND_SENTINEL,
};
