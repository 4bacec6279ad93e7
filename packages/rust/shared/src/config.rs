//! Application configuration for mapslink.
//!
//! User config lives at `~/.mapslink/mapslink.toml`.
//! CLI flags override config file values, which override defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{MapsLinkError, Result};
use crate::types::Credentials;

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "mapslink.toml";

/// Default config directory name under the user's home.
const CONFIG_DIR_NAME: &str = ".mapslink";

/// Upper bound on in-flight lookups per run.
pub const MAX_CONCURRENCY: usize = 16;

// ---------------------------------------------------------------------------
// Config structs (matching mapslink.toml schema)
// ---------------------------------------------------------------------------

/// Top-level application config, deserialized from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Output defaults.
    #[serde(default)]
    pub defaults: DefaultsConfig,

    /// Google Places settings.
    #[serde(default)]
    pub google: GoogleConfig,
}

/// `[defaults]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultsConfig {
    /// File name used when `--out` is not given.
    #[serde(default = "default_output_file")]
    pub output_file: String,

    /// Header of the appended link column.
    #[serde(default = "default_output_column")]
    pub output_column: String,

    /// Concurrent lookups. 1 means strictly sequential.
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        Self {
            output_file: default_output_file(),
            output_column: default_output_column(),
            concurrency: default_concurrency(),
        }
    }
}

fn default_output_file() -> String {
    "locations_with_google_maps.xlsx".into()
}
fn default_output_column() -> String {
    "Google Maps URL".into()
}
fn default_concurrency() -> usize {
    1
}

/// `[google]` section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoogleConfig {
    /// Name of the env var holding the API key (never store the key itself).
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    /// Find Place From Text endpoint.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for GoogleConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_api_key_env(),
            endpoint: default_endpoint(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_api_key_env() -> String {
    "GOOGLE_MAPS_API_KEY".into()
}
fn default_endpoint() -> String {
    "https://maps.googleapis.com/maps/api/place/findplacefromtext/json".into()
}
fn default_timeout_secs() -> u64 {
    10
}

impl GoogleConfig {
    /// Parse the configured endpoint.
    pub fn endpoint_url(&self) -> Result<Url> {
        Url::parse(&self.endpoint).map_err(|e| {
            MapsLinkError::config(format!("invalid google.endpoint '{}': {e}", self.endpoint))
        })
    }
}

impl DefaultsConfig {
    /// Clamp a requested concurrency into `1..=MAX_CONCURRENCY`.
    pub fn effective_concurrency(&self, requested: Option<usize>) -> usize {
        requested
            .unwrap_or(self.concurrency)
            .clamp(1, MAX_CONCURRENCY)
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Get the path to the config directory (`~/.mapslink/`).
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir()
        .ok_or_else(|| MapsLinkError::config("could not determine home directory"))?;
    Ok(home.join(CONFIG_DIR_NAME))
}

/// Get the path to the config file (`~/.mapslink/mapslink.toml`).
pub fn config_file_path() -> Result<PathBuf> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Load the application config from disk. Returns defaults if the file does not exist.
pub fn load_config() -> Result<AppConfig> {
    let path = config_file_path()?;

    if !path.exists() {
        tracing::debug!(?path, "config file not found, using defaults");
        return Ok(AppConfig::default());
    }

    load_config_from(&path)
}

/// Load the application config from a specific file path.
pub fn load_config_from(path: &Path) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path).map_err(|e| MapsLinkError::io(path, e))?;

    toml::from_str(&content)
        .map_err(|e| MapsLinkError::config(format!("failed to parse {}: {e}", path.display())))
}

/// Create the config directory and write a default config file.
/// Returns the path to the created file.
pub fn init_config() -> Result<PathBuf> {
    let dir = config_dir()?;
    std::fs::create_dir_all(&dir).map_err(|e| MapsLinkError::io(&dir, e))?;

    let path = dir.join(CONFIG_FILE_NAME);
    let config = AppConfig::default();
    let content =
        toml::to_string_pretty(&config).map_err(|e| MapsLinkError::config(e.to_string()))?;

    std::fs::write(&path, content).map_err(|e| MapsLinkError::io(&path, e))?;
    tracing::info!(?path, "created default config file");

    Ok(path)
}

/// Resolve the run's API key: an explicit value wins, otherwise the env var
/// named by `google.api_key_env`. Fails with `MissingCredentials` when neither
/// yields a non-empty key.
pub fn resolve_credentials(config: &AppConfig, explicit: Option<String>) -> Result<Credentials> {
    if let Some(key) = explicit.filter(|k| !k.trim().is_empty()) {
        return Credentials::new(key);
    }

    let var_name = &config.google.api_key_env;
    match std::env::var(var_name) {
        Ok(val) if !val.trim().is_empty() => Credentials::new(val),
        _ => Err(MapsLinkError::missing_credentials(format!(
            "Google Maps API key not found. Pass --api-key or set the {var_name} environment variable."
        ))),
    }
}
