//! Configuration loading
//!
//! Resolution order, later layers winning:
//! 1. Embedded defaults (compiled into binary)
//! 2. Override file (`--config` path, else ~/.config/bankountable/config.toml)
//! 3. `BANKOUNTABLE_API_URL` environment variable
//! 4. Explicit base URL from the caller (the CLI's `--api-url`)

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::Deserialize;
use tracing::debug;

use crate::error::{Error, Result};
use crate::locale::Locale;

/// Embedded default config (compiled into binary)
const DEFAULT_CONFIG: &str = include_str!("../../../config/bankountable.toml");

/// Environment variable overriding the backend base URL
pub const API_URL_ENV: &str = "BANKOUNTABLE_API_URL";

/// Statements backend connection settings
#[derive(Debug, Clone, PartialEq)]
pub struct BackendConfig {
    pub base_url: String,
    pub timeout: Duration,
    /// Upper bound on transactions per fetch
    pub transaction_limit: u32,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            timeout: Duration::from_secs(30),
            transaction_limit: 10_000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DisplayConfig {
    pub locale: Locale,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub backend: BackendConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Load from the embedded defaults, an override file and the environment
    pub fn load(override_path: Option<&Path>) -> Result<Self> {
        let mut config = load_file(override_path)?;
        if let Ok(url) = std::env::var(API_URL_ENV) {
            config.apply_api_url(&url);
        }
        Ok(config)
    }

    /// Replace the backend base URL, ignoring blank values
    pub fn apply_api_url(&mut self, url: &str) {
        let url = url.trim();
        if !url.is_empty() {
            self.backend.base_url = url.to_string();
        }
    }
}

/// Default config override path
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("bankountable").join("config.toml"))
}

/// Read the override file (when present) or fall back to embedded defaults
fn load_file(override_path: Option<&Path>) -> Result<Config> {
    let path = match override_path {
        Some(path) => {
            if !path.exists() {
                return Err(Error::Config(format!(
                    "Config file not found: {}",
                    path.display()
                )));
            }
            Some(path.to_path_buf())
        }
        None => default_config_path().filter(|p| p.exists()),
    };

    match path {
        Some(path) => {
            debug!(path = %path.display(), "Loading config override");
            let content = fs::read_to_string(&path)
                .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;
            parse_config(&content)
        }
        None => parse_config(DEFAULT_CONFIG),
    }
}

/// Raw config structure for TOML parsing
#[derive(Debug, Deserialize)]
struct RawConfig {
    backend: Option<RawBackend>,
    display: Option<RawDisplay>,
}

#[derive(Debug, Deserialize)]
struct RawBackend {
    base_url: Option<String>,
    timeout_secs: Option<u64>,
    transaction_limit: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct RawDisplay {
    locale: Option<String>,
}

/// Parse config from TOML content; absent keys keep their defaults
pub fn parse_config(content: &str) -> Result<Config> {
    let raw: RawConfig = toml::from_str(content)
        .map_err(|e| Error::Config(format!("Invalid config TOML: {}", e)))?;

    let mut config = Config::default();

    if let Some(backend) = raw.backend {
        if let Some(url) = backend.base_url {
            config.apply_api_url(&url);
        }
        if let Some(secs) = backend.timeout_secs {
            config.backend.timeout = Duration::from_secs(secs);
        }
        if let Some(limit) = backend.transaction_limit {
            if limit == 0 {
                return Err(Error::Config(
                    "backend.transaction_limit must be positive".to_string(),
                ));
            }
            config.backend.transaction_limit = limit;
        }
    }

    if let Some(display) = raw.display {
        if let Some(locale) = display.locale {
            config.display.locale = locale.parse().map_err(Error::Config)?;
        }
    }

    Ok(config)
}
