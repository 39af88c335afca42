//! Shared setup for commands
//!
//! This module contains:
//! - `open_backend` - Resolve configuration and build the backend client
//! - `fetch_transactions` - Load transactions with a friendly error

use std::path::Path;

use anyhow::{Context, Result};
use bankountable_core::{Config, DataSource, HttpBackend, Transaction};
use tracing::debug;

/// Resolve config (file, env, `--api-url`) and create the backend client
pub fn open_backend(config_path: Option<&Path>, api_url: Option<&str>) -> Result<(Config, HttpBackend)> {
    let mut config = Config::load(config_path).context("Failed to load configuration")?;
    if let Some(url) = api_url {
        config.apply_api_url(url);
    }
    debug!(url = %config.backend.base_url, locale = %config.display.locale, "Resolved config");

    let backend =
        HttpBackend::from_config(&config.backend).context("Failed to create backend client")?;
    Ok((config, backend))
}

/// Fetch all transactions from the data source
pub async fn fetch_transactions<S: DataSource + ?Sized>(source: &S) -> Result<Vec<Transaction>> {
    source
        .transactions()
        .await
        .context("Failed to fetch transactions (is the statements backend running?)")
}
