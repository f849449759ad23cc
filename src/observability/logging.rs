//! # Structured Logging
//!
//! Installs the global `tracing` subscriber. `RUST_LOG` wins over the
//! configured level when set.

use crate::config::LoggingConfig;
use crate::errors::{Error, Result};
use tracing_subscriber::{fmt, EnvFilter};

/// Build the filter: `RUST_LOG` if present, else the configured level.
pub fn env_filter(config: &LoggingConfig) -> Result<EnvFilter> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => Ok(filter),
        Err(_) => EnvFilter::try_new(&config.level).map_err(|e| {
            Error::config(format!("Invalid log level '{}': {}", config.level, e))
        }),
    }
}

/// Install the global subscriber.
///
/// Returns `Ok(false)` when a subscriber was already installed (e.g. by a
/// test harness); that is not treated as an error.
pub fn init_logging(config: &LoggingConfig) -> Result<bool> {
    let filter = env_filter(config)?;
    let builder = fmt().with_env_filter(filter).with_target(true);

    let installed = if config.json {
        builder.json().with_current_span(true).try_init().is_ok()
    } else {
        builder.try_init().is_ok()
    };

    Ok(installed)
}

/// Log configuration at startup. The token is reported only as set/unset.
pub fn log_config_info(config: &crate::config::AppConfig) {
    tracing::info!(
        vault_address = %config.vault.address,
        namespace = ?config.vault.namespace,
        kv_mount = %config.vault.kv_mount,
        transit_mount = %config.vault.transit_mount,
        transit_key = %config.vault.transit_key,
        timeout_secs = config.vault.timeout_secs,
        token_set = config.vault.token.is_some(),
        json_logging = config.logging.json,
        "Vault client configuration"
    );
}
