//! # Configuration Management
//!
//! Settings are layered, lowest precedence first:
//!
//! 1. built-in defaults
//! 2. an optional TOML/YAML/JSON file
//! 3. the standard Vault variables `VAULT_ADDR`, `VAULT_TOKEN`, `VAULT_NAMESPACE`
//! 4. `VAULT_DEMO_*` variables, nested with `__`
//!    (e.g. `VAULT_DEMO_VAULT__TRANSIT_KEY=orders`)
//!
//! The result is validated before it is returned.

pub mod settings;

pub use settings::{AppConfig, LoggingConfig, VaultConfig};

use crate::errors::Result;
use std::path::Path;

/// Prefix of application environment variables.
pub const ENV_PREFIX: &str = "VAULT_DEMO";

/// Load configuration from defaults, an optional file, and the environment.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    let mut builder = config::Config::builder()
        .add_source(config::Config::try_from(&AppConfig::default())?);

    if let Some(path) = path {
        builder = builder.add_source(config::File::from(path).required(true));
    }

    let config: AppConfig = builder
        .add_source(standard_vault_env()?)
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    config.validate()?;

    tracing::debug!(
        address = %config.vault.address,
        kv_mount = %config.vault.kv_mount,
        transit_mount = %config.vault.transit_mount,
        token_set = config.vault.token.is_some(),
        "Loaded configuration"
    );

    Ok(config)
}

/// The variables the `vault` CLI itself understands, mapped onto our keys.
fn standard_vault_env() -> Result<config::Config> {
    Ok(config::Config::builder()
        .set_override_option("vault.address", std::env::var("VAULT_ADDR").ok())?
        .set_override_option("vault.token", std::env::var("VAULT_TOKEN").ok())?
        .set_override_option("vault.namespace", std::env::var("VAULT_NAMESPACE").ok())?
        .build()?)
}

impl VaultConfig {
    /// Vault settings from the environment alone (no configuration file).
    pub fn from_env() -> Result<Self> {
        Ok(load_config(None)?.vault)
    }
}
