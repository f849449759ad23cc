//! # Configuration Settings
//!
//! Connection and logging settings for the Vault client.

use crate::errors::{Error, Result};
use crate::secrets::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use validator::{Validate, ValidationError};

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Vault connection configuration
    #[validate(nested)]
    pub vault: VaultConfig,

    /// Logging configuration
    #[validate(nested)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<()> {
        Validate::validate(self).map_err(Error::from)
    }
}

/// Connection settings for a Vault server.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct VaultConfig {
    /// Vault server address (e.g., "https://vault.example.com:8200")
    #[validate(custom(function = "validate_address"))]
    pub address: String,

    /// Vault authentication token (redacted in logs and serialized output)
    pub token: Option<SecretString>,

    /// Vault namespace (for Enterprise multi-tenancy)
    pub namespace: Option<String>,

    /// KV v2 mount holding application secrets
    #[validate(length(min = 1, message = "KV mount cannot be empty"))]
    pub kv_mount: String,

    /// Mount path of the transit engine
    #[validate(length(min = 1, message = "Transit mount cannot be empty"))]
    pub transit_mount: String,

    /// Transit key used when the caller does not name one
    #[validate(length(min = 1, message = "Transit key cannot be empty"))]
    pub transit_key: String,

    /// Per-request timeout applied by the HTTP transport
    #[validate(range(min = 1, max = 300, message = "Timeout must be between 1 and 300 seconds"))]
    pub timeout_secs: u64,

    /// Verify the server TLS certificate
    pub verify_tls: bool,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            address: "http://127.0.0.1:8200".to_string(),
            token: None,
            namespace: None,
            kv_mount: "secret".to_string(),
            transit_mount: "transit".to_string(),
            transit_key: "foo-key".to_string(),
            timeout_secs: 30,
            verify_tls: true,
        }
    }
}

impl VaultConfig {
    /// Request timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn validate_address(address: &str) -> std::result::Result<(), ValidationError> {
    let parsed = url::Url::parse(address).map_err(|_| {
        ValidationError::new("address").with_message("Vault address must be a valid URL".into())
    })?;

    match parsed.scheme() {
        "http" | "https" => Ok(()),
        _ => Err(ValidationError::new("address")
            .with_message("Vault address must use http or https".into())),
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error); `RUST_LOG` takes precedence
    #[validate(length(min = 1, message = "Log level cannot be empty"))]
    pub level: String,

    /// Enable JSON structured logging
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
