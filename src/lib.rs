//! # vault-transit-client
//!
//! A small client for a HashiCorp-Vault-compatible secret-management service:
//! read fields of versioned key/value secrets, and encrypt/decrypt payloads
//! through the transit engine without key material ever leaving the service.
//!
//! ## Architecture
//!
//! ```text
//! demo / caller ──▶ SecretVaultClient (trait) ──▶ VaultSecretClient ──▶ Vault HTTP API
//!                         │                              │
//!                   SecretError kinds            config::VaultConfig
//! ```
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use vault_transit_client::config::load_config;
//! use vault_transit_client::secrets::{SecretVaultClient, TransitKeyName, VaultSecretClient};
//!
//! #[tokio::main]
//! async fn main() -> vault_transit_client::Result<()> {
//!     let config = load_config(None)?;
//!     let client = VaultSecretClient::new(&config.vault)?;
//!
//!     let key = TransitKeyName::new("foo-key")?;
//!     client.ensure_transit_key(&key).await?;
//!     let ciphertext = client.encrypt(&key, b"Secure message").await?;
//!     let plaintext = client.decrypt(&key, &ciphertext).await?;
//!     assert_eq!(plaintext, b"Secure message");
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod demo;
pub mod errors;
pub mod observability;
pub mod secrets;

// Re-export commonly used types and traits
pub use config::{load_config, AppConfig, VaultConfig};
pub use errors::{Error, Result};
pub use secrets::{SecretError, SecretVaultClient, VaultSecretClient};

/// Application version from Cargo.toml
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name from Cargo.toml
pub const APP_NAME: &str = env!("CARGO_PKG_NAME");
