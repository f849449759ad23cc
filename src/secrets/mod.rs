//! Secret access over a HashiCorp-Vault-compatible service.
//!
//! The [`SecretVaultClient`] trait is the seam the rest of an application
//! depends on. It offers two capabilities:
//! - **get_secret_field**: read one field of a versioned key/value secret
//! - **ensure_transit_key / encrypt / decrypt**: encryption-as-a-service under
//!   a named transit key, provisioning the key and its mount on request
//!
//! [`VaultSecretClient`] implements it over the Vault HTTP API.
//!
//! # Example
//!
//! ```rust,ignore
//! use vault_transit_client::secrets::{SecretVaultClient, TransitKeyName, VaultSecretClient};
//!
//! let client = VaultSecretClient::new(&config)?;
//! let key = TransitKeyName::new("foo-key")?;
//!
//! client.ensure_transit_key(&key).await?;
//! let ciphertext = client.encrypt(&key, b"Secure message").await?;
//! assert_eq!(client.decrypt(&key, &ciphertext).await?, b"Secure message");
//! ```
//!
//! # Security Considerations
//!
//! - Secret values and plaintexts are never logged or put into error messages
//! - Secret values are held in [`SecretString`], zeroed on drop
//! - Nothing is cached; every call reads fresh from the service

pub mod client;
pub mod error;
pub mod types;
pub mod vault;

pub use client::SecretVaultClient;
pub use error::{Result, SecretError};
pub use types::{Absence, Ciphertext, SecretPath, SecretString, SecretValue, TransitKeyName};
pub use vault::VaultSecretClient;
