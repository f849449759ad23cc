//! HashiCorp Vault implementation of [`SecretVaultClient`].
//!
//! Key/value reads go through the KV v2 engine; encryption goes through the
//! transit engine, so key material never leaves Vault.
//!
//! # Example
//!
//! ```rust,ignore
//! use vault_transit_client::config::VaultConfig;
//! use vault_transit_client::secrets::{
//!     SecretPath, SecretVaultClient, TransitKeyName, VaultSecretClient,
//! };
//!
//! let client = VaultSecretClient::new(&VaultConfig::from_env()?)?;
//!
//! let path: SecretPath = "secret/team-a/github#github.oauth2.key".parse()?;
//! let value = client.get_secret_field(&path).await?;
//!
//! let key = TransitKeyName::new("foo-key")?;
//! client.ensure_transit_key(&key).await?;
//! let ciphertext = client.encrypt(&key, b"Secure message").await?;
//! let plaintext = client.decrypt(&key, &ciphertext).await?;
//! ```

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use rustify::errors::ClientError as RestClientError;
use serde_json::Value;
use std::collections::HashMap;
use tracing::{debug, info, instrument, warn};
use vaultrs::client::{VaultClient, VaultClientSettingsBuilder};
use vaultrs::error::ClientError;
use vaultrs::{kv2, sys, transit};

use super::client::SecretVaultClient;
use super::error::{Result, SecretError};
use super::types::{Absence, Ciphertext, SecretPath, SecretString, SecretValue, TransitKeyName};
use crate::config::VaultConfig;

/// Vault-backed secret client.
///
/// Holds the HTTP client and the transit mount name, nothing else. It is
/// `Send + Sync`; wrap it in an `Arc` to share it.
pub struct VaultSecretClient {
    client: VaultClient,
    transit_mount: String,
}

impl std::fmt::Debug for VaultSecretClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultSecretClient")
            .field("transit_mount", &self.transit_mount)
            .field("client", &"[VaultClient]")
            .finish()
    }
}

impl VaultSecretClient {
    /// Build a client from already-validated connection settings.
    ///
    /// No request is made here; connection problems surface on first use.
    ///
    /// # Errors
    ///
    /// - [`SecretError::Config`] if the address or TLS settings are rejected
    pub fn new(config: &VaultConfig) -> Result<Self> {
        if config.address.is_empty() {
            return Err(SecretError::config_error("Vault address cannot be empty"));
        }

        let mut settings_builder = VaultClientSettingsBuilder::default();
        settings_builder
            .address(&config.address)
            .timeout(Some(config.timeout()))
            .verify(config.verify_tls);

        if let Some(ref token) = config.token {
            settings_builder.token(token.expose_secret());
        }

        if let Some(ref namespace) = config.namespace {
            settings_builder.namespace(Some(namespace.clone()));
        }

        let settings = settings_builder.build().map_err(|e| {
            SecretError::config_error(format!("Invalid Vault configuration: {}", e))
        })?;

        let client = VaultClient::new(settings).map_err(|e| {
            SecretError::config_error(format!("Failed to create Vault client: {}", e))
        })?;

        info!(
            address = %config.address,
            transit_mount = %config.transit_mount,
            "Initialized Vault secret client"
        );

        Ok(Self { client, transit_mount: config.transit_mount.trim_matches('/').to_string() })
    }

    /// Transit mount this client provisions keys in.
    pub fn transit_mount(&self) -> &str {
        &self.transit_mount
    }

    async fn ensure_transit_mount(&self) -> Result<()> {
        let mounts = sys::mount::list(&self.client)
            .await
            .map_err(|e| service_error("list secret engine mounts", e))?;

        if mounts.contains_key(&format!("{}/", self.transit_mount)) {
            debug!(mount = %self.transit_mount, "Transit engine already mounted");
            return Ok(());
        }

        match sys::mount::enable(&self.client, &self.transit_mount, "transit", None).await {
            Ok(()) => {
                info!(mount = %self.transit_mount, "Mounted transit secrets engine");
                Ok(())
            }
            Err(e) if is_already_present(&e) => {
                debug!(mount = %self.transit_mount, "Transit engine mounted concurrently");
                Ok(())
            }
            Err(e) => Err(service_error("mount transit engine", e)),
        }
    }

    async fn transit_key_exists(&self, name: &TransitKeyName) -> Result<bool> {
        match transit::key::read(&self.client, &self.transit_mount, name.as_str()).await {
            Ok(_) => Ok(true),
            // Vault answers 404 for a missing key and for an unmounted engine
            Err(e) if status_code(&e) == Some(404) => Ok(false),
            Err(e) => Err(service_error("read transit key", e)),
        }
    }

    /// Transit encrypt silently creates unknown keys, so existence is checked first.
    ///
    /// Tokens limited to `encrypt/` and `decrypt/` cannot read the key; for
    /// them the operation itself reports a missing key.
    async fn require_transit_key(&self, name: &TransitKeyName) -> Result<()> {
        match transit::key::read(&self.client, &self.transit_mount, name.as_str()).await {
            Ok(_) => Ok(()),
            Err(e) if status_code(&e) == Some(404) => {
                Err(SecretError::key_not_found(name.as_str()))
            }
            Err(e) if status_code(&e) == Some(403) => {
                debug!("Transit key not readable with this token, skipping existence check");
                Ok(())
            }
            Err(e) => Err(service_error("read transit key", e)),
        }
    }
}

#[async_trait]
impl SecretVaultClient for VaultSecretClient {
    #[instrument(skip_all, fields(path = %path.location(), field = %path.field_key()))]
    async fn get_secret_field(&self, path: &SecretPath) -> Result<SecretValue> {
        let read: std::result::Result<Option<HashMap<String, Value>>, ClientError> =
            kv2::read(&self.client, path.mount(), path.logical_path()).await;

        let data = match read {
            Ok(data) => data,
            Err(e) if status_code(&e) == Some(404) => {
                let absence = if has_version_metadata(&e) {
                    Absence::NoDataAtPath
                } else {
                    Absence::PathMissing
                };
                debug!(reason = %absence, "Secret not readable");
                return Ok(SecretValue::Absent(absence));
            }
            Err(e) => return Err(service_error("read secret", e)),
        };

        let Some(mut data) = data.filter(|data| !data.is_empty()) else {
            debug!("Secret path holds no data");
            return Ok(SecretValue::Absent(Absence::NoDataAtPath));
        };

        let value = match data.remove(path.field_key()) {
            Some(Value::String(value)) => SecretValue::Present(SecretString::new(value)),
            Some(Value::Null) | None => SecretValue::Absent(Absence::FieldMissing),
            Some(other) => SecretValue::Present(SecretString::new(other.to_string())),
        };

        debug!(present = value.is_present(), "Resolved secret field");
        Ok(value)
    }

    #[instrument(skip_all, fields(mount = %self.transit_mount, key = %name))]
    async fn ensure_transit_key(&self, name: &TransitKeyName) -> Result<()> {
        self.ensure_transit_mount().await?;

        if self.transit_key_exists(name).await? {
            debug!("Transit key already exists");
            return Ok(());
        }

        match transit::key::create(&self.client, &self.transit_mount, name.as_str(), None).await {
            Ok(()) => {
                info!("Created transit key");
                Ok(())
            }
            Err(e) if is_already_present(&e) => {
                debug!("Transit key created concurrently");
                Ok(())
            }
            Err(e) => Err(service_error("create transit key", e)),
        }
    }

    #[instrument(skip_all, fields(mount = %self.transit_mount, key = %name))]
    async fn encrypt(&self, name: &TransitKeyName, plaintext: &[u8]) -> Result<Ciphertext> {
        self.require_transit_key(name).await?;

        let encoded = STANDARD.encode(plaintext);
        let response =
            transit::data::encrypt(&self.client, &self.transit_mount, name.as_str(), &encoded, None)
                .await
                .map_err(|e| {
                    if is_missing_key(&e) {
                        SecretError::key_not_found(name.as_str())
                    } else {
                        service_error("transit encrypt", e)
                    }
                })?;

        debug!(bytes = plaintext.len(), "Encrypted payload");
        Ok(Ciphertext::new(response.ciphertext))
    }

    #[instrument(skip_all, fields(mount = %self.transit_mount, key = %name))]
    async fn decrypt(&self, name: &TransitKeyName, ciphertext: &Ciphertext) -> Result<Vec<u8>> {
        self.require_transit_key(name).await?;

        let response = transit::data::decrypt(
            &self.client,
            &self.transit_mount,
            name.as_str(),
            ciphertext.as_str(),
            None,
        )
        .await
        .map_err(|e| {
            if is_missing_key(&e) {
                return SecretError::key_not_found(name.as_str());
            }
            match status_code(&e) {
                Some(400) => {
                    warn!("Vault rejected ciphertext");
                    SecretError::invalid_ciphertext(name.as_str(), api_messages(&e))
                }
                _ => service_error("transit decrypt", e),
            }
        })?;

        let plaintext = STANDARD.decode(response.plaintext.as_bytes()).map_err(|e| {
            SecretError::unexpected_response(format!("decrypted plaintext is not base64: {}", e))
        })?;

        debug!(bytes = plaintext.len(), "Decrypted payload");
        Ok(plaintext)
    }
}

/// HTTP status of a failed Vault call, if the server answered at all.
fn status_code(err: &ClientError) -> Option<u16> {
    match err {
        ClientError::APIError { code, .. } => Some(*code),
        ClientError::RestClientError {
            source: RestClientError::ServerResponseError { code, .. },
        } => Some(*code),
        _ => None,
    }
}

fn api_messages(err: &ClientError) -> String {
    match err {
        ClientError::APIError { errors, .. } if !errors.is_empty() => errors.join("; "),
        other => other.to_string(),
    }
}

/// Body of a failed call that vaultrs could not read as `{"errors": [...]}`.
fn response_body(err: &ClientError) -> Option<&str> {
    match err {
        ClientError::RestClientError {
            source: RestClientError::ServerResponseError { content, .. },
        } => content.as_deref(),
        _ => None,
    }
}

/// A KV v2 read of a deleted or destroyed version answers 404 with the
/// version metadata still in the body; a missing path answers without it.
fn has_version_metadata(err: &ClientError) -> bool {
    response_body(err)
        .and_then(|body| serde_json::from_str::<Value>(body).ok())
        .and_then(|body| body.pointer("/data/metadata").cloned())
        .is_some_and(|metadata| metadata.is_object())
}

/// Encrypt and decrypt answer 404, or 400 "encryption key not found", for keys
/// that do not exist and cannot be upserted.
fn is_missing_key(err: &ClientError) -> bool {
    match status_code(err) {
        Some(404) => true,
        Some(400) => api_messages(err).to_lowercase().contains("key not found"),
        _ => false,
    }
}

/// Mount-enable and key-create races come back as 400s with these messages.
fn is_already_present(err: &ClientError) -> bool {
    if status_code(err) != Some(400) {
        return false;
    }
    let messages = api_messages(err).to_lowercase();
    messages.contains("already in use") || messages.contains("already exists")
}

/// Map failures that are not operation-specific onto the error taxonomy.
fn service_error(operation: &str, err: ClientError) -> SecretError {
    match status_code(&err) {
        Some(401) | Some(403) => SecretError::unavailable(format!(
            "{} failed: permission denied ({})",
            operation,
            api_messages(&err)
        )),
        Some(code) if code >= 500 => SecretError::unavailable(format!(
            "{} failed: Vault returned {} ({})",
            operation,
            code,
            api_messages(&err)
        )),
        Some(code) => SecretError::unexpected_response(format!(
            "{} failed: Vault returned {} ({})",
            operation,
            code,
            api_messages(&err)
        )),
        None => match err {
            ClientError::RestClientError { .. } => {
                SecretError::unavailable(format!("{} failed: {}", operation, err))
            }
            other => SecretError::unexpected_response(format!("{} failed: {}", operation, other)),
        },
    }
}
