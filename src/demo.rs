//! Walkthrough of the client: read a KV secret, then round-trip a message
//! through the transit engine.
//!
//! The binary drives these steps; they live here so they run against any
//! [`SecretVaultClient`], including the mock server used in tests.

use tracing::{info, warn};

use crate::config::VaultConfig;
use crate::errors::Result;
use crate::secrets::{
    Absence, Ciphertext, SecretPath, SecretValue, SecretVaultClient, TransitKeyName,
};

/// Secret the walkthrough reads, relative to the KV mount.
pub const DEFAULT_SECRET_KEY: &str = "team-a/github";

/// Field of [`DEFAULT_SECRET_KEY`] holding the value.
pub const DEFAULT_SECRET_FIELD: &str = "github.oauth2.key";

/// Default plaintext for the transit round trip.
pub const DEFAULT_MESSAGE: &str = "Secure message";

/// What the walkthrough operates on.
#[derive(Debug, Clone)]
pub struct DemoOptions {
    pub secret_path: SecretPath,
    pub transit_key: TransitKeyName,
    pub message: String,
    /// Log the secret value itself instead of its length
    pub reveal: bool,
}

impl DemoOptions {
    /// Walkthrough defaults for the KV mount and transit key in `config`.
    pub fn from_config(config: &VaultConfig) -> Result<Self> {
        Ok(Self {
            secret_path: default_secret_path(&config.kv_mount)?,
            transit_key: TransitKeyName::new(config.transit_key.clone())?,
            message: DEFAULT_MESSAGE.to_string(),
            reveal: false,
        })
    }
}

/// The demo secret inside `kv_mount`.
pub fn default_secret_path(kv_mount: &str) -> Result<SecretPath> {
    Ok(SecretPath::new(kv_mount, DEFAULT_SECRET_KEY, DEFAULT_SECRET_FIELD)?)
}

/// Outcome of the transit step.
#[derive(Debug, Clone)]
pub struct TransitReport {
    pub key: TransitKeyName,
    pub ciphertext: Ciphertext,
    pub plaintext: Vec<u8>,
}

impl TransitReport {
    /// Whether decryption gave back exactly what was encrypted.
    pub fn round_trip_matches(&self, message: &str) -> bool {
        self.plaintext == message.as_bytes()
    }
}

/// Outcome of a full run.
#[derive(Debug, Clone)]
pub struct DemoReport {
    pub secret: SecretValue,
    pub transit: TransitReport,
}

/// Read the demo secret and log what was found.
///
/// Absence is reported, not raised: a fresh Vault without the secret still
/// lets the transit step run.
pub async fn read_secret(
    client: &dyn SecretVaultClient,
    path: &SecretPath,
    reveal: bool,
) -> Result<SecretValue> {
    let value = client.get_secret_field(path).await?;

    match &value {
        SecretValue::Present(secret) if reveal => {
            info!(path = %path, value = %secret.expose_secret(), "Secret value");
        }
        SecretValue::Present(secret) => {
            info!(
                path = %path,
                length = secret.len(),
                "Secret value found (use --reveal to print it)"
            );
        }
        SecretValue::Absent(absence) => {
            match absence {
                Absence::PathMissing => {
                    warn!(path = %path.location(), "Secret path does not exist")
                }
                Absence::NoDataAtPath => {
                    warn!(path = %path.location(), "No data found at secret path")
                }
                Absence::FieldMissing => warn!(
                    path = %path.location(),
                    field = %path.field_key(),
                    "Secret has no such field"
                ),
            }
            info!(
                "Create it with: vault kv put {} {}=foobar",
                path.location(),
                path.field_key()
            );
        }
    }

    Ok(value)
}

/// Provision the transit key, then encrypt and decrypt `message` under it.
pub async fn transit_round_trip(
    client: &dyn SecretVaultClient,
    key: &TransitKeyName,
    message: &str,
) -> Result<TransitReport> {
    client.ensure_transit_key(key).await?;

    let ciphertext = client.encrypt(key, message.as_bytes()).await?;
    info!(key = %key, ciphertext = %ciphertext, "Encrypted value");

    let plaintext = client.decrypt(key, &ciphertext).await?;
    let report = TransitReport { key: key.clone(), ciphertext, plaintext };

    if report.round_trip_matches(message) {
        let plaintext = String::from_utf8_lossy(&report.plaintext);
        info!(key = %key, plaintext = %plaintext, "Decrypted value");
    } else {
        warn!(key = %key, "Decrypted value differs from the original message");
    }

    Ok(report)
}

/// Run both steps in order.
pub async fn run(client: &dyn SecretVaultClient, options: &DemoOptions) -> Result<DemoReport> {
    let secret = read_secret(client, &options.secret_path, options.reveal).await?;
    let transit = transit_round_trip(client, &options.transit_key, &options.message).await?;
    Ok(DemoReport { secret, transit })
}
