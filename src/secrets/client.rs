//! Core secret access trait.

use async_trait::async_trait;

use super::error::Result;
use super::types::{Ciphertext, SecretPath, SecretValue, TransitKeyName};

/// Narrow interface over a secret-management service.
///
/// Covers two capabilities: reading a field of a versioned key/value secret,
/// and encrypting/decrypting payloads under a named transit key that never
/// leaves the service.
///
/// Implementations hold nothing but their connection handle, so a single
/// instance can be shared across tasks. Each call is one fresh round trip:
/// nothing is cached and nothing is retried.
///
/// # Security Considerations
///
/// - Implementations MUST NOT log secret values, plaintexts or tokens
/// - Failures are returned to the caller, never swallowed
#[async_trait]
pub trait SecretVaultClient: Send + Sync {
    /// Look up a single field of the key/value secret at `path`.
    ///
    /// Absence is reported in the returned [`SecretValue`], keeping a missing
    /// path apart from a path without data and a path without the field.
    ///
    /// # Errors
    ///
    /// - [`SecretError::Unavailable`] on transport or authorization failure
    ///
    /// [`SecretError::Unavailable`]: super::error::SecretError::Unavailable
    async fn get_secret_field(&self, path: &SecretPath) -> Result<SecretValue>;

    /// Make sure the transit backend is mounted and `name` exists in it.
    ///
    /// Both checks are independent and idempotent; "already exists" answers
    /// from a concurrent provisioner count as success.
    async fn ensure_transit_key(&self, name: &TransitKeyName) -> Result<()>;

    /// Encrypt `plaintext` under the transit key `name`.
    ///
    /// # Errors
    ///
    /// - [`SecretError::KeyNotFound`] if the key was never provisioned
    ///
    /// [`SecretError::KeyNotFound`]: super::error::SecretError::KeyNotFound
    async fn encrypt(&self, name: &TransitKeyName, plaintext: &[u8]) -> Result<Ciphertext>;

    /// Decrypt a ciphertext previously produced under the same key.
    ///
    /// # Errors
    ///
    /// - [`SecretError::KeyNotFound`] if the key does not exist
    /// - [`SecretError::InvalidCiphertext`] if the ciphertext is malformed or
    ///   belongs to another key
    ///
    /// [`SecretError::KeyNotFound`]: super::error::SecretError::KeyNotFound
    /// [`SecretError::InvalidCiphertext`]: super::error::SecretError::InvalidCiphertext
    async fn decrypt(&self, name: &TransitKeyName, ciphertext: &Ciphertext) -> Result<Vec<u8>>;
}
