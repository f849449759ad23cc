//! Error types for secret access operations.

use thiserror::Error;

/// Result type for secret access operations.
pub type Result<T> = std::result::Result<T, SecretError>;

/// Errors that can occur while talking to the secret-management service.
///
/// Every condition that needs a different corrective action has its own
/// variant, so callers can branch on the kind instead of the message.
#[derive(Error, Debug)]
pub enum SecretError {
    /// Transport, connection or authorization failure.
    #[error("Secret service unavailable: {message}")]
    Unavailable { message: String },

    /// The requested secret path does not exist.
    #[error("Secret path not found: {path}")]
    PathNotFound { path: String },

    /// The path exists but the requested field (or any data) is missing.
    #[error("Field '{field}' absent at {path}: {reason}")]
    FieldAbsent { path: String, field: String, reason: String },

    /// The transit key referenced for encrypt/decrypt does not exist.
    #[error("Transit key not found: {name}")]
    KeyNotFound { name: String },

    /// Ciphertext is malformed or was produced under a different key.
    #[error("Invalid ciphertext for key '{name}': {reason}")]
    InvalidCiphertext { name: String, reason: String },

    /// A value was rejected before any request was made.
    #[error("Invalid input: {reason}")]
    InvalidInput { reason: String },

    /// The client could not be built from its settings.
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// The service answered with something the client cannot interpret.
    #[error("Unexpected response from secret service: {message}")]
    UnexpectedResponse { message: String },
}

impl SecretError {
    /// Create an unavailable error.
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::Unavailable { message: message.into() }
    }

    /// Create a path not found error.
    pub fn path_not_found(path: impl Into<String>) -> Self {
        Self::PathNotFound { path: path.into() }
    }

    /// Create a field absent error.
    pub fn field_absent(
        path: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::FieldAbsent { path: path.into(), field: field.into(), reason: reason.into() }
    }

    /// Create a key not found error.
    pub fn key_not_found(name: impl Into<String>) -> Self {
        Self::KeyNotFound { name: name.into() }
    }

    /// Create an invalid ciphertext error.
    pub fn invalid_ciphertext(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidCiphertext { name: name.into(), reason: reason.into() }
    }

    /// Create an invalid input error.
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput { reason: reason.into() }
    }

    /// Create a config error.
    pub fn config_error(message: impl Into<String>) -> Self {
        Self::Config { message: message.into() }
    }

    /// Create an unexpected response error.
    pub fn unexpected_response(message: impl Into<String>) -> Self {
        Self::UnexpectedResponse { message: message.into() }
    }

    /// Whether retrying the same call later could succeed.
    ///
    /// Only transport-level failures qualify; the client itself never retries.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable { .. })
    }
}
