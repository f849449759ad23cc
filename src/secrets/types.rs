//! Value types exchanged with the secret-management service.
//!
//! All of them are transient: built per call and dropped afterwards. Secret
//! material is carried in [`SecretString`], which never prints its contents.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::error::{Result, SecretError};

/// A string wrapper that redacts its contents in Debug, Display, and serialization.
///
/// - Debug output shows `SecretString([REDACTED])`
/// - Display output shows `[REDACTED]`
/// - Serialization outputs `"[REDACTED]"`; deserialization accepts real values
/// - Memory is zeroed when dropped
///
/// The value is only reachable through [`SecretString::expose_secret`].
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecretString(String);

impl Serialize for SecretString {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str("[REDACTED]")
    }
}

impl<'de> Deserialize<'de> for SecretString {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        Ok(SecretString(value))
    }
}

impl SecretString {
    /// Creates a new SecretString from a string value.
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// Exposes the underlying secret value. Never log the result.
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    /// Returns the length of the secret without exposing the value.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true if the secret is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self::new(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Fully qualified location of a single field inside a key/value secret.
///
/// Written as `mount/logical/path#field`, e.g.
/// `secret/team-a/github#github.oauth2.key`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SecretPath {
    mount: String,
    logical_path: String,
    field_key: String,
}

impl SecretPath {
    /// Build a path, trimming surrounding slashes from mount and path.
    ///
    /// # Errors
    ///
    /// [`SecretError::InvalidInput`] if any component is empty after trimming.
    pub fn new(
        mount: impl AsRef<str>,
        logical_path: impl AsRef<str>,
        field_key: impl Into<String>,
    ) -> Result<Self> {
        let mount = mount.as_ref().trim_matches('/').to_string();
        let logical_path = logical_path.as_ref().trim_matches('/').to_string();
        let field_key = field_key.into();

        if mount.is_empty() {
            return Err(SecretError::invalid_input("secret mount cannot be empty"));
        }
        if logical_path.is_empty() {
            return Err(SecretError::invalid_input("secret path cannot be empty"));
        }
        if field_key.is_empty() {
            return Err(SecretError::invalid_input("secret field key cannot be empty"));
        }

        Ok(Self { mount, logical_path, field_key })
    }

    pub fn mount(&self) -> &str {
        &self.mount
    }

    pub fn logical_path(&self) -> &str {
        &self.logical_path
    }

    pub fn field_key(&self) -> &str {
        &self.field_key
    }

    /// `mount/logical_path`, the location without the field.
    pub fn location(&self) -> String {
        format!("{}/{}", self.mount, self.logical_path)
    }
}

impl fmt::Display for SecretPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}#{}", self.mount, self.logical_path, self.field_key)
    }
}

impl FromStr for SecretPath {
    type Err = SecretError;

    fn from_str(s: &str) -> Result<Self> {
        let (location, field) = s.rsplit_once('#').ok_or_else(|| {
            SecretError::invalid_input(format!("secret path '{}' is missing '#field'", s))
        })?;
        let (mount, logical_path) = location.trim_start_matches('/').split_once('/').ok_or_else(
            || SecretError::invalid_input(format!("secret path '{}' must be mount/path#field", s)),
        )?;
        Self::new(mount, logical_path, field)
    }
}

/// Why a secret field could not be resolved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Absence {
    /// Nothing is stored at the path at all.
    PathMissing,
    /// The path exists but its current version carries no data.
    NoDataAtPath,
    /// The path has data, just not the requested field.
    FieldMissing,
}

impl Absence {
    pub fn reason(&self) -> &'static str {
        match self {
            Absence::PathMissing => "path missing",
            Absence::NoDataAtPath => "no data at path",
            Absence::FieldMissing => "field missing",
        }
    }
}

impl fmt::Display for Absence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.reason())
    }
}

/// The resolved value of a [`SecretPath`], or the reason it is absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SecretValue {
    Present(SecretString),
    Absent(Absence),
}

impl SecretValue {
    pub fn is_present(&self) -> bool {
        matches!(self, SecretValue::Present(_))
    }

    pub fn as_secret(&self) -> Option<&SecretString> {
        match self {
            SecretValue::Present(value) => Some(value),
            SecretValue::Absent(_) => None,
        }
    }

    pub fn absence(&self) -> Option<Absence> {
        match self {
            SecretValue::Present(_) => None,
            SecretValue::Absent(absence) => Some(*absence),
        }
    }

    /// Turn absence into the matching named error.
    ///
    /// A missing path becomes [`SecretError::PathNotFound`]; a path without
    /// data or without the field becomes [`SecretError::FieldAbsent`].
    pub fn require(self, path: &SecretPath) -> Result<SecretString> {
        match self {
            SecretValue::Present(value) => Ok(value),
            SecretValue::Absent(Absence::PathMissing) => {
                Err(SecretError::path_not_found(path.location()))
            }
            SecretValue::Absent(absence) => {
                Err(SecretError::field_absent(path.location(), path.field_key(), absence.reason()))
            }
        }
    }
}

/// Name of a key inside the transit backend.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TransitKeyName(String);

impl TransitKeyName {
    /// # Errors
    ///
    /// [`SecretError::InvalidInput`] for empty names or names containing `/`
    /// or whitespace, which would alter the request path.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(SecretError::invalid_input("transit key name cannot be empty"));
        }
        if name.contains('/') || name.chars().any(char::is_whitespace) {
            return Err(SecretError::invalid_input(format!(
                "transit key name '{}' cannot contain '/' or whitespace",
                name
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransitKeyName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for TransitKeyName {
    type Error = SecretError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TransitKeyName> for String {
    fn from(name: TransitKeyName) -> Self {
        name.0
    }
}

impl FromStr for TransitKeyName {
    type Err = SecretError;

    fn from_str(s: &str) -> Result<Self> {
        Self::new(s)
    }
}

/// Opaque ciphertext produced by the transit backend (`vault:v1:...`).
///
/// Callers only hand it back to `decrypt`; its structure is the service's
/// business.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ciphertext(String);

impl Ciphertext {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Ciphertext {
    fn from(s: String) -> Self {
        Self(s)
    }
}
