//! Key material wrapper.
//!
//! The auth and encrypt keys are held in [`SecretString`] so a stray
//! `{:?}` on a config never prints them.

use std::fmt;

/// A string that redacts itself in `Debug` and `Display` output.
///
/// # Example
///
/// ```rust
/// use sealed_session::SecretString;
///
/// let key = SecretString::new("0123456789abcdef0123456789abcdef");
///
/// assert_eq!(format!("{:?}", key), "SecretString([REDACTED])");
/// assert_eq!(key.len(), 32);
/// ```
#[derive(Clone, Default)]
pub struct SecretString(String);

impl SecretString {
    #[must_use]
    pub fn new(secret: impl Into<String>) -> Self {
        Self(secret.into())
    }

    /// An empty secret, usable in `const` and `static` initializers.
    #[must_use]
    pub const fn empty() -> Self {
        Self(String::new())
    }

    /// Exposes the secret value.
    ///
    /// Use this only where the raw key is needed, such as building the codec.
    #[must_use]
    pub fn expose_secret(&self) -> &str {
        &self.0
    }

    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        self.0.as_bytes()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Length in bytes, which is what the key size checks compare against.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl fmt::Debug for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SecretString([REDACTED])")
    }
}

impl fmt::Display for SecretString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[REDACTED]")
    }
}

impl From<String> for SecretString {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for SecretString {
    fn from(s: &str) -> Self {
        Self(s.to_owned())
    }
}

impl PartialEq for SecretString {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}

impl Eq for SecretString {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_string_debug_redacted() {
        let secret = SecretString::new("auth-key");
        assert_eq!(format!("{secret:?}"), "SecretString([REDACTED])");
    }

    #[test]
    fn test_secret_string_display_redacted() {
        let secret = SecretString::new("auth-key");
        assert_eq!(format!("{secret}"), "[REDACTED]");
    }

    #[test]
    fn test_secret_string_expose_secret() {
        let secret = SecretString::new("auth-key");
        assert_eq!(secret.expose_secret(), "auth-key");
        assert_eq!(secret.as_bytes(), b"auth-key");
    }

    #[test]
    fn test_secret_string_empty() {
        let secret = SecretString::empty();
        assert!(secret.is_empty());
        assert_eq!(secret.len(), 0);
        assert_eq!(secret, SecretString::default());
    }

    #[test]
    fn test_secret_string_len_counts_bytes() {
        let secret: SecretString = "é".into();
        assert_eq!(secret.len(), 2);
    }

    #[test]
    fn test_secret_string_from_string() {
        let secret: SecretString = String::from("key").into();
        assert_eq!(secret.expose_secret(), "key");
    }
}
