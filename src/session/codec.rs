//! Sealed cookie values.
//!
//! A value is serialized to JSON, encrypted with AES-256-GCM, timestamped and
//! then authenticated with HMAC-SHA256. The cookie name is part of the MAC
//! input, so a value sealed for one cookie is rejected under another name.
//!
//! Token layout: `base64url("{timestamp}|{base64url(nonce || ciphertext)}")`
//! followed by `.` and the hex encoded MAC.

use std::fmt;
use std::sync::Arc;

use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::aead::{Aead, KeyInit, OsRng};
use aes_gcm::{Aes256Gcm, Nonce};
use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use chrono::Utc;
use hmac::{Hmac, Mac};
use serde::Serialize;
use serde::de::DeserializeOwned;
use sha2::Sha256;

use crate::SecretString;

type HmacSha256 = Hmac<Sha256>;

const NONCE_LEN: usize = 12;
const TAG_LEN: usize = 16;

/// Browsers drop cookies much larger than this.
pub const MAX_ENCODED_LENGTH: usize = 4096;

/// Tokens stamped further than this in the future are rejected.
const MAX_CLOCK_SKEW_SECS: i64 = 60;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// The token is not in the expected layout.
    Malformed,
    /// The MAC does not match; the value was altered or sealed with another key.
    InvalidMac,
    /// The timestamp is older than the max age.
    Expired,
    Encrypt,
    Decrypt,
    Serialize,
    /// The sealed token is longer than [`MAX_ENCODED_LENGTH`].
    ValueTooLong(usize),
}

impl std::error::Error for CodecError {}

impl fmt::Display for CodecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CodecError::Malformed => write!(f, "the cookie value is malformed"),
            CodecError::InvalidMac => write!(f, "the cookie value failed authentication"),
            CodecError::Expired => write!(f, "the cookie value has expired"),
            CodecError::Encrypt => write!(f, "failed to encrypt the cookie value"),
            CodecError::Decrypt => write!(f, "failed to decrypt the cookie value"),
            CodecError::Serialize => write!(f, "failed to serialize the cookie value"),
            CodecError::ValueTooLong(len) => write!(
                f,
                "the cookie value is too long ({len} bytes, max {MAX_ENCODED_LENGTH})"
            ),
        }
    }
}

/// Seals and unseals cookie values with a fixed key pair.
///
/// Cloning is cheap; the keys are shared.
#[derive(Clone)]
pub struct SecureCookie {
    keys: Arc<Keys>,
    max_age_secs: i64,
}

struct Keys {
    mac: HmacSha256,
    cipher: Aes256Gcm,
}

impl fmt::Debug for SecureCookie {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecureCookie")
            .field("keys", &"[REDACTED]")
            .field("max_age_secs", &self.max_age_secs)
            .finish()
    }
}

impl SecureCookie {
    /// Creates a codec from an auth key (any length, 64 bytes expected) and a
    /// 32 byte encrypt key.
    ///
    /// # Errors
    ///
    /// Returns [`CodecError::Encrypt`] if the encrypt key is not 32 bytes.
    pub fn new(auth_key: &SecretString, encrypt_key: &SecretString) -> Result<Self, CodecError> {
        let cipher = <Aes256Gcm as KeyInit>::new_from_slice(encrypt_key.as_bytes())
            .map_err(|_| CodecError::Encrypt)?;
        // HMAC takes keys of any length; this never fails.
        let mac = <HmacSha256 as Mac>::new_from_slice(auth_key.as_bytes())
            .map_err(|_| CodecError::Malformed)?;
        Ok(Self {
            keys: Arc::new(Keys { mac, cipher }),
            max_age_secs: 0,
        })
    }

    /// Sets how long a sealed value stays valid. Zero disables the check.
    #[must_use]
    pub fn with_max_age(mut self, secs: i64) -> Self {
        self.max_age_secs = secs.max(0);
        self
    }

    pub fn max_age(&self) -> i64 {
        self.max_age_secs
    }

    /// Seals `value` for the cookie called `name`.
    pub fn seal<T: Serialize>(&self, name: &str, value: &T) -> Result<String, CodecError> {
        let plaintext = serde_json::to_vec(value).map_err(|_| CodecError::Serialize)?;

        let mut nonce_bytes = [0u8; NONCE_LEN];
        OsRng.fill_bytes(&mut nonce_bytes);
        let ciphertext = self
            .keys
            .cipher
            .encrypt(Nonce::from_slice(&nonce_bytes), plaintext.as_slice())
            .map_err(|_| CodecError::Encrypt)?;

        let mut combined = Vec::with_capacity(NONCE_LEN + ciphertext.len());
        combined.extend_from_slice(&nonce_bytes);
        combined.extend_from_slice(&ciphertext);

        let payload = format!(
            "{}|{}",
            Utc::now().timestamp(),
            URL_SAFE_NO_PAD.encode(&combined)
        );
        let mac = self.mac(name, payload.as_bytes()).finalize().into_bytes();

        let token = format!("{}.{}", URL_SAFE_NO_PAD.encode(&payload), hex::encode(mac));
        if token.len() > MAX_ENCODED_LENGTH {
            return Err(CodecError::ValueTooLong(token.len()));
        }
        Ok(token)
    }

    /// Verifies and opens a token produced by [`SecureCookie::seal`], using
    /// the max age set with [`SecureCookie::with_max_age`].
    pub fn unseal<T: DeserializeOwned>(&self, name: &str, token: &str) -> Result<T, CodecError> {
        self.unseal_within(name, token, self.max_age_secs)
    }

    /// Like [`SecureCookie::unseal`], but rejects tokens older than
    /// `max_age_secs`. Zero or less disables the age check.
    pub fn unseal_within<T: DeserializeOwned>(
        &self,
        name: &str,
        token: &str,
        max_age_secs: i64,
    ) -> Result<T, CodecError> {
        if token.len() > MAX_ENCODED_LENGTH {
            return Err(CodecError::ValueTooLong(token.len()));
        }

        let (payload_b64, mac_hex) = token.rsplit_once('.').ok_or(CodecError::Malformed)?;
        let payload = URL_SAFE_NO_PAD
            .decode(payload_b64)
            .map_err(|_| CodecError::Malformed)?;
        let mac = hex::decode(mac_hex).map_err(|_| CodecError::Malformed)?;

        self.mac(name, &payload)
            .verify_slice(&mac)
            .map_err(|_| CodecError::InvalidMac)?;

        let payload = std::str::from_utf8(&payload).map_err(|_| CodecError::Malformed)?;
        let (timestamp, sealed) = payload.split_once('|').ok_or(CodecError::Malformed)?;
        let timestamp: i64 = timestamp.parse().map_err(|_| CodecError::Malformed)?;

        let now = Utc::now().timestamp();
        if timestamp > now.saturating_add(MAX_CLOCK_SKEW_SECS) {
            return Err(CodecError::Expired);
        }
        if max_age_secs > 0 && timestamp < now.saturating_sub(max_age_secs) {
            return Err(CodecError::Expired);
        }

        let combined = URL_SAFE_NO_PAD
            .decode(sealed)
            .map_err(|_| CodecError::Malformed)?;
        if combined.len() < NONCE_LEN + TAG_LEN {
            return Err(CodecError::Malformed);
        }
        let (nonce, ciphertext) = combined.split_at(NONCE_LEN);
        let plaintext = self
            .keys
            .cipher
            .decrypt(Nonce::from_slice(nonce), ciphertext)
            .map_err(|_| CodecError::Decrypt)?;

        serde_json::from_slice(&plaintext).map_err(|_| CodecError::Malformed)
    }

    fn mac(&self, name: &str, payload: &[u8]) -> HmacSha256 {
        let mut mac = self.keys.mac.clone();
        mac.update(name.as_bytes());
        mac.update(b"|");
        mac.update(payload);
        mac
    }
}
