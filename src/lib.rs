//! Signed and encrypted cookie sessions.
//!
//! Session data lives entirely in one cookie. The cookie value is encrypted
//! and authenticated so clients can neither read nor alter it, and the server
//! keeps no session table.
//!
//! # Usage
//!
//! Build a [`SessionConfig`], call [`SessionConfig::init`] once at startup,
//! then use the accessor methods per request:
//!
//! ```rust
//! use http::{HeaderMap, Request};
//! use sealed_session::SessionConfig;
//!
//! let mut config = SessionConfig::new();
//! config.init().unwrap();
//!
//! let (mut parts, ()) = Request::new(()).into_parts();
//! let mut response = HeaderMap::new();
//!
//! config.add_value(&mut response, &mut parts, "user_session_id", "2554").unwrap();
//! assert_eq!(config.get_value(&mut parts, "user_session_id").unwrap(), "2554");
//! ```
//!
//! The [`global`] module keeps one process-wide configuration for callers
//! that would rather not pass a config around.

use std::fmt;
use std::num::ParseIntError;

pub mod crypto;
pub mod global;
pub mod secret;
pub mod session;

pub use secret::SecretString;
pub use session::{
    CodecError, CookieOptions, SameSite, SecureCookie, Session, SessionConfig, SessionStore,
};

#[derive(Debug, Clone, PartialEq)]
pub enum SessionError {
    AuthKeyWrongSize,
    EncryptKeyWrongSize,
    MaxAgeTooShort,
    NotInitialized,
    KeyNotFound,
    InvalidNumber { key: String, source: ParseIntError },
    Codec(CodecError),
    InvalidHeader,
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::InvalidNumber { source, .. } => Some(source),
            SessionError::Codec(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::AuthKeyWrongSize => write!(
                f,
                "session: auth key is invalid, must be exactly {} characters",
                session::AUTH_KEY_LENGTH
            ),
            SessionError::EncryptKeyWrongSize => write!(
                f,
                "session: encrypt key is invalid, must be exactly {} characters",
                session::ENCRYPT_KEY_LENGTH
            ),
            SessionError::MaxAgeTooShort => {
                write!(f, "session: max age is invalid, must be at least 1 second")
            }
            SessionError::NotInitialized => {
                write!(f, "session: store is not initialized, call init() first")
            }
            SessionError::KeyNotFound => write!(f, "session: key not found in session data"),
            SessionError::InvalidNumber { key, source } => {
                write!(f, "session: value for {key} is not an integer: {source}")
            }
            SessionError::Codec(err) => write!(f, "session: {err}"),
            SessionError::InvalidHeader => {
                write!(f, "session: cookie is not a valid header value")
            }
        }
    }
}

impl From<CodecError> for SessionError {
    fn from(err: CodecError) -> Self {
        SessionError::Codec(err)
    }
}
