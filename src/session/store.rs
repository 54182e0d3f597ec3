//! Cookie-backed session store.

use std::collections::BTreeMap;

use chrono::Duration;
use http::HeaderMap;

use super::{CookieOptions, SecureCookie, Session, find_cookie};
use crate::{SecretString, SessionError};

/// Loads sessions from request cookies and writes them back as `Set-Cookie`.
///
/// Built by [`SessionConfig::init`](super::SessionConfig::init). Cheap to clone.
#[derive(Debug, Clone)]
pub struct SessionStore {
    codec: SecureCookie,
    cookie_name: String,
}

impl SessionStore {
    /// Binds a codec for `cookie_name`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::EncryptKeyWrongSize`] if the encrypt key cannot
    /// key the cipher.
    pub fn new(
        auth_key: &SecretString,
        encrypt_key: &SecretString,
        cookie_name: &str,
    ) -> Result<Self, SessionError> {
        let codec = SecureCookie::new(auth_key, encrypt_key)
            .map_err(|_| SessionError::EncryptKeyWrongSize)?;

        Ok(Self {
            codec,
            cookie_name: cookie_name.to_owned(),
        })
    }

    pub fn cookie_name(&self) -> &str {
        &self.cookie_name
    }

    pub fn codec(&self) -> &SecureCookie {
        &self.codec
    }

    /// Reads the session cookie from the request headers. Cookies sealed more
    /// than `max_age` ago are expired.
    ///
    /// Never fails. A missing cookie and a cookie that does not verify
    /// (tampered, sealed with other keys, expired or malformed) both give an
    /// empty session with `is_new` set. Callers cannot tell the two apart,
    /// so a forged cookie looks exactly like a logged-out client.
    pub fn get(&self, headers: &HeaderMap, max_age: Duration) -> Session {
        let Some(value) = find_cookie(headers, &self.cookie_name) else {
            return Session::new(&self.cookie_name);
        };

        match self
            .codec
            .unseal_within::<BTreeMap<String, String>>(
                &self.cookie_name,
                &value,
                max_age.num_seconds(),
            ) {
            Ok(values) => Session {
                name: self.cookie_name.clone(),
                values,
                is_new: false,
            },
            Err(e) => {
                if !value.is_empty() {
                    log::warn!(
                        target: "sealed_session",
                        "msg=\"session cookie rejected\" error=\"{e}\" cookie_prefix=\"{}...\"",
                        value.chars().take(8).collect::<String>()
                    );
                }
                Session::new(&self.cookie_name)
            }
        }
    }

    /// Seals the session and appends its `Set-Cookie` header.
    ///
    /// When `options` marks a removal (negative max age) the cookie is
    /// written empty and already expired, so the client drops it.
    pub fn save(
        &self,
        session: &Session,
        options: &CookieOptions,
        headers: &mut HeaderMap,
    ) -> Result<(), SessionError> {
        if options.is_removal() {
            return options.write(headers, &session.name, String::new());
        }

        let value = self.codec.seal(&session.name, &session.values).map_err(|e| {
            log::error!(
                target: "sealed_session",
                "msg=\"failed to seal session\" error=\"{e}\""
            );
            SessionError::Codec(e)
        })?;

        options.write(headers, &session.name, value)
    }
}
