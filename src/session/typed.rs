//! Helpers for values most apps keep in a session.
//!
//! Integer fields are stored as base-10 strings.

use http::HeaderMap;
use http::request::Parts;

use super::SessionConfig;
use crate::SessionError;

pub const KEY_USERNAME: &str = "username";
pub const KEY_USER_ID: &str = "user_id";
pub const KEY_TOKEN: &str = "token";
pub const KEY_SESSION_ID: &str = "session_id";

impl SessionConfig {
    pub fn add_username(
        &self,
        res: &mut HeaderMap,
        req: &mut Parts,
        value: &str,
    ) -> Result<(), SessionError> {
        self.add_value(res, req, KEY_USERNAME, value)
    }

    pub fn get_username(&self, req: &mut Parts) -> Result<String, SessionError> {
        self.get_value(req, KEY_USERNAME)
    }

    pub fn add_user_id(
        &self,
        res: &mut HeaderMap,
        req: &mut Parts,
        value: i64,
    ) -> Result<(), SessionError> {
        self.add_value(res, req, KEY_USER_ID, &value.to_string())
    }

    /// # Errors
    ///
    /// [`SessionError::KeyNotFound`] when unset, [`SessionError::InvalidNumber`]
    /// when the stored value is not an integer.
    pub fn get_user_id(&self, req: &mut Parts) -> Result<i64, SessionError> {
        self.get_int(req, KEY_USER_ID)
    }

    pub fn add_token(
        &self,
        res: &mut HeaderMap,
        req: &mut Parts,
        value: &str,
    ) -> Result<(), SessionError> {
        self.add_value(res, req, KEY_TOKEN, value)
    }

    pub fn get_token(&self, req: &mut Parts) -> Result<String, SessionError> {
        self.get_value(req, KEY_TOKEN)
    }

    pub fn add_session_id(
        &self,
        res: &mut HeaderMap,
        req: &mut Parts,
        value: i64,
    ) -> Result<(), SessionError> {
        self.add_value(res, req, KEY_SESSION_ID, &value.to_string())
    }

    /// Same error behavior as [`SessionConfig::get_user_id`].
    pub fn get_session_id(&self, req: &mut Parts) -> Result<i64, SessionError> {
        self.get_int(req, KEY_SESSION_ID)
    }

    fn get_int(&self, req: &mut Parts, key: &str) -> Result<i64, SessionError> {
        let value = self.get_value(req, key)?;
        value
            .parse::<i64>()
            .map_err(|source| SessionError::InvalidNumber {
                key: key.to_owned(),
                source,
            })
    }
}
