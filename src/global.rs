//! Process-wide default session configuration.
//!
//! For apps that would rather not pass a [`SessionConfig`] around. The
//! instance starts as [`SessionConfig::zeroed`], so call [`default_config`]
//! (and any setters) and then [`init`] once at startup:
//!
//! ```rust,ignore
//! use sealed_session::global;
//!
//! global::default_config();
//! global::set_secure(true);
//! global::set_cookie_name("app_session");
//! global::init()?;
//! ```
//!
//! Setters only change fields. Key changes take effect at the next [`init`];
//! cookie attributes (domain, path, max age, flags, same-site) are re-read
//! on every save. Access is behind a lock, but configuring from several
//! threads while requests are served still gives last-writer-wins results,
//! so configure before serving.

use std::collections::BTreeMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Duration;
use http::HeaderMap;
use http::request::Parts;

use crate::session::{SameSite, Session, SessionConfig};
use crate::{SecretString, SessionError};

static DEFAULT_CONFIG: RwLock<SessionConfig> = RwLock::new(SessionConfig::zeroed());

fn read() -> RwLockReadGuard<'static, SessionConfig> {
    DEFAULT_CONFIG.read().unwrap_or_else(PoisonError::into_inner)
}

fn write() -> RwLockWriteGuard<'static, SessionConfig> {
    DEFAULT_CONFIG.write().unwrap_or_else(PoisonError::into_inner)
}

/// Resets the default instance to [`SessionConfig::new`]. Drops any store.
pub fn default_config() {
    *write() = SessionConfig::new();
}

/// Initializes the default instance. See [`SessionConfig::init`].
pub fn init() -> Result<(), SessionError> {
    write().init()
}

/// Returns a copy of the default instance as it is now.
pub fn get_config() -> SessionConfig {
    read().clone()
}

pub fn set_secure(yes: bool) {
    write().secure = yes;
}

pub fn set_http_only(yes: bool) {
    write().http_only = yes;
}

pub fn set_domain(domain: impl Into<String>) {
    write().domain = domain.into();
}

pub fn set_path(path: impl Into<String>) {
    write().path = path.into();
}

pub fn set_max_age(max_age: Duration) {
    write().max_age = max_age;
}

/// Sets both keys. Takes effect at the next [`init`].
pub fn set_keys(auth_key: impl Into<SecretString>, encrypt_key: impl Into<SecretString>) {
    let mut config = write();
    config.auth_key = auth_key.into();
    config.encrypt_key = encrypt_key.into();
}

/// Sets the cookie name. Takes effect at the next [`init`].
pub fn set_cookie_name(cookie_name: impl Into<String>) {
    write().cookie_name = cookie_name.into();
}

pub fn set_same_site(same_site: Option<SameSite>) {
    write().same_site = same_site;
}

pub fn get_session(req: &mut Parts) -> Result<Session, SessionError> {
    read().get_session(req)
}

pub fn add_value(
    res: &mut HeaderMap,
    req: &mut Parts,
    key: &str,
    value: &str,
) -> Result<(), SessionError> {
    read().add_value(res, req, key, value)
}

pub fn get_value(req: &mut Parts, key: &str) -> Result<String, SessionError> {
    read().get_value(req, key)
}

pub fn get_all_values(req: &mut Parts) -> Result<BTreeMap<String, String>, SessionError> {
    read().get_all_values(req)
}

pub fn remove_value(res: &mut HeaderMap, req: &mut Parts, key: &str) -> Result<(), SessionError> {
    read().remove_value(res, req, key)
}

pub fn extend(res: &mut HeaderMap, req: &mut Parts) -> Result<(), SessionError> {
    read().extend(res, req)
}

pub fn destroy(res: &mut HeaderMap, req: &mut Parts) -> Result<(), SessionError> {
    read().destroy(res, req)
}

pub fn add_username(res: &mut HeaderMap, req: &mut Parts, value: &str) -> Result<(), SessionError> {
    read().add_username(res, req, value)
}

pub fn get_username(req: &mut Parts) -> Result<String, SessionError> {
    read().get_username(req)
}

pub fn add_user_id(res: &mut HeaderMap, req: &mut Parts, value: i64) -> Result<(), SessionError> {
    read().add_user_id(res, req, value)
}

pub fn get_user_id(req: &mut Parts) -> Result<i64, SessionError> {
    read().get_user_id(req)
}

pub fn add_token(res: &mut HeaderMap, req: &mut Parts, value: &str) -> Result<(), SessionError> {
    read().add_token(res, req, value)
}

pub fn get_token(req: &mut Parts) -> Result<String, SessionError> {
    read().get_token(req)
}

pub fn add_session_id(
    res: &mut HeaderMap,
    req: &mut Parts,
    value: i64,
) -> Result<(), SessionError> {
    read().add_session_id(res, req, value)
}

pub fn get_session_id(req: &mut Parts) -> Result<i64, SessionError> {
    read().get_session_id(req)
}
