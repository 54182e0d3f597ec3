//! Per-request session operations.
//!
//! Every method takes the request as [`Parts`] so the loaded session can be
//! cached in its extensions, and writes go to the response [`HeaderMap`] as
//! one `Set-Cookie` per save.

use std::collections::BTreeMap;

use http::HeaderMap;
use http::request::Parts;

use super::{Registry, Session, SessionConfig};
use crate::SessionError;

impl SessionConfig {
    /// Returns the session for the request, loading it from the cookie on
    /// first access.
    ///
    /// The result has `is_new` set when the request had no valid session
    /// cookie. See [`SessionStore::get`](super::SessionStore::get).
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::NotInitialized`] before [`SessionConfig::init`].
    pub fn get_session(&self, req: &mut Parts) -> Result<Session, SessionError> {
        let store = self.require_store()?;

        if let Some(session) = Registry::get(&req.extensions, store.cookie_name()) {
            return Ok(session);
        }

        let session = store.get(&req.headers, self.max_age);
        Registry::put(&mut req.extensions, session.clone());
        Ok(session)
    }

    /// Stores `value` under `key` and writes the updated cookie.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session_add_value", skip(self, res, req, value), err)
    )]
    pub fn add_value(
        &self,
        res: &mut HeaderMap,
        req: &mut Parts,
        key: &str,
        value: &str,
    ) -> Result<(), SessionError> {
        let mut session = self.get_session(req)?;
        session.insert(key, value);
        self.save(res, req, session)
    }

    /// Returns the value stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::KeyNotFound`] when the key is absent.
    pub fn get_value(&self, req: &mut Parts, key: &str) -> Result<String, SessionError> {
        self.get_session(req)?
            .values
            .remove(key)
            .ok_or(SessionError::KeyNotFound)
    }

    /// Returns every key-value pair in the session.
    pub fn get_all_values(
        &self,
        req: &mut Parts,
    ) -> Result<BTreeMap<String, String>, SessionError> {
        Ok(self.get_session(req)?.values)
    }

    /// Deletes `key` from the session and writes the updated cookie. Removing
    /// a key that is not there still rewrites the cookie.
    pub fn remove_value(
        &self,
        res: &mut HeaderMap,
        req: &mut Parts,
        key: &str,
    ) -> Result<(), SessionError> {
        let mut session = self.get_session(req)?;
        session.remove(key);
        self.save(res, req, session)
    }

    /// Rewrites the cookie unchanged with a fresh expiry, sliding the session
    /// window forward by `max_age`.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session_extend", skip_all, err)
    )]
    pub fn extend(&self, res: &mut HeaderMap, req: &mut Parts) -> Result<(), SessionError> {
        let session = self.get_session(req)?;
        self.save(res, req, session)
    }

    /// Expires the session cookie on the client and clears the session for
    /// the rest of this request. Typically used on logout.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session_destroy", skip_all, err)
    )]
    pub fn destroy(&self, res: &mut HeaderMap, req: &mut Parts) -> Result<(), SessionError> {
        let store = self.require_store()?;
        let session = self.get_session(req)?;

        let mut options = self.cookie_options();
        options.max_age = -1;
        store.save(&session, &options, res)?;

        Registry::put(&mut req.extensions, Session::new(store.cookie_name()));

        log::debug!(
            target: "sealed_session",
            "msg=\"session destroyed\" cookie_name=\"{}\"",
            store.cookie_name()
        );

        Ok(())
    }

    fn save(
        &self,
        res: &mut HeaderMap,
        req: &mut Parts,
        session: Session,
    ) -> Result<(), SessionError> {
        let store = self.require_store()?;
        store.save(&session, &self.cookie_options(), res)?;
        Registry::put(&mut req.extensions, session);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use http::Request;
    use http::header::{COOKIE, HeaderValue, SET_COOKIE};

    use super::*;

    fn config() -> SessionConfig {
        let mut config = SessionConfig::new();
        config.init().unwrap();
        config
    }

    fn request() -> Parts {
        Request::new(()).into_parts().0
    }

    /// Builds the next request from the last `Set-Cookie` of a response.
    fn follow_up(response: &HeaderMap) -> Parts {
        let set_cookie = response
            .get_all(SET_COOKIE)
            .iter()
            .last()
            .unwrap()
            .to_str()
            .unwrap();
        let pair = set_cookie.split(';').next().unwrap();
        Request::builder()
            .header(COOKIE, HeaderValue::from_str(pair).unwrap())
            .body(())
            .unwrap()
            .into_parts()
            .0
    }

    #[test]
    fn test_uninitialized_config() {
        let config = SessionConfig::new();
        let mut req = request();
        let mut res = HeaderMap::new();

        assert_eq!(
            config.get_session(&mut req),
            Err(SessionError::NotInitialized)
        );
        assert_eq!(
            config.add_value(&mut res, &mut req, "k", "v"),
            Err(SessionError::NotInitialized)
        );
        assert_eq!(
            config.destroy(&mut res, &mut req),
            Err(SessionError::NotInitialized)
        );
    }

    #[test]
    fn test_get_session_new() {
        let session = config().get_session(&mut request()).unwrap();
        assert!(session.is_new);
        assert!(session.values.is_empty());
    }

    #[test]
    fn test_add_and_get_value_same_request() {
        let config = config();
        let mut req = request();
        let mut res = HeaderMap::new();

        config.add_value(&mut res, &mut req, "user_session_id", "2554").unwrap();
        assert_eq!(
            config.get_value(&mut req, "user_session_id").unwrap(),
            "2554"
        );
        assert_eq!(
            config.get_value(&mut req, "missing"),
            Err(SessionError::KeyNotFound)
        );
        assert!(res.get(SET_COOKIE).is_some());
    }

    #[test]
    fn test_add_and_get_value_next_request() {
        let config = config();
        let mut res = HeaderMap::new();
        config
            .add_value(&mut res, &mut request(), "user_session_id", "2554")
            .unwrap();

        let mut next = follow_up(&res);
        assert!(!config.get_session(&mut next).unwrap().is_new);
        assert_eq!(
            config.get_value(&mut next, "user_session_id").unwrap(),
            "2554"
        );
    }

    #[test]
    fn test_get_all_values() {
        let config = config();
        let mut req = request();
        let mut res = HeaderMap::new();

        assert!(config.get_all_values(&mut req).unwrap().is_empty());

        config.add_value(&mut res, &mut req, "a", "1").unwrap();
        config.add_value(&mut res, &mut req, "b", "2").unwrap();

        let values = config.get_all_values(&mut follow_up(&res)).unwrap();
        assert_eq!(values.len(), 2);
        assert_eq!(values["a"], "1");
        assert_eq!(values["b"], "2");
    }

    #[test]
    fn test_remove_value() {
        let config = config();
        let mut req = request();
        let mut res = HeaderMap::new();

        config.add_value(&mut res, &mut req, "a", "1").unwrap();
        config.remove_value(&mut res, &mut req, "a").unwrap();
        assert_eq!(
            config.get_value(&mut req, "a"),
            Err(SessionError::KeyNotFound)
        );

        let mut next = follow_up(&res);
        assert!(config.get_all_values(&mut next).unwrap().is_empty());
    }

    #[test]
    fn test_extend_keeps_values() {
        let config = config();
        let mut res = HeaderMap::new();
        config.add_value(&mut res, &mut request(), "a", "1").unwrap();

        let mut next = follow_up(&res);
        let before = config.get_all_values(&mut next).unwrap();

        let mut extended = HeaderMap::new();
        config.extend(&mut extended, &mut next).unwrap();
        config.extend(&mut extended, &mut next).unwrap();
        assert_eq!(extended.get_all(SET_COOKIE).iter().count(), 2);

        let after = config.get_all_values(&mut follow_up(&extended)).unwrap();
        assert_eq!(before, after);
    }

    #[test]
    fn test_extend_uses_current_max_age() {
        let mut config = config();
        config.max_age = Duration::hours(2);

        let mut res = HeaderMap::new();
        config.extend(&mut res, &mut request()).unwrap();

        let set_cookie = res.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.contains("Max-Age=7200"));
    }

    #[test]
    fn test_destroy() {
        let config = config();
        let mut res = HeaderMap::new();
        config.add_value(&mut res, &mut request(), "a", "1").unwrap();

        let mut next = follow_up(&res);
        let mut destroyed = HeaderMap::new();
        config.destroy(&mut destroyed, &mut next).unwrap();

        let set_cookie = destroyed.get(SET_COOKIE).unwrap().to_str().unwrap();
        assert!(set_cookie.contains("Max-Age=0"));

        assert!(config.get_session(&mut next).unwrap().is_new);
        assert_eq!(
            config.get_value(&mut next, "a"),
            Err(SessionError::KeyNotFound)
        );

        let mut after = follow_up(&destroyed);
        assert!(config.get_session(&mut after).unwrap().is_new);
    }

    #[test]
    fn test_tampered_cookie_gives_new_session() {
        let config = config();
        let mut res = HeaderMap::new();
        config.add_value(&mut res, &mut request(), "a", "1").unwrap();

        let set_cookie = res.get(SET_COOKIE).unwrap().to_str().unwrap();
        let pair = set_cookie.split(';').next().unwrap();
        let mut bytes = pair.as_bytes().to_vec();
        let i = "session=".len() + 5;
        bytes[i] = if bytes[i] == b'A' { b'B' } else { b'A' };
        let tampered = String::from_utf8(bytes).unwrap();

        let mut req = Request::builder()
            .header(COOKIE, HeaderValue::from_str(&tampered).unwrap())
            .body(())
            .unwrap()
            .into_parts()
            .0;
        let session = config.get_session(&mut req).unwrap();
        assert!(session.is_new);
        assert!(session.values.is_empty());
    }

    #[test]
    fn test_reinit_rotates_keys() {
        let mut config = config();
        let mut res = HeaderMap::new();
        config.add_value(&mut res, &mut request(), "a", "1").unwrap();

        config.auth_key = crate::SecretString::empty();
        config.encrypt_key = crate::SecretString::empty();
        config.init().unwrap();

        assert!(config.get_session(&mut follow_up(&res)).unwrap().is_new);
    }
}
