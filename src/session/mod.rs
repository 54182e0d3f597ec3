mod accessor;
mod codec;
mod config;
mod options;
mod store;
mod typed;

use std::collections::{BTreeMap, HashMap};

use http::Extensions;

pub use codec::{CodecError, MAX_ENCODED_LENGTH, SecureCookie};
pub use config::{DEFAULT_COOKIE_NAME, DEFAULT_DOMAIN, DEFAULT_PATH, SameSite, SessionConfig};
pub use options::{CookieOptions, find_cookie};
pub use store::SessionStore;
pub use typed::{KEY_SESSION_ID, KEY_TOKEN, KEY_USER_ID, KEY_USERNAME};

/// Required auth key length in bytes.
pub const AUTH_KEY_LENGTH: usize = 64;

/// Required encrypt key length in bytes.
pub const ENCRYPT_KEY_LENGTH: usize = 32;

/// Session data for one request.
///
/// `is_new` is true when the request carried no usable session cookie, which
/// includes cookies that failed verification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub name: String,
    pub values: BTreeMap<String, String>,
    pub is_new: bool,
}

impl Session {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            values: BTreeMap::new(),
            is_new: true,
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.insert(key.into(), value.into());
    }

    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.values.remove(key)
    }
}

/// Sessions loaded during one request, keyed by cookie name.
///
/// Lives in the request extensions so every accessor call on the same request
/// sees the same session, including writes made earlier in the request.
#[derive(Debug, Clone, Default)]
struct Registry {
    sessions: HashMap<String, Session>,
}

impl Registry {
    fn get(extensions: &Extensions, name: &str) -> Option<Session> {
        extensions
            .get::<Registry>()
            .and_then(|registry| registry.sessions.get(name))
            .cloned()
    }

    fn put(extensions: &mut Extensions, session: Session) {
        if let Some(registry) = extensions.get_mut::<Registry>() {
            registry.sessions.insert(session.name.clone(), session);
            return;
        }

        let mut registry = Registry::default();
        registry.sessions.insert(session.name.clone(), session);
        extensions.insert(registry);
    }
}
