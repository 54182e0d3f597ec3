use chrono::Duration;

use super::{AUTH_KEY_LENGTH, CookieOptions, ENCRYPT_KEY_LENGTH, SessionStore};
use crate::crypto::generate_key;
use crate::{SecretString, SessionError};

pub const DEFAULT_DOMAIN: &str = ".";
pub const DEFAULT_PATH: &str = "/";
pub const DEFAULT_COOKIE_NAME: &str = "session";

/// `SameSite` attribute of the session cookie.
///
/// `Default` leaves the attribute off and lets the browser decide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SameSite {
    Default,
    Lax,
    #[default]
    Strict,
    None,
}

impl SameSite {
    /// Maps the numeric codes 1 through 4 (default, lax, strict, none) to a
    /// variant. Anything else is out of range.
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            1 => Some(SameSite::Default),
            2 => Some(SameSite::Lax),
            3 => Some(SameSite::Strict),
            4 => Some(SameSite::None),
            _ => None,
        }
    }

    pub fn code(self) -> i64 {
        match self {
            SameSite::Default => 1,
            SameSite::Lax => 2,
            SameSite::Strict => 3,
            SameSite::None => 4,
        }
    }
}

/// Session cookie settings and the two secret keys.
///
/// A config has to go through [`SessionConfig::init`] before it can serve
/// sessions. `init` validates the fields, fills in blanks and binds a
/// [`SessionStore`] to the keys. Changing the keys afterwards has no effect
/// until `init` runs again. The cookie attributes are re-read on every save,
/// and `max_age` is re-read on every load as well.
///
/// # Example
///
/// ```rust
/// use chrono::Duration;
/// use sealed_session::{SameSite, SessionConfig};
///
/// let mut config = SessionConfig::new();
/// config.max_age = Duration::hours(8);
/// config.secure = true;
/// config.same_site = Some(SameSite::Lax);
/// config.init().unwrap();
///
/// assert!(config.is_initialized());
/// ```
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Domain to serve the cookie under. `"."` leaves the attribute off.
    pub domain: String,
    pub path: String,
    /// How long the cookie and the sealed value stay valid.
    pub max_age: Duration,
    pub http_only: bool,
    pub secure: bool,
    /// `None` stands for an unset or out of range value and is validated to
    /// [`SameSite::Strict`].
    pub same_site: Option<SameSite>,
    pub cookie_name: String,
    /// 64 characters. Generated by `validate` when empty.
    pub auth_key: SecretString,
    /// 32 characters. Generated by `validate` when empty.
    pub encrypt_key: SecretString,
    store: Option<SessionStore>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            domain: DEFAULT_DOMAIN.to_owned(),
            path: DEFAULT_PATH.to_owned(),
            max_age: Duration::hours(1),
            http_only: true,
            secure: false,
            same_site: Some(SameSite::Strict),
            cookie_name: DEFAULT_COOKIE_NAME.to_owned(),
            auth_key: SecretString::empty(),
            encrypt_key: SecretString::empty(),
            store: None,
        }
    }
}

impl SessionConfig {
    /// Creates a config with the defaults: domain `"."`, path `"/"`, one hour
    /// max age, http-only, not secure, `SameSite=Strict`, cookie `"session"`
    /// and no keys.
    pub fn new() -> Self {
        Self::default()
    }

    /// A config with every field empty or zero. It fails validation until a
    /// max age is set.
    pub const fn zeroed() -> Self {
        Self {
            domain: String::new(),
            path: String::new(),
            max_age: Duration::zero(),
            http_only: false,
            secure: false,
            same_site: None,
            cookie_name: String::new(),
            auth_key: SecretString::empty(),
            encrypt_key: SecretString::empty(),
            store: None,
        }
    }

    /// Checks the config and fills in what can be defaulted.
    ///
    /// Blank domain and path fall back to `"."` and `"/"`, an unset
    /// `same_site` becomes `Strict`, and empty keys are generated. Running it
    /// again on a valid config changes nothing.
    ///
    /// # Errors
    ///
    /// - [`SessionError::MaxAgeTooShort`] when `max_age` is under one second
    /// - [`SessionError::AuthKeyWrongSize`] when the auth key is set but not 64 bytes
    /// - [`SessionError::EncryptKeyWrongSize`] when the encrypt key is set but not 32 bytes
    pub fn validate(&mut self) -> Result<(), SessionError> {
        if self.domain.trim().is_empty() {
            self.domain = DEFAULT_DOMAIN.to_owned();
        }

        if self.path.trim().is_empty() {
            self.path = DEFAULT_PATH.to_owned();
        }

        if self.max_age < Duration::seconds(1) {
            return Err(SessionError::MaxAgeTooShort);
        }

        if self.same_site.is_none() {
            self.same_site = Some(SameSite::Strict);
        }

        match self.auth_key.len() {
            0 => self.auth_key = generate_key(AUTH_KEY_LENGTH),
            AUTH_KEY_LENGTH => {}
            _ => return Err(SessionError::AuthKeyWrongSize),
        }

        match self.encrypt_key.len() {
            0 => self.encrypt_key = generate_key(ENCRYPT_KEY_LENGTH),
            ENCRYPT_KEY_LENGTH => {}
            _ => return Err(SessionError::EncryptKeyWrongSize),
        }

        Ok(())
    }

    /// Cookie attributes derived from the current field values.
    pub fn cookie_options(&self) -> CookieOptions {
        CookieOptions {
            domain: self.domain.clone(),
            path: self.path.clone(),
            max_age: self.max_age.num_seconds(),
            http_only: self.http_only,
            secure: self.secure,
            same_site: self.same_site.unwrap_or_default(),
        }
    }

    /// Validates the config and binds a fresh [`SessionStore`] to its keys.
    ///
    /// Calling it again replaces the store, which is how keys are rotated.
    /// Sessions sealed under the old keys read as new afterwards.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(name = "session_init", skip_all, err)
    )]
    pub fn init(&mut self) -> Result<(), SessionError> {
        if let Err(e) = self.validate() {
            log::error!(
                target: "sealed_session",
                "msg=\"invalid session config\" error=\"{e}\""
            );
            return Err(e);
        }

        let store = SessionStore::new(&self.auth_key, &self.encrypt_key, &self.cookie_name)?;
        let replaced = self.store.replace(store).is_some();

        log::info!(
            target: "sealed_session",
            "msg=\"session store initialized\" cookie_name=\"{}\" max_age_secs={} replaced={replaced}",
            self.cookie_name,
            self.max_age.num_seconds()
        );

        Ok(())
    }

    pub fn is_initialized(&self) -> bool {
        self.store.is_some()
    }

    pub fn store(&self) -> Option<&SessionStore> {
        self.store.as_ref()
    }

    pub(crate) fn require_store(&self) -> Result<&SessionStore, SessionError> {
        self.store.as_ref().ok_or(SessionError::NotInitialized)
    }
}
