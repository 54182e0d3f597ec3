//! Transport-level cookie attributes.

use chrono::{Duration, Utc};
use cookie::time::{Duration as CookieDuration, OffsetDateTime};
use cookie::{Cookie, Expiration, SameSite as CookieSameSite};
use http::HeaderMap;
use http::header::{COOKIE, HeaderValue, SET_COOKIE};

use super::SameSite;
use crate::SessionError;

/// Attributes written with every session cookie.
///
/// Produced by [`SessionConfig::cookie_options`](super::SessionConfig::cookie_options).
/// A negative `max_age` marks the cookie for deletion.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub domain: String,
    pub path: String,
    /// Lifetime in whole seconds.
    pub max_age: i64,
    pub http_only: bool,
    pub secure: bool,
    pub same_site: SameSite,
}

impl CookieOptions {
    pub fn is_removal(&self) -> bool {
        self.max_age < 0
    }

    /// Builds the cookie for `name`, computing the absolute expiry from
    /// `max_age` at the time of the call.
    pub fn build_cookie(&self, name: &str, value: String) -> Cookie<'static> {
        let mut cookie = Cookie::build((name.to_owned(), value))
            .path(self.path.clone())
            .http_only(self.http_only)
            .secure(self.secure)
            .build();

        // "." is the catch-all default and means no Domain attribute.
        if !self.domain.trim_start_matches('.').is_empty() {
            cookie.set_domain(self.domain.clone());
        }

        match self.same_site {
            SameSite::Default => {}
            SameSite::Lax => cookie.set_same_site(CookieSameSite::Lax),
            SameSite::Strict => cookie.set_same_site(CookieSameSite::Strict),
            SameSite::None => cookie.set_same_site(CookieSameSite::None),
        }

        if self.max_age > 0 {
            cookie.set_max_age(CookieDuration::seconds(self.max_age));
            // Past the representable calendar range only Max-Age is sent.
            let expires_at = Duration::try_seconds(self.max_age)
                .and_then(|max_age| Utc::now().checked_add_signed(max_age))
                .and_then(|at| OffsetDateTime::from_unix_timestamp(at.timestamp()).ok());
            if let Some(at) = expires_at {
                cookie.set_expires(Expiration::DateTime(at));
            }
        } else if self.max_age < 0 {
            cookie.set_max_age(CookieDuration::ZERO);
            cookie.set_expires(Expiration::DateTime(OffsetDateTime::UNIX_EPOCH));
        }

        cookie
    }

    /// Appends a `Set-Cookie` header for `name` to the response headers.
    pub fn write(
        &self,
        headers: &mut HeaderMap,
        name: &str,
        value: String,
    ) -> Result<(), SessionError> {
        let cookie = self.build_cookie(name, value);
        let header =
            HeaderValue::from_str(&cookie.to_string()).map_err(|_| SessionError::InvalidHeader)?;
        headers.append(SET_COOKIE, header);
        Ok(())
    }
}

/// Finds the value of the cookie called `name` across all `Cookie` headers.
///
/// The first match wins.
pub fn find_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(Cookie::split_parse)
        .filter_map(Result::ok)
        .find(|cookie| cookie.name() == name)
        .map(|cookie| cookie.value().to_owned())
}
