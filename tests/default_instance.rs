//! Tests for the process-wide default configuration.
//!
//! They share one global, so every test runs under `#[serial]`.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use chrono::Duration;
use http::header::{COOKIE, HeaderValue, SET_COOKIE};
use http::{HeaderMap, Request};
use sealed_session::{SameSite, SessionError, global};
use serial_test::serial;

const AUTH_KEY: &str = "asdfasdfasdfasdfasdfasdfasdfasdfasdfasdfasdfasdfasdfasdfasdfasdf";
const ENCRYPT_KEY: &str = "asdfasdfasdfasdfasdfasdfasdfasdf";

fn configure() {
    global::default_config();
    global::set_secure(true);
    global::set_http_only(true);
    global::set_domain("example.com");
    global::set_path("/example/path/");
    global::set_max_age(Duration::hours(2));
    global::set_keys(AUTH_KEY, ENCRYPT_KEY);
    global::set_cookie_name("test");
    global::set_same_site(Some(SameSite::Lax));
}

#[test]
#[serial]
fn setters_shape_the_default_config() {
    configure();

    let config = global::get_config();
    assert!(config.secure);
    assert!(config.http_only);
    assert_eq!(config.domain, "example.com");
    assert_eq!(config.path, "/example/path/");
    assert_eq!(config.max_age, Duration::hours(2));
    assert_eq!(config.auth_key.expose_secret(), AUTH_KEY);
    assert_eq!(config.encrypt_key.expose_secret(), ENCRYPT_KEY);
    assert_eq!(config.cookie_name, "test");
    assert_eq!(config.same_site, Some(SameSite::Lax));
}

#[test]
#[serial]
fn default_instance_serves_requests_after_init() {
    configure();
    global::init().unwrap();

    let (mut req, ()) = Request::new(()).into_parts();
    let mut res = HeaderMap::new();
    global::add_value(&mut res, &mut req, "k", "v").unwrap();

    let set_cookie = res.get(SET_COOKIE).unwrap().to_str().unwrap();
    assert!(set_cookie.starts_with("test="));
    assert!(set_cookie.contains("Domain=example.com"));

    let pair = set_cookie.split(';').next().unwrap();
    let (mut next, ()) = Request::builder()
        .header(COOKIE, HeaderValue::from_str(pair).unwrap())
        .body(())
        .unwrap()
        .into_parts();
    assert_eq!(global::get_value(&mut next, "k").unwrap(), "v");
    assert_eq!(global::get_all_values(&mut next).unwrap().len(), 1);

    let mut res = HeaderMap::new();
    global::destroy(&mut res, &mut next).unwrap();
    assert_eq!(
        global::get_value(&mut next, "k"),
        Err(SessionError::KeyNotFound)
    );
}

#[test]
#[serial]
fn key_changes_wait_for_init() {
    configure();
    global::init().unwrap();

    let (mut req, ()) = Request::new(()).into_parts();
    let mut res = HeaderMap::new();
    global::add_user_id(&mut res, &mut req, 42).unwrap();
    let pair = res
        .get(SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned();

    let request = || {
        Request::builder()
            .header(COOKIE, HeaderValue::from_str(&pair).unwrap())
            .body(())
            .unwrap()
            .into_parts()
            .0
    };

    // new keys are stored but the live store still uses the old ones
    global::set_keys("", "");
    assert_eq!(global::get_user_id(&mut request()).unwrap(), 42);

    global::init().unwrap();
    assert_eq!(
        global::get_user_id(&mut request()),
        Err(SessionError::KeyNotFound)
    );
}

#[test]
#[serial]
fn bad_keys_fail_init() {
    global::default_config();
    global::set_keys("too short", "");
    assert_eq!(global::init(), Err(SessionError::AuthKeyWrongSize));

    global::set_keys("", "too short");
    assert_eq!(global::init(), Err(SessionError::EncryptKeyWrongSize));

    global::set_keys("", "");
    global::set_max_age(Duration::zero());
    assert_eq!(global::init(), Err(SessionError::MaxAgeTooShort));
}

#[test]
#[serial]
fn max_age_setter_applies_to_live_store() {
    configure();
    global::set_max_age(Duration::seconds(1));
    global::init().unwrap();
    global::set_max_age(Duration::hours(1));

    let (mut req, ()) = Request::new(()).into_parts();
    let mut res = HeaderMap::new();
    global::add_value(&mut res, &mut req, "k", "v").unwrap();
    let pair = res
        .get(SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .split(';')
        .next()
        .unwrap()
        .to_owned();

    std::thread::sleep(std::time::Duration::from_millis(2100));

    let (mut next, ()) = Request::builder()
        .header(COOKIE, HeaderValue::from_str(&pair).unwrap())
        .body(())
        .unwrap()
        .into_parts();
    assert_eq!(global::get_value(&mut next, "k").unwrap(), "v");
}
