//! Session cookie helpers.
//!
//! The removal cookie repeats the `Secure` attribute of the session cookie:
//! browsers drop any `__Secure-` cookie set without it.

use axum_extra::extract::CookieJar;
use axum_extra::extract::cookie::{Cookie, SameSite};
use time::Duration;

/// Create the session cookie carrying a signed session token.
pub fn session_cookie(
    name: &str,
    token: &str,
    max_age_secs: i64,
    secure: bool,
) -> Cookie<'static> {
    Cookie::build((name.to_string(), token.to_string()))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::seconds(max_age_secs.max(0)))
        .build()
}

/// Create removal cookie for the session.
pub fn clear_session_cookie(name: &str, secure: bool) -> Cookie<'static> {
    Cookie::build((name.to_string(), ""))
        .http_only(true)
        .secure(secure)
        .same_site(SameSite::Lax)
        .path("/".to_string())
        .max_age(Duration::ZERO)
        .build()
}

/// Get the session token from cookies.
pub fn session_token<'a>(jar: &'a CookieJar, name: &str) -> Option<&'a str> {
    jar.get(name).map(Cookie::value).filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn session_cookie_is_locked_down() {
        let cookie = session_cookie("sid", "tok", 120, true);
        assert_eq!(cookie.value(), "tok");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::seconds(120)));
    }

    #[test]
    fn clear_cookie_expires_immediately() {
        let cookie = clear_session_cookie("sid", false);
        assert_eq!(cookie.value(), "");
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }

    #[test]
    fn secure_prefix_cookie_is_cleared_securely() {
        let cookie = clear_session_cookie("__Secure-sid", true);
        assert_eq!(cookie.secure(), Some(true));
        assert_eq!(cookie.max_age(), Some(Duration::ZERO));
    }

    #[test]
    fn empty_cookie_is_no_token() {
        let jar = CookieJar::new().add(Cookie::new("sid", ""));
        assert!(session_token(&jar, "sid").is_none());

        let jar = jar.add(Cookie::new("sid", "abc"));
        assert_eq!(session_token(&jar, "sid"), Some("abc"));
    }
}
