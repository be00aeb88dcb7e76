//! Session and organization-pointer cookies.
//!
//! ARCHITECTURE
//! ============
//! The provider owns the session; this server only carries its access and
//! refresh tokens in HTTP-only cookies and hands the access token back on
//! every provider call. The active organization is a separate opaque pointer
//! cookie that row-level authorization downstream validates.

use axum::http::HeaderValue;
use axum::http::header::SET_COOKIE;
use axum::response::Response;
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use time::Duration;

use crate::backend::{AuthIdentity, SessionTokens};

pub const ACCESS_TOKEN_COOKIE: &str = "sb-access-token";
pub const REFRESH_TOKEN_COOKIE: &str = "sb-refresh-token";
pub const ORG_COOKIE: &str = "current_org_id";

const ORG_COOKIE_MAX_AGE_DAYS: i64 = 30;
const REFRESH_TOKEN_MAX_AGE_DAYS: i64 = 30;

/// Authenticated caller: the resolved identity plus the access token that
/// proved it. The gate stores one in request extensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    pub user: AuthIdentity,
    pub access_token: String,
}

/// Active organization id for this request: the pointer cookie, or the one
/// the gate just restored from the caller's first membership.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveOrganization(pub String);

fn base_cookie(name: &'static str, value: String, secure: bool) -> Cookie<'static> {
    Cookie::build((name, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(secure)
        .build()
}

/// `current_org_id` cookie pointing at `org_id`, valid for 30 days.
#[must_use]
pub fn org_cookie(org_id: &str, secure: bool) -> Cookie<'static> {
    let mut cookie = base_cookie(ORG_COOKIE, org_id.to_owned(), secure);
    cookie.set_max_age(Duration::days(ORG_COOKIE_MAX_AGE_DAYS));
    cookie
}

/// Access + refresh token cookies for a freshly issued session.
#[must_use]
pub fn session_cookies(tokens: &SessionTokens, secure: bool) -> [Cookie<'static>; 2] {
    let mut access = base_cookie(ACCESS_TOKEN_COOKIE, tokens.access_token.clone(), secure);
    access.set_max_age(Duration::seconds(tokens.expires_in.max(0)));
    let mut refresh = base_cookie(REFRESH_TOKEN_COOKIE, tokens.refresh_token.clone(), secure);
    refresh.set_max_age(Duration::days(REFRESH_TOKEN_MAX_AGE_DAYS));
    [access, refresh]
}

/// Expired, empty cookie that makes the browser drop `name`.
#[must_use]
pub fn clear_cookie(name: &'static str, secure: bool) -> Cookie<'static> {
    let mut cookie = base_cookie(name, String::new(), secure);
    cookie.set_max_age(Duration::ZERO);
    cookie
}

fn non_empty<'a>(jar: &'a CookieJar, name: &str) -> Option<&'a str> {
    jar.get(name)
        .map(Cookie::value)
        .filter(|v| !v.trim().is_empty())
}

#[must_use]
pub fn access_token(jar: &CookieJar) -> Option<&str> {
    non_empty(jar, ACCESS_TOKEN_COOKIE)
}

#[must_use]
pub fn refresh_token(jar: &CookieJar) -> Option<&str> {
    non_empty(jar, REFRESH_TOKEN_COOKIE)
}

#[must_use]
pub fn current_org_id(jar: &CookieJar) -> Option<&str> {
    non_empty(jar, ORG_COOKIE)
}

/// Append `cookies` as `Set-Cookie` headers, skipping any name the response
/// already sets. Handler-written cookies (logout, org switch) win over the
/// gate's.
#[must_use]
pub fn append_cookies(mut response: Response, cookies: Vec<Cookie<'static>>) -> Response {
    if cookies.is_empty() {
        return response;
    }

    let already_set: Vec<String> = response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter_map(|v| Cookie::parse(v.to_owned()).ok())
        .map(|c| c.name().to_owned())
        .collect();

    for cookie in cookies {
        if already_set.iter().any(|name| name == cookie.name()) {
            continue;
        }
        match HeaderValue::from_str(&cookie.to_string()) {
            Ok(value) => {
                response.headers_mut().append(SET_COOKIE, value);
            }
            Err(e) => tracing::warn!(error = %e, cookie = cookie.name(), "dropping unencodable cookie"),
        }
    }
    response
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
