use std::time::Duration;

use axum::http::{header, HeaderMap, HeaderValue};

use crate::auth::jwt::JwtKeys;
use crate::auth::tokens::TokenPair;

pub const ACCESS_COOKIE: &str = "accessToken";
pub const REFRESH_COOKIE: &str = "refreshToken";

fn session_cookie(name: &str, value: &str, max_age: Duration) -> String {
    format!(
        "{name}={value}; Path=/; HttpOnly; Secure; SameSite=None; Max-Age={}",
        max_age.as_secs()
    )
}

fn cleared_cookie(name: &str) -> String {
    format!("{name}=; Path=/; HttpOnly; Secure; SameSite=None; Max-Age=0")
}

fn append(headers: &mut HeaderMap, cookie: String) {
    // JWTs are base64url plus dots, so they are always valid header bytes.
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        headers.append(header::SET_COOKIE, value);
    }
}

/// `Set-Cookie` headers carrying both tokens.
pub fn session_cookies(pair: &TokenPair, keys: &JwtKeys) -> HeaderMap {
    let mut headers = HeaderMap::new();
    append(
        &mut headers,
        session_cookie(ACCESS_COOKIE, &pair.access_token, keys.access_ttl),
    );
    append(
        &mut headers,
        session_cookie(REFRESH_COOKIE, &pair.refresh_token, keys.refresh_ttl),
    );
    headers
}

/// `Set-Cookie` headers expiring both tokens.
pub fn cleared_session_cookies() -> HeaderMap {
    let mut headers = HeaderMap::new();
    append(&mut headers, cleared_cookie(ACCESS_COOKIE));
    append(&mut headers, cleared_cookie(REFRESH_COOKIE));
    headers
}

/// Reads a cookie value from the request's `Cookie` headers.
pub fn read_cookie(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;

    #[test]
    fn reads_named_cookie() {
        let mut headers = HeaderMap::new();
        headers.insert(
            header::COOKIE,
            HeaderValue::from_static("theme=dark; refreshToken=abc.def.ghi; accessToken=xyz"),
        );
        assert_eq!(read_cookie(&headers, REFRESH_COOKIE).as_deref(), Some("abc.def.ghi"));
        assert_eq!(read_cookie(&headers, ACCESS_COOKIE).as_deref(), Some("xyz"));
        assert_eq!(read_cookie(&headers, "missing"), None);
    }

    #[test]
    fn empty_cookie_counts_as_absent() {
        let mut headers = HeaderMap::new();
        headers.insert(header::COOKIE, HeaderValue::from_static("refreshToken="));
        assert_eq!(read_cookie(&headers, REFRESH_COOKIE), None);
    }

    #[test]
    fn session_cookies_are_http_only_and_secure() {
        let keys = JwtKeys::from(&AppConfig::for_tests().jwt);
        let pair = TokenPair {
            access_token: "a.b.c".into(),
            refresh_token: "d.e.f".into(),
        };
        let headers = session_cookies(&pair, &keys);
        let cookies: Vec<&str> = headers
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(cookies.len(), 2);
        assert!(cookies[0].starts_with("accessToken=a.b.c;"));
        assert!(cookies[0].contains("Max-Age=300"));
        assert!(cookies[1].starts_with("refreshToken=d.e.f;"));
        assert!(cookies.iter().all(|c| c.contains("HttpOnly") && c.contains("Secure")));
    }

    #[test]
    fn cleared_cookies_expire_immediately() {
        let headers = cleared_session_cookies();
        assert!(headers
            .get_all(header::SET_COOKIE)
            .iter()
            .all(|v| v.to_str().unwrap().contains("Max-Age=0")));
    }
}
