// ABOUTME: Cookie header parsing helpers for browser authentication
// ABOUTME: Extracts named values from the Cookie header and builds the auth Set-Cookie value
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 FitCoach Contributors

use http::{header::COOKIE, HeaderMap};

/// Find the value of a cookie by name
#[must_use]
pub fn get_cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|raw| raw.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, value)| *key == name && !value.is_empty())
        .map(|(_, value)| value.to_owned())
}

/// `Set-Cookie` value carrying the session token
#[must_use]
pub fn auth_cookie(name: &str, token: &str, max_age_secs: i64, secure: bool) -> String {
    let secure = if secure { "; Secure" } else { "" };
    format!("{name}={token}; HttpOnly{secure}; Path=/; SameSite=Lax; Max-Age={max_age_secs}")
}

/// `Set-Cookie` value that expires the session cookie
#[must_use]
pub fn clear_cookie(name: &str) -> String {
    format!("{name}=; HttpOnly; Path=/; SameSite=Lax; Max-Age=0")
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_finds_cookie_among_others() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; auth_token=abc.def.ghi; lang=en"),
        );
        assert_eq!(
            get_cookie_value(&headers, "auth_token").as_deref(),
            Some("abc.def.ghi")
        );
        assert!(get_cookie_value(&headers, "missing").is_none());
    }

    #[test]
    fn test_empty_value_is_ignored() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("auth_token="));
        assert!(get_cookie_value(&headers, "auth_token").is_none());
    }

    #[test]
    fn test_auth_cookie_attributes() {
        let cookie = auth_cookie("auth_token", "abc", 3600, true);
        assert_eq!(
            cookie,
            "auth_token=abc; HttpOnly; Secure; Path=/; SameSite=Lax; Max-Age=3600"
        );
        assert!(!auth_cookie("auth_token", "abc", 60, false).contains("Secure"));
        assert!(clear_cookie("auth_token").ends_with("Max-Age=0"));
    }
}
