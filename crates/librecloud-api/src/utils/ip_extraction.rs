//! Client IP extraction from proxy headers.

use axum::http::header::HeaderMap;

/// Identifier used when no proxy header yields a client address. All such
/// requests share one rate-limit bucket, which fails closed rather than open.
pub const UNKNOWN_CLIENT: &str = "unknown";

/// Best-effort client address for rate limiting and audit logging.
///
/// Checks `X-Forwarded-For` (first entry, as appended by the closest trusted
/// proxy), then `X-Real-IP`, then `CF-Connecting-IP`. The value is
/// informational and never used for authorization.
pub fn client_ip(headers: &HeaderMap) -> String {
    if let Some(forwarded) = headers.get("x-forwarded-for").and_then(|v| v.to_str().ok()) {
        if let Some(first) = forwarded.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    for header in ["x-real-ip", "cf-connecting-ip"] {
        if let Some(value) = headers.get(header).and_then(|v| v.to_str().ok()) {
            let value = value.trim();
            if !value.is_empty() {
                return value.to_string();
            }
        }
    }

    UNKNOWN_CLIENT.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(
                axum::http::header::HeaderName::from_bytes(name.as_bytes()).unwrap(),
                HeaderValue::from_str(value).unwrap(),
            );
        }
        map
    }

    #[test]
    fn test_forwarded_for_takes_first_entry() {
        let h = headers(&[("x-forwarded-for", "203.0.113.7, 10.0.0.1, 10.0.0.2")]);
        assert_eq!(client_ip(&h), "203.0.113.7");
    }

    #[test]
    fn test_forwarded_for_entries_are_trimmed() {
        let h = headers(&[("x-forwarded-for", "  203.0.113.1  ,  198.51.100.1  ")]);
        assert_eq!(client_ip(&h), "203.0.113.1");
    }

    #[test]
    fn test_real_ip_fallback() {
        let h = headers(&[("x-real-ip", "198.51.100.9")]);
        assert_eq!(client_ip(&h), "198.51.100.9");
    }

    #[test]
    fn test_cf_connecting_ip_fallback() {
        let h = headers(&[("cf-connecting-ip", "192.0.2.4")]);
        assert_eq!(client_ip(&h), "192.0.2.4");
    }

    #[test]
    fn test_unknown_when_no_headers() {
        assert_eq!(client_ip(&HeaderMap::new()), UNKNOWN_CLIENT);
    }

    #[test]
    fn test_empty_forwarded_for_falls_through() {
        let h = headers(&[("x-forwarded-for", "  "), ("x-real-ip", "198.51.100.9")]);
        assert_eq!(client_ip(&h), "198.51.100.9");
    }
}
