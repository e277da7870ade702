//! Request classification.
//!
//! Every policy decision downstream reads the [`RequestClass`] produced
//! here, never the raw request.

use axum::http::{HeaderMap, HeaderName};

/// Default path prefix of API calls.
pub const API_URL_PREFIX: &str = "/api/v4";

/// Path prefix of incoming webhooks.
pub const WEBHOOK_URL_PREFIX: &str = "/hooks/";

/// Sent by the mobile apps on every request.
pub const X_MOBILE_APP: HeaderName = HeaderName::from_static("x-mobile-app");

/// Classification of one request.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RequestClass {
    pub is_api: bool,
    pub is_webhook: bool,
    pub is_static: bool,
    pub is_mobile: bool,
}

impl RequestClass {
    /// API, webhook and mobile callers get errors as data, not redirects.
    pub fn wants_structured_errors(&self) -> bool {
        self.is_api || self.is_webhook || self.is_mobile
    }

    /// Short label for metrics.
    pub fn label(&self) -> &'static str {
        if self.is_api {
            "api"
        } else if self.is_webhook {
            "webhook"
        } else if self.is_static {
            "static"
        } else {
            "web"
        }
    }
}

/// Classify with the default API prefix.
pub fn classify(path: &str, headers: &HeaderMap, handler_is_static: bool) -> RequestClass {
    classify_with_prefix(API_URL_PREFIX, path, headers, handler_is_static)
}

/// Classify against a configured API prefix.
pub fn classify_with_prefix(
    api_prefix: &str,
    path: &str,
    headers: &HeaderMap,
    handler_is_static: bool,
) -> RequestClass {
    RequestClass {
        is_api: path.starts_with(api_prefix),
        is_webhook: path.starts_with(WEBHOOK_URL_PREFIX),
        is_static: handler_is_static,
        is_mobile: is_mobile_app(headers),
    }
}

fn is_mobile_app(headers: &HeaderMap) -> bool {
    headers
        .get(X_MOBILE_APP)
        .is_some_and(|value| !value.as_bytes().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn mobile_headers(value: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(X_MOBILE_APP, HeaderValue::from_static(value));
        headers
    }

    #[test]
    fn test_api_prefix() {
        let headers = HeaderMap::new();
        assert!(classify("/api/v4/users/me", &headers, false).is_api);
        assert!(classify("/api/v4", &headers, false).is_api);
        assert!(!classify("/login/sso/saml", &headers, false).is_api);
        assert!(!classify("/api/v3/users", &headers, false).is_api);
    }

    #[test]
    fn test_configured_prefix() {
        let headers = HeaderMap::new();
        let class = classify_with_prefix("/custom/api", "/custom/api/ping", &headers, false);
        assert!(class.is_api);
        assert!(!classify_with_prefix("/custom/api", "/api/v4/ping", &headers, false).is_api);
    }

    #[test]
    fn test_mobile_header() {
        assert!(classify("/", &mobile_headers("mattermost"), false).is_mobile);
        assert!(!classify("/", &mobile_headers(""), false).is_mobile);
        assert!(!classify("/", &HeaderMap::new(), false).is_mobile);
    }

    #[test]
    fn test_static_flag_passes_through() {
        let headers = HeaderMap::new();
        assert!(classify("/api/v4/x", &headers, true).is_static);
        assert!(!classify("/", &headers, false).is_static);
    }

    #[test]
    fn test_structured_errors() {
        let headers = HeaderMap::new();
        assert!(classify("/api/v4/test", &headers, false).wants_structured_errors());
        assert!(classify("/hooks/abc", &headers, false).wants_structured_errors());
        assert!(classify("/login", &mobile_headers("1"), false).wants_structured_errors());
        assert!(!classify("/login/sso/saml", &headers, false).wants_structured_errors());
    }

    #[test]
    fn test_label() {
        let headers = HeaderMap::new();
        assert_eq!(classify("/api/v4/test", &headers, false).label(), "api");
        assert_eq!(classify("/", &headers, true).label(), "static");
        assert_eq!(classify("/login", &headers, false).label(), "web");
    }
}
