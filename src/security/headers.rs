//! Standard response headers added around every handler.
//!
//! Policy headers are decided before the handler runs and always win.
//! Defaults only fill in what the handler left unset.

use axum::http::header::{CONTENT_TYPE, EXPIRES, X_FRAME_OPTIONS};
use axum::http::{HeaderMap, HeaderName, HeaderValue, Method};

/// Correlation ID echoed on every response.
pub const X_REQUEST_ID: HeaderName = HeaderName::from_static("x-request-id");

/// Server version and configuration generation.
pub const X_VERSION_ID: HeaderName = HeaderName::from_static("x-version-id");

/// Static pages may only be framed by the same origin.
pub fn apply_frame_options(headers: &mut HeaderMap) {
    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN"));
}

/// Defaults for API responses: JSON bodies, and no caching of GET results.
pub fn api_defaults(method: &Method) -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
    if *method == Method::GET {
        headers.insert(EXPIRES, HeaderValue::from_static("0"));
    }
    headers
}

/// Copy `policy` into `target`, replacing existing values.
pub fn merge_policy(target: &mut HeaderMap, policy: &HeaderMap) {
    for (name, value) in policy {
        target.insert(name.clone(), value.clone());
    }
}

/// Headers the dispatcher owns: values to set, and names that must not
/// reach the client whatever the handler wrote.
#[derive(Debug, Default)]
pub struct HeaderPolicy {
    pub set: HeaderMap,
    pub absent: Vec<HeaderName>,
}

impl HeaderPolicy {
    pub fn apply(&self, target: &mut HeaderMap) {
        merge_policy(target, &self.set);
        for name in &self.absent {
            target.remove(name);
        }
    }
}

/// Copy `defaults` into `target` only where `target` has no value.
pub fn merge_defaults(target: &mut HeaderMap, defaults: &HeaderMap) {
    for (name, value) in defaults {
        if !target.contains_key(name) {
            target.insert(name.clone(), value.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_api_defaults_for_get_and_post() {
        let get = api_defaults(&Method::GET);
        assert_eq!(get[CONTENT_TYPE], "application/json");
        assert_eq!(get[EXPIRES], "0");

        let post = api_defaults(&Method::POST);
        assert!(post.get(EXPIRES).is_none());
    }

    #[test]
    fn test_defaults_do_not_override_handler() {
        let mut response = HeaderMap::new();
        response.insert(CONTENT_TYPE, HeaderValue::from_static("text/plain"));

        merge_defaults(&mut response, &api_defaults(&Method::GET));
        assert_eq!(response[CONTENT_TYPE], "text/plain");
        assert_eq!(response[EXPIRES], "0");
    }

    #[test]
    fn test_policy_removes_absent_headers() {
        let mut response = HeaderMap::new();
        response.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        response.insert(EXPIRES, HeaderValue::from_static("0"));

        let policy = HeaderPolicy {
            set: HeaderMap::new(),
            absent: vec![EXPIRES],
        };
        policy.apply(&mut response);

        assert!(!response.contains_key(EXPIRES));
        assert_eq!(response[CONTENT_TYPE], "text/html");
    }

    #[test]
    fn test_policy_overrides_handler() {
        let mut response = HeaderMap::new();
        response.insert(X_FRAME_OPTIONS, HeaderValue::from_static("ALLOWALL"));

        let mut policy = HeaderMap::new();
        apply_frame_options(&mut policy);
        merge_policy(&mut response, &policy);

        assert_eq!(response.get_all(X_FRAME_OPTIONS).iter().count(), 1);
        assert_eq!(response[X_FRAME_OPTIONS], "SAMEORIGIN");
    }
}
