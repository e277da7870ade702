//! Strict-Transport-Security advertisement.

use axum::http::header::STRICT_TRANSPORT_SECURITY;
use axum::http::{HeaderMap, HeaderValue};

use crate::config::ConfigSnapshot;

/// Header value for the snapshot, or `None` when HSTS is disabled.
pub fn hsts_value(snapshot: &ConfigSnapshot) -> Option<HeaderValue> {
    if !snapshot.hsts_enabled() {
        return None;
    }
    let value = if snapshot.service().tls_strict_transport_include_subdomains {
        format!("max-age={}; includeSubDomains", snapshot.hsts_max_age())
    } else {
        format!("max-age={}", snapshot.hsts_max_age())
    };
    HeaderValue::from_str(&value).ok()
}

/// Set `Strict-Transport-Security` when enabled.
///
/// When disabled the header is removed rather than left empty.
pub fn apply_hsts(snapshot: &ConfigSnapshot, headers: &mut HeaderMap) {
    match hsts_value(snapshot) {
        Some(value) => {
            headers.insert(STRICT_TRANSPORT_SECURITY, value);
        }
        None => {
            headers.remove(STRICT_TRANSPORT_SECURITY);
        }
    }
}
