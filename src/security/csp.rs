//! Content-Security-Policy for static routes.
//!
//! Policies are cached per site subpath (the path component of the
//! configured site URL). The directive set itself does not depend on the
//! subpath, so every cache slot holds the same base policy.

use axum::http::header::CONTENT_SECURITY_POLICY;
use axum::http::{HeaderMap, HeaderValue};
use dashmap::DashMap;
use url::Url;

use crate::config::ConfigSnapshot;

/// Policy served to static routes.
pub const BASE_POLICY: &str =
    "frame-ancestors 'self'; script-src 'self' cdn.segment.com/analytics.js/";

/// Cache is cleared once it holds this many subpaths.
pub const MAX_CACHED_PREFIXES: usize = 32;

/// Computes and caches CSP header values, shared by all handlers.
#[derive(Debug, Default)]
pub struct CspEngine {
    policies: DashMap<String, HeaderValue>,
}

impl CspEngine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Policy for a site subpath, computed on first use.
    pub fn policy_for(&self, prefix: &str) -> HeaderValue {
        if let Some(policy) = self.policies.get(prefix) {
            return policy.value().clone();
        }

        let policy = build_policy(prefix);
        if self.policies.len() >= MAX_CACHED_PREFIXES {
            tracing::debug!(
                cached = self.policies.len(),
                "CSP cache full, clearing"
            );
            self.policies.clear();
        }
        self.policies.insert(prefix.to_owned(), policy.clone());
        policy
    }

    /// Set `Content-Security-Policy` on static routes; non-static routes get none.
    pub fn apply_csp(&self, snapshot: &ConfigSnapshot, is_static: bool, headers: &mut HeaderMap) {
        if !is_static {
            return;
        }
        let prefix = extract_path_prefix(snapshot.site_url());
        headers.insert(CONTENT_SECURITY_POLICY, self.policy_for(&prefix));
    }

    /// Number of subpaths currently cached.
    pub fn cached_prefixes(&self) -> usize {
        self.policies.len()
    }
}

fn build_policy(prefix: &str) -> HeaderValue {
    tracing::debug!(prefix = %prefix, "Computing content security policy");
    HeaderValue::from_static(BASE_POLICY)
}

/// Path component of a site URL without a trailing slash.
///
/// Returns an empty string for an empty, unparsable, or path-less URL.
pub fn extract_path_prefix(site_url: &str) -> String {
    if site_url.is_empty() {
        return String::new();
    }
    match Url::parse(site_url) {
        Ok(url) => url.path().trim_end_matches('/').to_string(),
        Err(_) => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ServerConfig;

    fn snapshot(site_url: &str) -> ConfigSnapshot {
        let mut config = ServerConfig::default();
        config.service.site_url = site_url.to_string();
        ConfigSnapshot::new(1, config)
    }

    #[test]
    fn test_extract_path_prefix() {
        assert_eq!(extract_path_prefix(""), "");
        assert_eq!(extract_path_prefix("http://localhost:8065"), "");
        assert_eq!(extract_path_prefix("http://localhost:8065/"), "");
        assert_eq!(extract_path_prefix("https://example.com/subpath"), "/subpath");
        assert_eq!(extract_path_prefix("https://example.com/a/b/"), "/a/b");
        assert_eq!(extract_path_prefix("not a url"), "");
    }

    #[test]
    fn test_non_static_gets_no_policy() {
        let engine = CspEngine::new();
        let mut headers = HeaderMap::new();
        engine.apply_csp(&snapshot(""), false, &mut headers);

        assert!(headers.get(CONTENT_SECURITY_POLICY).is_none());
        assert_eq!(engine.cached_prefixes(), 0);
    }

    #[test]
    fn test_static_gets_single_base_policy() {
        let engine = CspEngine::new();
        let mut headers = HeaderMap::new();
        engine.apply_csp(&snapshot("http://localhost:8065"), true, &mut headers);
        engine.apply_csp(&snapshot("http://localhost:8065"), true, &mut headers);

        let values: Vec<&str> = headers
            .get_all(CONTENT_SECURITY_POLICY)
            .iter()
            .map(|v| v.to_str().unwrap())
            .collect();
        assert_eq!(values, vec![BASE_POLICY]);
        assert_eq!(engine.cached_prefixes(), 1);
    }

    #[test]
    fn test_prefix_change_computes_new_entry() {
        let engine = CspEngine::new();
        let first = engine.policy_for("/subpath");
        let second = engine.policy_for("/subpath2");

        assert_eq!(engine.cached_prefixes(), 2);
        assert_eq!(first, second);
        assert_eq!(second, BASE_POLICY);
    }

    #[test]
    fn test_cache_is_bounded() {
        let engine = CspEngine::new();
        for i in 0..MAX_CACHED_PREFIXES {
            engine.policy_for(&format!("/p{i}"));
        }
        assert_eq!(engine.cached_prefixes(), MAX_CACHED_PREFIXES);

        engine.policy_for("/one-more");
        assert_eq!(engine.cached_prefixes(), 1);
    }
}
