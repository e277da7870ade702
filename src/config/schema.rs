//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the server.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the server.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct ServerConfig {
    /// Listener configuration (bind address, request timeout).
    pub listener: ListenerConfig,

    /// Settings consulted by the request dispatcher on every request.
    pub service: ServiceSettings,

    /// Observability settings.
    pub observability: ObservabilityConfig,

    /// Administrative API settings.
    pub admin: AdminConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:8065").
    pub bind_address: String,

    /// Total time a request may take, in seconds.
    pub request_timeout_secs: u64,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:8065".to_string(),
            request_timeout_secs: 30,
        }
    }
}

/// Service settings shared by every route.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ServiceSettings {
    /// Public URL of the site. Its path component is the site subpath.
    pub site_url: String,

    /// Path prefix identifying API calls.
    pub api_prefix: String,

    /// Advertise Strict-Transport-Security.
    pub tls_strict_transport: bool,

    /// HSTS max-age in seconds.
    pub tls_strict_transport_max_age: u64,

    /// Append `includeSubDomains` to the HSTS header.
    pub tls_strict_transport_include_subdomains: bool,

    /// Keep detailed error text in error responses.
    pub enable_developer: bool,

    /// Replace every 5xx error with a generic one.
    pub experimental_enable_hardened_mode: bool,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            site_url: String::new(),
            api_prefix: "/api/v4".to_string(),
            tls_strict_transport: false,
            tls_strict_transport_max_age: 63_072_000, // 2 years
            tls_strict_transport_include_subdomains: false,
            enable_developer: false,
            experimental_enable_hardened_mode: false,
        }
    }
}

/// Output format of the log subscriber.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format.
    pub log_format: LogFormat,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: LogFormat::Pretty,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

/// Admin API configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct AdminConfig {
    /// Enable the admin API.
    pub enabled: bool,

    /// API key for authentication (Bearer token).
    pub api_key: String,

    /// Admin API bind address.
    pub bind_address: String,
}

impl Default for AdminConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            api_key: String::new(),
            bind_address: "127.0.0.1:8066".to_string(),
        }
    }
}
