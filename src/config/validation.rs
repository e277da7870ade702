//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses and the site URL
//! - Check the API prefix is an absolute path
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServerConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;
use url::Url;

use crate::config::schema::ServerConfig;

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("listener.bind_address `{0}` is not a socket address")]
    InvalidBindAddress(String),

    #[error("listener.request_timeout_secs must be greater than zero")]
    ZeroRequestTimeout,

    #[error("service.site_url `{url}` is invalid: {reason}")]
    InvalidSiteUrl { url: String, reason: String },

    #[error("service.api_prefix `{0}` must start with '/'")]
    InvalidApiPrefix(String),

    #[error("observability.metrics_address `{0}` is not a socket address")]
    InvalidMetricsAddress(String),

    #[error("admin.api_key must be set when the admin API is enabled")]
    MissingAdminKey,

    #[error("admin.bind_address `{0}` is not a socket address")]
    InvalidAdminAddress(String),
}

/// Validate a configuration, collecting every error.
pub fn validate_config(config: &ServerConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidBindAddress(
            config.listener.bind_address.clone(),
        ));
    }
    if config.listener.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroRequestTimeout);
    }

    if let Err(reason) = check_site_url(&config.service.site_url) {
        errors.push(ValidationError::InvalidSiteUrl {
            url: config.service.site_url.clone(),
            reason,
        });
    }

    let prefix = &config.service.api_prefix;
    if !prefix.starts_with('/') || prefix.len() < 2 {
        errors.push(ValidationError::InvalidApiPrefix(prefix.clone()));
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if config.admin.enabled {
        if config.admin.api_key.is_empty() {
            errors.push(ValidationError::MissingAdminKey);
        }
        if config.admin.bind_address.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAdminAddress(
                config.admin.bind_address.clone(),
            ));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// An empty site URL is allowed; anything else must be an absolute http(s) URL.
fn check_site_url(site_url: &str) -> Result<(), String> {
    if site_url.is_empty() {
        return Ok(());
    }
    let url = Url::parse(site_url).map_err(|e| e.to_string())?;
    match url.scheme() {
        "http" | "https" => Ok(()),
        other => Err(format!("unsupported scheme `{other}`")),
    }
}
