//! Shared utilities for integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::response::{IntoResponse, Response};
use web_dispatch::config::{ConfigStore, ServerConfig};
use web_dispatch::web::{AppError, Context, HandlerResult};

pub const SITE_URL: &str = "http://localhost:8065";

pub const SAML_MESSAGE: &str = "SAML 2.0 is not configured or supported on this server.";

/// A store whose config starts from the defaults plus a local site URL.
pub fn test_store(mutate: impl FnOnce(&mut ServerConfig)) -> Arc<ConfigStore> {
    let mut config = ServerConfig::default();
    config.service.site_url = SITE_URL.to_string();
    mutate(&mut config);
    Arc::new(ConfigStore::new(config))
}

pub fn request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn mobile_request(method: &str, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("X-Mobile-App", "mattermost")
        .body(Body::empty())
        .unwrap()
}

pub async fn body_string(response: Response) -> String {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Always fails the way an unconfigured SSO login does.
pub async fn handler_for_http_errors(_ctx: Context, _request: Request<Body>) -> HandlerResult {
    Err(AppError::new(
        "loginWithSaml",
        "api.user.saml.not_available.app_error",
        SAML_MESSAGE,
        StatusCode::NOT_IMPLEMENTED,
    )
    .with_detail("saml feature disabled"))
}

/// Does nothing and succeeds.
pub async fn empty_handler(_ctx: Context, _request: Request<Body>) -> HandlerResult {
    Ok(StatusCode::OK.into_response())
}
