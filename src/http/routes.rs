//! Built-in routes.
//!
//! API routes are mounted under the configured API prefix. Unknown API paths
//! get a structured 404, including paths under a prefix changed after the
//! router was built. Every other unknown path serves the web app's root page,
//! which renders client-side routes such as the `/error` page itself.

use axum::body::Body;
use axum::http::Request;
use axum::response::{Html, IntoResponse};
use axum::{Json, Router};
use serde_json::json;

use crate::web::{Context, HandlerResult, Web};

const ROOT_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head><meta charset="utf-8"><title>web-dispatch</title></head>
<body><div id="root"></div></body>
</html>
"#;

pub fn build_routes(web: &Web, api_prefix: &str) -> Router {
    let api_prefix = api_prefix.trim_end_matches('/');
    Router::new()
        .route_service(&format!("{api_prefix}/system/ping"), web.handler(system_ping))
        .route_service(&format!("{api_prefix}/{{*path}}"), web.handler(api_not_found))
        .route_service("/", web.static_handler(root_page))
        .fallback_service(web.static_handler(root_page))
}

async fn system_ping(ctx: Context, _request: Request<Body>) -> HandlerResult {
    Ok(Json(json!({
        "status": "OK",
        "version": env!("CARGO_PKG_VERSION"),
        "config_generation": ctx.snapshot().generation(),
    }))
    .into_response())
}

async fn api_not_found(ctx: Context, _request: Request<Body>) -> HandlerResult {
    Err(ctx.not_found())
}

async fn root_page(ctx: Context, _request: Request<Body>) -> HandlerResult {
    if ctx.class().is_api {
        return Err(ctx.not_found());
    }
    Ok(Html(ROOT_PAGE).into_response())
}
