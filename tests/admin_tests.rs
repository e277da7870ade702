//! Admin API tests.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::ServiceExt;
use web_dispatch::admin::setup_admin_router;

mod common;

use common::{body_string, test_store};

const KEY: &str = "test-admin-key";

fn admin_request(method: &str, uri: &str, key: Option<&str>, body: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(key) = key {
        builder = builder.header("authorization", format!("Bearer {key}"));
    }
    match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    }
}

fn store() -> std::sync::Arc<web_dispatch::ConfigStore> {
    test_store(|cfg| {
        cfg.admin.enabled = true;
        cfg.admin.api_key = KEY.to_string();
    })
}

#[tokio::test]
async fn test_rejects_missing_or_wrong_key() {
    let app = setup_admin_router(store());

    let res = app
        .clone()
        .oneshot(admin_request("GET", "/admin/status", None, None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let res = app
        .oneshot(admin_request("GET", "/admin/status", Some("nope"), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_empty_key_locks_everyone_out() {
    let app = setup_admin_router(test_store(|_| {}));
    let res = app
        .oneshot(admin_request("GET", "/admin/status", Some(""), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_config_is_redacted() {
    let app = setup_admin_router(store());
    let res = app
        .oneshot(admin_request("GET", "/admin/config", Some(KEY), None))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
    assert_eq!(body["admin"]["api_key"], "********");
    assert_eq!(body["service"]["site_url"], common::SITE_URL);
}

#[tokio::test]
async fn test_patch_service_updates_store() {
    let store = store();
    let app = setup_admin_router(store.clone());

    let res = app
        .clone()
        .oneshot(admin_request(
            "PATCH",
            "/admin/config/service",
            Some(KEY),
            Some(r#"{"tls_strict_transport": true, "tls_strict_transport_max_age": 6000}"#),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let body: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
    assert_eq!(body["tls_strict_transport"], true);
    assert_eq!(body["tls_strict_transport_max_age"], 6000);

    let snapshot = store.snapshot();
    assert_eq!(snapshot.generation(), 1);
    assert!(snapshot.hsts_enabled());
    assert_eq!(snapshot.hsts_max_age(), 6000);
    // Untouched fields survive the patch.
    assert_eq!(snapshot.site_url(), common::SITE_URL);

    let res = app
        .oneshot(admin_request("GET", "/admin/status", Some(KEY), None))
        .await
        .unwrap();
    let body: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
    assert_eq!(body["config_generation"], 1);
}

#[tokio::test]
async fn test_invalid_patch_is_rejected() {
    let store = store();
    let app = setup_admin_router(store.clone());

    let res = app
        .oneshot(admin_request(
            "PATCH",
            "/admin/config/service",
            Some(KEY),
            Some(r#"{"api_prefix": "api/v4"}"#),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let body: serde_json::Value = serde_json::from_str(&body_string(res).await).unwrap();
    assert_eq!(body["errors"].as_array().unwrap().len(), 1);
    assert_eq!(store.snapshot().generation(), 0);
    assert_eq!(store.snapshot().service().api_prefix, "/api/v4");
}

#[tokio::test]
async fn test_unknown_field_is_rejected() {
    let app = setup_admin_router(store());
    let res = app
        .oneshot(admin_request(
            "PATCH",
            "/admin/config/service",
            Some(KEY),
            Some(r#"{"max_connections": 10}"#),
        ))
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
