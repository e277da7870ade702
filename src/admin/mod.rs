//! Administrative API.
//!
//! The out-of-band path that changes configuration while requests are being
//! served. Every change goes through [`ConfigStore::update_config`], so
//! readers only ever see complete snapshots.

pub mod auth;
pub mod handlers;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{get, patch},
    Router,
};

use self::auth::admin_auth_middleware;
use self::handlers::{get_config, get_status, patch_service};
use crate::config::ConfigStore;

#[derive(Debug, Clone)]
pub struct AdminState {
    pub store: Arc<ConfigStore>,
}

pub fn setup_admin_router(store: Arc<ConfigStore>) -> Router {
    let state = AdminState { store };
    Router::new()
        .route("/admin/status", get(get_status))
        .route("/admin/config", get(get_config))
        .route("/admin/config/service", patch(patch_service))
        .layer(middleware::from_fn_with_state(state.clone(), admin_auth_middleware))
        .with_state(state)
}
