//! Per-request context handed to business handlers.

use std::sync::Arc;

use axum::http::StatusCode;

use crate::config::ConfigSnapshot;
use crate::web::classify::RequestClass;
use crate::web::handler::RouteFlags;
use crate::web::error::AppError;

/// What the dispatcher knows about the request it is serving.
///
/// Built fresh for every request and never shared between requests.
#[derive(Debug, Clone)]
pub struct Context {
    request_id: String,
    path: String,
    class: RequestClass,
    flags: RouteFlags,
    snapshot: Arc<ConfigSnapshot>,
}

impl Context {
    pub(crate) fn new(
        request_id: String,
        path: String,
        class: RequestClass,
        flags: RouteFlags,
        snapshot: Arc<ConfigSnapshot>,
    ) -> Self {
        Self {
            request_id,
            path,
            class,
            flags,
            snapshot,
        }
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn class(&self) -> RequestClass {
        self.class
    }

    /// Route flags, for the session and MFA layers around business logic.
    pub fn flags(&self) -> RouteFlags {
        self.flags
    }

    /// The configuration this request is served with.
    pub fn snapshot(&self) -> &Arc<ConfigSnapshot> {
        &self.snapshot
    }

    /// Error for a missing or malformed URL parameter.
    pub fn invalid_param(&self, parameter: &str) -> AppError {
        AppError::new(
            self.path.clone(),
            "api.context.invalid_param.app_error",
            format!("Invalid or missing {parameter} parameter in request URL."),
            StatusCode::BAD_REQUEST,
        )
    }

    /// Error for a path with no resource behind it.
    pub fn not_found(&self) -> AppError {
        AppError::new(
            self.path.clone(),
            "api.context.404.app_error",
            "Sorry, we could not find the page.",
            StatusCode::NOT_FOUND,
        )
    }
}
