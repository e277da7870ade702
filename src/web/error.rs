//! Application errors returned by business handlers.

use axum::http::header::LOCATION;
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::ServiceSettings;

/// Redirect target for browser callers.
pub const ERROR_PAGE_PATH: &str = "/error";

/// The single error kind a handler can report.
///
/// Serialized as the body of structured error responses.
#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("{location}: {message}, {detailed_error}")]
pub struct AppError {
    /// Machine-readable error code.
    pub id: String,
    /// Human-readable message.
    pub message: String,
    #[serde(default)]
    pub detailed_error: String,
    #[serde(default)]
    pub request_id: String,
    pub status_code: u16,
    /// Where the error was raised; never sent to clients.
    #[serde(skip)]
    pub location: String,
}

impl AppError {
    pub fn new(
        location: impl Into<String>,
        id: impl Into<String>,
        message: impl Into<String>,
        status: StatusCode,
    ) -> Self {
        Self {
            id: id.into(),
            message: message.into(),
            detailed_error: String::new(),
            request_id: String::new(),
            status_code: status.as_u16(),
            location: location.into(),
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detailed_error = detail.into();
        self
    }

    /// Status to respond with; out-of-range codes become 500.
    pub fn status(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
    }

    /// Strip what the current settings do not allow clients to see.
    pub fn sanitize(&mut self, settings: &ServiceSettings) {
        if !settings.enable_developer {
            self.detailed_error.clear();
        }
        if settings.experimental_enable_hardened_mode && self.status_code >= 500 {
            self.id.clear();
            self.message = "Internal Server Error".to_string();
            self.detailed_error.clear();
            self.status_code = StatusCode::INTERNAL_SERVER_ERROR.as_u16();
            self.location.clear();
        }
    }

    /// `/error?message=<urlencoded message>`.
    pub fn redirect_location(&self) -> String {
        let query = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("message", &self.message)
            .finish();
        format!("{ERROR_PAGE_PATH}?{query}")
    }

    /// `302 Found` pointing at the error page. The error's own status is dropped.
    pub fn into_redirect(self) -> Response {
        let location = HeaderValue::try_from(self.redirect_location())
            .unwrap_or_else(|_| HeaderValue::from_static(ERROR_PAGE_PATH));
        (StatusCode::FOUND, [(LOCATION, location)]).into_response()
    }
}

/// Structured error: the error as JSON with its own status.
impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        (self.status(), Json(self)).into_response()
    }
}
