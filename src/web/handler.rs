//! The request dispatcher.
//!
//! # Request lifecycle
//! ```text
//! Init        take one ConfigSnapshot, resolve the request ID
//! Classified  classify path + headers + route static flag
//! Dispatched  fix policy headers (HSTS, CSP, frame options), run handler
//! Ok(resp)    handler owns status and body
//! Err(err)    stamp + sanitize, then structured error or 302 to /error
//! Finalized   merge headers, record metrics, return
//! ```

use std::convert::Infallible;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context as TaskContext, Poll};
use std::time::Instant;

use axum::body::Body;
use axum::http::header::{CONTENT_SECURITY_POLICY, STRICT_TRANSPORT_SECURITY};
use axum::http::{HeaderMap, HeaderValue, Request};
use axum::response::{IntoResponse, Response};
use futures_util::future::BoxFuture;
use tower::Service;
use tracing::Instrument;
use uuid::Uuid;

use crate::config::{AppOptionsProvider, ConfigSnapshot};
use crate::observability::metrics;
use crate::security::headers::{
    api_defaults, apply_frame_options, merge_defaults, HeaderPolicy, X_REQUEST_ID, X_VERSION_ID,
};
use crate::security::{hsts, CspEngine};
use crate::web::classify::{classify_with_prefix, RequestClass};
use crate::web::context::Context;
use crate::web::error::AppError;

/// What a business handler returns.
pub type HandlerResult = Result<Response, AppError>;

pub type HandlerFuture = Pin<Box<dyn Future<Output = HandlerResult> + Send>>;

/// Business logic behind a route.
///
/// Implemented for every `Fn(Context, Request<Body>) -> impl Future<Output = HandlerResult>`.
pub trait HandleFunc: Send + Sync + 'static {
    fn call(&self, ctx: Context, request: Request<Body>) -> HandlerFuture;
}

impl<F, Fut> HandleFunc for F
where
    F: Fn(Context, Request<Body>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = HandlerResult> + Send + 'static,
{
    fn call(&self, ctx: Context, request: Request<Body>) -> HandlerFuture {
        Box::pin(self(ctx, request))
    }
}

/// Registration-time properties of a route.
///
/// Only `is_static` changes dispatcher behavior; the rest are passed to the
/// handler through its [`Context`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteFlags {
    pub require_session: bool,
    pub trust_requester: bool,
    pub require_mfa: bool,
    pub is_static: bool,
}

/// How a handler error reaches the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorPresentation {
    /// JSON body with the error's own status.
    Structured,
    /// `302 Found` to the error page.
    Redirect,
}

impl ErrorPresentation {
    pub fn for_class(class: RequestClass) -> Self {
        if class.wants_structured_errors() {
            Self::Structured
        } else {
            Self::Redirect
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Structured => "structured",
            Self::Redirect => "redirect",
        }
    }
}

/// A route's business logic wrapped with the dispatch policy.
///
/// Cheap to clone; clones share the callback, the config provider and the
/// CSP cache.
#[derive(Clone)]
pub struct Handler {
    options: Arc<dyn AppOptionsProvider>,
    csp: Arc<CspEngine>,
    handle_func: Arc<dyn HandleFunc>,
    flags: RouteFlags,
}

impl fmt::Debug for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handler")
            .field("flags", &self.flags)
            .field("csp", &self.csp)
            .finish_non_exhaustive()
    }
}

impl Handler {
    pub fn new(
        options: Arc<dyn AppOptionsProvider>,
        csp: Arc<CspEngine>,
        handle_func: impl HandleFunc,
        flags: RouteFlags,
    ) -> Self {
        Self {
            options,
            csp,
            handle_func: Arc::new(handle_func),
            flags,
        }
    }

    pub fn flags(&self) -> RouteFlags {
        self.flags
    }

    /// Serve one request.
    pub async fn serve(&self, request: Request<Body>) -> Response {
        let start = Instant::now();
        let snapshot = self.options.global_app_options();
        let method = request.method().clone();
        let path = request.uri().path().to_string();
        let request_id = request_id_of(request.headers());

        let class = classify_with_prefix(
            &snapshot.service().api_prefix,
            &path,
            request.headers(),
            self.flags.is_static,
        );

        let policy = self.policy_headers(&snapshot, class, &request_id);
        let defaults = if class.is_static {
            HeaderMap::new()
        } else {
            api_defaults(&method)
        };

        let span = tracing::debug_span!(
            "dispatch",
            request_id = %request_id,
            method = %method,
            path = %path,
            class = class.label(),
        );
        let ctx = Context::new(
            request_id.clone(),
            path.clone(),
            class,
            self.flags,
            Arc::clone(&snapshot),
        );
        let outcome = self.handle_func.call(ctx, request).instrument(span).await;

        let (mut response, presentation) = match outcome {
            Ok(response) => (response, None),
            Err(err) => {
                let presentation = ErrorPresentation::for_class(class);
                let response = finalize_error(err, &snapshot, presentation, &request_id, &path);
                (response, Some(presentation))
            }
        };

        // A redirect has no body to describe.
        if presentation != Some(ErrorPresentation::Redirect) {
            merge_defaults(response.headers_mut(), &defaults);
        }
        policy.apply(response.headers_mut());

        metrics::record_request(
            method.as_str(),
            response.status().as_u16(),
            class.label(),
            start,
        );
        response
    }

    fn policy_headers(
        &self,
        snapshot: &ConfigSnapshot,
        class: RequestClass,
        request_id: &str,
    ) -> HeaderPolicy {
        let mut headers = HeaderMap::new();
        let mut absent = Vec::new();
        if let Ok(value) = HeaderValue::from_str(request_id) {
            headers.insert(X_REQUEST_ID, value);
        }
        if let Ok(value) = HeaderValue::from_str(&version_id(snapshot)) {
            headers.insert(X_VERSION_ID, value);
        }

        hsts::apply_hsts(snapshot, &mut headers);
        if !headers.contains_key(STRICT_TRANSPORT_SECURITY) {
            absent.push(STRICT_TRANSPORT_SECURITY);
        }
        if class.is_static {
            apply_frame_options(&mut headers);
        } else {
            absent.push(CONTENT_SECURITY_POLICY);
        }
        self.csp.apply_csp(snapshot, class.is_static, &mut headers);

        HeaderPolicy {
            set: headers,
            absent,
        }
    }
}

impl Service<Request<Body>> for Handler {
    type Response = Response;
    type Error = Infallible;
    type Future = BoxFuture<'static, Result<Response, Infallible>>;

    fn poll_ready(&mut self, _cx: &mut TaskContext<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, request: Request<Body>) -> Self::Future {
        let handler = self.clone();
        Box::pin(async move { Ok(handler.serve(request).await) })
    }
}

fn finalize_error(
    mut err: AppError,
    snapshot: &ConfigSnapshot,
    presentation: ErrorPresentation,
    request_id: &str,
    path: &str,
) -> Response {
    err.request_id = request_id.to_string();

    if err.status_code >= 500 {
        tracing::error!(
            request_id = %request_id,
            path = %path,
            error_id = %err.id,
            status = err.status_code,
            error = %err,
            "Handler failed"
        );
    } else {
        tracing::info!(
            request_id = %request_id,
            path = %path,
            error_id = %err.id,
            status = err.status_code,
            error = %err,
            "Handler returned error"
        );
    }

    err.location = path.to_string();
    err.sanitize(snapshot.service());

    metrics::record_error(presentation.label());
    match presentation {
        ErrorPresentation::Structured => err.into_response(),
        ErrorPresentation::Redirect => err.into_redirect(),
    }
}

/// Reuse the inbound request ID when present, otherwise mint one.
fn request_id_of(headers: &HeaderMap) -> String {
    headers
        .get(X_REQUEST_ID)
        .and_then(|value| value.to_str().ok())
        .filter(|value| !value.is_empty())
        .map_or_else(|| Uuid::new_v4().simple().to_string(), str::to_string)
}

fn version_id(snapshot: &ConfigSnapshot) -> String {
    format!("{}.{}", env!("CARGO_PKG_VERSION"), snapshot.generation())
}
