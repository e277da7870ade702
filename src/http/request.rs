//! Request ID assignment.
//!
//! Runs before routing so every log line and every response of a request
//! carry the same ID. An ID supplied by the client is kept.

use std::task::{Context, Poll};

use axum::http::{HeaderValue, Request};
use tower::{Layer, Service};
use uuid::Uuid;

pub use crate::security::headers::X_REQUEST_ID;

/// Layer that ensures every request has an `X-Request-ID` header.
#[derive(Debug, Clone, Copy, Default)]
pub struct RequestIdLayer;

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService { inner }
    }
}

/// Service produced by [`RequestIdLayer`].
#[derive(Debug, Clone)]
pub struct RequestIdService<S> {
    inner: S,
}

impl<S, B> Service<Request<B>> for RequestIdService<S>
where
    S: Service<Request<B>>,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = S::Future;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut request: Request<B>) -> Self::Future {
        let missing = request
            .headers()
            .get(X_REQUEST_ID)
            .map_or(true, |value| value.is_empty());
        if missing {
            let id = Uuid::new_v4().simple().to_string();
            if let Ok(value) = HeaderValue::from_str(&id) {
                request.headers_mut().insert(X_REQUEST_ID, value);
            }
        }
        self.inner.call(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::convert::Infallible;
    use tower::{service_fn, ServiceExt};

    async fn echo_id(request: Request<()>) -> Result<String, Infallible> {
        Ok(request
            .headers()
            .get(X_REQUEST_ID)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string())
    }

    #[tokio::test]
    async fn test_assigns_missing_id() {
        let service = RequestIdLayer.layer(service_fn(echo_id));
        let id = service.oneshot(Request::new(())).await.unwrap();
        assert_eq!(id.len(), 32);
    }

    #[tokio::test]
    async fn test_keeps_client_id() {
        let service = RequestIdLayer.layer(service_fn(echo_id));
        let request = Request::builder()
            .header("X-Request-ID", "client-chosen")
            .body(())
            .unwrap();
        let id = service.oneshot(request).await.unwrap();
        assert_eq!(id, "client-chosen");
    }
}
