//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatcher-wrapped routes
//! - Wire up middleware (tracing, timeout, request ID)
//! - Apply configuration updates while serving
//! - Graceful shutdown

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::{broadcast, mpsc};
use tower_http::{timeout::TimeoutLayer, trace::TraceLayer};

use crate::config::{ConfigStore, ServerConfig};
use crate::http::request::RequestIdLayer;
use crate::http::routes;
use crate::web::Web;

/// HTTP server for the dispatcher.
pub struct HttpServer {
    router: Router,
    store: Arc<ConfigStore>,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self::with_store(Arc::new(ConfigStore::new(config)))
    }

    /// Create a server around an existing store, e.g. one shared with the admin API.
    pub fn with_store(store: Arc<ConfigStore>) -> Self {
        let web = Web::new(store.clone());
        let snapshot = store.snapshot();
        let timeout = Duration::from_secs(snapshot.config().listener.request_timeout_secs);
        let router = Self::build_router(&web, &snapshot.service().api_prefix, timeout);
        Self { router, store }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(web: &Web, api_prefix: &str, timeout: Duration) -> Router {
        routes::build_routes(web, api_prefix)
            .layer(TimeoutLayer::new(timeout))
            .layer(RequestIdLayer)
            .layer(TraceLayer::new_for_http())
    }

    pub fn router(&self) -> Router {
        self.router.clone()
    }

    pub fn store(&self) -> &Arc<ConfigStore> {
        &self.store
    }

    /// Serve until `shutdown` fires, applying every config received on
    /// `config_updates` in between.
    pub async fn run(
        self,
        listener: TcpListener,
        mut config_updates: mpsc::UnboundedReceiver<ServerConfig>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let store = Arc::clone(&self.store);
        let updater = tokio::spawn(async move {
            while let Some(config) = config_updates.recv().await {
                if let Err(e) = store.replace(config) {
                    tracing::error!(error = %e, "Rejected configuration update");
                }
            }
        });

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                // A closed channel means the coordinator is gone; stop too.
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        updater.abort();
        tracing::info!("HTTP server stopped");
        Ok(())
    }
}
