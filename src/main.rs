//! web-dispatch server.
//!
//! ```text
//!   config file ──watcher──┐         admin API (PATCH /admin/config/service)
//!                          ▼                      │
//!                    ConfigStore ◀────────────────┘
//!                          │ one snapshot per request
//!                          ▼
//!   request ──▶ RequestIdLayer ──▶ Router ──▶ Handler ──▶ business logic
//!                                               │
//!   response ◀── HSTS / CSP / redirect policy ◀─┘
//! ```

use std::error::Error;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use tokio::net::TcpListener;
use tokio::sync::mpsc;

use web_dispatch::admin::setup_admin_router;
use web_dispatch::config::loader::load_config;
use web_dispatch::config::watcher::ConfigWatcher;
use web_dispatch::lifecycle::signals::wait_for_termination;
use web_dispatch::observability::{logging, metrics};
use web_dispatch::{ConfigStore, HttpServer, ServerConfig, Shutdown};

#[derive(Parser)]
#[command(name = "web-dispatch")]
#[command(about = "HTTP server with uniform security and error policy", long_about = None)]
struct Args {
    /// Path to a TOML configuration file. Watched for changes.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => load_config(path)?,
        None => ServerConfig::default(),
    };

    logging::init_logging(&config.observability)?;
    tracing::info!("web-dispatch v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!(
        bind_address = %config.listener.bind_address,
        site_url = %config.service.site_url,
        hsts = config.service.tls_strict_transport,
        admin = config.admin.enabled,
        "Configuration loaded"
    );

    if config.observability.metrics_enabled {
        let addr: SocketAddr = config.observability.metrics_address.parse()?;
        metrics::init_metrics(addr)?;
    }

    let store = Arc::new(ConfigStore::new(config.clone()));
    let shutdown = Shutdown::new();

    // Keep the watcher alive for the lifetime of the server.
    let (config_updates, _watcher) = match &args.config {
        Some(path) => {
            let (watcher, updates) = ConfigWatcher::new(path);
            (updates, Some(watcher.run()?))
        }
        None => {
            let (_, updates) = mpsc::unbounded_channel();
            (updates, None)
        }
    };

    if config.admin.enabled {
        let listener = TcpListener::bind(&config.admin.bind_address).await?;
        tracing::info!(address = %listener.local_addr()?, "Admin API listening");
        let router = setup_admin_router(Arc::clone(&store));
        let mut stop = shutdown.subscribe();
        tokio::spawn(async move {
            let served = axum::serve(listener, router)
                .with_graceful_shutdown(async move {
                    let _ = stop.recv().await;
                })
                .await;
            if let Err(e) = served {
                tracing::error!(error = %e, "Admin API failed");
            }
        });
    }

    let signal_shutdown = shutdown.clone();
    tokio::spawn(async move {
        wait_for_termination().await;
        signal_shutdown.trigger();
    });

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    HttpServer::with_store(store)
        .run(listener, config_updates, shutdown.subscribe())
        .await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
