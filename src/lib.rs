//! Request dispatch for web servers.
//!
//! Every route is wrapped in a [`web::Handler`] that applies transport and
//! content security headers and turns handler errors into either a
//! structured response (API, webhook and mobile callers) or a redirect to
//! the error page (browsers).

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod web;

pub use config::{ConfigSnapshot, ConfigStore, ServerConfig};
pub use http::HttpServer;
pub use lifecycle::Shutdown;
pub use web::{AppError, Handler, Web};
