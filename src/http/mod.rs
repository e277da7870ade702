//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, trace + timeout layers)
//!     → request.rs (assign X-Request-ID)
//!     → routes.rs (route → web::Handler)
//!     → web::Handler (dispatch policy around business logic)
//!     → Send to client
//! ```

pub mod request;
pub mod routes;
pub mod server;

pub use request::{RequestIdLayer, X_REQUEST_ID};
pub use server::HttpServer;
