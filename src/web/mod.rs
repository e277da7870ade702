//! Request dispatch subsystem.
//!
//! # Data Flow
//! ```text
//! Request
//!     → handler.rs (Handler: one snapshot per request)
//!     → classify.rs (api / webhook / static / mobile)
//!     → security/ (HSTS, CSP, frame options decided up front)
//!     → business callback (Context, Request) → Result<Response, AppError>
//!     → handler.rs (pass-through, structured error, or 302 to /error)
//!     → Response
//! ```
//!
//! # Design Decisions
//! - Handlers report errors as return values, never through shared state
//! - Classification is a pure function of path, headers and route flags
//! - API, webhook and mobile callers never receive a redirect

pub mod classify;
pub mod context;
pub mod error;
pub mod handler;

use std::sync::Arc;

pub use classify::{classify, RequestClass};
pub use context::Context;
pub use error::AppError;
pub use handler::{ErrorPresentation, HandleFunc, Handler, HandlerResult, RouteFlags};

use crate::config::AppOptionsProvider;
use crate::security::CspEngine;

/// Mints [`Handler`]s that share one config provider and one CSP cache.
#[derive(Clone)]
pub struct Web {
    options: Arc<dyn AppOptionsProvider>,
    csp: Arc<CspEngine>,
}

impl Web {
    pub fn new(options: Arc<dyn AppOptionsProvider>) -> Self {
        Self {
            options,
            csp: Arc::new(CspEngine::new()),
        }
    }

    /// Non-static route with default flags.
    pub fn handler(&self, handle_func: impl HandleFunc) -> Handler {
        self.handler_with(handle_func, RouteFlags::default())
    }

    /// Route serving static web-app content.
    pub fn static_handler(&self, handle_func: impl HandleFunc) -> Handler {
        self.handler_with(
            handle_func,
            RouteFlags {
                is_static: true,
                ..RouteFlags::default()
            },
        )
    }

    pub fn handler_with(&self, handle_func: impl HandleFunc, flags: RouteFlags) -> Handler {
        Handler::new(
            Arc::clone(&self.options),
            Arc::clone(&self.csp),
            handle_func,
            flags,
        )
    }

    pub fn csp(&self) -> &Arc<CspEngine> {
        &self.csp
    }
}

impl std::fmt::Debug for Web {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Web").field("csp", &self.csp).finish_non_exhaustive()
    }
}
