//! Security header subsystem.
//!
//! # Data Flow
//! ```text
//! ConfigSnapshot + request class (from the dispatcher):
//!     → hsts.rs (Strict-Transport-Security, every route)
//!     → csp.rs (Content-Security-Policy, static routes, cached per subpath)
//!     → headers.rs (frame options, API defaults, merge rules)
//!     → Response headers
//! ```
//!
//! # Design Decisions
//! - Header values are computed from one snapshot per request
//! - Disabled policies remove the header; they never send it empty
//! - The CSP cache is the only shared mutable state

pub mod csp;
pub mod headers;
pub mod hsts;

pub use csp::CspEngine;
