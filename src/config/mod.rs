//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → store.rs (atomic swap of Arc<ConfigSnapshot>)
//!     → dispatcher reads one snapshot per request
//!
//! On change:
//!     watcher.rs detects file change      admin API patches settings
//!     → loader.rs loads new config         → store.rs copies + mutates
//!     → validation.rs validates            → validation.rs validates
//!     → store.rs publishes new generation
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable; a change publishes a new one
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod store;
pub mod validation;
pub mod watcher;

pub use loader::ConfigError;
pub use schema::{
    AdminConfig, ListenerConfig, LogFormat, ObservabilityConfig, ServerConfig, ServiceSettings,
};
pub use store::{AppOptionsProvider, ConfigSnapshot, ConfigStore};
