//! Point-in-time configuration snapshots.
//!
//! The store keeps the live configuration behind an [`ArcSwap`]. Readers take
//! a full snapshot with one atomic load; writers build a whole new
//! configuration, validate it, and swap the pointer. A reader therefore sees
//! either the old configuration or the new one, never a mix.

use std::sync::{Arc, Mutex, PoisonError};

use arc_swap::ArcSwap;

use crate::config::loader::ConfigError;
use crate::config::schema::{ServerConfig, ServiceSettings};
use crate::config::validation::validate_config;
use crate::observability::metrics;

/// An immutable view of the configuration at one moment.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigSnapshot {
    generation: u64,
    config: ServerConfig,
}

impl ConfigSnapshot {
    pub fn new(generation: u64, config: ServerConfig) -> Self {
        Self { generation, config }
    }

    /// Incremented on every accepted configuration change.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn service(&self) -> &ServiceSettings {
        &self.config.service
    }

    pub fn hsts_enabled(&self) -> bool {
        self.config.service.tls_strict_transport
    }

    pub fn hsts_max_age(&self) -> u64 {
        self.config.service.tls_strict_transport_max_age
    }

    pub fn site_url(&self) -> &str {
        &self.config.service.site_url
    }
}

/// Source of configuration snapshots for the dispatcher.
pub trait AppOptionsProvider: Send + Sync {
    /// Return the current snapshot. Must be safe to call while the
    /// configuration is being changed.
    fn global_app_options(&self) -> Arc<ConfigSnapshot>;
}

/// Thread-safe owner of the live configuration.
#[derive(Debug)]
pub struct ConfigStore {
    current: ArcSwap<ConfigSnapshot>,
    /// Serializes writers so two updates never start from the same snapshot.
    write_lock: Mutex<()>,
}

impl ConfigStore {
    /// Create a store at generation 0. The initial config is trusted as-is.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            current: ArcSwap::from_pointee(ConfigSnapshot::new(0, config)),
            write_lock: Mutex::new(()),
        }
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        self.current.load_full()
    }

    /// Apply `mutate` to a copy of the current config, validate the result
    /// and publish it. On validation failure the live config is unchanged.
    pub fn update_config<F>(&self, mutate: F) -> Result<Arc<ConfigSnapshot>, ConfigError>
    where
        F: FnOnce(&mut ServerConfig),
    {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let current = self.current.load();
        let mut next = current.config.clone();
        mutate(&mut next);
        self.publish(current.generation, next)
    }

    /// Replace the whole configuration, e.g. after a file reload.
    pub fn replace(&self, config: ServerConfig) -> Result<Arc<ConfigSnapshot>, ConfigError> {
        let _guard = self.write_lock.lock().unwrap_or_else(PoisonError::into_inner);
        let generation = self.current.load().generation;
        self.publish(generation, config)
    }

    fn publish(
        &self,
        generation: u64,
        config: ServerConfig,
    ) -> Result<Arc<ConfigSnapshot>, ConfigError> {
        if let Err(errors) = validate_config(&config) {
            metrics::record_config_reload("rejected");
            return Err(ConfigError::Validation(errors));
        }

        let snapshot = Arc::new(ConfigSnapshot::new(generation + 1, config));
        self.current.store(Arc::clone(&snapshot));
        metrics::record_config_reload("applied");

        tracing::info!(
            generation = snapshot.generation,
            site_url = %snapshot.site_url(),
            hsts = snapshot.hsts_enabled(),
            "Configuration updated"
        );
        Ok(snapshot)
    }
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

impl AppOptionsProvider for ConfigStore {
    fn global_app_options(&self) -> Arc<ConfigSnapshot> {
        self.snapshot()
    }
}
