//! Wiring of registry, store, event bus and runner

use crate::config::AppConfig;
use anyhow::{Context, Result};
use nser_replay::RunStore;
use nser_tools::{register_builtins, EventBus, HealthProber, ToolRegistry, ToolRunner};
use std::sync::Arc;
use tracing::debug;

/// Shared components built once per process
pub struct App {
    pub config: AppConfig,
    pub registry: Arc<ToolRegistry>,
    pub bus: EventBus,
}

impl App {
    /// Build the registry with the built-in catalog and an event bus
    pub fn new(config: AppConfig) -> Self {
        let registry = ToolRegistry::new();
        register_builtins(&registry);
        debug!(tools = registry.len(), "Tool registry initialized");

        let bus = EventBus::new(config.events.capacity);
        Self {
            config,
            registry: Arc::new(registry),
            bus,
        }
    }

    /// Open the run store at the configured path
    pub async fn open_store(&self) -> Result<Arc<RunStore>> {
        let path = self.config.store.db_path();
        let store = RunStore::from_path(&path, self.config.store.max_connections)
            .await
            .with_context(|| format!("Failed to open run store at {}", path.display()))?;
        Ok(Arc::new(store))
    }

    /// Runner bound to `store` and this app's event bus
    pub fn runner(&self, store: Arc<RunStore>) -> ToolRunner {
        ToolRunner::new(
            Arc::clone(&self.registry),
            store,
            Arc::new(self.bus.clone()),
            self.config.runner.to_runner_config(),
        )
    }

    /// Health prober using the configured probe timeout
    pub fn prober(&self) -> HealthProber {
        HealthProber::new(self.config.health.to_health_config())
    }
}
