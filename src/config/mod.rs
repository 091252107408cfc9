//! Application configuration
//!
//! Contains the configuration structures of the `nser` binary and their
//! conversion into the library crates' own config types.

mod loader;

pub use loader::load_config;

use nser_tools::{HealthConfig, RunnerConfig};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub runner: RunnerSection,
    #[serde(default)]
    pub health: HealthSection,
    #[serde(default)]
    pub store: StoreSection,
    #[serde(default)]
    pub events: EventsSection,
}

/// `[runner]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunnerSection {
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_output_channel_capacity")]
    pub output_channel_capacity: usize,
}

fn default_timeout_secs() -> u64 {
    300
}

fn default_output_channel_capacity() -> usize {
    256
}

impl Default for RunnerSection {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            output_channel_capacity: default_output_channel_capacity(),
        }
    }
}

impl RunnerSection {
    pub fn to_runner_config(&self) -> RunnerConfig {
        RunnerConfig::new(Duration::from_secs(self.timeout_secs))
            .with_output_channel_capacity(self.output_channel_capacity)
    }
}

/// `[health]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthSection {
    #[serde(default = "default_version_timeout_secs")]
    pub version_timeout_secs: u64,
}

fn default_version_timeout_secs() -> u64 {
    5
}

impl Default for HealthSection {
    fn default() -> Self {
        Self {
            version_timeout_secs: default_version_timeout_secs(),
        }
    }
}

impl HealthSection {
    pub fn to_health_config(&self) -> HealthConfig {
        HealthConfig::default()
            .with_version_timeout(Duration::from_secs(self.version_timeout_secs))
    }
}

/// `[store]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreSection {
    /// Database file; empty selects the default location
    #[serde(default)]
    pub path: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_max_connections() -> u32 {
    1
}

impl Default for StoreSection {
    fn default() -> Self {
        Self {
            path: String::new(),
            max_connections: default_max_connections(),
        }
    }
}

impl StoreSection {
    /// Resolved database path
    pub fn db_path(&self) -> PathBuf {
        if self.path.trim().is_empty() {
            nser_replay::default_db_path()
        } else {
            PathBuf::from(self.path.trim())
        }
    }
}

/// `[events]`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsSection {
    #[serde(default = "default_event_capacity")]
    pub capacity: usize,
}

fn default_event_capacity() -> usize {
    1024
}

impl Default for EventsSection {
    fn default() -> Self {
        Self {
            capacity: default_event_capacity(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_library() {
        let config = AppConfig::default();
        let runner = config.runner.to_runner_config();
        assert_eq!(runner.timeout, nser_tools::runner::DEFAULT_RUN_TIMEOUT);
        assert_eq!(
            runner.output_channel_capacity,
            nser_tools::runner::DEFAULT_OUTPUT_CHANNEL_CAPACITY
        );
        assert_eq!(
            config.health.to_health_config().version_timeout,
            nser_tools::health::DEFAULT_VERSION_TIMEOUT
        );
    }

    #[test]
    fn test_store_path() {
        let mut store = StoreSection::default();
        assert_eq!(store.db_path(), nser_replay::default_db_path());

        store.path = "/tmp/nser-test.db".to_string();
        assert_eq!(store.db_path(), PathBuf::from("/tmp/nser-test.db"));
    }
}
