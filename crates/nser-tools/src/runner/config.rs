//! Runner configuration

use std::time::Duration;

/// Hard deadline for a single run
pub const DEFAULT_RUN_TIMEOUT: Duration = Duration::from_secs(300);

/// Lines buffered between the pipe reader and the publisher
pub const DEFAULT_OUTPUT_CHANNEL_CAPACITY: usize = 256;

/// Configuration for the tool runner
#[derive(Debug, Clone)]
pub struct RunnerConfig {
    /// Deadline measured from process launch
    pub timeout: Duration,
    /// Capacity of the per-run line queue in streaming mode
    pub output_channel_capacity: usize,
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_RUN_TIMEOUT,
            output_channel_capacity: DEFAULT_OUTPUT_CHANNEL_CAPACITY,
        }
    }
}

impl RunnerConfig {
    /// Create a configuration with the given deadline
    #[must_use]
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            ..Default::default()
        }
    }

    /// Set the run deadline
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the streaming line queue capacity
    #[must_use]
    pub fn with_output_channel_capacity(mut self, capacity: usize) -> Self {
        self.output_channel_capacity = capacity.max(1);
        self
    }
}
