//! Trait for run record storage backends

use crate::error::Result;
use crate::run::{NewRun, RunStatus};

/// Write contract the runner depends on.
///
/// Implementations assign run ids and must accept exactly one terminal
/// update per run.
#[async_trait::async_trait]
pub trait RunStoreTrait: Send + Sync {
    /// Insert a record in the `running` state and return its id
    async fn insert_running(&self, run: &NewRun) -> Result<i64>;

    /// Move a `running` record to its terminal state
    async fn finalize(
        &self,
        run_id: i64,
        output: &str,
        status: RunStatus,
        exit_code: i32,
    ) -> Result<()>;

    /// Get the store name (for logging)
    fn name(&self) -> &str;
}
