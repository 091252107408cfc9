//! History queries for RunStore

use super::helpers::{format_timestamp, row_to_summary};
use super::run_store::RunStore;
use crate::error::{Error, Result};
use crate::run::{RunStatus, RunSummary, ABANDONED_EXIT_CODE};
use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::{info, instrument};

/// Output stored on records that were still running when reaped
const ABANDONED_OUTPUT: &str = "run abandoned: no terminal state was recorded";

impl RunStore {
    /// List runs for a workspace, newest first
    #[instrument(skip(self))]
    pub async fn list_runs_by_workspace(
        &self,
        workspace_id: i64,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<RunSummary>> {
        let rows = sqlx::query(
            r#"
            SELECT id, workspace_id, tool_name, target, args, command_line,
                   status, exit_code, started_at, completed_at
            FROM tool_runs
            WHERE workspace_id = ?1
            ORDER BY started_at DESC, id DESC
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(workspace_id)
        .bind(limit)
        .bind(offset)
        .fetch_all(self.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        rows.into_iter().map(row_to_summary).collect()
    }

    /// Get the raw output of a run
    #[instrument(skip(self))]
    pub async fn get_run_output(&self, run_id: i64) -> Result<String> {
        let row = sqlx::query("SELECT raw_output FROM tool_runs WHERE id = ?1")
            .bind(run_id)
            .fetch_optional(self.pool())
            .await
            .map_err(|e| Error::Database(e.to_string()))?
            .ok_or(Error::RunNotFound(run_id))?;

        Ok(row.get("raw_output"))
    }

    /// Mark runs still `running` that started before `before` as failed.
    ///
    /// Returns the number of records reaped.
    #[instrument(skip(self))]
    pub async fn abandon_stale_runs(&self, before: DateTime<Utc>) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE tool_runs
            SET status = ?1, exit_code = ?2, raw_output = ?3, completed_at = ?4
            WHERE status = 'running' AND started_at < ?5
            "#,
        )
        .bind(RunStatus::Failed.as_str())
        .bind(ABANDONED_EXIT_CODE)
        .bind(ABANDONED_OUTPUT)
        .bind(format_timestamp(Utc::now()))
        .bind(format_timestamp(before))
        .execute(self.pool())
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        let reaped = result.rows_affected();
        if reaped > 0 {
            info!(reaped, "Marked stale running records as failed");
        }
        Ok(reaped)
    }
}
