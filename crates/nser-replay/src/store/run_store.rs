//! RunStore - SQLite-based run record storage

use super::helpers::{format_timestamp, row_to_record};
use super::traits::RunStoreTrait;
use crate::error::{Error, Result};
use crate::run::{NewRun, RunRecord, RunStatus};
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;
use std::time::Duration;
use tracing::{debug, info, instrument};

/// How long a writer waits on a locked database before failing
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Run store for persisting tool run lifecycles to SQLite
#[derive(Clone)]
pub struct RunStore {
    pool: SqlitePool,
}

impl RunStore {
    /// Create a new run store from a database path
    ///
    /// This will create the database file if it doesn't exist and run migrations.
    pub async fn from_path(db_path: &Path, max_connections: u32) -> Result<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| Error::Database(format!("failed to create directory: {e}")))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(BUSY_TIMEOUT);

        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections.max(1))
            .connect_with(options)
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        info!("SQLite run store initialized at {}", db_path.display());
        Ok(store)
    }

    /// Create a new in-memory run store (for testing)
    pub async fn in_memory() -> Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .map_err(|e| Error::Database(e.to_string()))?;

        let store = Self { pool };
        store.run_migrations().await?;

        debug!("In-memory SQLite run store initialized");
        Ok(store)
    }

    /// Run database migrations
    async fn run_migrations(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS tool_runs (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                workspace_id INTEGER NOT NULL,
                tool_name TEXT NOT NULL,
                target TEXT NOT NULL,
                args TEXT NOT NULL DEFAULT '',
                command_line TEXT NOT NULL DEFAULT '',
                status TEXT NOT NULL DEFAULT 'running',
                exit_code INTEGER NOT NULL DEFAULT 0,
                raw_output TEXT NOT NULL DEFAULT '',
                started_at TEXT NOT NULL,
                completed_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_tool_runs_workspace
            ON tool_runs(workspace_id, started_at DESC)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS idx_tool_runs_status
            ON tool_runs(status)
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        debug!("Database migrations completed");
        Ok(())
    }

    /// Get a reference to the underlying connection pool
    #[must_use]
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Insert a new run in the `running` state
    #[instrument(skip(self, run), fields(tool = %run.tool_name, workspace_id = run.workspace_id))]
    pub async fn insert_running(&self, run: &NewRun) -> Result<i64> {
        let result = sqlx::query(
            r#"
            INSERT INTO tool_runs (
                workspace_id, tool_name, target, args, command_line,
                status, started_at
            ) VALUES (
                ?1, ?2, ?3, ?4, ?5, ?6, ?7
            )
            "#,
        )
        .bind(run.workspace_id)
        .bind(&run.tool_name)
        .bind(&run.target)
        .bind(&run.args)
        .bind(&run.command_line)
        .bind(RunStatus::Running.as_str())
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        let run_id = result.last_insert_rowid();
        debug!(run_id, "Inserted running tool run");
        Ok(run_id)
    }

    /// Move a `running` record to a terminal state.
    ///
    /// Only rows still in `running` are touched, so a second finalize for
    /// the same id fails with [`Error::AlreadyFinalized`].
    #[instrument(skip(self, output), fields(output_len = output.len()))]
    pub async fn finalize(
        &self,
        run_id: i64,
        output: &str,
        status: RunStatus,
        exit_code: i32,
    ) -> Result<()> {
        if !status.is_terminal() {
            return Err(Error::InvalidTransition(format!(
                "run {run_id} cannot be finalized as {status}"
            )));
        }

        let result = sqlx::query(
            r#"
            UPDATE tool_runs
            SET raw_output = ?2, status = ?3, exit_code = ?4, completed_at = ?5
            WHERE id = ?1 AND status = 'running'
            "#,
        )
        .bind(run_id)
        .bind(output)
        .bind(status.as_str())
        .bind(exit_code)
        .bind(format_timestamp(Utc::now()))
        .execute(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?;

        if result.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM tool_runs WHERE id = ?1")
                .bind(run_id)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| Error::Database(e.to_string()))?
                .is_some();
            return Err(if exists {
                Error::AlreadyFinalized(run_id)
            } else {
                Error::RunNotFound(run_id)
            });
        }

        debug!(run_id, %status, exit_code, "Finalized tool run");
        Ok(())
    }

    /// Get a run by ID
    #[instrument(skip(self))]
    pub async fn get_run(&self, run_id: i64) -> Result<RunRecord> {
        let row = sqlx::query(
            r#"
            SELECT id, workspace_id, tool_name, target, args, command_line,
                   status, exit_code, raw_output, started_at, completed_at
            FROM tool_runs
            WHERE id = ?1
            "#,
        )
        .bind(run_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| Error::Database(e.to_string()))?
        .ok_or(Error::RunNotFound(run_id))?;

        row_to_record(row)
    }
}

#[async_trait::async_trait]
impl RunStoreTrait for RunStore {
    async fn insert_running(&self, run: &NewRun) -> Result<i64> {
        RunStore::insert_running(self, run).await
    }

    async fn finalize(
        &self,
        run_id: i64,
        output: &str,
        status: RunStatus,
        exit_code: i32,
    ) -> Result<()> {
        RunStore::finalize(self, run_id, output, status, exit_code).await
    }

    fn name(&self) -> &str {
        "sqlite"
    }
}
