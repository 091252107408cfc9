//! Helper functions for store module

use crate::error::Error;
use crate::run::{RunRecord, RunStatus, RunSummary};
use chrono::{DateTime, SecondsFormat, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;

/// Fixed-width RFC 3339 so timestamps compare correctly as text
pub(crate) fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, Error> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| Error::Serialization(format!("invalid timestamp: {e}")))
}

fn parse_status(row: &SqliteRow) -> Result<RunStatus, Error> {
    let status_str: String = row.get("status");
    status_str.parse().map_err(Error::Serialization)
}

fn parse_times(row: &SqliteRow) -> Result<(DateTime<Utc>, Option<DateTime<Utc>>), Error> {
    let started_at_str: String = row.get("started_at");
    let completed_at_str: Option<String> = row.get("completed_at");

    let started_at = parse_timestamp(&started_at_str)?;
    let completed_at = completed_at_str
        .as_deref()
        .map(parse_timestamp)
        .transpose()?;
    Ok((started_at, completed_at))
}

/// Convert a SQLite row to a RunRecord
pub(crate) fn row_to_record(row: SqliteRow) -> Result<RunRecord, Error> {
    let status = parse_status(&row)?;
    let (started_at, completed_at) = parse_times(&row)?;

    Ok(RunRecord {
        id: row.get("id"),
        workspace_id: row.get("workspace_id"),
        tool_name: row.get("tool_name"),
        target: row.get("target"),
        args: row.get("args"),
        command_line: row.get("command_line"),
        status,
        exit_code: row.get("exit_code"),
        raw_output: row.get("raw_output"),
        started_at,
        completed_at,
    })
}

/// Convert a SQLite row to a RunSummary
pub(crate) fn row_to_summary(row: SqliteRow) -> Result<RunSummary, Error> {
    let status = parse_status(&row)?;
    let (started_at, completed_at) = parse_times(&row)?;

    Ok(RunSummary {
        id: row.get("id"),
        workspace_id: row.get("workspace_id"),
        tool_name: row.get("tool_name"),
        target: row.get("target"),
        args: row.get("args"),
        command_line: row.get("command_line"),
        status,
        exit_code: row.get("exit_code"),
        started_at,
        completed_at,
    })
}

/// Get the default data directory for nser
pub fn default_data_dir() -> std::path::PathBuf {
    dirs::home_dir()
        .map(|p| p.join(".nser"))
        .unwrap_or_else(|| std::path::PathBuf::from(".nser"))
}

/// Get the default database path
pub fn default_db_path() -> std::path::PathBuf {
    default_data_dir().join("nser.db")
}
