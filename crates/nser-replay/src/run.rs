//! Run - Lifecycle records for tool executions
//!
//! A run is created in the `running` state when a tool is launched and is
//! moved exactly once to `completed` or `failed` when the process exits.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Exit code recorded when no real exit code is available
/// (spawn failure, signal termination, timeout, abandoned record).
pub const ABANDONED_EXIT_CODE: i32 = -1;

/// Run status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Process is running
    Running,
    /// Process exited with code 0
    Completed,
    /// Process exited non-zero, was killed, or never started
    Failed,
}

impl RunStatus {
    /// Returns the string representation
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    /// Check if the status is terminal (completed or failed)
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }
}

impl std::fmt::Display for RunStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for RunStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "running" => Ok(Self::Running),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            _ => Err(format!("unknown run status: {s}")),
        }
    }
}

/// Data needed to insert a new `running` record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRun {
    /// Owning workspace
    pub workspace_id: i64,
    /// Registry name of the tool
    pub tool_name: String,
    /// Target passed as the last positional argument
    pub target: String,
    /// User-supplied arguments joined with spaces
    pub args: String,
    /// Rendered command line (display only)
    pub command_line: String,
}

impl NewRun {
    /// Create a new run description
    #[must_use]
    pub fn new(
        workspace_id: i64,
        tool_name: impl Into<String>,
        target: impl Into<String>,
        user_args: &[String],
        command_line: impl Into<String>,
    ) -> Self {
        Self {
            workspace_id,
            tool_name: tool_name.into(),
            target: target.into(),
            args: user_args.join(" "),
            command_line: command_line.into(),
        }
    }
}

/// A persisted run record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunRecord {
    /// Store-assigned identifier
    pub id: i64,
    /// Owning workspace
    pub workspace_id: i64,
    /// Registry name of the tool
    pub tool_name: String,
    /// Target
    pub target: String,
    /// User-supplied arguments
    pub args: String,
    /// Rendered command line
    pub command_line: String,
    /// Lifecycle status
    pub status: RunStatus,
    /// Process exit code (0 while running)
    pub exit_code: i32,
    /// Merged stdout/stderr, empty while running
    pub raw_output: String,
    /// Launch time
    pub started_at: DateTime<Utc>,
    /// Finalization time, absent while running
    pub completed_at: Option<DateTime<Utc>>,
}

/// History row without the raw output payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    /// Store-assigned identifier
    pub id: i64,
    /// Owning workspace
    pub workspace_id: i64,
    /// Registry name of the tool
    pub tool_name: String,
    /// Target
    pub target: String,
    /// User-supplied arguments
    pub args: String,
    /// Rendered command line
    pub command_line: String,
    /// Lifecycle status
    pub status: RunStatus,
    /// Process exit code
    pub exit_code: i32,
    /// Launch time
    pub started_at: DateTime<Utc>,
    /// Finalization time
    pub completed_at: Option<DateTime<Utc>>,
}
