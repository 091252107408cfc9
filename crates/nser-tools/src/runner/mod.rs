//! Runner - Tool execution engine
//!
//! This module launches registered tools as subprocesses and supervises them:
//! - Argument vector and display command line construction
//! - Hard deadline and caller cancellation (whole process tree is killed)
//! - Run record lifecycle (`running` on launch, one terminal update on exit)
//! - Live line-by-line output for streaming runs
//!
//! Both entry points share the same setup, so unknown tools and missing
//! binaries are rejected before any record exists.

mod command;
mod config;
mod process;
mod stream;


pub use command::{build_args, render_command_line};
pub use config::{RunnerConfig, DEFAULT_OUTPUT_CHANNEL_CAPACITY, DEFAULT_RUN_TIMEOUT};

use crate::error::{Error, Result};
use crate::events::EventSink;
use crate::registry::ToolRegistry;
use crate::resolve::resolve_binary;
use nser_replay::{NewRun, RunStatus, RunStoreTrait, ABANDONED_EXIT_CODE};
use process::{Capture, Termination, DRAIN_GRACE};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument, warn};

/// Delimiter placed between stdout and stderr in blocking-run output
pub const STDERR_DELIMITER: &str = "\n--- STDERR ---\n";

/// A request to run a registered tool
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunRequest {
    /// Workspace the run belongs to
    pub workspace_id: i64,
    /// Registry name of the tool
    pub tool_name: String,
    /// Target, always the last positional argument
    pub target: String,
    /// Extra user arguments, placed after the tool's default arguments
    #[serde(default)]
    pub args: Vec<String>,
}

impl RunRequest {
    /// Create a request without user arguments
    #[must_use]
    pub fn new(workspace_id: i64, tool_name: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            workspace_id,
            tool_name: tool_name.into(),
            target: target.into(),
            args: Vec::new(),
        }
    }

    /// Set the user arguments
    #[must_use]
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }
}

/// Final result of a run, returned by blocking runs and carried by done events
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunResult {
    /// Store-assigned run id
    pub run_id: i64,
    /// Registry name of the tool
    pub tool_name: String,
    /// Target
    pub target: String,
    /// Rendered command line
    pub command_line: String,
    /// `completed` or `failed`
    pub status: RunStatus,
    /// Captured output
    pub output: String,
    /// Wall-clock duration in milliseconds
    pub duration_ms: u64,
    /// Process exit code, `-1` when none was observable
    pub exit_code: i32,
}

impl RunResult {
    /// Whether the run completed with exit code 0
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed
    }
}

/// Returned immediately by a streaming run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamStart {
    /// Run id used by the run's output and done events
    pub run_id: i64,
    /// Rendered command line
    pub command_line: String,
}

/// Everything needed to launch a run, computed before any side effect
#[derive(Debug, Clone)]
pub(crate) struct PreparedRun {
    pub(crate) request: RunRequest,
    pub(crate) path: PathBuf,
    pub(crate) args: Vec<String>,
    pub(crate) command_line: String,
}

/// Terminal state of one execution, ready to be persisted
#[derive(Debug)]
pub(crate) struct Outcome {
    pub(crate) output: String,
    pub(crate) status: RunStatus,
    pub(crate) exit_code: i32,
}

impl Outcome {
    fn from_termination(output: String, termination: &Termination) -> Self {
        let (status, exit_code) = termination.classify();
        Self {
            output,
            status,
            exit_code,
        }
    }

    fn start_error(kind: &str, err: &std::io::Error) -> Self {
        Self {
            output: format!("{kind} error: {err}"),
            status: RunStatus::Failed,
            exit_code: ABANDONED_EXIT_CODE,
        }
    }

    fn into_result(self, prepared: &PreparedRun, run_id: i64, elapsed: Duration) -> RunResult {
        RunResult {
            run_id,
            tool_name: prepared.request.tool_name.clone(),
            target: prepared.request.target.clone(),
            command_line: prepared.command_line.clone(),
            status: self.status,
            output: self.output,
            duration_ms: u64::try_from(elapsed.as_millis()).unwrap_or(u64::MAX),
            exit_code: self.exit_code,
        }
    }
}

/// Tool runner for executing registered tools
pub struct ToolRunner {
    registry: Arc<ToolRegistry>,
    store: Arc<dyn RunStoreTrait>,
    events: Arc<dyn EventSink>,
    config: RunnerConfig,
}

impl ToolRunner {
    /// Create a new tool runner
    #[must_use]
    pub fn new(
        registry: Arc<ToolRegistry>,
        store: Arc<dyn RunStoreTrait>,
        events: Arc<dyn EventSink>,
        config: RunnerConfig,
    ) -> Self {
        Self {
            registry,
            store,
            events,
            config,
        }
    }

    /// Resolve the tool and binary, then build the argument vector
    fn prepare(&self, request: RunRequest) -> Result<PreparedRun> {
        let def = self.registry.get(&request.tool_name)?;
        let path = resolve_binary(&def.binary).ok_or_else(|| Error::NotInstalled {
            tool: def.name.clone(),
            binary: def.binary.clone(),
        })?;
        let args = build_args(&def, &request.args, &request.target);
        let command_line = render_command_line(&def.binary, &args);

        Ok(PreparedRun {
            request,
            path,
            args,
            command_line,
        })
    }

    /// Render the command line a request would run, without running it
    pub fn preview(&self, request: RunRequest) -> Result<String> {
        self.prepare(request).map(|prepared| prepared.command_line)
    }

    async fn insert_running(&self, prepared: &PreparedRun) -> Result<i64> {
        let request = &prepared.request;
        let run = NewRun::new(
            request.workspace_id,
            &request.tool_name,
            &request.target,
            &request.args,
            &prepared.command_line,
        );
        Ok(self.store.insert_running(&run).await?)
    }

    /// Run a tool and wait for it to finish.
    ///
    /// A failing tool is an `Ok` result with status `failed`. Errors are
    /// returned for unknown tools, missing binaries and store failures.
    #[instrument(
        skip(self, request, cancel),
        fields(tool = %request.tool_name, workspace_id = request.workspace_id)
    )]
    pub async fn run(&self, request: RunRequest, cancel: &CancellationToken) -> Result<RunResult> {
        let prepared = self.prepare(request)?;
        let started = Instant::now();
        let run_id = self.insert_running(&prepared).await?;
        info!(run_id, command = %prepared.command_line, "Starting tool run");

        // Execution and finalization run on their own task. Dropping this
        // future cancels the task's token, which kills the process; the
        // record is still finalized.
        let task_cancel = cancel.child_token();
        let abandon_guard = task_cancel.clone().drop_guard();
        let store = Arc::clone(&self.store);
        let timeout = self.config.timeout;
        let handle = tokio::spawn(async move {
            let outcome = execute_buffered(&prepared, run_id, timeout, &task_cancel).await;
            let finalized = store
                .finalize(run_id, &outcome.output, outcome.status, outcome.exit_code)
                .await;
            (prepared, outcome, finalized)
        });

        let joined = handle.await;
        abandon_guard.disarm();
        let (prepared, outcome, finalized) =
            joined.map_err(|e| Error::Execution(format!("run task failed: {e}")))?;
        finalized?;

        let result = outcome.into_result(&prepared, run_id, started.elapsed());
        info!(
            run_id,
            status = %result.status,
            exit_code = result.exit_code,
            duration_ms = result.duration_ms,
            "Tool run finished"
        );
        Ok(result)
    }

    /// Start a tool in the background and return its run id immediately.
    ///
    /// The record is inserted before this returns. Output lines and the
    /// single done event are published to the event sink. Cancelling
    /// `cancel` kills the process; the record is still finalized.
    #[instrument(
        skip(self, request, cancel),
        fields(tool = %request.tool_name, workspace_id = request.workspace_id)
    )]
    pub async fn run_streaming(
        &self,
        request: RunRequest,
        cancel: &CancellationToken,
    ) -> Result<StreamStart> {
        let prepared = self.prepare(request)?;
        let run_id = self.insert_running(&prepared).await?;
        info!(run_id, command = %prepared.command_line, "Starting streaming tool run");

        let start = StreamStart {
            run_id,
            command_line: prepared.command_line.clone(),
        };

        let task = stream::StreamTask {
            run_id,
            prepared,
            store: Arc::clone(&self.store),
            events: Arc::clone(&self.events),
            config: self.config.clone(),
            cancel: cancel.child_token(),
        };
        tokio::spawn(task.run());

        Ok(start)
    }
}

/// Run the process with separate stdout/stderr capture until it exits,
/// the deadline passes or `cancel` fires
async fn execute_buffered(
    prepared: &PreparedRun,
    run_id: i64,
    timeout: Duration,
    cancel: &CancellationToken,
) -> Outcome {
    let mut cmd = process::command(&prepared.path, &prepared.args);
    cmd.stdout(Stdio::piped()).stderr(Stdio::piped());
    let spawned = cmd.spawn();
    drop(cmd);

    let mut child = match spawned {
        Ok(child) => child,
        Err(e) => {
            warn!(run_id, error = %e, "Failed to start tool");
            return Outcome::start_error("start", &e);
        }
    };
    let deadline = Instant::now() + timeout;

    let stdout = Capture::start(child.stdout.take());
    let stderr = Capture::start(child.stderr.take());

    let termination = process::wait_for_exit(&mut child, deadline, cancel).await;
    if termination.needs_kill() {
        warn!(run_id, ?termination, "Killing tool process tree");
        process::terminate(&mut child).await;
    }

    let stdout = stdout.finish(DRAIN_GRACE).await;
    let stderr = stderr.finish(DRAIN_GRACE).await;

    Outcome::from_termination(merge_output(stdout, &stderr), &termination)
}

/// Stdout, then a delimited stderr section when stderr is non-empty
fn merge_output(stdout: String, stderr: &str) -> String {
    if stderr.is_empty() {
        stdout
    } else {
        format!("{stdout}{STDERR_DELIMITER}{stderr}")
    }
}
