//! Streaming execution task

use super::process::{self, trim_line_ending, Termination, DRAIN_GRACE};
use super::{Outcome, PreparedRun, RunnerConfig};
use crate::events::{EventSink, ToolEvent};
use nser_replay::RunStoreTrait;
use std::io::{BufRead, BufReader, PipeReader};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Background half of a streaming run
pub(super) struct StreamTask {
    pub(super) run_id: i64,
    pub(super) prepared: PreparedRun,
    pub(super) store: Arc<dyn RunStoreTrait>,
    pub(super) events: Arc<dyn EventSink>,
    pub(super) config: RunnerConfig,
    pub(super) cancel: CancellationToken,
}

impl StreamTask {
    pub(super) async fn run(self) {
        let started = Instant::now();
        let outcome = self.execute().await;

        // Finalization does not observe the cancellation token
        if let Err(e) = self
            .store
            .finalize(self.run_id, &outcome.output, outcome.status, outcome.exit_code)
            .await
        {
            error!(run_id = self.run_id, error = %e, "Failed to finalize streaming run");
        }

        let result = outcome.into_result(&self.prepared, self.run_id, started.elapsed());
        info!(
            run_id = self.run_id,
            status = %result.status,
            exit_code = result.exit_code,
            duration_ms = result.duration_ms,
            "Streaming tool run finished"
        );
        self.events.publish(ToolEvent::Done(result));
    }

    async fn execute(&self) -> Outcome {
        let (reader, writer) = match std::io::pipe() {
            Ok(pair) => pair,
            Err(e) => return self.start_failed("pipe", &e),
        };
        let stderr_writer = match writer.try_clone() {
            Ok(w) => w,
            Err(e) => return self.start_failed("pipe", &e),
        };

        // Both streams share one pipe so lines interleave as written
        let mut cmd = process::command(&self.prepared.path, &self.prepared.args);
        cmd.stdout(writer).stderr(stderr_writer);
        let spawned = cmd.spawn();
        // Close our copies of the write end so EOF is seen when the tool exits
        drop(cmd);

        let mut child = match spawned {
            Ok(child) => child,
            Err(e) => return self.start_failed("start", &e),
        };
        let deadline = Instant::now() + self.config.timeout;

        let (tx, mut lines) = mpsc::channel(self.config.output_channel_capacity.max(1));
        tokio::task::spawn_blocking(move || read_lines(reader, tx));

        let mut output = String::new();
        let mut ended = None;
        loop {
            tokio::select! {
                line = lines.recv() => match line {
                    Some(line) => self.emit_line(line, &mut output),
                    None => break,
                },
                // A backgrounded grandchild may hold the pipe open after the
                // tool itself exited
                status = child.wait() => {
                    ended = Some(Termination::from_wait(status));
                    break;
                }
                () = tokio::time::sleep_until(deadline) => {
                    ended = Some(Termination::TimedOut);
                    break;
                }
                () = self.cancel.cancelled() => {
                    ended = Some(Termination::Cancelled);
                    break;
                }
            }
        }

        let termination = match ended {
            Some(termination) => termination,
            None => process::wait_for_exit(&mut child, deadline, &self.cancel).await,
        };

        if termination.needs_kill() {
            warn!(run_id = self.run_id, ?termination, "Killing tool process tree");
            process::terminate(&mut child).await;
        }

        let drain_until = Instant::now() + DRAIN_GRACE;
        while let Ok(Some(line)) = tokio::time::timeout_at(drain_until, lines.recv()).await {
            self.emit_line(line, &mut output);
        }

        Outcome::from_termination(output, &termination)
    }

    fn emit_line(&self, line: String, output: &mut String) {
        output.push_str(&line);
        output.push('\n');
        self.events.publish(ToolEvent::Output {
            run_id: self.run_id,
            line,
        });
    }

    fn start_failed(&self, kind: &str, err: &std::io::Error) -> Outcome {
        warn!(run_id = self.run_id, error = %err, "Failed to start tool");
        Outcome::start_error(kind, err)
    }
}

/// Forward complete lines from the merged pipe until EOF or the receiver closes
fn read_lines(reader: PipeReader, tx: mpsc::Sender<String>) {
    let mut reader = BufReader::new(reader);
    loop {
        let mut buf = Vec::new();
        match reader.read_until(b'\n', &mut buf) {
            Ok(0) => break,
            Ok(_) => {
                if tx.blocking_send(trim_line_ending(buf)).is_err() {
                    break;
                }
            }
            Err(e) => {
                debug!(error = %e, "Output pipe read failed");
                break;
            }
        }
    }
}
