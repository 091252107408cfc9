//! Subprocess spawning, termination and exit classification

use nser_replay::{RunStatus, ABANDONED_EXIT_CODE};
use std::path::Path;
use std::process::{ExitStatus, Stdio};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// How long pipes may stay open once the process exited or was killed.
///
/// A backgrounded grandchild can hold a pipe open after the tool itself
/// is gone; its output past this point is not captured.
pub(crate) const DRAIN_GRACE: Duration = Duration::from_secs(2);

/// How a supervised process ended
#[derive(Debug)]
pub(crate) enum Termination {
    /// Process exited on its own
    Exited(ExitStatus),
    /// Deadline elapsed and the process tree was killed
    TimedOut,
    /// Caller cancelled and the process tree was killed
    Cancelled,
    /// Waiting on the process failed
    WaitFailed(String),
}

impl Termination {
    /// Wrap the result of waiting on the process
    pub(crate) fn from_wait(status: std::io::Result<ExitStatus>) -> Self {
        match status {
            Ok(status) => Self::Exited(status),
            Err(e) => Self::WaitFailed(e.to_string()),
        }
    }

    /// Map the outcome to a run status and exit code.
    ///
    /// Any non-zero exit is `failed`. Without an observable exit code
    /// (signal, kill, wait error) the code is `-1`.
    pub(crate) fn classify(&self) -> (RunStatus, i32) {
        match self {
            Self::Exited(status) => match status.code() {
                Some(0) => (RunStatus::Completed, 0),
                Some(code) => (RunStatus::Failed, code),
                None => (RunStatus::Failed, ABANDONED_EXIT_CODE),
            },
            Self::TimedOut | Self::Cancelled | Self::WaitFailed(_) => {
                (RunStatus::Failed, ABANDONED_EXIT_CODE)
            }
        }
    }

    /// Whether the process tree still has to be killed
    pub(crate) fn needs_kill(&self) -> bool {
        !matches!(self, Self::Exited(_))
    }
}

/// Build a command for `path args...` with stdin closed.
///
/// On Unix the child leads its own process group so the whole tree can
/// be signalled at once.
pub(crate) fn command(path: &Path, args: &[String]) -> Command {
    let mut cmd = Command::new(path);
    cmd.args(args).stdin(Stdio::null()).kill_on_drop(true);
    #[cfg(unix)]
    cmd.process_group(0);
    cmd
}

/// Wait for `child` to exit, the deadline to pass, or the caller to cancel
pub(crate) async fn wait_for_exit(
    child: &mut Child,
    deadline: Instant,
    cancel: &CancellationToken,
) -> Termination {
    tokio::select! {
        status = child.wait() => Termination::from_wait(status),
        () = tokio::time::sleep_until(deadline) => Termination::TimedOut,
        () = cancel.cancelled() => Termination::Cancelled,
    }
}

/// Kill the process tree of `child` and reap it.
pub(crate) async fn terminate(child: &mut Child) {
    if let Some(pid) = child.id() {
        kill_tree(pid);
    }
    if let Err(e) = child.start_kill() {
        debug!(error = %e, "Direct kill after tree kill failed");
    }
    if let Err(e) = child.wait().await {
        warn!(error = %e, "Failed to reap killed process");
    }
}

#[cfg(unix)]
fn kill_tree(pid: u32) {
    use nix::sys::signal::{killpg, Signal};
    use nix::unistd::Pid;

    let Ok(raw) = i32::try_from(pid) else {
        return;
    };
    if let Err(e) = killpg(Pid::from_raw(raw), Signal::SIGKILL) {
        debug!(pid, error = %e, "killpg failed");
    }
}

#[cfg(windows)]
fn kill_tree(pid: u32) {
    let result = std::process::Command::new("taskkill")
        .args(["/T", "/F", "/PID", &pid.to_string()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();
    if let Err(e) = result {
        debug!(pid, error = %e, "taskkill failed");
    }
}

#[cfg(not(any(unix, windows)))]
fn kill_tree(_pid: u32) {}

/// Background reader that keeps what it read even if it is cut short
pub(crate) struct Capture {
    buf: Arc<Mutex<Vec<u8>>>,
    task: JoinHandle<()>,
}

impl Capture {
    /// Start draining `reader` on its own task
    pub(crate) fn start<R>(reader: Option<R>) -> Self
    where
        R: AsyncRead + Unpin + Send + 'static,
    {
        let buf = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&buf);
        let task = tokio::spawn(async move {
            let Some(mut reader) = reader else {
                return;
            };
            let mut chunk = [0u8; 8192];
            loop {
                match reader.read(&mut chunk).await {
                    Ok(0) => break,
                    Ok(n) => sink
                        .lock()
                        .unwrap_or_else(|e| e.into_inner())
                        .extend_from_slice(&chunk[..n]),
                    Err(e) => {
                        debug!(error = %e, "Pipe read failed");
                        break;
                    }
                }
            }
        });
        Self { buf, task }
    }

    /// Wait up to `grace` for EOF, then return everything read so far
    pub(crate) async fn finish(self, grace: Duration) -> String {
        let Self { buf, mut task } = self;
        if tokio::time::timeout(grace, &mut task).await.is_err() {
            debug!("Pipe still open after grace period, abandoning reader");
            task.abort();
        }
        let bytes = std::mem::take(&mut *buf.lock().unwrap_or_else(|e| e.into_inner()));
        String::from_utf8_lossy(&bytes).into_owned()
    }
}

/// Strip one trailing `\n` and an optional `\r` before it
pub(crate) fn trim_line_ending(mut line: Vec<u8>) -> String {
    if line.last() == Some(&b'\n') {
        line.pop();
        if line.last() == Some(&b'\r') {
            line.pop();
        }
    }
    String::from_utf8_lossy(&line).into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trim_line_ending() {
        assert_eq!(trim_line_ending(b"abc\n".to_vec()), "abc");
        assert_eq!(trim_line_ending(b"abc\r\n".to_vec()), "abc");
        assert_eq!(trim_line_ending(b"abc".to_vec()), "abc");
        assert_eq!(trim_line_ending(b"\n".to_vec()), "");
    }

    #[test]
    fn test_killed_runs_classify_as_failed() {
        for term in [Termination::TimedOut, Termination::Cancelled] {
            assert!(term.needs_kill());
            assert_eq!(term.classify(), (RunStatus::Failed, ABANDONED_EXIT_CODE));
        }
        let term = Termination::WaitFailed("gone".to_string());
        assert!(term.needs_kill());
        assert_eq!(term.classify(), (RunStatus::Failed, -1));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_exit_codes_classify() {
        for (script, expected) in [
            ("exit 0", (RunStatus::Completed, 0)),
            ("exit 1", (RunStatus::Failed, 1)),
            ("exit 7", (RunStatus::Failed, 7)),
            ("kill -9 $$", (RunStatus::Failed, -1)),
        ] {
            let status = tokio::process::Command::new("sh")
                .args(["-c", script])
                .status()
                .await
                .unwrap();
            assert_eq!(Termination::Exited(status).classify(), expected, "{script}");
        }
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_terminate_kills_process_group() {
        let args = vec!["-c".to_string(), "sleep 30 & sleep 30; wait".to_string()];
        let mut child = command(Path::new("sh"), &args)
            .stdout(Stdio::piped())
            .spawn()
            .unwrap();
        let capture = Capture::start(child.stdout.take());

        terminate(&mut child).await;

        // The background sleep held the pipe too; EOF proves it died with the group
        let started = std::time::Instant::now();
        let output = capture.finish(Duration::from_secs(5)).await;
        assert!(output.is_empty());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
