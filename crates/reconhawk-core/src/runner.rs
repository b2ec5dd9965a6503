//! External engine execution.

use crate::error::RunnerError;
use crate::stage::StageConfig;
use async_trait::async_trait;
use std::process::{ExitStatus, Stdio};
use std::time::{Duration, Instant};
use tokio::io::{AsyncRead, AsyncReadExt};
use tokio::process::{Child, Command};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Result of a stage execution.
#[derive(Debug, Clone)]
pub struct StageResult {
    /// Stage name.
    pub stage_name: String,

    /// Exit code (0 = success, -1 when terminated by a signal).
    pub exit_code: i32,

    /// Captured stdout.
    pub stdout: String,

    /// Captured stderr.
    pub stderr: String,

    /// Duration in milliseconds.
    pub duration_ms: u64,

    /// Whether execution succeeded.
    pub success: bool,
}

impl StageResult {
    /// Whether this stage passed (exit code 0).
    pub fn passed(&self) -> bool {
        self.success && self.exit_code == 0
    }
}

/// Runs one stage to completion.
///
/// Implementations report a nonzero exit as an ordinary [`StageResult`];
/// only failures to run at all surface as [`RunnerError`].
#[async_trait]
pub trait CommandRunner: Send + Sync {
    async fn execute(
        &self,
        config: &StageConfig,
        cancel: &CancellationToken,
    ) -> Result<StageResult, RunnerError>;
}

/// Runner backed by real child processes.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

/// How long output is still read after the engine exits. A background process
/// that inherited the pipes can otherwise keep them open indefinitely.
const OUTPUT_GRACE: Duration = Duration::from_secs(2);

type Captured = (ExitStatus, Vec<u8>, Vec<u8>);

enum Waited {
    Finished(std::io::Result<Captured>),
    TimedOut(Duration),
    Cancelled,
}

#[async_trait]
impl CommandRunner for ProcessRunner {
    async fn execute(
        &self,
        config: &StageConfig,
        cancel: &CancellationToken,
    ) -> Result<StageResult, RunnerError> {
        let start = Instant::now();

        let (exe, args) = config
            .command
            .split_first()
            .ok_or_else(|| RunnerError::EmptyCommand {
                stage: config.name.clone(),
            })?;

        let stdin = match &config.stdin {
            Some(path) => {
                let file = std::fs::File::open(path).map_err(|source| RunnerError::Io {
                    stage: config.name.clone(),
                    source,
                })?;
                Stdio::from(file)
            }
            None => Stdio::null(),
        };

        debug!(stage = %config.name, command = ?config.command, "Spawning engine");
        let mut child = Command::new(exe)
            .args(args)
            .stdin(stdin)
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| RunnerError::Spawn {
                program: exe.clone(),
                source,
            })?;

        let stop_reading = CancellationToken::new();
        let stdout_task = tokio::spawn(drain(child.stdout.take(), stop_reading.clone()));
        let stderr_task = tokio::spawn(drain(child.stderr.take(), stop_reading.clone()));

        // The deadline and the cancel path cover the output drain as well as
        // the exit, so nothing after spawn can wait unbounded.
        let waited = tokio::select! {
            finished = finish(&mut child, stdout_task, stderr_task, &stop_reading) => {
                Waited::Finished(finished)
            }
            timeout = deadline(config.timeout) => Waited::TimedOut(timeout),
            _ = cancel.cancelled() => Waited::Cancelled,
        };
        stop_reading.cancel();

        let (status, stdout, stderr) = match waited {
            Waited::Finished(finished) => finished.map_err(|source| RunnerError::Io {
                stage: config.name.clone(),
                source,
            })?,
            Waited::TimedOut(timeout) => {
                reap(&mut child, &config.name).await;
                return Err(RunnerError::TimedOut {
                    stage: config.name.clone(),
                    timeout,
                });
            }
            Waited::Cancelled => {
                reap(&mut child, &config.name).await;
                return Err(RunnerError::Cancelled {
                    stage: config.name.clone(),
                });
            }
        };

        let duration_ms = start.elapsed().as_millis() as u64;
        let exit_code = status.code().unwrap_or(-1);
        debug!(stage = %config.name, exit_code, duration_ms, "Engine exited");

        Ok(StageResult {
            stage_name: config.name.clone(),
            exit_code,
            stdout: String::from_utf8_lossy(&stdout).into_owned(),
            stderr: String::from_utf8_lossy(&stderr).into_owned(),
            duration_ms,
            success: status.success(),
        })
    }
}

/// Wait for exit, then collect output for at most [`OUTPUT_GRACE`].
async fn finish(
    child: &mut Child,
    stdout: JoinHandle<Vec<u8>>,
    stderr: JoinHandle<Vec<u8>>,
    stop_reading: &CancellationToken,
) -> std::io::Result<Captured> {
    let status = child.wait().await?;

    let output = async {
        let (stdout, stderr) = tokio::join!(stdout, stderr);
        (stdout.unwrap_or_default(), stderr.unwrap_or_default())
    };
    tokio::pin!(output);

    let (stdout, stderr) = tokio::select! {
        captured = &mut output => captured,
        _ = tokio::time::sleep(OUTPUT_GRACE) => {
            debug!("Engine exited but its output pipes are still open");
            stop_reading.cancel();
            output.await
        }
    };
    Ok((status, stdout, stderr))
}

/// Resolves once `timeout` has elapsed; never resolves without one.
async fn deadline(timeout: Option<Duration>) -> Duration {
    match timeout {
        Some(timeout) => {
            tokio::time::sleep(timeout).await;
            timeout
        }
        None => std::future::pending().await,
    }
}

/// Read until EOF or until `stop` fires, keeping whatever arrived.
async fn drain<R: AsyncRead + Unpin>(reader: Option<R>, stop: CancellationToken) -> Vec<u8> {
    let mut buf = Vec::new();
    let Some(mut reader) = reader else {
        return buf;
    };

    let mut chunk = [0u8; 8192];
    loop {
        tokio::select! {
            read = reader.read(&mut chunk) => match read {
                Ok(0) => break,
                Ok(n) => buf.extend_from_slice(&chunk[..n]),
                Err(e) => {
                    debug!(error = %e, "Stopped reading child output");
                    break;
                }
            },
            _ = stop.cancelled() => break,
        }
    }
    buf
}

/// Kill the child and wait for it, so nothing is still writing once we return.
async fn reap(child: &mut Child, stage: &str) {
    // The engine itself may already be gone while its pipes are still held.
    if let Ok(Some(_)) = child.try_wait() {
        return;
    }
    if let Err(e) = child.kill().await {
        warn!(stage, error = %e, "Failed to kill engine");
    }
}
