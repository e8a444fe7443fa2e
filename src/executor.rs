//! Runs a submitted program in a fresh child process with a wall-clock deadline.
//!
//! Each call writes the source to its own uniquely named temp file, starts the
//! configured interpreter on it, and captures stdout/stderr. The temp file is
//! owned by a `NamedTempFile` guard, so it is removed on every exit path
//! (normal exit, launch failure, timeout, or panic).
//!
//! Isolation is the OS process boundary plus the deadline. Nothing limits
//! memory, CPU, filesystem or network access; callers surface
//! [`UNSAFE_WARNING`] to the user instead.

use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use serde::Serialize;
use thiserror::Error;
use tokio::process::Command;
use tracing::{debug, error, instrument, warn};
use uuid::Uuid;

use crate::config::ExecutorCfg;
use crate::util::trunc_for_log;

/// Placed in stderr when the deadline fires. Any partial output is discarded.
pub const TIMEOUT_MESSAGE: &str = "Execution timed out.";

/// Standing warning shown next to every run.
pub const UNSAFE_WARNING: &str = "This executes Python code on your machine. Avoid untrusted code.";

/// Prefix for stderr text when the child could not be started at all.
pub const LAUNCH_FAILURE_PREFIX: &str = "Execution failed to start: ";

const SOURCE_PREFIX: &str = "lesson-run-";
const SOURCE_SUFFIX: &str = ".py";

#[derive(Debug, Error)]
pub enum ExecError {
  #[error("could not write temporary source file: {0}")]
  TempFile(#[source] std::io::Error),
  #[error("could not start `{program}`: {source}")]
  Launch { program: String, source: std::io::Error },
  #[error("failed while waiting for the child process: {0}")]
  Wait(#[source] std::io::Error),
}

/// Captured output of one execution.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionResult {
  pub stdout: String,
  pub stderr: String,
  pub timed_out: bool,
  /// The interpreter never ran (temp file or spawn failure). Stderr holds the reason.
  pub launch_failed: bool,
}

impl ExecutionResult {
  fn timed_out() -> Self {
    Self { stdout: String::new(), stderr: TIMEOUT_MESSAGE.into(), timed_out: true, launch_failed: false }
  }

  fn launch_failed(e: &ExecError) -> Self {
    Self { stdout: String::new(), stderr: format!("{LAUNCH_FAILURE_PREFIX}{e}"), timed_out: false, launch_failed: true }
  }
}

#[derive(Clone, Debug)]
pub struct Executor {
  interpreter: String,
  interpreter_args: Vec<String>,
  default_timeout: Duration,
  max_timeout: Duration,
  scratch_dir: Option<PathBuf>,
}

impl Executor {
  #[cfg(test)]
  pub fn new(interpreter: impl Into<String>) -> Self {
    Self::from_config(&ExecutorCfg { interpreter: interpreter.into(), ..ExecutorCfg::default() })
  }

  pub fn from_config(cfg: &ExecutorCfg) -> Self {
    let default_timeout = Duration::from_secs(cfg.default_timeout_secs.max(1));
    Self {
      interpreter: cfg.interpreter.clone(),
      interpreter_args: cfg.interpreter_args.clone(),
      default_timeout,
      max_timeout: Duration::from_secs(cfg.max_timeout_secs).max(default_timeout),
      scratch_dir: cfg.scratch_dir.clone(),
    }
  }

  /// Create temp artifacts under `dir` instead of the system temp dir.
  #[cfg(test)]
  pub fn with_scratch_dir(mut self, dir: impl AsRef<Path>) -> Self {
    self.scratch_dir = Some(dir.as_ref().to_path_buf());
    self
  }

  pub fn interpreter(&self) -> &str {
    &self.interpreter
  }

  pub fn default_timeout(&self) -> Duration {
    self.default_timeout
  }

  /// Caller-requested timeout in whole seconds, clamped to `1..=max`. `None` means the default.
  pub fn clamp_timeout(&self, requested_secs: Option<u64>) -> Duration {
    match requested_secs {
      Some(s) => Duration::from_secs(s.max(1)).min(self.max_timeout),
      None => self.default_timeout,
    }
  }

  /// Run `code` and always return a result. Infrastructure failures are logged
  /// and folded into stderr with `launch_failed` set.
  pub async fn run(&self, code: &str, timeout: Option<Duration>) -> ExecutionResult {
    let timeout = timeout.unwrap_or(self.default_timeout);
    match self.try_run(code, timeout).await {
      Ok(res) => res,
      Err(e) => {
        error!(target: "executor", interpreter = %self.interpreter, error = %e, "Execution could not be carried out");
        ExecutionResult::launch_failed(&e)
      }
    }
  }

  /// Single attempt, no retries. A timeout is a normal result, not an error.
  #[instrument(level = "debug", skip(self, code), fields(run_id = %Uuid::new_v4(), code_len = code.len(), timeout_ms = timeout.as_millis() as u64))]
  pub async fn try_run(&self, code: &str, timeout: Duration) -> Result<ExecutionResult, ExecError> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(SOURCE_PREFIX).suffix(SOURCE_SUFFIX);
    let mut source = match &self.scratch_dir {
      Some(dir) => builder.tempfile_in(dir),
      None => builder.tempfile(),
    }
    .map_err(ExecError::TempFile)?;
    source
      .write_all(code.as_bytes())
      .and_then(|_| source.flush())
      .map_err(ExecError::TempFile)?;

    let outcome = self.spawn_and_wait(source.path(), timeout).await;

    let path = source.path().to_path_buf();
    if let Err(e) = source.close() {
      warn!(target: "executor", path = %path.display(), error = %e, "Failed to remove temporary source file");
    }
    outcome
  }

  async fn spawn_and_wait(&self, path: &Path, timeout: Duration) -> Result<ExecutionResult, ExecError> {
    let mut cmd = Command::new(&self.interpreter);
    cmd.args(&self.interpreter_args)
      .arg(path)
      .stdin(Stdio::null())
      .stdout(Stdio::piped())
      .stderr(Stdio::piped())
      // Dropping the wait future on timeout kills the child.
      .kill_on_drop(true);

    let child = cmd
      .spawn()
      .map_err(|source| ExecError::Launch { program: self.interpreter.clone(), source })?;

    let started = Instant::now();
    match tokio::time::timeout(timeout, child.wait_with_output()).await {
      Ok(Ok(output)) => {
        let res = ExecutionResult {
          stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
          stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
          timed_out: false,
          launch_failed: false,
        };
        debug!(
          target: "executor",
          status = ?output.status.code(),
          elapsed_ms = started.elapsed().as_millis() as u64,
          stdout_len = res.stdout.len(),
          stderr = %trunc_for_log(&res.stderr, 200),
          "Child exited"
        );
        Ok(res)
      }
      Ok(Err(e)) => Err(ExecError::Wait(e)),
      Err(_) => {
        warn!(target: "executor", timeout_ms = timeout.as_millis() as u64, "Child exceeded deadline; killed");
        Ok(ExecutionResult::timed_out())
      }
    }
  }
}
