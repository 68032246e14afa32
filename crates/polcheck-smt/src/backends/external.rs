use std::io::{Read, Write};
use std::path::Path;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use tempfile::NamedTempFile;
use wait_timeout::ChildExt;

use crate::script::SmtScript;
use crate::solver::{parse_verdict, SolverBackend, SolverError, Verdict};

/// Solver executable used when none is configured.
pub const DEFAULT_SOLVER_COMMAND: &str = "z3";

/// Wall-clock deadline for one solver invocation.
pub const DEFAULT_SOLVER_TIMEOUT: Duration = Duration::from_secs(10);

const REAP_TIMEOUT: Duration = Duration::from_secs(2);

/// Runs scripts through an SMT-LIB2 solver executable, one process per
/// script: `<command> -smt2 <artifact>`.
#[derive(Debug, Clone)]
pub struct ExternalSolver {
    command: String,
    timeout: Duration,
}

impl Default for ExternalSolver {
    fn default() -> Self {
        Self::new(DEFAULT_SOLVER_COMMAND)
    }
}

impl ExternalSolver {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            timeout: DEFAULT_SOLVER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn command(&self) -> &str {
        &self.command
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    fn write_artifact(script: &SmtScript) -> Result<NamedTempFile, SolverError> {
        let mut artifact = tempfile::Builder::new()
            .prefix("polcheck-")
            .suffix(".smt2")
            .tempfile()?;
        artifact.write_all(script.to_smtlib().as_bytes())?;
        artifact.flush()?;
        Ok(artifact)
    }

    fn run_on_file(&self, path: &Path) -> Result<Verdict, SolverError> {
        let deadline = Instant::now() + self.timeout;
        let mut child = Command::new(&self.command)
            .arg("-smt2")
            .arg(path)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| SolverError::Launch {
                command: self.command.clone(),
                source,
            })?;

        // Drain both pipes concurrently so a chatty solver cannot block on a
        // full pipe while we wait for it to exit.
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        match child.wait_timeout(self.timeout) {
            Ok(Some(status)) => {
                // A background process started by the solver can keep the
                // pipes open after it exits; the deadline covers that too.
                match (recv_before(&stdout, deadline), recv_before(&stderr, deadline)) {
                    (Some(stdout), Some(stderr)) => {
                        tracing::debug!(
                            solver = %self.command,
                            %status,
                            stdout_bytes = stdout.len(),
                            "solver exited"
                        );
                        parse_verdict(&stdout, &stderr)
                    }
                    _ => {
                        tracing::warn!(
                            solver = %self.command,
                            timeout_secs = self.timeout.as_secs_f64(),
                            "solver output still open at the deadline"
                        );
                        Err(self.timeout_error())
                    }
                }
            }
            Ok(None) => {
                // Reader threads are detached: a surviving grandchild may still
                // hold the pipes open.
                reap(&mut child);
                tracing::warn!(
                    solver = %self.command,
                    timeout_secs = self.timeout.as_secs_f64(),
                    "solver timed out"
                );
                Err(self.timeout_error())
            }
            Err(e) => {
                reap(&mut child);
                Err(SolverError::Io(e))
            }
        }
    }

    fn timeout_error(&self) -> SolverError {
        SolverError::Timeout {
            command: self.command.clone(),
            timeout: self.timeout,
        }
    }
}

impl SolverBackend for ExternalSolver {
    fn name(&self) -> &str {
        &self.command
    }

    fn solve(&self, script: &SmtScript) -> Result<Verdict, SolverError> {
        // The artifact is removed when `artifact` drops, on every return path.
        let artifact = Self::write_artifact(script)?;
        tracing::debug!(artifact = %artifact.path().display(), "wrote solver artifact");
        self.run_on_file(artifact.path())
    }
}

/// Read `pipe` to the end on its own thread. The receiver yields the text
/// once the write side closes; a missing pipe yields an empty string.
fn spawn_reader<R>(pipe: Option<R>) -> Receiver<String>
where
    R: Read + Send + 'static,
{
    let (tx, rx) = mpsc::channel();
    match pipe {
        Some(mut pipe) => {
            thread::spawn(move || {
                let mut buf = Vec::new();
                let _ = pipe.read_to_end(&mut buf);
                let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
            });
        }
        None => {
            let _ = tx.send(String::new());
        }
    }
    rx
}

/// `None` when the reader is still blocked at `deadline`.
fn recv_before(rx: &Receiver<String>, deadline: Instant) -> Option<String> {
    match rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
        Ok(text) => Some(text),
        Err(RecvTimeoutError::Timeout) => None,
        Err(RecvTimeoutError::Disconnected) => Some(String::new()),
    }
}

/// Kill `child` and wait a bounded time for it to be reaped.
fn reap(child: &mut Child) {
    let _ = child.kill();
    match child.wait_timeout(REAP_TIMEOUT) {
        Ok(Some(_)) | Err(_) => {}
        Ok(None) => tracing::warn!(pid = child.id(), "solver process could not be reaped"),
    }
}
