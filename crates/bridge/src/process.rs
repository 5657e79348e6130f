//! Bounded interpreter runs.
//!
//! A run spawns `<interpreter> [args..] -c <script>` inside the working
//! directory, drains stdout and stderr on reader threads, and polls the child
//! until it exits or the deadline passes. On timeout the child is killed and
//! reaped; its reader threads are left to finish on their own.
//!
//! The same deadline bounds collecting the streams. A background process
//! started by the script can keep a pipe open after the interpreter exits;
//! the run then fails at the deadline instead of waiting for it.

use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use pickles_core::{ConversionError, ExternalInvocationResult, Result};
use tracing::{debug, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

type Reader = Receiver<std::io::Result<Vec<u8>>>;

/// Launches scripts through one interpreter.
#[derive(Debug, Clone)]
pub struct ScriptRunner {
    interpreter: String,
    interpreter_args: Vec<String>,
    cwd: PathBuf,
    timeout: Duration,
}

impl ScriptRunner {
    /// Create a runner.
    pub fn new(
        interpreter: impl Into<String>,
        interpreter_args: Vec<String>,
        cwd: impl Into<PathBuf>,
        timeout: Duration,
    ) -> Self {
        Self {
            interpreter: interpreter.into(),
            interpreter_args,
            cwd: cwd.into(),
            timeout,
        }
    }

    /// Interpreter program name.
    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }

    /// Directory the child runs in.
    pub fn cwd(&self) -> &Path {
        &self.cwd
    }

    /// Run `script` and capture its streams.
    ///
    /// A non-zero exit status is returned as a value, not an error; use
    /// [`require_success`] to enforce it.
    ///
    /// # Errors
    ///
    /// `ExternalProcessFailure` when the interpreter cannot be spawned, when
    /// it is killed by a signal, or when it outlives the timeout.
    pub fn run(&self, script: &str) -> Result<ExternalInvocationResult> {
        debug!(
            target: "pickles::bridge",
            interpreter = %self.interpreter,
            cwd = ?self.cwd,
            script_len = script.len(),
            "Launching interpreter"
        );

        let mut child = Command::new(&self.interpreter)
            .args(&self.interpreter_args)
            .arg("-c")
            .arg(script)
            .current_dir(&self.cwd)
            .env("PYTHONIOENCODING", "utf-8")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| {
                ConversionError::external(format!(
                    "failed to launch '{}': {}",
                    self.interpreter, e
                ))
            })?;

        let deadline = Instant::now() + self.timeout;
        let stdout = spawn_reader(child.stdout.take());
        let stderr = spawn_reader(child.stderr.take());

        let status = self.wait_bounded(&mut child, deadline)?;

        let stdout = self.collect_reader(&stdout, "stdout", deadline)?;
        let stderr = self.collect_reader(&stderr, "stderr", deadline)?;

        match status.code() {
            Some(exit_status) => {
                debug!(
                    target: "pickles::bridge",
                    exit_status,
                    stdout_len = stdout.len(),
                    stderr_len = stderr.len(),
                    "Interpreter exited"
                );
                Ok(ExternalInvocationResult {
                    exit_status,
                    stdout,
                    stderr,
                })
            }
            None => {
                warn!(target: "pickles::bridge", status = %status, "Interpreter terminated abnormally");
                Err(ConversionError::external(format!(
                    "'{}' terminated abnormally ({}): {}",
                    self.interpreter,
                    status,
                    String::from_utf8_lossy(&stderr)
                )))
            }
        }
    }

    fn wait_bounded(
        &self,
        child: &mut Child,
        deadline: Instant,
    ) -> Result<std::process::ExitStatus> {
        loop {
            match child.try_wait() {
                Ok(Some(status)) => return Ok(status),
                Ok(None) if Instant::now() >= deadline => {
                    let _ = child.kill();
                    let _ = child.wait();
                    warn!(
                        target: "pickles::bridge",
                        timeout_ms = self.timeout.as_millis() as u64,
                        "Interpreter timed out and was killed"
                    );
                    return Err(ConversionError::external(format!(
                        "'{}' timed out after {} ms",
                        self.interpreter,
                        self.timeout.as_millis()
                    )));
                }
                Ok(None) => thread::sleep(POLL_INTERVAL),
                Err(e) => {
                    let _ = child.kill();
                    let _ = child.wait();
                    return Err(ConversionError::external(format!(
                        "failed waiting for '{}': {}",
                        self.interpreter, e
                    )));
                }
            }
        }
    }

    fn collect_reader(&self, reader: &Reader, name: &str, deadline: Instant) -> Result<Vec<u8>> {
        let remaining = deadline.saturating_duration_since(Instant::now());
        match reader.recv_timeout(remaining) {
            Ok(Ok(buf)) => Ok(buf),
            Ok(Err(e)) => Err(ConversionError::external(format!(
                "failed to read interpreter {}: {}",
                name, e
            ))),
            Err(RecvTimeoutError::Timeout) => {
                warn!(
                    target: "pickles::bridge",
                    stream = name,
                    timeout_ms = self.timeout.as_millis() as u64,
                    "Interpreter output still open at the deadline"
                );
                Err(ConversionError::external(format!(
                    "'{}' timed out after {} ms: {} was held open after exit",
                    self.interpreter,
                    self.timeout.as_millis(),
                    name
                )))
            }
            Err(RecvTimeoutError::Disconnected) => Err(ConversionError::external(format!(
                "reader thread for interpreter {} panicked",
                name
            ))),
        }
    }
}

/// Turn a non-zero exit into `ExternalProcessFailure` carrying stderr verbatim.
pub fn require_success(
    result: ExternalInvocationResult,
    interpreter: &str,
) -> Result<ExternalInvocationResult> {
    if result.success() {
        return Ok(result);
    }
    warn!(
        target: "pickles::bridge",
        exit_status = result.exit_status,
        "Interpreter exited with failure"
    );
    Err(ConversionError::external(format!(
        "'{}' exited with status {}: {}",
        interpreter,
        result.exit_status,
        result.stderr_lossy()
    )))
}

fn spawn_reader<R: Read + Send + 'static>(stream: Option<R>) -> Reader {
    let (tx, rx) = mpsc::channel();
    thread::spawn(move || {
        let mut buf = Vec::new();
        let result = match stream {
            Some(mut stream) => stream.read_to_end(&mut buf).map(|_| buf),
            None => Ok(buf),
        };
        // The receiver is gone when the run already gave up on this stream.
        let _ = tx.send(result);
    });
    rx
}
