//! Runs pipeline shell scripts with a timeout and captured output

use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use wait_timeout::ChildExt;

/// Timeout for collecting output from child process pipes
const OUTPUT_COLLECTION_TIMEOUT: Duration = Duration::from_secs(10);

/// Maximum captured output per stream (10MB)
const MAX_OUTPUT_SIZE: usize = 10 * 1024 * 1024;

/// Outcome of one script invocation
#[derive(Debug, Clone)]
pub struct ScriptResult {
    pub script: PathBuf,
    pub arg: String,
    pub success: bool,
    pub stdout: String,
    pub stderr: String,
    pub exit_code: Option<i32>,
    pub duration: Duration,
    pub timed_out: bool,
}

impl ScriptResult {
    pub fn summary(&self) -> String {
        let status = if self.timed_out {
            "TIMEOUT"
        } else if self.success {
            "OK"
        } else {
            "FAILED"
        };
        format!(
            "{status} - {} {} ({}s, exit code: {:?})",
            self.script.display(),
            self.arg,
            self.duration.as_secs(),
            self.exit_code
        )
    }
}

/// Invokes a pipeline script with a single argument
pub trait ScriptRunner {
    fn run(&self, script: &Path, arg: &str) -> Result<ScriptResult>;
}

/// Spawns scripts as child processes, killing them after `timeout`
pub struct ProcessRunner {
    timeout: Duration,
}

impl ProcessRunner {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout }
    }
}

impl ScriptRunner for ProcessRunner {
    fn run(&self, script: &Path, arg: &str) -> Result<ScriptResult> {
        info!(script = %script.display(), arg, "running");
        let start = Instant::now();
        let mut child = spawn_script(script, arg)?;

        // Drain the pipes while waiting, a full pipe buffer would block the child
        let stdout_rx = collect(child.stdout.take());
        let stderr_rx = collect(child.stderr.take());

        let wait_result = child
            .wait_timeout(self.timeout)
            .with_context(|| format!("Failed to wait for {}", script.display()))?;
        let duration = start.elapsed();

        if wait_result.is_none() {
            kill_child_process(&mut child);
        }

        let stdout = stdout_rx
            .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
            .unwrap_or_else(|_| "[output collection timed out]".to_string());
        let stderr = stderr_rx
            .recv_timeout(OUTPUT_COLLECTION_TIMEOUT)
            .unwrap_or_else(|_| "[output collection timed out]".to_string());
        debug!(script = %script.display(), stdout_len = stdout.len(), stderr_len = stderr.len(), "collected output");

        let result = match wait_result {
            Some(status) => ScriptResult {
                script: script.to_path_buf(),
                arg: arg.to_string(),
                success: status.success(),
                stdout,
                stderr,
                exit_code: status.code(),
                duration,
                timed_out: false,
            },
            None => ScriptResult {
                script: script.to_path_buf(),
                arg: arg.to_string(),
                success: false,
                stdout,
                stderr: format!(
                    "{stderr}\n[Process killed after {}s timeout]",
                    self.timeout.as_secs()
                ),
                exit_code: None,
                duration,
                timed_out: true,
            },
        };
        Ok(result)
    }
}

fn spawn_script(script: &Path, arg: &str) -> Result<Child> {
    Command::new(script)
        .arg(arg)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .with_context(|| format!("Failed to spawn {}", script.display()))
}

fn collect<R: Read + Send + 'static>(stream: Option<R>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    match stream {
        Some(stream) => {
            thread::spawn(move || {
                let _ = tx.send(read_stream_to_string(stream));
            });
        }
        None => {
            let _ = tx.send(String::new());
        }
    }
    rx
}

/// Read a stream to string, keeping at most `MAX_OUTPUT_SIZE` bytes
fn read_stream_to_string<R: Read>(mut stream: R) -> String {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 8192];

    loop {
        match stream.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => {
                let remaining = MAX_OUTPUT_SIZE.saturating_sub(buf.len());
                let to_copy = n.min(remaining);
                buf.extend_from_slice(&chunk[..to_copy]);
                if to_copy < n {
                    // Drain the rest so the child does not see a broken pipe
                    let mut discard = [0u8; 8192];
                    while stream.read(&mut discard).unwrap_or(0) > 0 {}
                    buf.extend_from_slice(b"\n[output truncated at 10MB]");
                    break;
                }
            }
            Err(_) => {
                if buf.is_empty() {
                    return "[error reading output]".to_string();
                }
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).to_string()
}

fn kill_child_process(child: &mut Child) {
    // The process may have exited already
    let _ = child.kill();
    let _ = child.wait();
}
