//! External command execution with captured output and timeouts.
//!
//! Commands are spawned directly (no shell), so package specs such as
//! `libfoo>=1.2` are passed through as single arguments.

use crate::error::{MedicError, Result};
use std::io::Read;
use std::process::{Child, Command, Stdio};
use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

/// How often a running child is polled for exit.
const POLL_INTERVAL: Duration = Duration::from_millis(25);

/// How long to wait for pipe readers once the child is gone.
///
/// A grandchild may still hold the pipes open after the child exits or is
/// killed; output it writes after this window is dropped.
const DRAIN_GRACE: Duration = Duration::from_secs(1);

/// Result of executing a command.
#[derive(Debug, Clone)]
pub struct CommandResult {
    /// Exit code (None if killed by signal or timed out).
    pub exit_code: Option<i32>,

    /// Standard output.
    pub stdout: String,

    /// Standard error.
    pub stderr: String,

    /// Whether the command was killed for exceeding its timeout.
    pub timed_out: bool,
}

/// Options for command execution.
#[derive(Debug, Clone, Default)]
pub struct CommandOptions {
    /// Wall-clock limit (None = no timeout).
    pub timeout: Option<Duration>,
}

/// Render a program and its arguments for logs and error messages.
pub fn display_command(program: &str, args: &[String]) -> String {
    std::iter::once(program.to_string())
        .chain(args.iter().cloned())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Execute a program, capturing stdout and stderr.
///
/// On timeout the child is forcibly terminated (its whole process group on
/// Unix) and the result is returned with `timed_out` set rather than as an
/// error. Only a failure to spawn or wait on the child is an `Err`.
pub fn execute(program: &str, args: &[String], options: &CommandOptions) -> Result<CommandResult> {
    let start = Instant::now();
    let rendered = display_command(program, args);

    let mut cmd = Command::new(program);
    cmd.args(args)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped());

    #[cfg(unix)]
    {
        use std::os::unix::process::CommandExt;
        cmd.process_group(0);
    }

    let mut child = cmd.spawn().map_err(|e| MedicError::ExternalToolFailure {
        command: rendered.clone(),
        message: format!("failed to start: {}", e),
    })?;

    tracing::debug!(pid = child.id(), command = %rendered, "spawned");

    let stdout_rx = spawn_reader(child.stdout.take());
    let stderr_rx = spawn_reader(child.stderr.take());

    let deadline = options.timeout.map(|t| start + t);
    let mut timed_out = false;

    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break Some(status),
            Ok(None) => {}
            Err(e) => {
                terminate(&mut child);
                return Err(MedicError::Io(e));
            }
        }

        if let Some(deadline) = deadline {
            if Instant::now() >= deadline {
                tracing::warn!(pid = child.id(), command = %rendered, "timed out, killing");
                terminate(&mut child);
                timed_out = true;
                break None;
            }
        }

        thread::sleep(POLL_INTERVAL);
    };

    let stdout = stdout_rx.recv_timeout(DRAIN_GRACE).unwrap_or_default();
    let stderr = stderr_rx.recv_timeout(DRAIN_GRACE).unwrap_or_default();
    let exit_code = status.and_then(|s| s.code());

    Ok(CommandResult {
        exit_code,
        stdout,
        stderr,
        timed_out,
    })
}

/// Read a pipe to the end on a helper thread, delivering the text once.
fn spawn_reader<R: Read + Send + 'static>(pipe: Option<R>) -> mpsc::Receiver<String> {
    let (tx, rx) = mpsc::channel();
    if let Some(mut pipe) = pipe {
        thread::spawn(move || {
            let mut buf = Vec::new();
            let _ = pipe.read_to_end(&mut buf);
            let _ = tx.send(String::from_utf8_lossy(&buf).into_owned());
        });
    }
    rx
}

/// Kill the child (and its process group on Unix) and reap it.
fn terminate(child: &mut Child) {
    #[cfg(unix)]
    {
        if let Ok(pgid) = i32::try_from(child.id()) {
            // SAFETY: kill(2) with a negative pid signals the process group we
            // created for this child; it has no memory-safety preconditions.
            unsafe {
                libc::kill(-pgid, libc::SIGKILL);
            }
        }
    }

    if let Err(err) = child.kill() {
        tracing::debug!(error = %err, "kill after group signal");
    }
    if let Err(err) = child.wait() {
        tracing::warn!(error = %err, "failed to reap child process");
    }
}
