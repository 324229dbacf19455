//! Timeout-safe subprocess execution.
//!
//! stdout and stderr are drained on dedicated threads so a chatty child
//! cannot deadlock against a full pipe while we poll for completion.

use crate::RobotError;
use std::io::Read;
use std::process::{Command, Stdio};
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Captured output of a completed subprocess.
#[derive(Debug, Clone)]
pub struct CapturedRun {
    pub status_success: bool,
    pub status_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Run `command`, killing it if it exceeds `timeout`.
///
/// `args` is only used for error messages.
pub fn run_with_timeout(
    mut command: Command,
    args: &[String],
    timeout: Duration,
) -> Result<CapturedRun, RobotError> {
    command.stdin(Stdio::null());
    command.stdout(Stdio::piped());
    command.stderr(Stdio::piped());

    let mut child = command.spawn().map_err(|err| {
        if err.kind() == std::io::ErrorKind::NotFound {
            RobotError::NotInstalled
        } else {
            RobotError::CommandFailed {
                args: args.join(" "),
                message: err.to_string(),
            }
        }
    })?;

    let stdout = child
        .stdout
        .take()
        .ok_or_else(|| RobotError::Io("child stdout was not piped".to_string()))?;
    let stderr = child
        .stderr
        .take()
        .ok_or_else(|| RobotError::Io("child stderr was not piped".to_string()))?;
    let stdout_reader = spawn_reader(stdout);
    let stderr_reader = spawn_reader(stderr);

    let deadline = Instant::now() + timeout;
    let status = loop {
        match child.try_wait() {
            Ok(Some(status)) => break status,
            Ok(None) => {
                if Instant::now() >= deadline {
                    let _ = child.kill();
                    let _ = child.wait();
                    // Reader threads end once the pipes close.
                    let _ = stdout_reader.join();
                    let _ = stderr_reader.join();
                    return Err(RobotError::Timeout {
                        args: args.join(" "),
                        timeout,
                    });
                }
                std::thread::sleep(POLL_INTERVAL);
            }
            Err(err) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(RobotError::Io(err.to_string()));
            }
        }
    };

    let stdout = join_reader(stdout_reader);
    let stderr = join_reader(stderr_reader);

    Ok(CapturedRun {
        status_success: status.success(),
        status_code: status.code(),
        stdout,
        stderr,
    })
}

fn spawn_reader(mut source: impl Read + Send + 'static) -> std::thread::JoinHandle<Vec<u8>> {
    std::thread::spawn(move || {
        let mut buffer = Vec::new();
        let _ = source.read_to_end(&mut buffer);
        buffer
    })
}

fn join_reader(handle: std::thread::JoinHandle<Vec<u8>>) -> String {
    let bytes = handle.join().unwrap_or_default();
    String::from_utf8_lossy(&bytes).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_stdout_of_a_quick_command() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo hello"]);
        let run = run_with_timeout(command, &["echo".to_string()], Duration::from_secs(5))
            .expect("command should run");
        assert!(run.status_success);
        assert_eq!(run.stdout.trim(), "hello");
    }

    #[test]
    fn kills_a_command_that_exceeds_its_timeout() {
        let mut command = Command::new("sh");
        command.args(["-c", "sleep 30"]);
        let started = Instant::now();
        let result = run_with_timeout(command, &["sleep".to_string()], Duration::from_millis(300));
        assert!(matches!(result, Err(RobotError::Timeout { .. })));
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn missing_binary_maps_to_not_installed() {
        let command = Command::new("owlmetry-no-such-binary");
        let result = run_with_timeout(command, &[], Duration::from_secs(1));
        assert!(matches!(result, Err(RobotError::NotInstalled)));
    }

    #[test]
    fn nonzero_exit_is_reported_not_erased() {
        let mut command = Command::new("sh");
        command.args(["-c", "echo boom >&2; exit 3"]);
        let run = run_with_timeout(command, &[], Duration::from_secs(5)).expect("command ran");
        assert!(!run.status_success);
        assert_eq!(run.status_code, Some(3));
        assert_eq!(run.stderr.trim(), "boom");
    }
}
