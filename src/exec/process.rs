//! Child processes with a deadline
//!
//! Output goes to anonymous temp files instead of pipes so a chatty child
//! can never block on a full pipe while we poll for its exit.

use std::io::{self, Read, Seek, SeekFrom};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::{Duration, Instant};

const POLL_INTERVAL: Duration = Duration::from_millis(20);

/// A child that exited before its deadline
#[derive(Debug)]
pub struct Captured {
    pub status: ExitStatus,
    pub stdout: String,
    pub stderr: String,
}

fn read_back(mut file: std::fs::File) -> io::Result<String> {
    file.seek(SeekFrom::Start(0))?;
    let mut bytes = Vec::new();
    file.read_to_end(&mut bytes)?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

/// Run `command` to completion, or kill it once `limit` has elapsed.
///
/// Returns `Ok(None)` on timeout; spawn and wait failures are `Err`.
pub fn run_with_deadline(mut command: Command, limit: Duration) -> io::Result<Option<Captured>> {
    let stdout = tempfile::tempfile()?;
    let stderr = tempfile::tempfile()?;

    let mut child = command
        .stdin(Stdio::null())
        .stdout(Stdio::from(stdout.try_clone()?))
        .stderr(Stdio::from(stderr.try_clone()?))
        .spawn()?;

    let deadline = Instant::now() + limit;
    let status = loop {
        if let Some(status) = child.try_wait()? {
            break status;
        }
        if Instant::now() >= deadline {
            // Already-exited races are fine; wait() reaps either way
            let _ = child.kill();
            let _ = child.wait();
            return Ok(None);
        }
        thread::sleep(POLL_INTERVAL);
    };

    Ok(Some(Captured {
        status,
        stdout: read_back(stdout)?,
        stderr: read_back(stderr)?,
    }))
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;

    fn sh(script: &str) -> Command {
        let mut command = Command::new("sh");
        command.arg("-c").arg(script);
        command
    }

    #[test]
    fn test_captures_output_and_status() {
        let captured = run_with_deadline(sh("echo out; echo err >&2; exit 3"), Duration::from_secs(10))
            .unwrap()
            .unwrap();
        assert_eq!(captured.status.code(), Some(3));
        assert_eq!(captured.stdout.trim(), "out");
        assert_eq!(captured.stderr.trim(), "err");
    }

    #[test]
    fn test_kills_on_timeout() {
        let started = Instant::now();
        let result = run_with_deadline(sh("sleep 30"), Duration::from_millis(200)).unwrap();
        assert!(result.is_none());
        assert!(started.elapsed() < Duration::from_secs(10));
    }

    #[test]
    fn test_missing_program_is_error() {
        let command = Command::new("graft-test-no-such-program");
        assert!(run_with_deadline(command, Duration::from_secs(1)).is_err());
    }
}
