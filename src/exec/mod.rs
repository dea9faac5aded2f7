//! Shell command execution for migration and verification commands
//!
//! The [`CommandExecutor`] trait is the seam the upgrade orchestrator runs
//! commands through. [`ShellExecutor`] is the production implementation.

pub mod process;

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::{GraftError, Result};

/// A fully resolved command ready to run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invocation {
    /// Declared command name, used in errors and logs
    pub name: String,

    /// Shell invocation string
    pub run: String,

    pub working_dir: PathBuf,

    /// Merged over the inherited environment
    pub env: BTreeMap<String, String>,

    pub timeout: Duration,
}

/// What a finished command produced
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandOutput {
    /// Exit code; `None` when the process was terminated by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }

    /// Human-readable exit status
    pub fn status_label(&self) -> String {
        match self.code {
            Some(code) => format!("exit code {code}"),
            None => "signal".to_string(),
        }
    }
}

/// Runs shell commands
///
/// A non-zero exit is reported through [`CommandOutput`], not as an error;
/// errors are reserved for commands that could not start or timed out.
pub trait CommandExecutor {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput>;
}

/// Runs commands through the platform shell
#[derive(Debug, Default, Clone, Copy)]
pub struct ShellExecutor;

impl ShellExecutor {
    fn shell(script: &str) -> std::process::Command {
        #[cfg(windows)]
        {
            let mut command = std::process::Command::new("cmd");
            command.arg("/C").arg(script);
            command
        }
        #[cfg(not(windows))]
        {
            let mut command = std::process::Command::new("sh");
            command.arg("-c").arg(script);
            command
        }
    }
}

impl CommandExecutor for ShellExecutor {
    fn run(&self, invocation: &Invocation) -> Result<CommandOutput> {
        if !invocation.working_dir.is_dir() {
            return Err(GraftError::CommandSpawnFailed {
                name: invocation.name.clone(),
                reason: format!(
                    "working directory {} does not exist",
                    invocation.working_dir.display()
                ),
            });
        }

        let mut command = Self::shell(&invocation.run);
        command
            .current_dir(&invocation.working_dir)
            .envs(&invocation.env);

        tracing::debug!(
            command = %invocation.name,
            run = %invocation.run,
            dir = %invocation.working_dir.display(),
            "running command"
        );

        let captured = process::run_with_deadline(command, invocation.timeout).map_err(|e| {
            GraftError::CommandSpawnFailed {
                name: invocation.name.clone(),
                reason: e.to_string(),
            }
        })?;

        let Some(captured) = captured else {
            tracing::warn!(command = %invocation.name, "command timed out");
            return Err(GraftError::CommandTimeout {
                name: invocation.name.clone(),
                seconds: invocation.timeout.as_secs(),
            });
        };

        Ok(CommandOutput {
            code: captured.status.code(),
            stdout: captured.stdout,
            stderr: captured.stderr,
        })
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::test_fixtures::create_temp_dir;

    fn invocation(run: &str, dir: PathBuf) -> Invocation {
        Invocation {
            name: "check".to_string(),
            run: run.to_string(),
            working_dir: dir,
            env: BTreeMap::new(),
            timeout: Duration::from_secs(10),
        }
    }

    #[test]
    fn test_runs_in_working_dir_with_env() {
        let temp = create_temp_dir();
        let mut inv = invocation("pwd; echo \"$KB_MODE\"", temp.path().to_path_buf());
        inv.env.insert("KB_MODE".to_string(), "strict".to_string());

        let output = ShellExecutor.run(&inv).unwrap();
        assert!(output.success());
        let lines: Vec<&str> = output.stdout.lines().collect();
        let expected = dunce::canonicalize(temp.path()).unwrap();
        assert_eq!(dunce::canonicalize(lines[0]).unwrap(), expected);
        assert_eq!(lines[1], "strict");
    }

    #[test]
    fn test_nonzero_exit_is_reported_not_raised() {
        let temp = create_temp_dir();
        let output = ShellExecutor
            .run(&invocation("echo broken >&2; exit 4", temp.path().to_path_buf()))
            .unwrap();
        assert!(!output.success());
        assert_eq!(output.status_label(), "exit code 4");
        assert_eq!(output.stderr.trim(), "broken");
    }

    #[test]
    fn test_timeout_is_distinct_error() {
        let temp = create_temp_dir();
        let mut inv = invocation("sleep 30", temp.path().to_path_buf());
        inv.timeout = Duration::from_millis(200);

        let err = ShellExecutor.run(&inv).unwrap_err();
        assert!(matches!(err, GraftError::CommandTimeout { .. }));
    }

    #[test]
    fn test_missing_working_dir() {
        let temp = create_temp_dir();
        let err = ShellExecutor
            .run(&invocation("true", temp.path().join("absent")))
            .unwrap_err();
        assert!(matches!(err, GraftError::CommandSpawnFailed { .. }));
    }
}
