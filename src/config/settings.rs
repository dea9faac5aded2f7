//! Runtime settings
//!
//! Built once from the command line (with environment fallbacks) and passed
//! down explicitly.

use std::path::PathBuf;
use std::time::Duration;

/// Default limit for remote ref queries
pub const DEFAULT_GIT_TIMEOUT_SECS: u64 = 5;

/// Default limit for clone and fetch transfers
pub const DEFAULT_FETCH_TIMEOUT_SECS: u64 = 120;

/// Default limit for migration and verification commands
pub const DEFAULT_COMMAND_TIMEOUT_SECS: u64 = 600;

/// Upper bounds for every blocking operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub git_query: Duration,
    pub git_fetch: Duration,
    pub command: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            git_query: Duration::from_secs(DEFAULT_GIT_TIMEOUT_SECS),
            git_fetch: Duration::from_secs(DEFAULT_FETCH_TIMEOUT_SECS),
            command: Duration::from_secs(DEFAULT_COMMAND_TIMEOUT_SECS),
        }
    }
}

impl Timeouts {
    pub fn from_secs(git_query: u64, git_fetch: u64, command: u64) -> Self {
        Self {
            git_query: Duration::from_secs(git_query),
            git_fetch: Duration::from_secs(git_fetch),
            command: Duration::from_secs(command),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Settings {
    /// Directory to start the workspace search from
    pub workspace: Option<PathBuf>,
    pub timeouts: Timeouts,
    pub verbose: bool,
}
