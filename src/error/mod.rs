//! Error types and handling for graft
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`config`]: Declaration and lock schema errors
//! - [`git`]: Git operation errors
//! - [`fs`]: File system errors

pub mod config;
pub mod fs;
pub mod git;

#[cfg(test)]
mod tests;

pub use config::schema;
pub use fs::{read_failed as file_read_failed, write_failed as file_write_failed};
pub use git::{operation_failed as git_operation_failed, timeout as git_timeout};

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for graft operations
#[derive(Error, Diagnostic, Debug)]
pub enum GraftError {
    // Schema errors (graft.yaml and graft.lock)
    #[error("Invalid {path}: {message}")]
    #[diagnostic(
        code(graft::schema::invalid),
        help("Run 'graft validate config' or 'graft validate lock' to list every problem")
    )]
    Schema { path: String, message: String },

    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(graft::config::not_found),
        help("Run graft from a repository containing graft.yaml, or pass --workspace")
    )]
    ConfigNotFound { path: String },

    #[error("Lock file not found: {path}")]
    #[diagnostic(
        code(graft::lockfile::missing),
        help("Run 'graft resolve' to generate the lock file")
    )]
    LockfileMissing { path: String },

    // Resolution errors
    #[error(
        "Conflicting requirements for '{name}': {first_requirer} requires {first_version}, \
         {second_requirer} requires {second_version}"
    )]
    #[diagnostic(
        code(graft::deps::conflict),
        help("Align both requirers on the same source and ref")
    )]
    Conflict {
        name: String,
        first_requirer: String,
        first_version: String,
        second_requirer: String,
        second_version: String,
    },

    #[error("Circular dependency detected: {chain}")]
    #[diagnostic(
        code(graft::deps::cycle),
        help("Remove one edge of the cycle from the dependencies' graft.yaml files")
    )]
    Cycle { chain: String },

    #[error("Dependency '{name}' not found in lock file")]
    #[diagnostic(
        code(graft::deps::not_found),
        help("Run 'graft status' to list locked dependencies")
    )]
    DependencyNotFound { name: String },

    // Git errors
    #[error("Git {operation} failed for {target}: {reason}")]
    #[diagnostic(code(graft::git::operation_failed))]
    GitOperationFailed {
        operation: String,
        target: String,
        reason: String,
    },

    #[error("Git {operation} timed out after {seconds}s for {target}")]
    #[diagnostic(
        code(graft::git::timeout),
        help("Raise the limit with --git-timeout / --fetch-timeout if the remote is slow")
    )]
    GitTimeout {
        operation: String,
        target: String,
        seconds: u64,
    },

    // Command errors
    #[error("Command '{name}' failed with {status}: {stderr}")]
    #[diagnostic(code(graft::command::failed))]
    CommandFailed {
        name: String,
        status: String,
        stderr: String,
    },

    #[error("Command '{name}' timed out after {seconds}s")]
    #[diagnostic(
        code(graft::command::timeout),
        help("Raise the limit with --command-timeout")
    )]
    CommandTimeout { name: String, seconds: u64 },

    #[error("Failed to start command '{name}': {reason}")]
    #[diagnostic(code(graft::command::spawn_failed))]
    CommandSpawnFailed { name: String, reason: String },

    // Integrity errors
    #[error("Integrity mismatch for '{name}': lock records {expected}, checkout is at {actual}")]
    #[diagnostic(
        code(graft::integrity::mismatch),
        help("Run 'graft resolve' to re-sync checkouts with the lock file")
    )]
    IntegrityMismatch {
        name: String,
        expected: String,
        actual: String,
    },

    // Snapshot errors
    #[error("Snapshot '{id}' not found")]
    #[diagnostic(code(graft::snapshot::not_found))]
    SnapshotNotFound { id: String },

    #[error("Snapshot '{id}' failed: {reason}")]
    #[diagnostic(code(graft::snapshot::failed))]
    SnapshotFailed { id: String, reason: String },

    #[error("Rollback failed after error ({cause}): {reason}")]
    #[diagnostic(
        code(graft::snapshot::rollback_failed),
        help("Restore graft.lock manually from .graft/.snapshots/")
    )]
    RollbackFailed { cause: String, reason: String },

    // Workspace errors
    #[error("Failed to lock workspace: {reason}")]
    #[diagnostic(code(graft::workspace::lock_failed))]
    WorkspaceLockFailed { reason: String },

    // File system errors
    #[error("Failed to read file: {path}: {reason}")]
    #[diagnostic(code(graft::fs::read_failed))]
    FileReadFailed { path: String, reason: String },

    #[error("Failed to write file: {path}: {reason}")]
    #[diagnostic(code(graft::fs::write_failed))]
    FileWriteFailed { path: String, reason: String },

    #[error("IO error: {message}")]
    #[diagnostic(code(graft::fs::io_error))]
    IoError { message: String },
}

impl From<std::io::Error> for GraftError {
    fn from(err: std::io::Error) -> Self {
        GraftError::IoError {
            message: err.to_string(),
        }
    }
}

impl From<serde_yaml::Error> for GraftError {
    fn from(err: serde_yaml::Error) -> Self {
        GraftError::Schema {
            path: "unknown".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<serde_json::Error> for GraftError {
    fn from(err: serde_json::Error) -> Self {
        GraftError::Schema {
            path: "unknown".to_string(),
            message: err.to_string(),
        }
    }
}

impl From<git2::Error> for GraftError {
    fn from(err: git2::Error) -> Self {
        GraftError::GitOperationFailed {
            operation: "operation".to_string(),
            target: "repository".to_string(),
            reason: err.message().to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, GraftError>;
