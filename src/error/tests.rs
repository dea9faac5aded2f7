//! Error type tests
//!
//! Tests for GraftError enum and its conversions.

use std::path::Path;
use std::time::Duration;

use miette::Diagnostic;

use crate::error::GraftError;
use crate::error::config::not_found as config_not_found;
use crate::error::{file_read_failed, file_write_failed, git_operation_failed, git_timeout, schema};

macro_rules! test_error_contains {
    ($test_name:ident, $err:expr, $($contains:expr),+ $(,)?) => {
        #[test]
        fn $test_name() {
            let err = $err;
            let error_string = err.to_string();
            $(
                assert!(error_string.contains($contains),
                    "Error message should contain '{}', got: {}",
                    $contains,
                    error_string
                );
            )+
        }
    };
}

#[test]
fn test_error_code() {
    let err = schema("graft.yaml", "missing apiVersion");
    assert_eq!(
        err.code().map(|c| c.to_string()),
        Some("graft::schema::invalid".to_string())
    );
}

#[test]
fn test_io_error_conversion() {
    let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
    let graft_err: GraftError = io_err.into();
    assert!(matches!(graft_err, GraftError::IoError { .. }));
}

#[test]
fn test_yaml_error_conversion() {
    let parse_result: std::result::Result<serde_yaml::Value, _> =
        serde_yaml::from_str("invalid: yaml: content: [unclosed");
    let graft_err: GraftError = parse_result.unwrap_err().into();
    assert!(matches!(graft_err, GraftError::Schema { .. }));
}

#[test]
fn test_json_error_conversion() {
    let parse_result: std::result::Result<serde_json::Value, _> =
        serde_json::from_str("invalid json content");
    let graft_err: GraftError = parse_result.unwrap_err().into();
    assert!(matches!(graft_err, GraftError::Schema { .. }));
}

#[test]
fn test_git_error_conversion() {
    let git_err = git2::Error::from_str("git error");
    let graft_err: GraftError = git_err.into();
    assert!(matches!(graft_err, GraftError::GitOperationFailed { .. }));
}

test_error_contains!(
    test_schema_error_names_file,
    schema("graft.lock", "commit 'abc' is not 40 hex characters"),
    "graft.lock",
    "40 hex"
);

test_error_contains!(
    test_config_not_found,
    config_not_found("/repo/graft.yaml"),
    "Configuration file not found",
    "/repo/graft.yaml"
);

test_error_contains!(
    test_conflict_names_both_requirers,
    GraftError::Conflict {
        name: "shared".to_string(),
        first_requirer: "alpha".to_string(),
        first_version: "https://example.com/shared.git#v1".to_string(),
        second_requirer: "beta".to_string(),
        second_version: "https://example.com/shared.git#v2".to_string(),
    },
    "shared",
    "alpha",
    "beta",
    "#v1",
    "#v2"
);

test_error_contains!(
    test_cycle_error,
    GraftError::Cycle {
        chain: "a -> b -> a".to_string(),
    },
    "Circular dependency",
    "a -> b -> a"
);

test_error_contains!(
    test_integrity_mismatch_reports_both_commits,
    GraftError::IntegrityMismatch {
        name: "docs".to_string(),
        expected: "1".repeat(40),
        actual: "2".repeat(40),
    },
    "docs",
    &"1".repeat(40),
    &"2".repeat(40)
);

test_error_contains!(
    test_git_operation_failed,
    git_operation_failed("clone", "https://example.com/repo.git", "Repository not found"),
    "Git clone failed",
    "Repository not found"
);

test_error_contains!(
    test_git_timeout,
    git_timeout("ls-remote", "https://example.com/repo.git", Duration::from_secs(5)),
    "timed out after 5s"
);

test_error_contains!(
    test_command_failed_carries_stderr,
    GraftError::CommandFailed {
        name: "migrate".to_string(),
        status: "exit code 3".to_string(),
        stderr: "boom".to_string(),
    },
    "migrate",
    "exit code 3",
    "boom"
);

test_error_contains!(
    test_file_read_failed,
    file_read_failed(Path::new("/tmp/graft.lock"), "permission denied"),
    "Failed to read file",
    "permission denied"
);

test_error_contains!(
    test_file_write_failed,
    file_write_failed(Path::new("/tmp/graft.lock"), "disk full"),
    "Failed to write file",
    "disk full"
);

test_error_contains!(
    test_snapshot_not_found,
    GraftError::SnapshotNotFound {
        id: "upgrade-20260101T000000000000Z".to_string(),
    },
    "Snapshot",
    "not found"
);
