//! Git operation errors

use std::time::Duration;

use super::GraftError;

/// Creates a git operation error
pub fn operation_failed(
    operation: impl Into<String>,
    target: impl Into<String>,
    reason: impl Into<String>,
) -> GraftError {
    GraftError::GitOperationFailed {
        operation: operation.into(),
        target: target.into(),
        reason: reason.into(),
    }
}

/// Creates a git timeout error
pub fn timeout(operation: impl Into<String>, target: impl Into<String>, limit: Duration) -> GraftError {
    GraftError::GitTimeout {
        operation: operation.into(),
        target: target.into(),
        seconds: limit.as_secs(),
    }
}
