//! File system errors

use std::path::Path;

use super::GraftError;

/// Creates a file read error
pub fn read_failed(path: &Path, reason: impl ToString) -> GraftError {
    GraftError::FileReadFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Creates a file write error
pub fn write_failed(path: &Path, reason: impl ToString) -> GraftError {
    GraftError::FileWriteFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
