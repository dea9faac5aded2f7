//! Declaration and lock schema errors

use super::GraftError;

/// Creates a schema error for the given file
pub fn schema(path: impl Into<String>, message: impl Into<String>) -> GraftError {
    GraftError::Schema {
        path: path.into(),
        message: message.into(),
    }
}

/// Creates a config not found error
pub fn not_found(path: impl Into<String>) -> GraftError {
    GraftError::ConfigNotFound { path: path.into() }
}
