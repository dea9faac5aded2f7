//! Git error interpretation
//!
//! Maps raw libgit2 errors to short reasons that name the likely cause.

use git2::{Error, ErrorClass, ErrorCode};

#[derive(Clone, Copy)]
enum Cause {
    RepositoryNotFound,
    AuthenticationFailed,
    PermissionDenied,
    Network,
    Other,
}

type Check = fn(&str) -> bool;

const CLASSIFICATIONS: &[(Check, Cause)] = &[
    (
        |msg| {
            msg.contains("not found")
                || msg.contains("404")
                || msg.contains("does not appear to be a git repository")
                || msg.contains("too many redirects")
        },
        Cause::RepositoryNotFound,
    ),
    (
        |msg| msg.contains("authentication") || msg.contains("credentials"),
        Cause::AuthenticationFailed,
    ),
    (
        |msg| msg.contains("permission denied") || msg.contains("access denied"),
        Cause::PermissionDenied,
    ),
    (
        |msg| {
            msg.contains("connection")
                || msg.contains("network")
                || msg.contains("could not resolve host")
        },
        Cause::Network,
    ),
];

fn classify(msg: &str) -> Cause {
    CLASSIFICATIONS
        .iter()
        .find(|(check, _)| check(msg))
        .map_or(Cause::Other, |(_, cause)| *cause)
}

/// Interpret a git2 error as a user-facing reason
pub fn interpret_git_error(err: &Error) -> String {
    let message = err.message().to_lowercase();
    match classify(&message) {
        Cause::RepositoryNotFound => "Repository not found".to_string(),
        Cause::AuthenticationFailed => "Authentication failed".to_string(),
        Cause::PermissionDenied => "Permission denied".to_string(),
        Cause::Network => format!("Network error: {}", err.message()),
        Cause::Other => match err.class() {
            ErrorClass::Http => format!("HTTP error: {}", err.message()),
            ErrorClass::Ssh => format!("SSH error: {}", err.message()),
            _ => err.message().to_string(),
        },
    }
}

/// Whether the error came from a callback asking libgit2 to stop
pub fn is_user_abort(err: &Error) -> bool {
    err.code() == ErrorCode::User
}
