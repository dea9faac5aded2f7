//! Configuration handling for graft
//!
//! This module contains data structures for:
//! - `graft.yaml` - Dependency declaration (deps, changes, commands)
//! - `graft.lock` - Lock file with resolved commits
//! - Runtime settings (timeouts, workspace override)

pub mod graft;
pub mod lockfile;
pub mod settings;

pub use graft::Command;
pub use settings::{Settings, Timeouts};
