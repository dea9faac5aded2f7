//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - apply: Apply command arguments
//! - status: Status command arguments
//! - upgrade: Upgrade command arguments
//! - validate: Validate command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::settings::{
    DEFAULT_COMMAND_TIMEOUT_SECS, DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_GIT_TIMEOUT_SECS,
};
use crate::config::{Settings, Timeouts};

pub mod apply;
pub mod completions;
pub mod status;
pub mod upgrade;
pub mod validate;

pub use apply::ApplyArgs;
pub use completions::CompletionsArgs;
pub use status::StatusArgs;
pub use upgrade::UpgradeArgs;
pub use validate::{ValidateArgs, ValidateScope};

/// graft - git-backed dependency manager
///
/// Pin knowledge repositories to exact commits and upgrade them atomically.
#[derive(Parser, Debug)]
#[command(
    name = "graft",
    author,
    version,
    color = clap::ColorChoice::Auto,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Git-backed dependency manager with atomic upgrades",
    long_about = "graft resolves the git dependencies declared in graft.yaml (and their own \
                  graft.yaml files) into graft.lock, and upgrades them with migration and \
                  verification commands that roll back on failure.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  graft resolve                          \x1b[90m# Resolve graft.yaml into graft.lock\x1b[0m\n   \
                  graft status                           \x1b[90m# Show locked dependencies\x1b[0m\n   \
                  graft upgrade meta-kb --to v2.0.0      \x1b[90m# Upgrade with migration and rollback\x1b[0m\n   \
                  graft apply meta-kb --to main          \x1b[90m# Re-pin without running commands\x1b[0m\n   \
                  graft validate integrity               \x1b[90m# Compare checkouts with graft.lock\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Workspace directory (defaults to the nearest directory with graft.yaml)
    #[arg(long, short = 'w', global = true, env = "GRAFT_WORKSPACE")]
    pub workspace: Option<PathBuf>,

    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    /// Timeout in seconds for remote ref queries
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        env = "GRAFT_GIT_TIMEOUT",
        default_value_t = DEFAULT_GIT_TIMEOUT_SECS
    )]
    pub git_timeout: u64,

    /// Timeout in seconds for clones and fetches
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        env = "GRAFT_FETCH_TIMEOUT",
        default_value_t = DEFAULT_FETCH_TIMEOUT_SECS
    )]
    pub fetch_timeout: u64,

    /// Timeout in seconds for migration and verification commands
    #[arg(
        long,
        global = true,
        value_name = "SECS",
        env = "GRAFT_COMMAND_TIMEOUT",
        default_value_t = DEFAULT_COMMAND_TIMEOUT_SECS
    )]
    pub command_timeout: u64,

    #[command(subcommand)]
    pub command: Commands,
}

impl Cli {
    /// Runtime settings from the global options
    pub fn settings(&self) -> Settings {
        Settings {
            workspace: self.workspace.clone(),
            timeouts: Timeouts::from_secs(self.git_timeout, self.fetch_timeout, self.command_timeout),
            verbose: self.verbose,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Resolve graft.yaml into graft.lock
    Resolve,

    /// Point a dependency at another ref without running commands
    Apply(ApplyArgs),

    /// Show locked dependencies
    Status(StatusArgs),

    /// Upgrade a dependency, running its migration and verification
    Upgrade(UpgradeArgs),

    /// Check graft.yaml, graft.lock and the checkouts
    Validate(ValidateArgs),

    /// Show version information
    #[command(hide = true)]
    Version,

    /// Generate shell completions
    Completions(CompletionsArgs),
}
