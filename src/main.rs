//! graft - git-backed dependency manager
//!
//! Resolves the git dependencies a repository declares in graft.yaml into a
//! lock file pinned to exact commits, and upgrades them atomically with
//! migration and verification commands that roll back on failure.

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod common;
mod config;
mod error;
mod exec;
mod git;
mod hash;
mod operations;
mod progress;
mod resolver;
mod snapshot;
mod ui;
mod validator;
mod workspace;

#[cfg(test)]
mod test_fixtures;

use cli::{Cli, Commands};

/// Log to stderr; `RUST_LOG` wins over `--verbose`
fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let settings = cli.settings();

    let result = match cli.command {
        Commands::Resolve => commands::resolve::run(settings),
        Commands::Apply(args) => commands::apply::run(settings, args),
        Commands::Status(args) => commands::status::run(settings, args),
        Commands::Upgrade(args) => commands::upgrade::run(settings, args),
        Commands::Validate(args) => match commands::validate::run(settings, args) {
            Ok(code) => std::process::exit(code),
            Err(e) => Err(e),
        },
        Commands::Version => commands::version::run(),
        Commands::Completions(args) => commands::completions::run(args),
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        if let Some(help) = miette::Diagnostic::help(&e) {
            eprintln!("  help: {help}");
        }
        std::process::exit(1);
    }
}
