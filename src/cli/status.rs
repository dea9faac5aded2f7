use clap::Parser;

/// Arguments for status command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Show every locked dependency:\n    graft status\n\n\
                  Show one dependency:\n    graft status meta-kb")]
pub struct StatusArgs {
    /// Only show this dependency
    pub name: Option<String>,
}
