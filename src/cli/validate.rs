use clap::{Parser, ValueEnum};

/// What `graft validate` checks
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ValidateScope {
    /// graft.yaml schema and references
    Config,
    /// graft.lock schema, drift and remote refs
    Lock,
    /// Checkouts against the locked commits
    Integrity,
    /// Every check
    #[default]
    All,
}

/// Arguments for validate command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Run every check:\n    graft validate\n\n\
                  Only compare checkouts with graft.lock:\n    graft validate integrity\n\n\
                  EXIT STATUS:\n  \
                  0  no errors (warnings allowed)\n  \
                  1  at least one error\n  \
                  2  a checkout does not match graft.lock")]
pub struct ValidateArgs {
    /// Which check to run
    #[arg(value_enum, default_value_t = ValidateScope::All)]
    pub check: ValidateScope,
}
