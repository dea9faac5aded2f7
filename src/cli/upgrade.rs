use clap::Parser;

/// Arguments for upgrade command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Upgrade with migration and verification:\n    graft upgrade meta-kb --to v2.0.0\n\n\
                  Preview what would run:\n    graft upgrade meta-kb --to v2.0.0 --dry-run\n\n\
                  Upgrade without the verification command:\n    graft upgrade meta-kb --to v2.0.0 --skip-verify\n\n\
                  Keep the lock snapshot for later inspection:\n    graft upgrade meta-kb --to v2.0.0 --keep-snapshot")]
pub struct UpgradeArgs {
    /// Dependency name as it appears in graft.lock
    pub name: String,

    /// Target ref (branch, tag or commit)
    #[arg(long = "to", value_name = "REF")]
    pub to: String,

    /// Do not run the migration command
    #[arg(long)]
    pub skip_migration: bool,

    /// Do not run the verification command
    #[arg(long)]
    pub skip_verify: bool,

    /// Show what would happen without changing anything
    #[arg(long)]
    pub dry_run: bool,

    /// Keep the lock snapshot after a successful upgrade
    #[arg(long)]
    pub keep_snapshot: bool,
}
