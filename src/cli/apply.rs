use clap::Parser;

/// Arguments for apply command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Pin meta-kb to a tag without running its migration:\n    graft apply meta-kb --to v2.0.0\n\n\
                  Follow a branch again:\n    graft apply meta-kb --to main\n\n\
                  graft.yaml is not edited; the next resolve uses its declared ref.")]
pub struct ApplyArgs {
    /// Dependency name as it appears in graft.lock
    pub name: String,

    /// Ref to pin (branch, tag or commit)
    #[arg(long = "to", value_name = "REF")]
    pub to: String,
}
