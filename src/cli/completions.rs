use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate bash completions:\n    graft completions bash > ~/.bash_completion.d/graft\n\n\
                  Generate zsh completions:\n    graft completions zsh > ~/.zfunc/_graft\n\n\
                  Generate fish completions:\n    graft completions fish > ~/.config/fish/completions/graft.fish")]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(value_enum, ignore_case = true)]
    pub shell: Shell,
}
