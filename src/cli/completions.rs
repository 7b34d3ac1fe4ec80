use clap::Parser;
use clap_complete::Shell;

/// Arguments for completions command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  repogen completions bash > ~/.local/share/bash-completion/completions/repogen\n  \
                  repogen completions zsh > ~/.zfunc/_repogen")]
pub struct CompletionsArgs {
    /// Target shell
    #[arg(value_enum)]
    pub shell: Shell,
}
