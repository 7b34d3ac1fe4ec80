use clap::Parser;
use std::path::PathBuf;

/// Arguments for the generate command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  Generate from ./repogen.yaml:\n    repogen generate\n\n\
                  Generate with an explicit configuration:\n    repogen generate --config release/repogen.yaml\n\n\
                  Write the archive elsewhere and keep downloads:\n    repogen generate --output /tmp/release --keep-work-dir")]
pub struct GenerateArgs {
    /// Configuration file (defaults to $REPOGEN_CONFIG or ./repogen.yaml)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Directory receiving the archive, overriding outputDirectory
    #[arg(long, short = 'o')]
    pub output: Option<PathBuf>,

    /// Keep the working directory with downloads and the staged tree
    #[arg(long)]
    pub keep_work_dir: bool,
}
