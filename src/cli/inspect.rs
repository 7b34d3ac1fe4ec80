use clap::Parser;
use std::path::PathBuf;

/// Arguments for the inspect command
#[derive(Parser, Debug)]
#[command(after_help = "EXAMPLES:\n  \
                  List the entries of an archive:\n    repogen inspect rh-sample-maven-repository.zip\n\n\
                  Check the archive against a digest:\n    repogen inspect rh-sample-maven-repository.zip --digest blake3:...")]
pub struct InspectArgs {
    /// Repository archive to list
    pub archive: PathBuf,

    /// Expected `blake3:` digest of the archive
    #[arg(long)]
    pub digest: Option<String>,
}
