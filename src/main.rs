//! Repogen - deliverable Maven repository generator
//!
//! Command line entry point; see the library crate for the assembly engine.

use clap::Parser;

use repogen::cli::{Cli, Commands};
use repogen::{commands, logging};

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result: miette::Result<()> = match cli.command {
        Commands::Generate(args) => commands::generate::run(args),
        Commands::Inspect(args) => commands::inspect::run(args).map_err(Into::into),
        Commands::Completions(args) => commands::completions::run(args).map_err(Into::into),
    };

    if let Err(report) = result {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}
