//! CLI definitions using clap derive API
//!
//! This module is organized into submodules for each command's argument types:
//! - generate: Generate command arguments
//! - inspect: Inspect command arguments
//! - completions: Completions command arguments

use clap::builder::{Styles, styling::AnsiColor};
use clap::{Parser, Subcommand};

pub mod completions;
pub mod generate;
pub mod inspect;

pub use completions::CompletionsArgs;
pub use generate::GenerateArgs;
pub use inspect::InspectArgs;

/// Repogen - deliverable Maven repository generator
///
/// Assemble the offline Maven repository shipped with a product release.
#[derive(Parser, Debug)]
#[command(
    name = "repogen",
    author,
    version,
    color = clap::ColorChoice::Always,
    styles = Styles::styled()
        .header(AnsiColor::Green.on_default().bold())
        .usage(AnsiColor::Green.on_default().bold())
        .literal(AnsiColor::Cyan.on_default().bold())
        .placeholder(AnsiColor::Cyan.on_default()),
    about = "Deliverable Maven repository generator for product releases",
    long_about = "Repogen collects the artifacts of a product release, maps them to their \
                  productized versions, resolves them with their descriptors against the \
                  configured remote repositories and packages the result as a zipped Maven \
                  repository.",
    after_help = "\x1b[1m\x1b[32mExamples:\x1b[0m\n   \
                  repogen generate                           \x1b[90m# Generate from ./repogen.yaml\x1b[0m\n   \
                  repogen generate -c release/repogen.yaml   \x1b[90m# Use another configuration\x1b[0m\n   \
                  repogen inspect repo.zip                   \x1b[90m# List archive entries\x1b[0m\n\n\
                  "
)]
pub struct Cli {
    /// Enable verbose output
    #[arg(long, short = 'v', global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Generate the deliverable repository archive
    Generate(GenerateArgs),

    /// List the entries of a repository archive
    Inspect(InspectArgs),

    /// Generate shell completions
    Completions(CompletionsArgs),
}
