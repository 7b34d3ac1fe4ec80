//! Inspect command implementation

use console::Style;

use crate::cli::InspectArgs;
use crate::error::{Result, package};
use crate::package::{archive, digest};

/// Run inspect command
pub fn run(args: InspectArgs) -> Result<()> {
    let entries = archive::list_entries(&args.archive)?;

    println!(
        "{} ({} entries):",
        Style::new().bold().yellow().apply_to(args.archive.display()),
        entries.len()
    );
    for entry in &entries {
        if entry.ends_with('/') {
            println!("  {}", Style::new().dim().apply_to(entry));
        } else {
            println!("  {entry}");
        }
    }

    let actual = digest::hash_file(&args.archive)?;
    println!();
    println!(
        "{} {}",
        Style::new().bold().apply_to("Digest:"),
        Style::new().cyan().apply_to(&actual)
    );

    if let Some(expected) = &args.digest {
        if actual != *expected {
            return Err(package::digest_mismatch(&args.archive, expected, &actual));
        }
        println!("{}", Style::new().bold().green().apply_to("Digest verified"));
    }

    Ok(())
}
