//! Generate command implementation
//!
//! Loads the product configuration, wires the network-backed collaborators
//! into a [`RepoManager`] and prints a summary of the written archive.

use std::sync::Arc;

use console::Style;

use crate::cli::GenerateArgs;
use crate::config::{self, RepogenConfig};
use crate::domain::RepositoryData;
use crate::error::package;
use crate::operations::RepoManager;
use crate::progress::ProgressDisplay;
use crate::remap::{DaVersionCatalog, VersionCatalog};
use crate::transport::{HttpFetcher, RemoteFetch, RetryPolicy};

/// Run generate command
pub fn run(args: GenerateArgs) -> miette::Result<()> {
    let config_path = config::locate(args.config.as_deref())?;
    tracing::info!(config = %config_path.display(), "loading configuration");
    let config = RepogenConfig::load(&config_path)?;

    let mut request = config.to_request()?;
    if let Some(output) = &args.output {
        request.output_directory = std::path::absolute(output).map_err(|e| package::io(output, e))?;
    }

    let fetcher: Arc<dyn RemoteFetch> = Arc::new(HttpFetcher::new(request.tuning.timeout)?);
    let catalog: Arc<dyn VersionCatalog> = match &config.version_catalog.url {
        Some(url) => Arc::new(DaVersionCatalog::new(
            url,
            Arc::clone(&fetcher),
            RetryPolicy::from_tuning(&request.tuning),
        )?),
        None => Arc::new(config.static_catalog()),
    };
    let collector = Arc::new(config.build_info_collector()?);

    let progress = Arc::new(ProgressDisplay::new());
    let manager =
        RepoManager::new(fetcher, collector, catalog).with_progress(Arc::clone(&progress) as _);

    let repository = match manager.prepare(&request) {
        Ok(repository) => {
            progress.finish();
            repository
        }
        Err(failure) => {
            progress.abandon();
            return Err(failure.into());
        }
    };

    print_summary(&repository);

    if args.keep_work_dir {
        println!(
            "  {} {}",
            Style::new().bold().apply_to("Working directory:"),
            repository.working_directory.display()
        );
    } else if let Err(e) = repository.remove_working_directory() {
        tracing::warn!(
            path = %repository.working_directory.display(),
            error = %e,
            "failed to remove working directory"
        );
    }

    Ok(())
}

fn print_summary(repository: &RepositoryData) {
    println!(
        "{} {}",
        Style::new().bold().green().apply_to("Generated"),
        Style::new()
            .bold()
            .yellow()
            .apply_to(repository.repository_zip_path.display())
    );
    println!(
        "  {} {}",
        Style::new().bold().apply_to("Files:"),
        repository.files.len()
    );
    println!(
        "  {} {}",
        Style::new().bold().apply_to("Digest:"),
        Style::new().cyan().apply_to(&repository.archive_digest)
    );
}
