//! Root coordinate sourcing
//!
//! A run starts from a set of root coordinates. Where they come from depends
//! on the strategy's [`SourceKind`]:
//!
//! - `extensions.rs`: a hosted list of `group:artifact[:version]` entries
//! - `builds.rs`: the artifacts produced by completed builds
//!
//! Sourcing never touches local state; the result is handed to the version
//! remapper as an ordered set.

pub mod builds;
pub mod extensions;

pub use builds::{BuildInfoCollector, CompletedBuild, StaticBuildInfoCollector};

use std::collections::BTreeSet;

use crate::domain::ArtifactCoordinate;
use crate::error::{Result, request};
use crate::request::{EXTENSIONS_LIST_URL, GenerationRequest, SourceKind};
use crate::transport::{RemoteFetch, RetryPolicy};

/// Fetches the root coordinates of a run
///
/// # Arguments
///
/// * `request` - The validated generation request
/// * `fetcher` - Used for the extensions list
/// * `collector` - Used for build artifacts
/// * `retry` - Retry policy for network calls
pub fn fetch_root_coordinates(
    request: &GenerationRequest,
    fetcher: &dyn RemoteFetch,
    collector: &dyn BuildInfoCollector,
    retry: &RetryPolicy,
) -> Result<BTreeSet<ArtifactCoordinate>> {
    match request.strategy.source() {
        SourceKind::ExtensionsList => {
            let url = request.parameter(EXTENSIONS_LIST_URL).ok_or_else(|| {
                request::missing_parameter(request.strategy.name(), EXTENSIONS_LIST_URL)
            })?;
            extensions::fetch(url, fetcher, retry)
        }
        SourceKind::Builds => builds::collect(&request.source_builds, collector),
    }
}
