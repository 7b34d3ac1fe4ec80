//! Artifact resolution
//!
//! Coordinates are resolved against the remote repository chain of one
//! [`ResolverSettings`](crate::config::ResolverSettings) snapshot.
//!
//! ## Module Organization
//!
//! - `pom.rs`: POM descriptor reading
//! - `model.rs`: effective model (inheritance, interpolation, management)
//! - `remote.rs`: deduplicated downloads through the repository chain
//! - `graph.rs`: level-by-level traversal on a worker pool

pub mod graph;
pub mod model;
pub mod pom;
pub mod remote;

pub use graph::ArtifactResolver;
pub use remote::RemoteResolver;

use crate::domain::ArtifactCoordinate;

/// Observer of the resolving stage
///
/// Called from worker threads.
pub trait ResolveProgress: Send + Sync {
    /// A traversal level with `count` coordinates is about to be downloaded
    fn level_started(&self, depth: usize, count: usize);

    /// A coordinate and its descriptors are available locally
    fn artifact_resolved(&self, coordinate: &ArtifactCoordinate);
}

/// Progress observer that ignores every event
#[derive(Debug, Default, Clone, Copy)]
pub struct NoProgress;

impl ResolveProgress for NoProgress {
    fn level_started(&self, _depth: usize, _count: usize) {}

    fn artifact_resolved(&self, _coordinate: &ArtifactCoordinate) {}
}
