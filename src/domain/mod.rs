//! Domain models for repogen
//!
//! Artifact coordinates, version ordering and the result of one assembly run.

pub mod coordinate;
pub mod repository;
pub mod version;

pub use coordinate::{ArtifactCoordinate, ResolvedArtifact};
pub use repository::RepositoryData;
pub use version::ArtifactVersion;
