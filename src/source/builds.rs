//! Coordinates produced by completed builds

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use crate::domain::ArtifactCoordinate;
use crate::error::{Result, source};

/// Reference to a finished build whose artifacts go into the deliverable
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CompletedBuild {
    /// Build identifier as known to the build system
    pub id: String,
}

impl CompletedBuild {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }
}

/// Source of the artifacts a build produced
///
/// The build system behind it is opaque to the engine.
pub trait BuildInfoCollector: Send + Sync {
    fn artifacts(&self, build: &CompletedBuild) -> Result<BTreeSet<ArtifactCoordinate>>;
}

/// Collector answering from a fixed table, typically filled from the configuration file
#[derive(Debug, Clone, Default)]
pub struct StaticBuildInfoCollector {
    builds: BTreeMap<String, BTreeSet<ArtifactCoordinate>>,
}

impl StaticBuildInfoCollector {
    #[must_use]
    pub fn with_build(
        mut self,
        id: impl Into<String>,
        artifacts: impl IntoIterator<Item = ArtifactCoordinate>,
    ) -> Self {
        self.builds
            .entry(id.into())
            .or_default()
            .extend(artifacts);
        self
    }
}

impl BuildInfoCollector for StaticBuildInfoCollector {
    fn artifacts(&self, build: &CompletedBuild) -> Result<BTreeSet<ArtifactCoordinate>> {
        self.builds
            .get(&build.id)
            .cloned()
            .ok_or_else(|| source::incomplete_build_info(&build.id, "no build info recorded"))
    }
}

/// Union of the artifacts of every build
///
/// A build that reports no artifacts is treated as incomplete.
pub fn collect(
    builds: &[CompletedBuild],
    collector: &dyn BuildInfoCollector,
) -> Result<BTreeSet<ArtifactCoordinate>> {
    let mut coordinates = BTreeSet::new();
    for build in builds {
        let artifacts = collector.artifacts(build)?;
        if artifacts.is_empty() {
            return Err(source::incomplete_build_info(
                &build.id,
                "build reported no artifacts",
            ));
        }
        tracing::debug!(build = %build.id, artifacts = artifacts.len(), "collected build artifacts");
        coordinates.extend(artifacts);
    }
    Ok(coordinates)
}
