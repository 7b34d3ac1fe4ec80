//! Breadth-first traversal of the dependency graph
//!
//! The graph is walked one level at a time. Downloads of a level run on the
//! worker pool; mediation happens between levels on the calling thread, in
//! declaration order, so the selected set does not depend on scheduling.
//!
//! ```text
//! level 0: roots (always kept)
//! level 1: their runtime dependencies, minus excluded and already selected keys
//! level n: ...
//! ```
//!
//! Mediation is nearest-wins per `group:artifact:type[:classifier]`; at equal
//! depth the first declaration wins. The dependency management of a root
//! governs its whole subtree: below level 1 a managed entry replaces the
//! declared version and scope and adds its exclusions.

use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::sync::Arc;

use rayon::prelude::*;

use super::ResolveProgress;
use super::model::{EffectiveModel, ModelBuilder, RUNTIME_SCOPES, RuntimeDependency};
use super::pom::{Dependency, Exclusion};
use super::remote::RemoteResolver;
use crate::domain::{ArtifactCoordinate, ResolvedArtifact};
use crate::error::{Result, request, resolve};

/// One selected coordinate and how it was reached
struct Node {
    coordinate: ArtifactCoordinate,
    /// Coordinates from the root down to this one, inclusive
    path: Arc<Vec<ArtifactCoordinate>>,
    /// Exclusions accumulated along `path`
    exclusions: Arc<Vec<Exclusion>>,
    /// Dependency management of the root this node descends from
    management: Arc<BTreeMap<String, Dependency>>,
}

impl Node {
    fn root(coordinate: &ArtifactCoordinate) -> Self {
        Self {
            coordinate: coordinate.clone(),
            path: Arc::new(vec![coordinate.clone()]),
            exclusions: Arc::new(Vec::new()),
            management: Arc::new(BTreeMap::new()),
        }
    }

    fn excludes(&self, coordinate: &ArtifactCoordinate) -> bool {
        self.exclusions
            .iter()
            .any(|e| e.matches(&coordinate.group_id, &coordinate.artifact_id))
    }

    fn on_path(&self, key: &str) -> bool {
        self.path.iter().any(|c| c.management_key() == key)
    }

    fn child(
        &self,
        dependency: RuntimeDependency,
        management: &Arc<BTreeMap<String, Dependency>>,
    ) -> Self {
        let mut path = Vec::with_capacity(self.path.len() + 1);
        path.extend(self.path.iter().cloned());
        path.push(dependency.coordinate.clone());

        let exclusions = if dependency.exclusions.is_empty() {
            Arc::clone(&self.exclusions)
        } else {
            let mut merged = self.exclusions.as_ref().clone();
            merged.extend(dependency.exclusions);
            Arc::new(merged)
        };

        Self {
            coordinate: dependency.coordinate,
            path: Arc::new(path),
            exclusions,
            management: Arc::clone(management),
        }
    }
}

/// Applies root management to a transitive dependency
///
/// Returns `None` when the managed scope takes it out of the runtime closure.
fn managed(
    mut dependency: RuntimeDependency,
    management: &BTreeMap<String, Dependency>,
) -> Option<RuntimeDependency> {
    let Some(entry) = management.get(&dependency.coordinate.management_key()) else {
        return Some(dependency);
    };
    if let Some(version) = entry
        .version
        .as_deref()
        .filter(|v| !v.is_empty() && *v != dependency.coordinate.version)
    {
        tracing::trace!(
            dependency = %dependency.coordinate,
            version,
            "version set by root management"
        );
        dependency.coordinate.version = version.to_string();
    }
    if let Some(scope) = entry.scope.as_deref() {
        if !RUNTIME_SCOPES.contains(&scope) {
            return None;
        }
        dependency.scope = scope.to_string();
    }
    dependency.exclusions.extend(entry.exclusions.iter().cloned());
    Some(dependency)
}

/// Resolves coordinates to downloaded files
pub struct ArtifactResolver {
    remote: RemoteResolver,
    pool: rayon::ThreadPool,
    progress: Arc<dyn ResolveProgress>,
}

impl ArtifactResolver {
    /// Creates a resolver downloading on `workers` threads
    pub fn new(
        remote: RemoteResolver,
        workers: usize,
        progress: Arc<dyn ResolveProgress>,
    ) -> Result<Self> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|index| format!("repogen-resolve-{index}"))
            .build()
            .map_err(|e| request::invalid(format!("failed to start resolver workers: {e}")))?;
        Ok(Self {
            remote,
            pool,
            progress,
        })
    }

    /// Resolves `coordinates`, following dependencies when `transitive` is set
    ///
    /// Returns every file downloaded on the way: primary files, their
    /// descriptors, parent descriptors and imported BOMs.
    pub fn resolve(
        &self,
        coordinates: &BTreeSet<ArtifactCoordinate>,
        transitive: bool,
    ) -> Result<BTreeSet<ResolvedArtifact>> {
        let mut selected: HashSet<String> = HashSet::new();
        let mut level: Vec<Node> = coordinates.iter().map(Node::root).collect();
        for node in &level {
            selected.insert(node.coordinate.management_key());
        }

        let mut depth = 0usize;
        while !level.is_empty() {
            tracing::debug!(depth, artifacts = level.len(), "resolving level");
            self.progress.level_started(depth, level.len());

            let expanded: Vec<Option<EffectiveModel>> = self.pool.install(|| {
                level
                    .par_iter()
                    .map(|node| self.visit(&node.coordinate, transitive))
                    .collect::<Result<Vec<_>>>()
            })?;

            if !transitive {
                break;
            }

            let mut next = Vec::new();
            for (node, model) in level.iter().zip(expanded) {
                let Some(EffectiveModel {
                    management,
                    dependencies,
                    ..
                }) = model
                else {
                    continue;
                };
                let management = if depth == 0 {
                    Arc::new(management)
                } else {
                    Arc::clone(&node.management)
                };

                for dependency in dependencies {
                    let dependency = if depth == 0 {
                        dependency
                    } else {
                        match managed(dependency, &management) {
                            Some(dependency) => dependency,
                            None => continue,
                        }
                    };
                    if node.excludes(&dependency.coordinate) {
                        continue;
                    }
                    let key = dependency.coordinate.management_key();
                    if node.on_path(&key) {
                        let mut chain: Vec<String> =
                            node.path.iter().map(ToString::to_string).collect();
                        chain.push(dependency.coordinate.to_string());
                        return Err(resolve::circular(&chain));
                    }
                    if !selected.insert(key) {
                        continue;
                    }
                    next.push(node.child(dependency, &management));
                }
            }

            level = next;
            depth += 1;
        }

        Ok(self.remote.downloaded())
    }

    /// Ancestor descriptors of `coordinate`, nearest first
    pub fn resolve_parent_chain(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<Vec<ArtifactCoordinate>> {
        let chain = ModelBuilder::new(&self.remote).parent_chain(coordinate)?;
        Ok(chain.into_iter().skip(1).map(|(c, _)| c).collect())
    }

    /// Downloads one coordinate with its descriptor, and builds its model when `transitive`
    fn visit(
        &self,
        coordinate: &ArtifactCoordinate,
        transitive: bool,
    ) -> Result<Option<EffectiveModel>> {
        self.remote.download(coordinate)?;
        if !coordinate.is_descriptor() {
            self.remote.download(&coordinate.pom())?;
        }

        let builder = ModelBuilder::new(&self.remote);
        let model = if transitive {
            Some(builder.build(coordinate)?)
        } else {
            builder.parent_chain(coordinate)?;
            None
        };

        self.progress.artifact_resolved(coordinate);
        Ok(model)
    }
}
