//! Effective POM model
//!
//! The effective model of a descriptor is what its dependency list means
//! once inheritance and management are applied:
//!
//! 1. the parent chain is loaded, nearest first
//! 2. properties are merged from the farthest ancestor down, then the
//!    `project.*`, `pom.*` and `parent.*` built-ins are added
//! 3. dependency management is merged child first, then `import`-scoped
//!    BOMs contribute the entries not declared directly
//! 4. dependencies are inherited, interpolated and completed from
//!    management; only compile and runtime, non-optional ones are kept

use std::collections::BTreeMap;

use super::pom::{Dependency, Exclusion, Pom};
use crate::domain::ArtifactCoordinate;
use crate::domain::coordinate::{DEFAULT_TYPE, POM_TYPE};
use crate::error::{Result, resolve};

/// Scopes whose dependencies are needed at runtime
pub(crate) const RUNTIME_SCOPES: [&str; 2] = ["compile", "runtime"];

/// Passes allowed for nested `${...}` expressions
const MAX_INTERPOLATION_DEPTH: usize = 16;

/// Loads descriptors by coordinate
pub trait PomSource: Sync {
    /// Fetches and parses the POM at `coordinate`
    fn load(&self, coordinate: &ArtifactCoordinate) -> Result<Pom>;
}

/// A dependency that takes part in the runtime closure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeDependency {
    pub coordinate: ArtifactCoordinate,
    pub scope: String,
    pub exclusions: Vec<Exclusion>,
}

/// Inheritance and management applied to one descriptor
#[derive(Debug, Clone)]
pub struct EffectiveModel {
    pub coordinate: ArtifactCoordinate,
    pub packaging: String,
    /// Parent descriptors, nearest first
    pub lineage: Vec<ArtifactCoordinate>,
    /// Descriptors imported into dependency management, with their own lineage
    pub imports: Vec<ArtifactCoordinate>,
    pub management: BTreeMap<String, Dependency>,
    pub dependencies: Vec<RuntimeDependency>,
}

/// Builds effective models from a [`PomSource`]
pub struct ModelBuilder<'a> {
    source: &'a dyn PomSource,
}

impl<'a> ModelBuilder<'a> {
    pub fn new(source: &'a dyn PomSource) -> Self {
        Self { source }
    }

    /// The descriptor at `coordinate` followed by its ancestors
    ///
    /// A chain that revisits a descriptor is a [`CircularDependency`].
    ///
    /// [`CircularDependency`]: crate::error::RepoError::CircularDependency
    pub fn parent_chain(
        &self,
        coordinate: &ArtifactCoordinate,
    ) -> Result<Vec<(ArtifactCoordinate, Pom)>> {
        let mut chain: Vec<(ArtifactCoordinate, Pom)> = Vec::new();
        let mut current = coordinate.pom();

        loop {
            if chain.iter().any(|(seen, _)| seen == &current) {
                let mut cycle: Vec<String> = chain.iter().map(|(c, _)| c.to_string()).collect();
                cycle.push(current.to_string());
                return Err(resolve::circular(&cycle));
            }

            let pom = self.source.load(&current)?;
            let parent = pom.parent.clone();
            chain.push((current.clone(), pom));

            let Some(parent) = parent else {
                return Ok(chain);
            };
            if parent.group_id.is_empty() || parent.artifact_id.is_empty() || parent.version.is_empty()
            {
                return Err(resolve::descriptor_malformed(
                    &current,
                    "incomplete <parent> reference",
                ));
            }
            current = ArtifactCoordinate::new(parent.group_id, parent.artifact_id, parent.version)
                .with_kind(POM_TYPE);
        }
    }

    /// Effective model of the descriptor at `coordinate`
    pub fn build(&self, coordinate: &ArtifactCoordinate) -> Result<EffectiveModel> {
        self.build_guarded(&coordinate.pom(), &mut Vec::new())
    }

    fn build_guarded(
        &self,
        coordinate: &ArtifactCoordinate,
        importing: &mut Vec<String>,
    ) -> Result<EffectiveModel> {
        let chain = self.parent_chain(coordinate)?;
        let properties = effective_properties(&chain);
        let expand = |value: &str| interpolate(value, &properties);

        let (mut management, import_declarations) = declared_management(&chain, &expand);

        let mut imports = Vec::new();
        importing.push(coordinate.to_string());
        for declaration in import_declarations {
            let bom = declared_coordinate(coordinate, &declaration)?.pom();
            if importing.contains(&bom.to_string()) {
                let mut cycle = importing.clone();
                cycle.push(bom.to_string());
                return Err(resolve::circular(&cycle));
            }

            let imported = self.build_guarded(&bom, importing)?;
            for (key, managed) in imported.management {
                management.entry(key).or_insert(managed);
            }
            imports.push(bom);
            imports.extend(imported.lineage);
            imports.extend(imported.imports);
        }
        importing.pop();

        let dependencies = runtime_dependencies(coordinate, &chain, &management, &expand)?;

        let packaging = chain
            .first()
            .and_then(|(_, pom)| pom.packaging.clone())
            .map_or_else(|| DEFAULT_TYPE.to_string(), |p| expand(&p));

        Ok(EffectiveModel {
            coordinate: coordinate.clone(),
            packaging,
            lineage: chain.into_iter().skip(1).map(|(c, _)| c).collect(),
            imports,
            management,
            dependencies,
        })
    }
}

fn effective_properties(chain: &[(ArtifactCoordinate, Pom)]) -> BTreeMap<String, String> {
    let mut properties = BTreeMap::new();
    for (_, pom) in chain.iter().rev() {
        properties.extend(pom.properties.iter().map(|(k, v)| (k.clone(), v.clone())));
    }

    let Some((coordinate, pom)) = chain.first() else {
        return properties;
    };
    let parent = pom.parent.as_ref();
    let group_id = pom
        .group_id
        .clone()
        .or_else(|| parent.map(|p| p.group_id.clone()))
        .unwrap_or_else(|| coordinate.group_id.clone());
    let version = pom
        .version
        .clone()
        .or_else(|| parent.map(|p| p.version.clone()))
        .unwrap_or_else(|| coordinate.version.clone());
    let artifact_id = pom
        .artifact_id
        .clone()
        .unwrap_or_else(|| coordinate.artifact_id.clone());
    let packaging = pom
        .packaging
        .clone()
        .unwrap_or_else(|| DEFAULT_TYPE.to_string());

    for prefix in ["project", "pom"] {
        properties.insert(format!("{prefix}.groupId"), group_id.clone());
        properties.insert(format!("{prefix}.artifactId"), artifact_id.clone());
        properties.insert(format!("{prefix}.version"), version.clone());
        properties.insert(format!("{prefix}.packaging"), packaging.clone());
    }
    if let Some(parent) = parent {
        for prefix in ["project.parent", "parent"] {
            properties.insert(format!("{prefix}.groupId"), parent.group_id.clone());
            properties.insert(format!("{prefix}.artifactId"), parent.artifact_id.clone());
            properties.insert(format!("{prefix}.version"), parent.version.clone());
        }
    }
    properties
}

/// Replaces `${name}` expressions; unknown names are left as written
pub fn interpolate(value: &str, properties: &BTreeMap<String, String>) -> String {
    let mut current = value.to_string();
    for _ in 0..MAX_INTERPOLATION_DEPTH {
        let next = interpolate_once(&current, properties);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

fn interpolate_once(value: &str, properties: &BTreeMap<String, String>) -> String {
    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(start) = rest.find("${") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        match after.find('}') {
            Some(end) => {
                let name = &after[..end];
                match properties.get(name) {
                    Some(replacement) => out.push_str(replacement),
                    None => {
                        out.push_str("${");
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[end + 1..];
            }
            None => {
                out.push_str(&rest[start..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

fn interpolated(dependency: &Dependency, expand: &dyn Fn(&str) -> String) -> Dependency {
    let opt = |value: &Option<String>| value.as_deref().map(expand);
    Dependency {
        group_id: expand(&dependency.group_id),
        artifact_id: expand(&dependency.artifact_id),
        version: opt(&dependency.version),
        kind: opt(&dependency.kind),
        classifier: opt(&dependency.classifier),
        scope: opt(&dependency.scope),
        optional: opt(&dependency.optional),
        exclusions: dependency
            .exclusions
            .iter()
            .map(|e| Exclusion {
                group_id: expand(&e.group_id),
                artifact_id: expand(&e.artifact_id),
            })
            .collect(),
    }
}

/// `group:artifact:type[:classifier]` of a declared dependency
fn management_key(dependency: &Dependency) -> String {
    let kind = dependency.kind.as_deref().unwrap_or(DEFAULT_TYPE);
    match dependency.classifier.as_deref().filter(|c| !c.is_empty()) {
        Some(classifier) => format!(
            "{}:{}:{}:{}",
            dependency.group_id, dependency.artifact_id, kind, classifier
        ),
        None => format!("{}:{}:{}", dependency.group_id, dependency.artifact_id, kind),
    }
}

fn is_import(dependency: &Dependency) -> bool {
    dependency.scope.as_deref() == Some("import") && dependency.kind.as_deref() == Some(POM_TYPE)
}

/// Declared management entries (child first) and the BOM imports, in order
fn declared_management(
    chain: &[(ArtifactCoordinate, Pom)],
    expand: &dyn Fn(&str) -> String,
) -> (BTreeMap<String, Dependency>, Vec<Dependency>) {
    let mut management = BTreeMap::new();
    let mut imports: Vec<Dependency> = Vec::new();

    for (_, pom) in chain {
        for declared in &pom.dependency_management {
            let dependency = interpolated(declared, expand);
            if is_import(&dependency) {
                if !imports
                    .iter()
                    .any(|i| management_key(i) == management_key(&dependency))
                {
                    imports.push(dependency);
                }
            } else {
                management
                    .entry(management_key(&dependency))
                    .or_insert(dependency);
            }
        }
    }
    (management, imports)
}

fn runtime_dependencies(
    coordinate: &ArtifactCoordinate,
    chain: &[(ArtifactCoordinate, Pom)],
    management: &BTreeMap<String, Dependency>,
    expand: &dyn Fn(&str) -> String,
) -> Result<Vec<RuntimeDependency>> {
    let mut seen: Vec<String> = Vec::new();
    let mut dependencies = Vec::new();

    for (_, pom) in chain {
        for declared in &pom.dependencies {
            let mut dependency = interpolated(declared, expand);
            let key = management_key(&dependency);
            if seen.contains(&key) {
                continue;
            }
            seen.push(key.clone());

            if let Some(managed) = management.get(&key) {
                if dependency.version.is_none() {
                    dependency.version.clone_from(&managed.version);
                }
                if dependency.scope.is_none() {
                    dependency.scope.clone_from(&managed.scope);
                }
                if dependency.optional.is_none() {
                    dependency.optional.clone_from(&managed.optional);
                }
                if dependency.exclusions.is_empty() {
                    dependency.exclusions.clone_from(&managed.exclusions);
                }
            }

            let scope = dependency
                .scope
                .clone()
                .unwrap_or_else(|| RUNTIME_SCOPES[0].to_string());
            let optional = dependency
                .optional
                .as_deref()
                .is_some_and(|o| o.eq_ignore_ascii_case("true"));
            if optional || !RUNTIME_SCOPES.contains(&scope.as_str()) {
                continue;
            }

            let resolved = declared_coordinate(coordinate, &dependency)?;
            dependencies.push(RuntimeDependency {
                coordinate: resolved,
                scope,
                exclusions: dependency.exclusions,
            });
        }
    }
    Ok(dependencies)
}

/// Coordinate of a declared dependency, which must be fully resolved
fn declared_coordinate(
    owner: &ArtifactCoordinate,
    dependency: &Dependency,
) -> Result<ArtifactCoordinate> {
    let version = dependency.version.clone().unwrap_or_default();
    let parts = [&dependency.group_id, &dependency.artifact_id, &version];

    if parts.iter().any(|p| p.is_empty()) {
        return Err(resolve::descriptor_malformed(
            owner,
            format!(
                "dependency {}:{} has no version",
                dependency.group_id, dependency.artifact_id
            ),
        ));
    }
    if let Some(unresolved) = parts.iter().find(|p| p.contains("${")) {
        return Err(resolve::descriptor_malformed(
            owner,
            format!("unresolved expression '{unresolved}'"),
        ));
    }

    Ok(ArtifactCoordinate::new(
        dependency.group_id.clone(),
        dependency.artifact_id.clone(),
        version,
    )
    .with_kind(dependency.kind.clone().unwrap_or_else(|| DEFAULT_TYPE.to_string()))
    .with_classifier(dependency.classifier.clone().unwrap_or_default()))
}
