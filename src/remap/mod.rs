//! Community to productized version remapping
//!
//! Every root coordinate is looked up in a [`VersionCatalog`]. The result is a
//! [`VersionOverrideMap`] built once per run and read-only afterwards.
//!
//! Rules:
//! - a version that already carries the productized marker passes through
//!   without a catalog query
//! - no catalog entry means the coordinate keeps its own version
//! - an unversioned coordinate needs a catalog entry

pub mod catalog;

pub use catalog::{DaVersionCatalog, StaticVersionCatalog, VersionCatalog};

use std::collections::{BTreeMap, BTreeSet};

use crate::domain::{ArtifactCoordinate, version};
use crate::error::{Result, resolve};

/// Coordinate to productized version, for one run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VersionOverrideMap {
    versions: BTreeMap<ArtifactCoordinate, String>,
}

impl VersionOverrideMap {
    pub fn get(&self, coordinate: &ArtifactCoordinate) -> Option<&str> {
        self.versions.get(coordinate).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.versions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.versions.is_empty()
    }

    /// The root coordinates with their remapped versions applied
    pub fn remapped_coordinates(&self) -> BTreeSet<ArtifactCoordinate> {
        self.versions
            .iter()
            .map(|(coordinate, version)| coordinate.with_version(version))
            .collect()
    }
}

/// Applies a catalog to root coordinates
pub struct VersionRemapper<'a> {
    catalog: &'a dyn VersionCatalog,
}

impl<'a> VersionRemapper<'a> {
    pub fn new(catalog: &'a dyn VersionCatalog) -> Self {
        Self { catalog }
    }

    /// Builds the override map for `coordinates`
    pub fn remap(&self, coordinates: &BTreeSet<ArtifactCoordinate>) -> Result<VersionOverrideMap> {
        let mut versions = BTreeMap::new();
        for coordinate in coordinates {
            let target = self.remap_one(coordinate)?;
            if target != coordinate.version {
                tracing::debug!(
                    artifact = %coordinate.ga_key(),
                    from = %coordinate.version,
                    to = %target,
                    "remapped version"
                );
            }
            versions.insert(coordinate.clone(), target);
        }
        Ok(VersionOverrideMap { versions })
    }

    fn remap_one(&self, coordinate: &ArtifactCoordinate) -> Result<String> {
        if coordinate.has_version() && version::is_productized(&coordinate.version) {
            return Ok(coordinate.version.clone());
        }

        let productized = self.catalog.lookup_productized_version(
            &coordinate.group_id,
            &coordinate.artifact_id,
            &coordinate.version,
        )?;

        match productized {
            Some(version) => Ok(version),
            None if coordinate.has_version() => Ok(coordinate.version.clone()),
            None => Err(resolve::not_found(
                coordinate.ga_key(),
                "no version available",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoError;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counting {
        inner: StaticVersionCatalog,
        queries: AtomicUsize,
    }

    impl VersionCatalog for Counting {
        fn productized_versions(&self, g: &str, a: &str, v: &str) -> Result<Vec<String>> {
            self.queries.fetch_add(1, Ordering::SeqCst);
            self.inner.productized_versions(g, a, v)
        }
    }

    fn catalog() -> Counting {
        Counting {
            inner: StaticVersionCatalog::default()
                .with_entry("io.vertx:vertx-core", ["4.1.0.redhat-00001", "4.1.0.redhat-00004"])
                .with_entry("io.vertx:vertx-web", ["4.1.0.redhat-00002"]),
            queries: AtomicUsize::new(0),
        }
    }

    fn coordinates(list: &[&str]) -> BTreeSet<ArtifactCoordinate> {
        list.iter().map(|c| c.parse().unwrap()).collect()
    }

    #[test]
    fn test_catalog_entry_picks_latest() {
        let catalog = catalog();
        let map = VersionRemapper::new(&catalog)
            .remap(&coordinates(&["io.vertx:vertx-core:4.1.0"]))
            .unwrap();
        let remapped = map.remapped_coordinates();
        assert_eq!(remapped.iter().next().unwrap().version, "4.1.0.redhat-00004");
    }

    #[test]
    fn test_missing_entry_passes_through() {
        let catalog = catalog();
        let roots = coordinates(&["io.vertx:vertx-bridge-common:4.1.0"]);
        let map = VersionRemapper::new(&catalog).remap(&roots).unwrap();
        assert_eq!(map.remapped_coordinates(), roots);
    }

    #[test]
    fn test_productized_version_skips_catalog() {
        let catalog = catalog();
        let roots = coordinates(&["io.vertx:vertx-core:4.0.3.redhat-00007"]);
        let map = VersionRemapper::new(&catalog).remap(&roots).unwrap();
        assert_eq!(map.remapped_coordinates(), roots);
        assert_eq!(catalog.queries.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_unversioned_coordinate() {
        let catalog = catalog();
        let map = VersionRemapper::new(&catalog)
            .remap(&coordinates(&["io.vertx:vertx-web"]))
            .unwrap();
        assert_eq!(map.len(), 1);
        assert_eq!(
            map.remapped_coordinates().iter().next().unwrap().version,
            "4.1.0.redhat-00002"
        );

        let err = VersionRemapper::new(&catalog)
            .remap(&coordinates(&["io.vertx:vertx-unknown"]))
            .unwrap_err();
        assert!(matches!(err, RepoError::ArtifactNotFound { ref reason, .. } if reason == "no version available"));
    }

    #[test]
    fn test_remap_is_repeatable() {
        let catalog = catalog();
        let roots = coordinates(&["io.vertx:vertx-core:4.1.0", "io.vertx:vertx-web"]);
        let remapper = VersionRemapper::new(&catalog);
        assert_eq!(remapper.remap(&roots).unwrap(), remapper.remap(&roots).unwrap());
    }
}
