//! Packaging of resolved artifacts into the deliverable archive
//!
//! ## Module Organization
//!
//! - [`resources`]: README and settings template, overridable per product
//! - [`archive`]: Deterministic zip writing and listing
//! - [`digest`]: BLAKE3 digest of the written archive

pub mod archive;
pub mod digest;
pub mod resources;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use crate::domain::{RepositoryData, ResolvedArtifact};
use crate::error::{Result, package};
use crate::request::GenerationRequest;

/// Directory of the working directory holding the tree that gets zipped
pub const STAGING_DIR: &str = "staging";

/// Stages resolved artifacts in repository layout and zips them
pub struct Repackager<'a> {
    request: &'a GenerationRequest,
    working_directory: &'a Path,
}

impl<'a> Repackager<'a> {
    pub fn new(request: &'a GenerationRequest, working_directory: &'a Path) -> Self {
        Self {
            request,
            working_directory,
        }
    }

    /// Root of the staged tree, parent of the top-level directory
    pub fn staging_root(&self) -> PathBuf {
        self.working_directory.join(STAGING_DIR)
    }

    /// Build the archive from `artifacts`
    ///
    /// Artifacts sharing a repository path are staged once. The archive is
    /// only written after the whole tree has been staged.
    pub fn assemble(&self, artifacts: &BTreeSet<ResolvedArtifact>) -> Result<RepositoryData> {
        let top_level_directory = self.request.top_level_directory();
        let top = self.staging_root().join(&top_level_directory);
        std::fs::create_dir_all(&top).map_err(|e| package::io(&top, e))?;

        let mut files = BTreeSet::new();
        for artifact in artifacts {
            let target = top.join(artifact.coordinate.relative_path());
            if files.contains(&target) {
                tracing::debug!(path = %target.display(), "already staged");
                continue;
            }
            stage_file(&artifact.local_path, &target)?;
            files.insert(target);
        }

        for auxiliary in resources::auxiliary_files(
            self.request.configuration_directory.as_deref(),
            &top_level_directory,
        )? {
            let target = top.join(auxiliary.name);
            std::fs::write(&target, &auxiliary.content).map_err(|e| package::io(&target, e))?;
            files.insert(target);
        }

        let repository_zip_path = self.request.repository_zip_path();
        archive::write_zip(&self.staging_root(), &repository_zip_path)?;
        let archive_digest = digest::hash_file(&repository_zip_path)?;

        tracing::info!(
            archive = %repository_zip_path.display(),
            files = files.len(),
            digest = %archive_digest,
            "repository archive written"
        );

        Ok(RepositoryData {
            repository_zip_path,
            files,
            archive_digest,
            working_directory: self.working_directory.to_path_buf(),
        })
    }
}

fn stage_file(source: &Path, target: &Path) -> Result<()> {
    if let Some(parent) = target.parent() {
        std::fs::create_dir_all(parent).map_err(|e| package::io(parent, e))?;
    }
    std::fs::copy(source, target).map_err(|e| package::io(target, e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ArtifactCoordinate;
    use crate::error::RepoError;
    use crate::request::{EXTENSIONS_LIST_URL, GenerationStrategy};
    use tempfile::TempDir;

    fn downloaded(temp: &TempDir, coordinate: ArtifactCoordinate, content: &str) -> ResolvedArtifact {
        let local_path = temp.path().join("downloads").join(coordinate.relative_path());
        std::fs::create_dir_all(local_path.parent().unwrap()).unwrap();
        std::fs::write(&local_path, content).unwrap();
        ResolvedArtifact {
            coordinate,
            local_path,
            origin: "file:///remote/".to_string(),
        }
    }

    fn request(temp: &TempDir) -> GenerationRequest {
        GenerationRequest::new(
            GenerationStrategy::ResolveOnly,
            "rh-sample-",
            temp.path().join("settings.xml"),
            temp.path().join("release"),
        )
        .with_parameter(EXTENSIONS_LIST_URL, "file:///extensions.txt")
    }

    fn artifacts(temp: &TempDir) -> BTreeSet<ResolvedArtifact> {
        let jar = ArtifactCoordinate::new("io.vertx", "vertx-bridge-common", "4.1.0");
        let pom = jar.pom();
        let parent = ArtifactCoordinate::new("org.jboss", "jboss-parent", "37").pom();
        [
            downloaded(temp, jar, "jar bytes"),
            downloaded(temp, pom, "<project/>"),
            downloaded(temp, parent, "<project/>"),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn test_assemble_layout() {
        let temp = TempDir::new().unwrap();
        let work = temp.path().join("work");
        let request = request(&temp);

        let data = Repackager::new(&request, &work)
            .assemble(&artifacts(&temp))
            .unwrap();

        assert_eq!(
            data.repository_zip_path,
            temp.path().join("release/rh-sample-maven-repository.zip")
        );
        assert!(data.repository_zip_path.is_file());
        assert!(data.archive_digest.starts_with(digest::HASH_PREFIX));

        let entries: Vec<String> = data.archive_entries().into_iter().collect();
        assert_eq!(
            entries,
            vec![
                "rh-sample-maven-repository/README.md",
                "rh-sample-maven-repository/example-settings.xml",
                "rh-sample-maven-repository/io/vertx/vertx-bridge-common/4.1.0/vertx-bridge-common-4.1.0.jar",
                "rh-sample-maven-repository/io/vertx/vertx-bridge-common/4.1.0/vertx-bridge-common-4.1.0.pom",
                "rh-sample-maven-repository/org/jboss/jboss-parent/37/jboss-parent-37.pom",
            ]
        );

        let listed = archive::list_entries(&data.repository_zip_path).unwrap();
        for entry in &entries {
            assert!(listed.contains(entry), "missing {entry}");
        }
    }

    #[test]
    fn test_assemble_is_deterministic() {
        let temp = TempDir::new().unwrap();
        let request = request(&temp);
        let artifacts = artifacts(&temp);

        let first = Repackager::new(&request, &temp.path().join("work-a"))
            .assemble(&artifacts)
            .unwrap();
        let first_bytes = std::fs::read(&first.repository_zip_path).unwrap();

        let second = Repackager::new(&request, &temp.path().join("work-b"))
            .assemble(&artifacts)
            .unwrap();
        let second_bytes = std::fs::read(&second.repository_zip_path).unwrap();

        assert_eq!(first_bytes, second_bytes);
        assert_eq!(first.archive_digest, second.archive_digest);
    }

    #[test]
    fn test_missing_download_is_packaging_error() {
        let temp = TempDir::new().unwrap();
        let request = request(&temp);
        let missing = ResolvedArtifact {
            coordinate: ArtifactCoordinate::new("org.acme", "gone", "1.0"),
            local_path: temp.path().join("nowhere.jar"),
            origin: "file:///remote/".to_string(),
        };

        let err = Repackager::new(&request, &temp.path().join("work"))
            .assemble(&[missing].into_iter().collect())
            .unwrap_err();
        assert!(matches!(err, RepoError::PackagingIoError { .. }));
        assert!(!request.repository_zip_path().exists());
    }
}
