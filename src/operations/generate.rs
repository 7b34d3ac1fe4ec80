//! Repository generation workflow
//!
//! [`RepoManager::prepare`] runs one assembly through its stages:
//!
//! ```text
//! INIT -> SOURCING -> REMAPPING -> RESOLVING -> PACKAGING -> DONE
//!   \________\___________\____________\____________\-> FAILED
//! ```
//!
//! Each stage consumes the value produced by the previous one. The first
//! fatal error ends the run and is reported with its stage. Nothing is
//! packaged after a failure and the working directory is kept.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::ResolverSettings;
use crate::domain::{ArtifactCoordinate, RepositoryData, ResolvedArtifact};
use crate::error::{AssemblyFailure, Result, Stage, package};
use crate::package::Repackager;
use crate::remap::{VersionCatalog, VersionRemapper};
use crate::request::GenerationRequest;
use crate::resolver::{ArtifactResolver, NoProgress, RemoteResolver, ResolveProgress};
use crate::source::{self, BuildInfoCollector};
use crate::temp;
use crate::transport::{RemoteFetch, RetryPolicy};

/// Directory of the working directory receiving downloads
pub const DOWNLOADS_DIR: &str = "downloads";

/// Output of INIT
struct Prepared {
    working_directory: PathBuf,
    settings: ResolverSettings,
}

/// Assembles deliverable repositories
///
/// Collaborators are injected so that runs can be driven against fakes.
pub struct RepoManager {
    fetcher: Arc<dyn RemoteFetch>,
    collector: Arc<dyn BuildInfoCollector>,
    catalog: Arc<dyn VersionCatalog>,
    progress: Arc<dyn ResolveProgress>,
}

impl RepoManager {
    pub fn new(
        fetcher: Arc<dyn RemoteFetch>,
        collector: Arc<dyn BuildInfoCollector>,
        catalog: Arc<dyn VersionCatalog>,
    ) -> Self {
        Self {
            fetcher,
            collector,
            catalog,
            progress: Arc::new(NoProgress),
        }
    }

    #[must_use]
    pub fn with_progress(mut self, progress: Arc<dyn ResolveProgress>) -> Self {
        self.progress = progress;
        self
    }

    /// Runs one assembly and returns the written repository
    pub fn prepare(
        &self,
        request: &GenerationRequest,
    ) -> std::result::Result<RepositoryData, AssemblyFailure> {
        let _run = tracing::info_span!("generate", strategy = %request.strategy).entered();
        let retry = RetryPolicy::from_tuning(&request.tuning);

        let prepared = run_stage(Stage::Init, || self.init(request))?;

        let roots = run_stage(Stage::Sourcing, || {
            let roots = source::fetch_root_coordinates(
                request,
                self.fetcher.as_ref(),
                self.collector.as_ref(),
                &retry,
            )?;
            tracing::info!(roots = roots.len(), "root coordinates sourced");
            Ok(roots)
        })
        .inspect_err(|_| keep(&prepared))?;

        let coordinates = run_stage(Stage::Remapping, || {
            let overrides = VersionRemapper::new(self.catalog.as_ref()).remap(&roots)?;
            tracing::info!(coordinates = overrides.len(), "versions remapped");
            Ok(overrides.remapped_coordinates())
        })
        .inspect_err(|_| keep(&prepared))?;

        let resolved = run_stage(Stage::Resolving, || {
            self.resolve(request, &prepared, retry, &coordinates)
        })
        .inspect_err(|_| keep(&prepared))?;

        let repository = run_stage(Stage::Packaging, || {
            Repackager::new(request, &prepared.working_directory).assemble(&resolved)
        })
        .inspect_err(|_| keep(&prepared))?;

        tracing::info!(stage = %Stage::Done, archive = %repository.repository_zip_path.display(), "repository generated");
        Ok(repository)
    }

    fn init(&self, request: &GenerationRequest) -> Result<Prepared> {
        request.validate()?;

        let work_root = request.work_root.clone().unwrap_or_else(temp::temp_dir_base);
        let working_directory =
            temp::create_work_dir(&work_root).map_err(|e| package::io(&work_root, e))?;
        tracing::debug!(path = %working_directory.display(), "working directory created");

        let settings = ResolverSettings::load(&request.settings_path)?;
        for repository in settings.repositories() {
            tracing::debug!(id = %repository.id, url = %repository.url, "remote repository");
        }

        Ok(Prepared {
            working_directory,
            settings,
        })
    }

    fn resolve(
        &self,
        request: &GenerationRequest,
        prepared: &Prepared,
        retry: RetryPolicy,
        coordinates: &BTreeSet<ArtifactCoordinate>,
    ) -> Result<BTreeSet<ResolvedArtifact>> {
        let remote = RemoteResolver::new(
            &prepared.settings,
            Arc::clone(&self.fetcher),
            retry,
            prepared.working_directory.join(DOWNLOADS_DIR),
        );
        let resolver =
            ArtifactResolver::new(remote, request.tuning.workers, Arc::clone(&self.progress))?;

        let resolved = resolver.resolve(coordinates, request.strategy.transitive())?;
        tracing::info!(files = resolved.len(), "artifacts resolved");
        Ok(resolved)
    }
}

fn run_stage<T>(
    stage: Stage,
    body: impl FnOnce() -> Result<T>,
) -> std::result::Result<T, AssemblyFailure> {
    tracing::info!(stage = %stage, "stage started");
    body().map_err(|error| {
        tracing::error!(stage = %stage, error = %error, "stage failed");
        AssemblyFailure::new(stage, error)
    })
}

fn keep(prepared: &Prepared) {
    tracing::info!(
        stage = %Stage::Failed,
        path = %prepared.working_directory.display(),
        "working directory kept for inspection"
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoError;
    use crate::remap::StaticVersionCatalog;
    use crate::request::{EXTENSIONS_LIST_URL, GenerationStrategy};
    use crate::source::StaticBuildInfoCollector;
    use crate::transport::FetchOutcome;
    use std::collections::HashMap;
    use tempfile::TempDir;

    const LIST_URL: &str = "mem://lists/extensions.txt";

    /// Remote repository at `mem://repo/` plus the extensions list
    #[derive(Default)]
    struct Remote {
        files: HashMap<String, Vec<u8>>,
    }

    impl Remote {
        fn file(mut self, url: &str, content: &str) -> Self {
            self.files.insert(url.to_string(), content.as_bytes().to_vec());
            self
        }

        fn pom(self, coordinate: &str, parent: Option<&str>, dependencies: &[&str]) -> Self {
            let c: ArtifactCoordinate = coordinate.parse().unwrap();
            let parent = parent.map_or_else(String::new, |p| {
                let p: ArtifactCoordinate = p.parse().unwrap();
                format!(
                    "<parent><groupId>{}</groupId><artifactId>{}</artifactId><version>{}</version></parent>",
                    p.group_id, p.artifact_id, p.version
                )
            });
            let dependencies: String = dependencies
                .iter()
                .map(|d| {
                    let d: ArtifactCoordinate = d.parse().unwrap();
                    format!(
                        "<dependency><groupId>{}</groupId><artifactId>{}</artifactId><version>{}</version></dependency>",
                        d.group_id, d.artifact_id, d.version
                    )
                })
                .collect();
            let xml = format!(
                "<project>{parent}<groupId>{}</groupId><artifactId>{}</artifactId><version>{}</version><dependencies>{dependencies}</dependencies></project>",
                c.group_id, c.artifact_id, c.version
            );
            let url = format!("mem://repo/{}", c.pom().relative_path());
            self.file(&url, &xml)
        }

        fn jar(self, coordinate: &str) -> Self {
            let c: ArtifactCoordinate = coordinate.parse().unwrap();
            let url = format!("mem://repo/{}", c.relative_path());
            self.file(&url, "jar")
        }
    }

    impl RemoteFetch for Remote {
        fn get(&self, url: &str) -> Result<FetchOutcome> {
            Ok(self
                .files
                .get(url)
                .map_or(FetchOutcome::NotFound, |b| FetchOutcome::Found(b.clone())))
        }
    }

    fn settings(temp: &TempDir) -> PathBuf {
        let path = temp.path().join("settings.xml");
        std::fs::write(
            &path,
            r"<settings><profiles><profile><id>mem</id>
                <activation><activeByDefault>true</activeByDefault></activation>
                <repositories><repository><id>mem</id><url>mem://repo/</url></repository></repositories>
              </profile></profiles></settings>",
        )
        .unwrap();
        path
    }

    fn resolve_only(temp: &TempDir) -> GenerationRequest {
        GenerationRequest::new(
            GenerationStrategy::ResolveOnly,
            "rh-sample-",
            settings(temp),
            temp.path().join("release"),
        )
        .with_parameter(EXTENSIONS_LIST_URL, LIST_URL)
        .with_work_root(temp.path().join("work"))
    }

    fn vertx_remote() -> Remote {
        Remote::default()
            .file(LIST_URL, "io.vertx:vertx-bridge-common\n")
            .pom("org.jboss:jboss-parent:37", None, &[])
            .pom(
                "io.vertx:vertx-bridge-common:4.1.0",
                Some("org.jboss:jboss-parent:37"),
                &["io.vertx:vertx-core:4.1.0"],
            )
            .jar("io.vertx:vertx-bridge-common:4.1.0")
    }

    fn manager(remote: Remote, catalog: StaticVersionCatalog) -> RepoManager {
        RepoManager::new(
            Arc::new(remote),
            Arc::new(StaticBuildInfoCollector::default()),
            Arc::new(catalog),
        )
    }

    #[test]
    fn test_resolve_only_run() {
        let temp = TempDir::new().unwrap();
        let catalog = StaticVersionCatalog::default()
            .with_entry("io.vertx:vertx-bridge-common", ["4.1.0"]);

        let data = manager(vertx_remote(), catalog)
            .prepare(&resolve_only(&temp))
            .unwrap();

        assert_eq!(
            data.repository_zip_path,
            temp.path().join("release/rh-sample-maven-repository.zip")
        );
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
        assert!(data.working_directory.starts_with(temp.path().join("work")));
    }

    #[test]
    fn test_generate_run_follows_dependencies() {
        let temp = TempDir::new().unwrap();
        let remote = Remote::default()
            .pom("org.acme:core:1.0.0.redhat-00001", None, &["org.acme:util:2.0"])
            .jar("org.acme:core:1.0.0.redhat-00001")
            .pom("org.acme:util:2.0", None, &[])
            .jar("org.acme:util:2.0");
        let collector = StaticBuildInfoCollector::default().with_build(
            "1234",
            ["org.acme:core:1.0.0.redhat-00001".parse().unwrap()],
        );

        let request = GenerationRequest::new(
            GenerationStrategy::Generate,
            "rh-acme-",
            settings(&temp),
            temp.path().join("release"),
        )
        .with_source_builds(vec![crate::source::CompletedBuild::new("1234")])
        .with_work_root(temp.path().join("work"));

        let data = RepoManager::new(
            Arc::new(remote),
            Arc::new(collector),
            Arc::new(StaticVersionCatalog::default()),
        )
        .prepare(&request)
        .unwrap();

        let entries = data.archive_entries();
        assert!(entries.contains("rh-acme-maven-repository/org/acme/util/2.0/util-2.0.jar"));
        assert_eq!(entries.len(), 6);
    }

    #[test]
    fn test_invalid_request_fails_in_init() {
        let temp = TempDir::new().unwrap();
        let request = GenerationRequest::new(
            GenerationStrategy::ResolveOnly,
            "rh-sample-",
            settings(&temp),
            temp.path().join("release"),
        );

        let failure = manager(vertx_remote(), StaticVersionCatalog::default())
            .prepare(&request)
            .unwrap_err();
        assert_eq!(failure.stage, Stage::Init);
        assert!(matches!(failure.error, RepoError::InvalidRequest { .. }));
    }

    #[test]
    fn test_missing_artifact_fails_without_archive() {
        let temp = TempDir::new().unwrap();
        let remote = Remote::default().file(LIST_URL, "org.acme:absent:1.0\n");
        let request = resolve_only(&temp);

        let failure = manager(remote, StaticVersionCatalog::default())
            .prepare(&request)
            .unwrap_err();
        assert_eq!(failure.stage, Stage::Resolving);
        assert!(matches!(failure.error, RepoError::ArtifactNotFound { .. }));
        assert!(!request.repository_zip_path().exists());

        let kept: Vec<_> = std::fs::read_dir(temp.path().join("work")).unwrap().collect();
        assert_eq!(kept.len(), 1);
    }

    #[test]
    fn test_unavailable_list_fails_in_sourcing() {
        let temp = TempDir::new().unwrap();
        let failure = manager(Remote::default(), StaticVersionCatalog::default())
            .prepare(&resolve_only(&temp))
            .unwrap_err();
        assert_eq!(failure.stage, Stage::Sourcing);
        assert!(matches!(failure.error, RepoError::SourceUnavailable { .. }));
    }

    #[test]
    fn test_unversioned_root_without_catalog_entry_fails_in_remapping() {
        let temp = TempDir::new().unwrap();
        let failure = manager(vertx_remote(), StaticVersionCatalog::default())
            .prepare(&resolve_only(&temp))
            .unwrap_err();
        assert_eq!(failure.stage, Stage::Remapping);
        assert!(matches!(failure.error, RepoError::ArtifactNotFound { .. }));
    }
}
