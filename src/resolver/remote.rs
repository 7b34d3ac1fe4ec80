//! Downloads through the remote repository chain
//!
//! Each coordinate is downloaded at most once per run. Concurrent requests
//! for the same coordinate wait for the first one and share its outcome.

use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, OnceLock, PoisonError};

use super::model::PomSource;
use super::pom::Pom;
use crate::config::{RemoteRepository, ResolverSettings};
use crate::domain::{ArtifactCoordinate, ResolvedArtifact};
use crate::error::{Result, package, resolve};
use crate::transport::{FetchOutcome, RemoteFetch, RetryPolicy};

type Slot = Arc<OnceLock<Result<ResolvedArtifact>>>;

/// Downloads artifacts into a run-local directory
pub struct RemoteResolver {
    repositories: Vec<RemoteRepository>,
    fetcher: Arc<dyn RemoteFetch>,
    retry: RetryPolicy,
    download_dir: PathBuf,
    slots: Mutex<HashMap<ArtifactCoordinate, Slot>>,
}

impl RemoteResolver {
    pub fn new(
        settings: &ResolverSettings,
        fetcher: Arc<dyn RemoteFetch>,
        retry: RetryPolicy,
        download_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            repositories: settings.repositories().to_vec(),
            fetcher,
            retry,
            download_dir: download_dir.into(),
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Downloads `coordinate`, or returns the outcome of an earlier download
    pub fn download(&self, coordinate: &ArtifactCoordinate) -> Result<ResolvedArtifact> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(slots.entry(coordinate.clone()).or_default())
        };
        slot.get_or_init(|| self.fetch(coordinate)).clone()
    }

    /// Every artifact downloaded successfully so far
    pub fn downloaded(&self) -> BTreeSet<ResolvedArtifact> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots
            .values()
            .filter_map(|slot| slot.get().and_then(|outcome| outcome.as_ref().ok()))
            .cloned()
            .collect()
    }

    fn fetch(&self, coordinate: &ArtifactCoordinate) -> Result<ResolvedArtifact> {
        if !coordinate.has_version() {
            return Err(resolve::not_found(coordinate, "no version available"));
        }

        let relative_path = coordinate.relative_path();
        for repository in &self.repositories {
            let url = repository.url_of(&relative_path);
            let bytes = match self.retry.run(&url, || self.fetcher.get(&url))? {
                FetchOutcome::Found(bytes) => bytes,
                FetchOutcome::NotFound => {
                    tracing::trace!(artifact = %coordinate, repository = %repository.id, "not in repository");
                    continue;
                }
            };

            let local_path = self.download_dir.join(&relative_path);
            store(&local_path, &bytes)?;
            tracing::debug!(
                artifact = %coordinate,
                repository = %repository.id,
                bytes = bytes.len(),
                "downloaded"
            );
            return Ok(ResolvedArtifact {
                coordinate: coordinate.clone(),
                local_path,
                origin: repository.url.clone(),
            });
        }

        let searched: Vec<&str> = self.repositories.iter().map(|r| r.id.as_str()).collect();
        Err(resolve::not_found(
            coordinate,
            format!("absent from repositories [{}]", searched.join(", ")),
        ))
    }
}

fn store(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| package::io(parent, e))?;
    }
    std::fs::write(path, bytes).map_err(|e| package::io(path, e))
}

impl PomSource for RemoteResolver {
    fn load(&self, coordinate: &ArtifactCoordinate) -> Result<Pom> {
        let artifact = self.download(coordinate)?;
        let content = std::fs::read_to_string(&artifact.local_path)
            .map_err(|e| resolve::descriptor_malformed(coordinate, e.to_string()))?;
        Pom::parse(&content).map_err(|reason| resolve::descriptor_malformed(coordinate, reason))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoError;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tempfile::TempDir;

    /// Serves fixed bodies by URL and counts requests
    struct Remote {
        files: HashMap<String, Vec<u8>>,
        requests: AtomicUsize,
    }

    impl RemoteFetch for Remote {
        fn get(&self, url: &str) -> Result<FetchOutcome> {
            self.requests.fetch_add(1, Ordering::SeqCst);
            Ok(match self.files.get(url) {
                Some(body) => FetchOutcome::Found(body.clone()),
                None => FetchOutcome::NotFound,
            })
        }
    }

    fn settings() -> ResolverSettings {
        ResolverSettings::with_repositories(vec![
            RemoteRepository::new("first", "http://first/"),
            RemoteRepository::new("second", "http://second/"),
        ])
    }

    fn resolver(temp: &TempDir, files: &[(&str, &str)]) -> (RemoteResolver, Arc<Remote>) {
        let remote = Arc::new(Remote {
            files: files
                .iter()
                .map(|(u, b)| ((*u).to_string(), b.as_bytes().to_vec()))
                .collect(),
            requests: AtomicUsize::new(0),
        });
        let resolver = RemoteResolver::new(
            &settings(),
            remote.clone(),
            RetryPolicy::new(1, Duration::ZERO),
            temp.path().join("downloads"),
        );
        (resolver, remote)
    }

    #[test]
    fn test_falls_through_to_next_repository() {
        let temp = TempDir::new().unwrap();
        let (resolver, _) = resolver(&temp, &[("http://second/g/a/1/a-1.jar", "jar")]);

        let artifact = resolver.download(&ArtifactCoordinate::new("g", "a", "1")).unwrap();
        assert_eq!(artifact.origin, "http://second/");
        assert_eq!(std::fs::read_to_string(&artifact.local_path).unwrap(), "jar");
        assert!(artifact.local_path.ends_with("downloads/g/a/1/a-1.jar"));
    }

    #[test]
    fn test_downloads_once_per_coordinate() {
        let temp = TempDir::new().unwrap();
        let (resolver, remote) = resolver(&temp, &[("http://first/g/a/1/a-1.pom", "<project/>")]);
        let pom = ArtifactCoordinate::new("g", "a", "1").pom();

        resolver.load(&pom).unwrap();
        resolver.load(&pom).unwrap();
        assert_eq!(remote.requests.load(Ordering::SeqCst), 1);
        assert_eq!(resolver.downloaded().len(), 1);
    }

    #[test]
    fn test_absent_everywhere_is_not_found() {
        let temp = TempDir::new().unwrap();
        let (resolver, _) = resolver(&temp, &[]);
        let err = resolver.download(&ArtifactCoordinate::new("g", "a", "1")).unwrap_err();
        assert!(matches!(err, RepoError::ArtifactNotFound { ref reason, .. } if reason.contains("first, second")));
        assert!(resolver.downloaded().is_empty());
    }

    #[test]
    fn test_malformed_descriptor() {
        let temp = TempDir::new().unwrap();
        let (resolver, _) = resolver(&temp, &[("http://first/g/a/1/a-1.pom", "<html><body>")]);
        let err = resolver.load(&ArtifactCoordinate::new("g", "a", "1").pom()).unwrap_err();
        assert!(matches!(err, RepoError::DescriptorMalformed { .. }));
    }
}
