//! Product configuration (repogen.yaml) data structures
//!
//! ```yaml
//! product:
//!   name: sample
//! outputDirectory: /tmp/resolveRepoTest
//! settingsPath: settings.xml
//! repositoryGeneration:
//!   strategy: RESOLVE_ONLY
//!   parameters:
//!     extensionsListUrl: https://example.com/extensions.txt
//! ```
//!
//! Relative paths are resolved against the directory holding the file, which
//! is also where `repository-README.md` and `repository-example-settings.xml`
//! overrides are looked up.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{CONFIG_ENV, CONFIG_FILE};
use crate::domain::ArtifactCoordinate;
use crate::error::{Result, config, request};
use crate::remap::StaticVersionCatalog;
use crate::request::{GenerationRequest, GenerationStrategy, ResolverTuning, default_zip_name};
use crate::source::{CompletedBuild, StaticBuildInfoCollector};

/// Product configuration (repogen.yaml)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepogenConfig {
    pub product: ProductConfig,

    /// Defaults to `rh-<product name>-`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_level_directory_prefix: Option<String>,

    pub output_directory: PathBuf,

    /// Defaults to `<prefix>maven-repository.zip`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_zip_name: Option<String>,

    pub settings_path: PathBuf,

    /// Parent of run working directories; the system temp dir when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub work_root: Option<PathBuf>,

    pub repository_generation: RepositoryGenerationConfig,

    #[serde(default)]
    pub version_catalog: VersionCatalogConfig,

    #[serde(default)]
    pub resolver: ResolverConfig,

    /// Directory of the file the configuration was read from
    #[serde(skip)]
    pub base_directory: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProductConfig {
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RepositoryGenerationConfig {
    pub strategy: String,

    #[serde(default)]
    pub parameters: BTreeMap<String, String>,

    #[serde(default)]
    pub source_builds: Vec<SourceBuildConfig>,
}

/// A completed build and the artifacts it produced
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceBuildConfig {
    pub id: String,

    /// Coordinates in `g:a[:type[:classifier]]:v` form
    #[serde(default)]
    pub artifacts: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VersionCatalogConfig {
    /// `g:a[:v]` to the productized versions available for it
    #[serde(default)]
    pub overrides: BTreeMap<String, Vec<String>>,

    /// Dependency-analysis service queried when set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolverConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workers: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_attempts: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub backoff_millis: Option<u64>,
}

impl ResolverConfig {
    pub fn tuning(&self) -> ResolverTuning {
        let defaults = ResolverTuning::default();
        ResolverTuning {
            workers: self.workers.unwrap_or(defaults.workers),
            timeout: self
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
            max_attempts: self.max_attempts.unwrap_or(defaults.max_attempts),
            backoff: self
                .backoff_millis
                .map_or(defaults.backoff, Duration::from_millis),
        }
    }
}

impl RepogenConfig {
    /// Parse configuration from YAML string
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load configuration from a file, remembering its directory
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                config::not_found(path)
            } else {
                config::parse_failed(path, e)
            }
        })?;
        let mut parsed: Self =
            serde_yaml::from_str(&content).map_err(|e| config::parse_failed(path, e))?;

        let path = dunce::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
        parsed.base_directory = path.parent().map(Path::to_path_buf).unwrap_or_default();
        Ok(parsed)
    }

    /// `rh-<product>-` unless configured
    pub fn top_level_directory_prefix(&self) -> String {
        self.top_level_directory_prefix
            .clone()
            .unwrap_or_else(|| format!("rh-{}-", self.product.name))
    }

    fn resolve_path(&self, path: &Path) -> PathBuf {
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_directory.join(path)
        }
    }

    /// Builds the generation request for one run
    ///
    /// Rejects unknown strategies and unparsable coordinates; the remaining
    /// checks happen when the run initializes.
    pub fn to_request(&self) -> Result<GenerationRequest> {
        let strategy: GenerationStrategy = self.repository_generation.strategy.parse()?;
        let prefix = self.top_level_directory_prefix();

        let builds = self
            .repository_generation
            .source_builds
            .iter()
            .map(|build| CompletedBuild::new(&build.id))
            .collect();

        let mut request = GenerationRequest::new(
            strategy,
            prefix.clone(),
            self.resolve_path(&self.settings_path),
            self.resolve_path(&self.output_directory),
        )
        .with_source_builds(builds)
        .with_zip_name(
            self.repository_zip_name
                .clone()
                .unwrap_or_else(|| default_zip_name(&prefix)),
        )
        .with_configuration_directory(&self.base_directory)
        .with_tuning(self.resolver.tuning());

        if let Some(work_root) = &self.work_root {
            request = request.with_work_root(self.resolve_path(work_root));
        }
        for (key, value) in &self.repository_generation.parameters {
            request = request.with_parameter(key, value);
        }
        Ok(request)
    }

    /// Build info recorded for the configured source builds
    pub fn build_info_collector(&self) -> Result<StaticBuildInfoCollector> {
        let mut collector = StaticBuildInfoCollector::default();
        for build in &self.repository_generation.source_builds {
            let artifacts = build
                .artifacts
                .iter()
                .map(|a| {
                    let coordinate: ArtifactCoordinate = a.parse()?;
                    if coordinate.has_version() {
                        Ok(coordinate)
                    } else {
                        Err(request::invalid(format!(
                            "artifact '{a}' of build '{}' has no version",
                            build.id
                        )))
                    }
                })
                .collect::<Result<Vec<_>>>()?;
            collector = collector.with_build(&build.id, artifacts);
        }
        Ok(collector)
    }

    /// Catalog of the configured version overrides
    pub fn static_catalog(&self) -> StaticVersionCatalog {
        StaticVersionCatalog::new(self.version_catalog.overrides.clone())
    }
}

/// Finds the configuration file
///
/// Lookup order: the explicit path, `REPOGEN_CONFIG`, `./repogen.yaml`, then
/// `<config dir>/repogen/repogen.yaml`.
pub fn locate(explicit: Option<&Path>) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return existing(path.to_path_buf());
    }
    if let Some(path) = std::env::var_os(CONFIG_ENV).filter(|p| !p.is_empty()) {
        return existing(PathBuf::from(path));
    }

    let local = PathBuf::from(CONFIG_FILE);
    if local.is_file() {
        return Ok(local);
    }
    if let Some(user) = dirs::config_dir().map(|dir| dir.join("repogen").join(CONFIG_FILE)) {
        if user.is_file() {
            return Ok(user);
        }
    }
    Err(config::not_found(&local))
}

fn existing(path: PathBuf) -> Result<PathBuf> {
    if path.is_file() {
        Ok(path)
    } else {
        Err(config::not_found(&path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RepoError;
    use crate::request::EXTENSIONS_LIST_URL;
    use crate::source::BuildInfoCollector;
    use serial_test::serial;
    use tempfile::TempDir;

    const SAMPLE: &str = r"
product:
  name: sample
outputDirectory: release
settingsPath: settings.xml
workRoot: work
repositoryGeneration:
  strategy: RESOLVE_ONLY
  parameters:
    extensionsListUrl: http://lists.example.com/extensions.txt
versionCatalog:
  overrides:
    io.vertx:vertx-core:
      - 4.1.0.redhat-00001
resolver:
  workers: 4
  maxAttempts: 5
";

    #[test]
    fn test_parse_and_defaults() {
        let config = RepogenConfig::from_yaml(SAMPLE).unwrap();
        assert_eq!(config.product.name, "sample");
        assert_eq!(config.top_level_directory_prefix(), "rh-sample-");
        let tuning = config.resolver.tuning();
        assert_eq!(tuning.workers, 4);
        assert_eq!(tuning.max_attempts, 5);
        assert_eq!(tuning.timeout, ResolverTuning::default().timeout);
    }

    #[test]
    fn test_to_request_resolves_relative_paths() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(&path, SAMPLE).unwrap();

        let config = RepogenConfig::load(&path).unwrap();
        let request = config.to_request().unwrap();
        let base = dunce::canonicalize(temp.path()).unwrap();

        assert_eq!(request.strategy, GenerationStrategy::ResolveOnly);
        assert_eq!(request.settings_path, base.join("settings.xml"));
        assert_eq!(
            request.repository_zip_path(),
            base.join("release").join("rh-sample-maven-repository.zip")
        );
        assert_eq!(
            request.parameter(EXTENSIONS_LIST_URL),
            Some("http://lists.example.com/extensions.txt")
        );
        assert_eq!(request.configuration_directory.as_deref(), Some(base.as_path()));
        assert_eq!(request.work_root, Some(base.join("work")));
    }

    #[test]
    fn test_unknown_strategy_rejected() {
        let yaml = SAMPLE.replace("RESOLVE_ONLY", "OFFLINER");
        let config = RepogenConfig::from_yaml(&yaml).unwrap();
        assert!(matches!(
            config.to_request(),
            Err(RepoError::InvalidRequest { .. })
        ));
    }

    #[test]
    fn test_build_info_from_source_builds() {
        let yaml = r"
product:
  name: sample
outputDirectory: /tmp/out
settingsPath: /tmp/settings.xml
repositoryGeneration:
  strategy: GENERATE
  sourceBuilds:
    - id: '4711'
      artifacts:
        - org.acme:core:1.0.0.redhat-00001
        - org.acme:core:pom:1.0.0.redhat-00001
";
        let config = RepogenConfig::from_yaml(yaml).unwrap();
        let request = config.to_request().unwrap();
        assert_eq!(request.source_builds, vec![CompletedBuild::new("4711")]);

        let collector = config.build_info_collector().unwrap();
        let artifacts = collector.artifacts(&CompletedBuild::new("4711")).unwrap();
        assert_eq!(artifacts.len(), 2);
    }

    #[test]
    fn test_unversioned_build_artifact_rejected() {
        let yaml = r"
product:
  name: sample
outputDirectory: /tmp/out
settingsPath: /tmp/settings.xml
repositoryGeneration:
  strategy: GENERATE
  sourceBuilds:
    - id: '1'
      artifacts: [org.acme:core]
";
        let config = RepogenConfig::from_yaml(yaml).unwrap();
        assert!(config.build_info_collector().is_err());
    }

    #[test]
    fn test_load_missing_file() {
        let err = RepogenConfig::load(Path::new("/nonexistent/repogen.yaml")).unwrap_err();
        assert!(matches!(err, RepoError::ConfigNotFound { .. }));
    }

    #[test]
    fn test_load_invalid_yaml_names_file() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join(CONFIG_FILE);
        std::fs::write(&path, "product: [").unwrap();
        let err = RepogenConfig::load(&path).unwrap_err();
        assert!(matches!(err, RepoError::ConfigParseFailed { ref path, .. } if path.ends_with(CONFIG_FILE)));
    }

    #[test]
    #[serial]
    fn test_locate_prefers_explicit_then_env() {
        let temp = TempDir::new().unwrap();
        let explicit = temp.path().join("explicit.yaml");
        let from_env = temp.path().join("env.yaml");
        std::fs::write(&explicit, SAMPLE).unwrap();
        std::fs::write(&from_env, SAMPLE).unwrap();

        let original = std::env::var(CONFIG_ENV).ok();
        unsafe {
            std::env::set_var(CONFIG_ENV, &from_env);
        }
        assert_eq!(locate(Some(&explicit)).unwrap(), explicit);
        assert_eq!(locate(None).unwrap(), from_env);

        unsafe {
            std::env::set_var(CONFIG_ENV, temp.path().join("absent.yaml"));
        }
        assert!(locate(None).is_err());

        unsafe {
            if let Some(o) = original {
                std::env::set_var(CONFIG_ENV, o);
            } else {
                std::env::remove_var(CONFIG_ENV);
            }
        }
    }
}
