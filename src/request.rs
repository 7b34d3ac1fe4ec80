//! Generation strategies and the immutable request for one assembly run

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Component, Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::error::{RepoError, Result, request};
use crate::source::CompletedBuild;

/// Parameter naming the URL of the extensions list for `RESOLVE_ONLY`
pub const EXTENSIONS_LIST_URL: &str = "extensionsListUrl";

/// Fixed part of the archive's top-level directory name
pub const REPOSITORY_SUFFIX: &str = "maven-repository";

/// Where root coordinates come from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// A hosted list of `group:artifact` entries
    ExtensionsList,
    /// Artifacts produced by completed builds
    Builds,
}

/// How a deliverable repository is generated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationStrategy {
    /// Listed artifacts with their descriptors and parent chains only
    ResolveOnly,
    /// Build artifacts plus their full runtime dependency closure
    Generate,
}

impl GenerationStrategy {
    pub fn source(self) -> SourceKind {
        match self {
            GenerationStrategy::ResolveOnly => SourceKind::ExtensionsList,
            GenerationStrategy::Generate => SourceKind::Builds,
        }
    }

    pub fn transitive(self) -> bool {
        match self {
            GenerationStrategy::ResolveOnly => false,
            GenerationStrategy::Generate => true,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            GenerationStrategy::ResolveOnly => "RESOLVE_ONLY",
            GenerationStrategy::Generate => "GENERATE",
        }
    }
}

impl fmt::Display for GenerationStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for GenerationStrategy {
    type Err = RepoError;

    fn from_str(input: &str) -> std::result::Result<Self, Self::Err> {
        match input.trim().to_ascii_uppercase().replace('-', "_").as_str() {
            "RESOLVE_ONLY" => Ok(GenerationStrategy::ResolveOnly),
            "GENERATE" | "FULL" => Ok(GenerationStrategy::Generate),
            _ => Err(request::invalid(format!(
                "unknown repository generation strategy '{input}' (expected RESOLVE_ONLY or GENERATE)"
            ))),
        }
    }
}

/// Resource limits for the resolving stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolverTuning {
    /// Size of the download worker pool
    pub workers: usize,
    /// Timeout of a single network call
    pub timeout: Duration,
    /// Attempts per network call, including the first one
    pub max_attempts: u32,
    /// Delay before the first retry; doubled for every further one
    pub backoff: Duration,
}

impl Default for ResolverTuning {
    fn default() -> Self {
        Self {
            workers: 8,
            timeout: Duration::from_secs(60),
            max_attempts: 3,
            backoff: Duration::from_millis(500),
        }
    }
}

/// Immutable configuration of one assembly invocation
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub strategy: GenerationStrategy,
    pub parameters: BTreeMap<String, String>,
    pub top_level_directory_prefix: String,
    /// Maven settings document defining the remote repository chain
    pub settings_path: PathBuf,
    pub source_builds: Vec<CompletedBuild>,
    /// Release directory receiving the archive
    pub output_directory: PathBuf,
    pub repository_zip_name: String,
    /// Directory searched for overrides of the README and settings template
    pub configuration_directory: Option<PathBuf>,
    /// Parent of the run's working directory (system temp dir when unset)
    pub work_root: Option<PathBuf>,
    pub tuning: ResolverTuning,
}

impl GenerationRequest {
    pub fn new(
        strategy: GenerationStrategy,
        top_level_directory_prefix: impl Into<String>,
        settings_path: impl Into<PathBuf>,
        output_directory: impl Into<PathBuf>,
    ) -> Self {
        let prefix = top_level_directory_prefix.into();
        Self {
            strategy,
            parameters: BTreeMap::new(),
            repository_zip_name: default_zip_name(&prefix),
            top_level_directory_prefix: prefix,
            settings_path: settings_path.into(),
            source_builds: Vec::new(),
            output_directory: output_directory.into(),
            configuration_directory: None,
            work_root: None,
            tuning: ResolverTuning::default(),
        }
    }

    #[must_use]
    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_source_builds(mut self, builds: Vec<CompletedBuild>) -> Self {
        self.source_builds = builds;
        self
    }

    #[must_use]
    pub fn with_zip_name(mut self, name: impl Into<String>) -> Self {
        self.repository_zip_name = name.into();
        self
    }

    #[must_use]
    pub fn with_configuration_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.configuration_directory = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_work_root(mut self, dir: impl Into<PathBuf>) -> Self {
        self.work_root = Some(dir.into());
        self
    }

    #[must_use]
    pub fn with_tuning(mut self, tuning: ResolverTuning) -> Self {
        self.tuning = tuning;
        self
    }

    /// Name of the archive's single top-level directory
    pub fn top_level_directory(&self) -> String {
        format!("{}{}", self.top_level_directory_prefix, REPOSITORY_SUFFIX)
    }

    /// Where the archive is written
    pub fn repository_zip_path(&self) -> PathBuf {
        self.output_directory.join(&self.repository_zip_name)
    }

    pub fn parameter(&self, key: &str) -> Option<&str> {
        self.parameters
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    /// Checks that the request can be executed, before any network activity
    pub fn validate(&self) -> Result<()> {
        match self.strategy {
            GenerationStrategy::ResolveOnly => {
                if self.parameter(EXTENSIONS_LIST_URL).is_none() {
                    return Err(request::missing_parameter(
                        self.strategy.name(),
                        EXTENSIONS_LIST_URL,
                    ));
                }
            }
            GenerationStrategy::Generate => {
                if self.source_builds.is_empty() {
                    return Err(request::invalid(format!(
                        "strategy {} requires at least one source build",
                        self.strategy
                    )));
                }
            }
        }

        validate_zip_name(&self.repository_zip_name)?;
        validate_prefix(&self.top_level_directory_prefix)?;

        if !self.settings_path.is_file() {
            return Err(request::invalid(format!(
                "resolver settings file not found: {}",
                self.settings_path.display()
            )));
        }
        if self.tuning.workers == 0 {
            return Err(request::invalid("resolver worker pool size must be at least 1"));
        }
        if self.tuning.max_attempts == 0 {
            return Err(request::invalid("resolver attempts must be at least 1"));
        }
        Ok(())
    }
}

/// `<prefix>maven-repository.zip`
pub fn default_zip_name(prefix: &str) -> String {
    format!("{prefix}{REPOSITORY_SUFFIX}.zip")
}

fn validate_zip_name(name: &str) -> Result<()> {
    let as_path = Path::new(name);
    let is_plain_name = as_path.file_name().is_some_and(|file| file == as_path.as_os_str());
    if name.trim().is_empty() || !is_plain_name {
        return Err(request::invalid(format!(
            "repository zip name must be a plain file name, got '{name}'"
        )));
    }
    Ok(())
}

/// The prefix becomes the archive's single top-level directory
fn validate_prefix(prefix: &str) -> Result<()> {
    let directory = format!("{prefix}{REPOSITORY_SUFFIX}");
    let mut components = Path::new(&directory).components();
    let single_component = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(name)), None) if name == directory.as_str()
    );
    if prefix.contains(['/', '\\']) || prefix.contains("..") || !single_component {
        return Err(request::invalid(format!(
            "top-level directory prefix must not contain path separators, got '{prefix}'"
        )));
    }
    Ok(())
}
