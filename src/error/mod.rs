//! Error types and handling for repogen
//!
//! Uses `thiserror` for error definitions and `miette` for pretty diagnostics.
//!
//! This module is organized into sub-modules by error domain:
//! - [`request`]: Request validation errors
//! - [`source`]: Coordinate sourcing errors
//! - [`resolve`]: Artifact resolution errors
//! - [`package`]: Packaging errors
//! - [`config`]: Configuration errors

pub mod config;
pub mod package;
pub mod request;
pub mod resolve;
pub mod source;

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// Main error type for repository generation
#[derive(Error, Diagnostic, Debug, Clone, PartialEq, Eq)]
pub enum RepoError {
    // Request errors
    #[error("Invalid generation request: {message}")]
    #[diagnostic(
        code(repogen::request::invalid),
        help("Check the repositoryGeneration section of the configuration file")
    )]
    InvalidRequest { message: String },

    // Source errors
    #[error("Coordinate source unavailable: {url}: {reason}")]
    #[diagnostic(
        code(repogen::source::unavailable),
        help("Check that the extensions list URL is reachable and lists group:artifact entries")
    )]
    SourceUnavailable { url: String, reason: String },

    #[error("Failed to collect artifacts of build '{build}': {reason}")]
    #[diagnostic(code(repogen::source::incomplete_build_info))]
    IncompleteBuildInfo { build: String, reason: String },

    // Resolution errors
    #[error("Artifact '{coordinate}' not found: {reason}")]
    #[diagnostic(
        code(repogen::resolve::not_found),
        help("Make sure the artifact is available in one of the repositories of the settings file")
    )]
    ArtifactNotFound { coordinate: String, reason: String },

    #[error("Malformed descriptor for '{coordinate}': {reason}")]
    #[diagnostic(code(repogen::resolve::descriptor_malformed))]
    DescriptorMalformed { coordinate: String, reason: String },

    #[error("Transport error for {url}: {reason}")]
    #[diagnostic(
        code(repogen::resolve::transport),
        help("The remote repository did not answer; retry later or check the proxy settings")
    )]
    TransportError { url: String, reason: String },

    #[error("Circular dependency detected: {chain}")]
    #[diagnostic(
        code(repogen::resolve::circular),
        help("The descriptor graph of a well-formed repository must not contain cycles")
    )]
    CircularDependency { chain: String },

    // Packaging errors
    #[error("Failed to write '{path}': {reason}")]
    #[diagnostic(code(repogen::package::io))]
    PackagingIoError { path: String, reason: String },

    #[error("Archive digest mismatch for '{path}': expected {expected}, got {actual}")]
    #[diagnostic(
        code(repogen::package::digest_mismatch),
        help("The archive changed after it was generated; regenerate or re-download it")
    )]
    DigestMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    // Configuration errors
    #[error("Configuration file not found: {path}")]
    #[diagnostic(
        code(repogen::config::not_found),
        help("Pass --config or set REPOGEN_CONFIG to point at a repogen.yaml file")
    )]
    ConfigNotFound { path: String },

    #[error("Failed to parse configuration file: {path}: {reason}")]
    #[diagnostic(code(repogen::config::parse_failed))]
    ConfigParseFailed { path: String, reason: String },
}

impl RepoError {
    /// Whether the failed operation may succeed when attempted again
    pub fn is_retryable(&self) -> bool {
        matches!(self, RepoError::TransportError { .. })
    }
}

/// Stage of one assembly run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Stage {
    Init,
    Sourcing,
    Remapping,
    Resolving,
    Packaging,
    Done,
    Failed,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Stage::Init => "INIT",
            Stage::Sourcing => "SOURCING",
            Stage::Remapping => "REMAPPING",
            Stage::Resolving => "RESOLVING",
            Stage::Packaging => "PACKAGING",
            Stage::Done => "DONE",
            Stage::Failed => "FAILED",
        };
        f.write_str(name)
    }
}

/// First fatal error of an assembly run, with the stage it surfaced in
#[derive(Error, Diagnostic, Debug)]
#[error("Repository generation failed during {stage}")]
#[diagnostic(code(repogen::run::failed))]
pub struct AssemblyFailure {
    pub stage: Stage,
    #[source]
    #[diagnostic_source]
    pub error: RepoError,
}

impl AssemblyFailure {
    pub fn new(stage: Stage, error: RepoError) -> Self {
        Self { stage, error }
    }
}

impl From<serde_yaml::Error> for RepoError {
    fn from(err: serde_yaml::Error) -> Self {
        RepoError::ConfigParseFailed {
            path: "unknown".to_string(),
            reason: err.to_string(),
        }
    }
}

/// Result type alias using miette for error handling
pub type Result<T> = miette::Result<T, RepoError>;
