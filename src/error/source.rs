//! Coordinate sourcing errors

use super::RepoError;

/// Creates a source unavailable error
pub fn unavailable(url: impl Into<String>, reason: impl Into<String>) -> RepoError {
    RepoError::SourceUnavailable {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates an incomplete build info error
pub fn incomplete_build_info(build: impl Into<String>, reason: impl Into<String>) -> RepoError {
    RepoError::IncompleteBuildInfo {
        build: build.into(),
        reason: reason.into(),
    }
}
