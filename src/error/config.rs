//! Configuration errors

use std::path::Path;

use super::RepoError;

/// Creates a configuration not found error
pub fn not_found(path: &Path) -> RepoError {
    RepoError::ConfigNotFound {
        path: path.display().to_string(),
    }
}

/// Creates a configuration parse error
pub fn parse_failed(path: &Path, reason: impl ToString) -> RepoError {
    RepoError::ConfigParseFailed {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}
