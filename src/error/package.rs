//! Packaging errors

use std::path::Path;

use super::RepoError;

/// Creates a packaging IO error
pub fn io(path: &Path, reason: impl ToString) -> RepoError {
    RepoError::PackagingIoError {
        path: path.display().to_string(),
        reason: reason.to_string(),
    }
}

/// Creates an archive digest mismatch error
pub fn digest_mismatch(path: &Path, expected: &str, actual: &str) -> RepoError {
    RepoError::DigestMismatch {
        path: path.display().to_string(),
        expected: expected.to_string(),
        actual: actual.to_string(),
    }
}
