//! Artifact resolution errors

use super::RepoError;

/// Creates an artifact not found error
pub fn not_found(coordinate: impl ToString, reason: impl Into<String>) -> RepoError {
    RepoError::ArtifactNotFound {
        coordinate: coordinate.to_string(),
        reason: reason.into(),
    }
}

/// Creates a malformed descriptor error
pub fn descriptor_malformed(coordinate: impl ToString, reason: impl Into<String>) -> RepoError {
    RepoError::DescriptorMalformed {
        coordinate: coordinate.to_string(),
        reason: reason.into(),
    }
}

/// Creates a transport error
pub fn transport(url: impl Into<String>, reason: impl Into<String>) -> RepoError {
    RepoError::TransportError {
        url: url.into(),
        reason: reason.into(),
    }
}

/// Creates a circular dependency error from the offending chain
pub fn circular<S: AsRef<str>>(chain: &[S]) -> RepoError {
    let chain: Vec<&str> = chain.iter().map(AsRef::as_ref).collect();
    RepoError::CircularDependency {
        chain: chain.join(" -> "),
    }
}
