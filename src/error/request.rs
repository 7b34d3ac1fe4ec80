//! Request validation errors

use super::RepoError;

/// Creates an invalid request error
pub fn invalid(message: impl Into<String>) -> RepoError {
    RepoError::InvalidRequest {
        message: message.into(),
    }
}

/// Creates an invalid request error for a parameter the strategy requires
pub fn missing_parameter(strategy: &str, parameter: &str) -> RepoError {
    RepoError::InvalidRequest {
        message: format!("strategy {strategy} requires the '{parameter}' parameter"),
    }
}
