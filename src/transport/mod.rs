//! Network access for coordinate sources, catalogs and remote repositories
//!
//! Everything that leaves the process goes through [`RemoteFetch`], so the
//! orchestrator can run against fakes in tests. [`HttpFetcher`] serves
//! `http(s)://` URLs with a bounded timeout and `file://` URLs from disk.

pub mod http;
pub mod retry;

pub use http::HttpFetcher;
pub use retry::RetryPolicy;

use crate::error::Result;

/// Outcome of a successful round trip
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Found(Vec<u8>),
    /// The remote answered that the resource does not exist
    NotFound,
}

/// Read-only access to remote resources
///
/// Implementations report network and server failures as
/// [`RepoError::TransportError`](crate::error::RepoError::TransportError) and a
/// missing resource as [`FetchOutcome::NotFound`], never as an error.
pub trait RemoteFetch: Send + Sync {
    fn get(&self, url: &str) -> Result<FetchOutcome>;
}
