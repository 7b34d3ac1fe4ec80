//! Blocking HTTP and file URL fetcher

use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use url::Url;

use super::{FetchOutcome, RemoteFetch};
use crate::error::{Result, request, resolve};

/// [`RemoteFetch`] over `reqwest`, with `file://` support for local mirrors
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    /// Creates a fetcher whose every request is bounded by `timeout`
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("repogen/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| request::invalid(format!("failed to create HTTP client: {e}")))?;
        Ok(Self { client })
    }

    fn get_file(url: &Url) -> Result<FetchOutcome> {
        let path = url
            .to_file_path()
            .map_err(|()| resolve::transport(url.as_str(), "not a local file URL"))?;
        match std::fs::read(&path) {
            Ok(bytes) => Ok(FetchOutcome::Found(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FetchOutcome::NotFound),
            Err(e) => Err(resolve::transport(url.as_str(), e.to_string())),
        }
    }

    fn get_http(&self, url: &Url) -> Result<FetchOutcome> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .map_err(|e| resolve::transport(url.as_str(), e.to_string()))?;

        let status = response.status();
        if status.is_success() {
            let bytes = response
                .bytes()
                .map_err(|e| resolve::transport(url.as_str(), e.to_string()))?;
            return Ok(FetchOutcome::Found(bytes.to_vec()));
        }
        if is_transient(status) {
            return Err(resolve::transport(url.as_str(), status.to_string()));
        }

        // Remaining client errors (401, 403, 404, 410, ...) mean this remote
        // will not serve the resource
        tracing::debug!(url = %url, status = %status, "remote does not serve resource");
        Ok(FetchOutcome::NotFound)
    }
}

fn is_transient(status: StatusCode) -> bool {
    status.is_server_error()
        || status == StatusCode::TOO_MANY_REQUESTS
        || status == StatusCode::REQUEST_TIMEOUT
}

impl RemoteFetch for HttpFetcher {
    fn get(&self, url: &str) -> Result<FetchOutcome> {
        let parsed = Url::parse(url).map_err(|e| resolve::transport(url, e.to_string()))?;
        match parsed.scheme() {
            "file" => Self::get_file(&parsed),
            "http" | "https" => self.get_http(&parsed),
            other => Err(resolve::transport(
                url,
                format!("unsupported URL scheme '{other}'"),
            )),
        }
    }
}
