//! Version catalogs answering which productized versions exist for an artifact

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::Deserialize;
use url::Url;

use crate::domain::version;
use crate::error::{Result, resolve};
use crate::transport::{FetchOutcome, RemoteFetch, RetryPolicy};

/// Catalog of productized versions
pub trait VersionCatalog: Send + Sync {
    /// All productized versions known for `group:artifact`, optionally narrowed
    /// to rebuilds of `community_version`
    fn productized_versions(
        &self,
        group_id: &str,
        artifact_id: &str,
        community_version: &str,
    ) -> Result<Vec<String>>;

    /// The latest productized version, if any
    fn lookup_productized_version(
        &self,
        group_id: &str,
        artifact_id: &str,
        community_version: &str,
    ) -> Result<Option<String>> {
        let candidates = self.productized_versions(group_id, artifact_id, community_version)?;
        Ok(version::latest(candidates.iter().map(String::as_str)))
    }
}

/// Catalog backed by a fixed table
///
/// Keys are `group:artifact:version` or `group:artifact`; the versioned key
/// takes precedence.
#[derive(Debug, Clone, Default)]
pub struct StaticVersionCatalog {
    entries: BTreeMap<String, Vec<String>>,
}

impl StaticVersionCatalog {
    pub fn new(entries: BTreeMap<String, Vec<String>>) -> Self {
        Self { entries }
    }

    #[must_use]
    pub fn with_entry(
        mut self,
        key: impl Into<String>,
        versions: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        self.entries
            .entry(key.into())
            .or_default()
            .extend(versions.into_iter().map(Into::into));
        self
    }
}

impl VersionCatalog for StaticVersionCatalog {
    fn productized_versions(
        &self,
        group_id: &str,
        artifact_id: &str,
        community_version: &str,
    ) -> Result<Vec<String>> {
        let versioned = format!("{group_id}:{artifact_id}:{community_version}");
        let unversioned = format!("{group_id}:{artifact_id}");
        let found = (!community_version.is_empty())
            .then(|| self.entries.get(&versioned))
            .flatten()
            .or_else(|| self.entries.get(&unversioned));
        Ok(found.cloned().unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GaVersionProducts {
    group_id: String,
    artifact_id: String,
    #[serde(default)]
    gav_products: Vec<GavProducts>,
}

#[derive(Debug, Deserialize)]
struct GavProducts {
    version: String,
}

/// Catalog served by a dependency-analysis service
///
/// Queries `<base>?groupId=..&artifactId=..[&version=..]` and reads an array of
/// `{groupId, artifactId, gavProducts: [{version, ...}]}` records.
pub struct DaVersionCatalog {
    base_url: Url,
    fetcher: Arc<dyn RemoteFetch>,
    retry: RetryPolicy,
}

impl DaVersionCatalog {
    pub fn new(base_url: &str, fetcher: Arc<dyn RemoteFetch>, retry: RetryPolicy) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| crate::error::request::invalid(format!("invalid catalog URL '{base_url}': {e}")))?;
        Ok(Self {
            base_url,
            fetcher,
            retry,
        })
    }

    fn query_url(&self, group_id: &str, artifact_id: &str, community_version: &str) -> String {
        let mut url = self.base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            query.append_pair("groupId", group_id);
            query.append_pair("artifactId", artifact_id);
            if !community_version.is_empty() {
                query.append_pair("version", community_version);
            }
        }
        url.to_string()
    }
}

impl VersionCatalog for DaVersionCatalog {
    fn productized_versions(
        &self,
        group_id: &str,
        artifact_id: &str,
        community_version: &str,
    ) -> Result<Vec<String>> {
        let url = self.query_url(group_id, artifact_id, community_version);
        let body = match self.retry.run(&url, || self.fetcher.get(&url))? {
            FetchOutcome::Found(body) => body,
            FetchOutcome::NotFound => return Ok(Vec::new()),
        };

        let records: Vec<GaVersionProducts> = serde_json::from_slice(&body)
            .map_err(|e| resolve::transport(&url, format!("unexpected catalog answer: {e}")))?;

        Ok(records
            .into_iter()
            .filter(|r| r.group_id == group_id && r.artifact_id == artifact_id)
            .flat_map(|r| r.gav_products)
            .map(|p| p.version)
            .filter(|v| version::is_productized(v))
            .collect())
    }
}
