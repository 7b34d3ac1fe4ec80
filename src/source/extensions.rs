//! Hosted extensions list
//!
//! The list is served either as a JSON array or as plain text:
//!
//! ```text
//! ["io.vertx:vertx-bridge-common", {"groupId": "io.vertx", "artifactId": "vertx-core"}]
//! ```
//!
//! ```text
//! # core extensions
//! io.vertx:vertx-bridge-common
//! io.vertx:vertx-core:4.1.0, io.vertx:vertx-web
//! ```
//!
//! Plain text entries are separated by newlines, commas or whitespace. Lines
//! starting with `#` are comments. Entries without a version keep an empty
//! version until the remapper assigns one.

use std::collections::BTreeSet;

use serde::Deserialize;

use crate::domain::ArtifactCoordinate;
use crate::error::{Result, source};
use crate::transport::{FetchOutcome, RemoteFetch, RetryPolicy};

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum ListEntry {
    Text(String),
    Object {
        #[serde(rename = "groupId")]
        group_id: String,
        #[serde(rename = "artifactId")]
        artifact_id: String,
        #[serde(default)]
        version: Option<String>,
    },
}

/// Downloads and parses the extensions list at `url`
pub fn fetch(
    url: &str,
    fetcher: &dyn RemoteFetch,
    retry: &RetryPolicy,
) -> Result<BTreeSet<ArtifactCoordinate>> {
    tracing::info!(url, "fetching extensions list");

    let outcome = retry
        .run(url, || fetcher.get(url))
        .map_err(|e| source::unavailable(url, e.to_string()))?;
    let body = match outcome {
        FetchOutcome::Found(body) => body,
        FetchOutcome::NotFound => return Err(source::unavailable(url, "list not found")),
    };
    let text = String::from_utf8(body)
        .map_err(|e| source::unavailable(url, format!("list is not valid UTF-8: {e}")))?;

    let coordinates = parse(&text).map_err(|reason| source::unavailable(url, reason))?;
    if coordinates.is_empty() {
        return Err(source::unavailable(url, "list contains no artifacts"));
    }
    tracing::info!(url, artifacts = coordinates.len(), "extensions list loaded");
    Ok(coordinates)
}

/// Parses a list body into coordinates
///
/// Plain-text lists separate entries by commas or whitespace; `#` comments out
/// the rest of the line.
pub fn parse(text: &str) -> std::result::Result<BTreeSet<ArtifactCoordinate>, String> {
    if text.trim_start().starts_with('[') {
        return parse_json(text);
    }

    text.lines()
        .map(|line| line.split_once('#').map_or(line, |(content, _)| content))
        .flat_map(|line| line.split(|c: char| c == ',' || c.is_whitespace()))
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(parse_entry)
        .collect()
}

fn parse_json(text: &str) -> std::result::Result<BTreeSet<ArtifactCoordinate>, String> {
    let entries: Vec<ListEntry> =
        serde_json::from_str(text).map_err(|e| format!("invalid JSON list: {e}"))?;
    entries
        .into_iter()
        .filter_map(|entry| match entry {
            ListEntry::Text(text) if text.trim().is_empty() => None,
            ListEntry::Text(text) => Some(parse_entry(text.trim())),
            ListEntry::Object {
                group_id,
                artifact_id,
                version,
            } => Some(if group_id.trim().is_empty() || artifact_id.trim().is_empty() {
                Err(format!("invalid entry '{group_id}:{artifact_id}'"))
            } else {
                Ok(ArtifactCoordinate::new(
                    group_id.trim(),
                    artifact_id.trim(),
                    version.unwrap_or_default().trim(),
                ))
            }),
        })
        .collect()
}

fn parse_entry(entry: &str) -> std::result::Result<ArtifactCoordinate, String> {
    entry
        .parse::<ArtifactCoordinate>()
        .map_err(|_| format!("invalid entry '{entry}'"))
}
