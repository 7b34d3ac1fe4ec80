//! Artifact coordinates and resolved artifacts
//!
//! A coordinate identifies one file in a Maven repository:
//! `groupId:artifactId[:type[:classifier]]:version`.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{RepoError, request};

/// Default artifact type when none is declared
pub const DEFAULT_TYPE: &str = "jar";

/// Artifact type of a descriptor
pub const POM_TYPE: &str = "pom";

/// Fully qualified artifact coordinate
///
/// Equality and ordering cover every field, so two coordinates differing
/// only by version are distinct artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactCoordinate {
    pub group_id: String,
    pub artifact_id: String,
    /// May be empty for coordinates sourced without a version
    #[serde(default)]
    pub version: String,
    #[serde(rename = "type", default = "default_type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
}

fn default_type() -> String {
    DEFAULT_TYPE.to_string()
}

impl ArtifactCoordinate {
    /// Create a `jar` coordinate
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group_id: group_id.into(),
            artifact_id: artifact_id.into(),
            version: version.into(),
            kind: DEFAULT_TYPE.to_string(),
            classifier: None,
        }
    }

    #[must_use]
    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        let classifier = classifier.into();
        self.classifier = (!classifier.is_empty()).then_some(classifier);
        self
    }

    #[must_use]
    pub fn with_version(&self, version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            ..self.clone()
        }
    }

    /// The descriptor (POM) coordinate of this artifact
    #[must_use]
    pub fn pom(&self) -> Self {
        Self {
            group_id: self.group_id.clone(),
            artifact_id: self.artifact_id.clone(),
            version: self.version.clone(),
            kind: POM_TYPE.to_string(),
            classifier: None,
        }
    }

    pub fn has_version(&self) -> bool {
        !self.version.is_empty()
    }

    /// Whether this coordinate points at a descriptor rather than a binary
    pub fn is_descriptor(&self) -> bool {
        self.kind == POM_TYPE && self.classifier.is_none()
    }

    /// Unversioned `group:artifact` key
    pub fn ga_key(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// Versionless key used for mediation: `group:artifact:type[:classifier]`
    pub fn management_key(&self) -> String {
        match &self.classifier {
            Some(classifier) => format!(
                "{}:{}:{}:{}",
                self.group_id, self.artifact_id, self.kind, classifier
            ),
            None => format!("{}:{}:{}", self.group_id, self.artifact_id, self.kind),
        }
    }

    /// File extension for the artifact type
    pub fn extension(&self) -> &str {
        match self.kind.as_str() {
            "bundle" | "maven-plugin" | "ejb" | "ejb-client" | "test-jar" | "java-source"
            | "javadoc" => "jar",
            "" => DEFAULT_TYPE,
            other => other,
        }
    }

    /// Classifier as it appears in the file name
    pub fn effective_classifier(&self) -> Option<&str> {
        match (&self.classifier, self.kind.as_str()) {
            (Some(classifier), _) => Some(classifier.as_str()),
            (None, "test-jar") => Some("tests"),
            (None, "ejb-client") => Some("client"),
            (None, "java-source") => Some("sources"),
            (None, "javadoc") => Some("javadoc"),
            _ => None,
        }
    }

    /// `<artifactId>-<version>[-<classifier>].<ext>`
    pub fn file_name(&self) -> String {
        match self.effective_classifier() {
            Some(classifier) => format!(
                "{}-{}-{}.{}",
                self.artifact_id,
                self.version,
                classifier,
                self.extension()
            ),
            None => format!("{}-{}.{}", self.artifact_id, self.version, self.extension()),
        }
    }

    /// Repository layout path, always `/`-separated
    pub fn relative_path(&self) -> String {
        format!(
            "{}/{}/{}/{}",
            self.group_id.replace('.', "/"),
            self.artifact_id,
            self.version,
            self.file_name()
        )
    }
}

impl fmt::Display for ArtifactCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group_id, self.artifact_id, self.kind)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}", self.version)
    }
}

impl FromStr for ArtifactCoordinate {
    type Err = RepoError;

    /// Parses `g:a`, `g:a:v`, `g:a:type:v` and `g:a:type:classifier:v`
    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = input.trim().split(':').map(str::trim).collect();
        let invalid = || request::invalid(format!("invalid artifact coordinate '{input}'"));

        if parts.iter().take(2).any(|p| p.is_empty()) {
            return Err(invalid());
        }

        let coordinate = match parts.as_slice() {
            [g, a] => Self::new(*g, *a, ""),
            [g, a, v] if !v.is_empty() => Self::new(*g, *a, *v),
            [g, a, t, v] if !t.is_empty() && !v.is_empty() => Self::new(*g, *a, *v).with_kind(*t),
            [g, a, t, c, v] if !t.is_empty() && !v.is_empty() => {
                Self::new(*g, *a, *v).with_kind(*t).with_classifier(*c)
            }
            _ => return Err(invalid()),
        };
        Ok(coordinate)
    }
}

/// An artifact file downloaded for the current run
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResolvedArtifact {
    pub coordinate: ArtifactCoordinate,
    /// Local copy inside the run's working directory
    pub local_path: PathBuf,
    /// Base URL of the repository that served the file
    pub origin: String,
}
