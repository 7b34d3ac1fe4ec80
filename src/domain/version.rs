//! Artifact version ordering
//!
//! Versions compare by their numeric `major.minor.micro[...]` prefix first,
//! with missing components treated as zero, then by qualifier. A version
//! without qualifier sorts below any qualified version of the same numbers,
//! so `4.1.0.redhat-00001` is newer than `4.1.0`. Qualifiers compare
//! lexically, which orders zero-padded build suffixes correctly.

use std::cmp::Ordering;
use std::fmt;

/// Marker carried by productized versions
pub const PRODUCTIZED_MARKER: &str = "redhat";

/// Whether a version string already denotes a productized build
pub fn is_productized(version: &str) -> bool {
    version.to_ascii_lowercase().contains(PRODUCTIZED_MARKER)
}

/// A parsed, comparable artifact version
#[derive(Debug, Clone)]
pub struct ArtifactVersion {
    raw: String,
    numbers: Vec<u64>,
    qualifier: String,
}

impl ArtifactVersion {
    pub fn parse(raw: &str) -> Self {
        let split = raw
            .find(|c: char| !(c.is_ascii_digit() || c == '.'))
            .unwrap_or(raw.len());
        let (numeric, rest) = raw.split_at(split);

        let numbers = numeric
            .split('.')
            .filter(|part| !part.is_empty())
            .map(|part| part.parse::<u64>().unwrap_or(u64::MAX))
            .collect();
        let qualifier = rest.trim_start_matches(['.', '-', '_']).to_string();

        Self {
            raw: raw.to_string(),
            numbers,
            qualifier,
        }
    }

    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn qualifier(&self) -> &str {
        &self.qualifier
    }

    fn number(&self, index: usize) -> u64 {
        self.numbers.get(index).copied().unwrap_or(0)
    }
}

impl Ord for ArtifactVersion {
    fn cmp(&self, other: &Self) -> Ordering {
        let width = self.numbers.len().max(other.numbers.len()).max(3);
        for index in 0..width {
            match self.number(index).cmp(&other.number(index)) {
                Ordering::Equal => {}
                unequal => return unequal,
            }
        }

        let qualifiers = match (self.qualifier.is_empty(), other.qualifier.is_empty()) {
            (true, true) => Ordering::Equal,
            (true, false) => Ordering::Less,
            (false, true) => Ordering::Greater,
            (false, false) => self.qualifier.cmp(&other.qualifier),
        };

        // Raw text keeps the order total for spellings like `1.0` and `1.0.0`
        qualifiers.then_with(|| self.raw.cmp(&other.raw))
    }
}

impl PartialOrd for ArtifactVersion {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for ArtifactVersion {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for ArtifactVersion {}

impl fmt::Display for ArtifactVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

/// Pick the latest of several candidate versions
pub fn latest<'a, I>(candidates: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .filter(|candidate| !candidate.trim().is_empty())
        .map(ArtifactVersion::parse)
        .max()
        .map(|version| version.raw)
}
