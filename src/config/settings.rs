//! Resolver settings (Maven `settings.xml`)
//!
//! The settings document defines which remote repositories artifacts are
//! resolved from. It is read once at the start of a run; the resulting
//! [`ResolverSettings`] snapshot is shared by every download of that run.
//!
//! Supported subset:
//! - `<profiles>` with `<repositories>`, activated through `<activeProfiles>`
//!   or `<activeByDefault>`
//! - `<mirrors>` whose `<mirrorOf>` is `*`, `external:*`, an id, or a comma
//!   separated list with `!id` exclusions

use std::path::Path;

use crate::error::{Result, config};
use crate::xml::{self, XmlEvent};

/// Repository used when no active profile declares one
pub const CENTRAL_ID: &str = "central";
pub const CENTRAL_URL: &str = "https://repo.maven.apache.org/maven2/";

/// A remote repository artifacts are downloaded from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteRepository {
    pub id: String,
    /// Base URL, always ending with `/`
    pub url: String,
}

impl RemoteRepository {
    pub fn new(id: impl Into<String>, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        Self { id: id.into(), url }
    }

    /// URL of a repository-relative path
    pub fn url_of(&self, relative_path: &str) -> String {
        format!("{}{}", self.url, relative_path.trim_start_matches('/'))
    }

    fn is_external(&self) -> bool {
        let lower = self.url.to_ascii_lowercase();
        !(lower.starts_with("file:")
            || lower.contains("://localhost")
            || lower.contains("://127.0.0.1"))
    }
}

#[derive(Debug, Default, Clone)]
struct Mirror {
    id: String,
    url: String,
    mirror_of: String,
}

impl Mirror {
    fn matches(&self, repository: &RemoteRepository) -> bool {
        let mut matched = false;
        for pattern in self.mirror_of.split(',').map(str::trim) {
            if let Some(excluded) = pattern.strip_prefix('!') {
                if excluded == repository.id {
                    return false;
                }
                continue;
            }
            matched |= match pattern {
                "*" => true,
                "external:*" => repository.is_external(),
                id => id == repository.id,
            };
        }
        matched
    }
}

#[derive(Debug, Default, Clone)]
struct Profile {
    id: String,
    active_by_default: bool,
    repositories: Vec<(String, String)>,
}

#[derive(Debug, Default)]
struct RawSettings {
    mirrors: Vec<Mirror>,
    profiles: Vec<Profile>,
    active_profiles: Vec<String>,
}

/// Snapshot of the remote repository chain for one run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolverSettings {
    repositories: Vec<RemoteRepository>,
}

impl ResolverSettings {
    /// Loads and interprets a settings file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                config::not_found(path)
            } else {
                config::parse_failed(path, e)
            }
        })?;
        Self::parse(&content).map_err(|reason| config::parse_failed(path, reason))
    }

    /// Interprets settings XML content
    pub fn parse(content: &str) -> std::result::Result<Self, String> {
        let raw = read_raw(content)?;
        Ok(Self::from_raw(&raw))
    }

    /// Settings resolving straight from the given repositories, without mirrors
    pub fn with_repositories(repositories: Vec<RemoteRepository>) -> Self {
        Self { repositories }
    }

    /// Remote repositories in lookup order, with mirrors applied
    pub fn repositories(&self) -> &[RemoteRepository] {
        &self.repositories
    }

    fn from_raw(raw: &RawSettings) -> Self {
        // activeByDefault only applies when no declared profile is listed explicitly
        let listed: Vec<&Profile> = raw
            .profiles
            .iter()
            .filter(|p| raw.active_profiles.iter().any(|id| id == &p.id))
            .collect();
        let active: Vec<&Profile> = if listed.is_empty() {
            raw.profiles.iter().filter(|p| p.active_by_default).collect()
        } else {
            listed
        };

        let mut declared: Vec<RemoteRepository> = Vec::new();
        for profile in active {
            for (id, url) in &profile.repositories {
                if !declared.iter().any(|r| &r.id == id) {
                    declared.push(RemoteRepository::new(id, url));
                }
            }
        }
        if declared.is_empty() {
            declared.push(RemoteRepository::new(CENTRAL_ID, CENTRAL_URL));
        }

        let mut repositories: Vec<RemoteRepository> = Vec::new();
        for repository in declared {
            let effective = raw
                .mirrors
                .iter()
                .find(|mirror| mirror.matches(&repository))
                .map_or(repository, |mirror| {
                    RemoteRepository::new(&mirror.id, &mirror.url)
                });
            if !repositories.iter().any(|r| r.url == effective.url) {
                repositories.push(effective);
            }
        }

        Self { repositories }
    }
}

fn read_raw(content: &str) -> std::result::Result<RawSettings, String> {
    let mut raw = RawSettings::default();

    xml::walk(content, |event| match event {
        XmlEvent::Open(path) => {
            if xml::is(path, &["settings", "mirrors", "mirror"]) {
                raw.mirrors.push(Mirror::default());
            } else if xml::is(path, &["settings", "profiles", "profile"]) {
                raw.profiles.push(Profile::default());
            } else if xml::is(
                path,
                &["settings", "profiles", "profile", "repositories", "repository"],
            ) {
                if let Some(profile) = raw.profiles.last_mut() {
                    profile.repositories.push((String::new(), String::new()));
                }
            }
        }
        XmlEvent::Text(path, text) => {
            if xml::ends_with(path, &["mirrors", "mirror", "id"]) {
                if let Some(mirror) = raw.mirrors.last_mut() {
                    mirror.id = text.to_string();
                }
            } else if xml::ends_with(path, &["mirrors", "mirror", "url"]) {
                if let Some(mirror) = raw.mirrors.last_mut() {
                    mirror.url = text.to_string();
                }
            } else if xml::ends_with(path, &["mirrors", "mirror", "mirrorOf"]) {
                if let Some(mirror) = raw.mirrors.last_mut() {
                    mirror.mirror_of = text.to_string();
                }
            } else if xml::is(path, &["settings", "profiles", "profile", "id"]) {
                if let Some(profile) = raw.profiles.last_mut() {
                    profile.id = text.to_string();
                }
            } else if xml::ends_with(path, &["profile", "activation", "activeByDefault"]) {
                if let Some(profile) = raw.profiles.last_mut() {
                    profile.active_by_default = text.eq_ignore_ascii_case("true");
                }
            } else if xml::ends_with(path, &["repositories", "repository", "id"]) {
                if let Some(repo) = raw.profiles.last_mut().and_then(|p| p.repositories.last_mut()) {
                    repo.0 = text.to_string();
                }
            } else if xml::ends_with(path, &["repositories", "repository", "url"]) {
                if let Some(repo) = raw.profiles.last_mut().and_then(|p| p.repositories.last_mut()) {
                    repo.1 = text.to_string();
                }
            } else if xml::is(path, &["settings", "activeProfiles", "activeProfile"]) {
                raw.active_profiles.push(text.to_string());
            }
        }
        XmlEvent::Close(_) => {}
    })?;

    raw.mirrors.retain(|mirror| !mirror.url.is_empty());
    for profile in &mut raw.profiles {
        profile.repositories.retain(|(_, url)| !url.is_empty());
    }
    Ok(raw)
}
