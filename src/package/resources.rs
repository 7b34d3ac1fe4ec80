//! README and settings template shipped at the root of the repository
//!
//! Both can be replaced by placing a file with the same resource name in the
//! configuration directory.

use std::path::Path;

use crate::error::{Result, package};

/// Resource name of the README template
pub const README_RESOURCE: &str = "repository-README.md";

/// Resource name of the example settings template
pub const SETTINGS_RESOURCE: &str = "repository-example-settings.xml";

/// Placeholder replaced with the archive's top-level directory name
pub const TOP_LEVEL_DIRECTORY_PLACEHOLDER: &str = "{{top_level_directory}}";

const DEFAULT_README: &str = include_str!("../../resources/repository-README.md");
const DEFAULT_SETTINGS: &str = include_str!("../../resources/repository-example-settings.xml");

/// A file added next to the artifacts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuxiliaryFile {
    /// Name at the root of the repository tree
    pub name: &'static str,
    pub content: String,
}

/// The README and settings template, rendered for `top_level_directory`
pub fn auxiliary_files(
    configuration_directory: Option<&Path>,
    top_level_directory: &str,
) -> Result<Vec<AuxiliaryFile>> {
    let specs = [
        ("README.md", README_RESOURCE, DEFAULT_README),
        ("example-settings.xml", SETTINGS_RESOURCE, DEFAULT_SETTINGS),
    ];

    specs
        .into_iter()
        .map(|(name, resource, default)| {
            let template = overridable(configuration_directory, resource, default)?;
            Ok(AuxiliaryFile {
                name,
                content: template.replace(TOP_LEVEL_DIRECTORY_PLACEHOLDER, top_level_directory),
            })
        })
        .collect()
}

/// The override from the configuration directory, or the built-in default
fn overridable(
    configuration_directory: Option<&Path>,
    resource: &str,
    default: &str,
) -> Result<String> {
    let Some(candidate) = configuration_directory
        .map(|dir| dir.join(resource))
        .filter(|path| path.is_file())
    else {
        return Ok(default.to_string());
    };

    tracing::debug!(path = %candidate.display(), "using resource override");
    std::fs::read_to_string(&candidate).map_err(|e| package::io(&candidate, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults_are_rendered() {
        let files = auxiliary_files(None, "rh-sample-maven-repository").unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.name).collect();
        assert_eq!(names, vec!["README.md", "example-settings.xml"]);
        for file in &files {
            assert!(file.content.contains("rh-sample-maven-repository"));
            assert!(!file.content.contains(TOP_LEVEL_DIRECTORY_PLACEHOLDER));
        }
    }

    #[test]
    fn test_configuration_directory_overrides() {
        let temp = TempDir::new().unwrap();
        std::fs::write(
            temp.path().join(README_RESOURCE),
            "Custom readme for {{top_level_directory}}",
        )
        .unwrap();

        let files = auxiliary_files(Some(temp.path()), "rh-sample-maven-repository").unwrap();
        assert_eq!(files[0].content, "Custom readme for rh-sample-maven-repository");
        // No override for the settings template
        assert!(files[1].content.contains("<settings"));
    }
}
