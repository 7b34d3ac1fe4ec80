//! POM descriptor reading
//!
//! Only the parts of a POM that matter for resolution are kept: identity,
//! parent reference, properties, dependency management and dependencies.
//! Profiles, build sections and reporting are ignored.

use std::collections::BTreeMap;

use crate::xml::{self, XmlEvent};

/// `<parent>` reference of a POM
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParentRef {
    pub group_id: String,
    pub artifact_id: String,
    pub version: String,
}

/// `<exclusion>` entry; either part may be `*`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Exclusion {
    pub group_id: String,
    pub artifact_id: String,
}

impl Exclusion {
    pub fn matches(&self, group_id: &str, artifact_id: &str) -> bool {
        (self.group_id == "*" || self.group_id == group_id)
            && (self.artifact_id == "*" || self.artifact_id == artifact_id)
    }
}

/// A `<dependency>` as written, before interpolation and management
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dependency {
    pub group_id: String,
    pub artifact_id: String,
    pub version: Option<String>,
    pub kind: Option<String>,
    pub classifier: Option<String>,
    pub scope: Option<String>,
    pub optional: Option<String>,
    pub exclusions: Vec<Exclusion>,
}

/// A parsed POM
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Pom {
    pub group_id: Option<String>,
    pub artifact_id: Option<String>,
    pub version: Option<String>,
    pub packaging: Option<String>,
    pub parent: Option<ParentRef>,
    pub properties: BTreeMap<String, String>,
    pub dependency_management: Vec<Dependency>,
    pub dependencies: Vec<Dependency>,
}

#[derive(Clone, Copy)]
enum Section {
    Managed,
    Direct,
}

impl Pom {
    /// Parses POM XML
    pub fn parse(content: &str) -> Result<Self, String> {
        let mut pom = Pom::default();
        let mut root: Option<String> = None;

        xml::walk(content, |event| match event {
            XmlEvent::Open(path) => {
                if path.len() == 1 {
                    root = Some(path[0].clone());
                }
                match path {
                    [_, p] if p == "parent" => pom.parent = Some(ParentRef::default()),
                    _ => {}
                }
                if let Some(section) = dependency_section(path, 0) {
                    pom.section_mut(section).push(Dependency::default());
                }
                if xml::ends_with(path, &["exclusions", "exclusion"]) {
                    if let Some(dependency) = dependency_section(path, 2)
                        .and_then(|section| pom.section_mut(section).last_mut())
                    {
                        dependency.exclusions.push(Exclusion::default());
                    }
                }
            }
            XmlEvent::Text(path, text) => pom.set_text(path, text),
            XmlEvent::Close(_) => {}
        })?;

        match root.as_deref() {
            Some("project") => Ok(pom),
            Some(other) => Err(format!("expected <project> root element, found <{other}>")),
            None => Err("document has no root element".to_string()),
        }
    }

    fn section_mut(&mut self, section: Section) -> &mut Vec<Dependency> {
        match section {
            Section::Managed => &mut self.dependency_management,
            Section::Direct => &mut self.dependencies,
        }
    }

    fn set_text(&mut self, path: &[String], text: &str) {
        let value = text.to_string();
        match path {
            [_, field] => match field.as_str() {
                "groupId" => self.group_id = Some(value),
                "artifactId" => self.artifact_id = Some(value),
                "version" => self.version = Some(value),
                "packaging" => self.packaging = Some(value),
                _ => {}
            },
            [_, section, field] if section == "parent" => {
                if let Some(parent) = self.parent.as_mut() {
                    match field.as_str() {
                        "groupId" => parent.group_id = value,
                        "artifactId" => parent.artifact_id = value,
                        "version" => parent.version = value,
                        _ => {}
                    }
                }
            }
            [_, section, name] if section == "properties" => {
                self.properties.insert(name.clone(), value);
            }
            _ => self.set_dependency_text(path, value),
        }
    }

    fn set_dependency_text(&mut self, path: &[String], value: String) {
        // .../dependency/exclusions/exclusion/<field>
        if let Some(section) = dependency_section(path, 3) {
            if xml::ends_with(&path[..path.len() - 1], &["exclusions", "exclusion"]) {
                let exclusion = self
                    .section_mut(section)
                    .last_mut()
                    .and_then(|d| d.exclusions.last_mut());
                if let Some(exclusion) = exclusion {
                    match path[path.len() - 1].as_str() {
                        "groupId" => exclusion.group_id = value,
                        "artifactId" => exclusion.artifact_id = value,
                        _ => {}
                    }
                }
                return;
            }
        }

        // .../dependency/<field>
        let Some(section) = dependency_section(path, 1) else {
            return;
        };
        let Some(dependency) = self.section_mut(section).last_mut() else {
            return;
        };
        match path[path.len() - 1].as_str() {
            "groupId" => dependency.group_id = value,
            "artifactId" => dependency.artifact_id = value,
            "version" => dependency.version = Some(value),
            "type" => dependency.kind = Some(value),
            "classifier" => dependency.classifier = Some(value),
            "scope" => dependency.scope = Some(value),
            "optional" => dependency.optional = Some(value),
            _ => {}
        }
    }
}

/// Section whose `<dependency>` element sits `below` levels above the end of `path`
fn dependency_section(path: &[String], below: usize) -> Option<Section> {
    let end = path.len().checked_sub(below)?;
    let head = &path[..end];
    if xml::is(head, &["project", "dependencyManagement", "dependencies", "dependency"]) {
        Some(Section::Managed)
    } else if xml::is(head, &["project", "dependencies", "dependency"]) {
        Some(Section::Direct)
    } else {
        None
    }
}
