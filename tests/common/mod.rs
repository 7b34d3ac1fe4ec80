//! Common test utilities for Repogen integration tests
//!
//! A [`TestRelease`] owns a temporary directory holding a `file://` remote
//! repository, a Maven settings file pointing at it and the release output.

use std::path::{Path, PathBuf};

use repogen::domain::ArtifactCoordinate;
use tempfile::TempDir;
use url::Url;

/// A release setup with a local remote repository
#[allow(dead_code)]
pub struct TestRelease {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Root of the temporary directory
    pub path: PathBuf,
}

impl TestRelease {
    /// Create an empty release setup
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = dunce::canonicalize(temp.path()).expect("Failed to canonicalize temp dir");
        std::fs::create_dir_all(path.join("remote")).expect("Failed to create remote");
        Self { temp, path }
    }

    /// Directory served as the remote repository
    pub fn remote_dir(&self) -> PathBuf {
        self.path.join("remote")
    }

    /// `file://` URL of the remote repository
    pub fn remote_url(&self) -> String {
        file_url(&self.remote_dir())
    }

    /// Where archives are written
    #[allow(dead_code)]
    pub fn output_dir(&self) -> PathBuf {
        self.path.join("release")
    }

    /// Parent of run working directories
    #[allow(dead_code)]
    pub fn work_root(&self) -> PathBuf {
        self.path.join("work")
    }

    /// Write a file below the temp root
    #[allow(dead_code)]
    pub fn write_file(&self, path: &str, content: &str) -> PathBuf {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
        file_path
    }

    /// Publish a descriptor to the remote repository
    ///
    /// `coordinate` and `parent` are `g:a:v`; `dependencies` are `g:a:v` or
    /// `g:a:v@scope`.
    pub fn publish_pom(&self, coordinate: &str, parent: Option<&str>, dependencies: &[&str]) {
        let c = parse(coordinate);
        let parent = parent.map_or_else(String::new, |p| {
            let p = parse(p);
            format!(
                "<parent><groupId>{}</groupId><artifactId>{}</artifactId><version>{}</version></parent>",
                p.group_id, p.artifact_id, p.version
            )
        });
        let dependencies: String = dependencies
            .iter()
            .map(|d| {
                let (d, scope) = d.split_once('@').unwrap_or((d, "compile"));
                let d = parse(d);
                format!(
                    "<dependency><groupId>{}</groupId><artifactId>{}</artifactId><version>{}</version><scope>{scope}</scope></dependency>",
                    d.group_id, d.artifact_id, d.version
                )
            })
            .collect();
        let packaging = if coordinate.contains("parent") { "pom" } else { "jar" };
        let xml = format!(
            "<?xml version=\"1.0\"?>\n<project xmlns=\"http://maven.apache.org/POM/4.0.0\">\n  <modelVersion>4.0.0</modelVersion>\n  {parent}\n  <groupId>{}</groupId>\n  <artifactId>{}</artifactId>\n  <version>{}</version>\n  <packaging>{packaging}</packaging>\n  <dependencies>{dependencies}</dependencies>\n</project>\n",
            c.group_id, c.artifact_id, c.version
        );
        self.publish(&c.pom(), &xml);
    }

    /// Publish a jar (and its descriptor) to the remote repository
    #[allow(dead_code)]
    pub fn publish_jar(&self, coordinate: &str, parent: Option<&str>, dependencies: &[&str]) {
        self.publish_pom(coordinate, parent, dependencies);
        let c = parse(coordinate);
        self.publish(&c, &format!("jar content of {coordinate}"));
    }

    fn publish(&self, coordinate: &ArtifactCoordinate, content: &str) {
        let target = self.remote_dir().join(coordinate.relative_path());
        std::fs::create_dir_all(target.parent().expect("artifact path has a parent"))
            .expect("Failed to create artifact directory");
        std::fs::write(target, content).expect("Failed to publish artifact");
    }

    /// Write an extensions list and return its `file://` URL
    pub fn write_extensions_list(&self, entries: &[&str]) -> String {
        let path = self.write_file("lists/extensions.txt", &(entries.join("\n") + "\n"));
        file_url(&path)
    }

    /// Write a settings file resolving from the remote repository only
    pub fn write_settings(&self) -> PathBuf {
        let settings = format!(
            r#"<?xml version="1.0" encoding="UTF-8"?>
<settings>
  <profiles>
    <profile>
      <id>local</id>
      <repositories>
        <repository>
          <id>local</id>
          <url>{}</url>
        </repository>
      </repositories>
    </profile>
  </profiles>
  <activeProfiles>
    <activeProfile>local</activeProfile>
  </activeProfiles>
</settings>
"#,
            self.remote_url()
        );
        self.write_file("settings.xml", &settings)
    }

    /// Publish the vertx-bridge-common release used by the resolve-only scenario
    #[allow(dead_code)]
    pub fn publish_vertx_bridge_common(&self) {
        self.publish_pom("org.jboss:jboss-parent:37", None, &[]);
        self.publish_jar(
            "io.vertx:vertx-bridge-common:4.1.0",
            Some("org.jboss:jboss-parent:37"),
            &["io.vertx:vertx-core:4.1.0", "junit:junit:4.13.2@test"],
        );
    }

    /// Get path to repogen binary
    #[allow(dead_code)]
    pub fn repogen_bin() -> PathBuf {
        PathBuf::from(env!("CARGO_BIN_EXE_repogen"))
    }
}

impl Default for TestRelease {
    fn default() -> Self {
        Self::new()
    }
}

/// `file://` URL of a local path
#[allow(dead_code)]
pub fn file_url(path: &Path) -> String {
    Url::from_file_path(path)
        .expect("absolute path")
        .to_string()
}

fn parse(coordinate: &str) -> ArtifactCoordinate {
    coordinate.parse().expect("valid coordinate")
}
