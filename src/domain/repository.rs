//! Result of one assembly run

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

/// The deliverable produced by a successful run
#[derive(Debug, Clone)]
pub struct RepositoryData {
    /// Path of the written archive
    pub repository_zip_path: PathBuf,

    /// Staged files that went into the archive
    pub files: BTreeSet<PathBuf>,

    /// BLAKE3 digest of the archive, `blake3:`-prefixed
    pub archive_digest: String,

    /// Working directory of the run; left in place for downstream verification
    pub working_directory: PathBuf,
}

impl RepositoryData {
    /// Archive entry names of the staged files, relative to the staging root
    pub fn archive_entries(&self) -> BTreeSet<String> {
        let staging_root = self.working_directory.join(crate::package::STAGING_DIR);
        self.files
            .iter()
            .filter_map(|file| relative_entry(&staging_root, file))
            .collect()
    }

    /// Remove the working directory once the caller is done with `files`
    pub fn remove_working_directory(&self) -> std::io::Result<()> {
        if self.working_directory.exists() {
            std::fs::remove_dir_all(&self.working_directory)?;
        }
        Ok(())
    }
}

fn relative_entry(root: &Path, file: &Path) -> Option<String> {
    let relative = file.strip_prefix(root).ok()?;
    let parts: Vec<String> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    Some(parts.join("/"))
}
