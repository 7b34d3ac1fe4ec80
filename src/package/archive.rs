//! Deterministic zip archives
//!
//! Identical trees produce byte-identical archives: entries are sorted by
//! path, directories get their own entries, and every entry carries the same
//! timestamp (1980-01-01 00:00) and permissions.

use std::fs::File;
use std::io::{BufReader, Write};
use std::path::Path;

use walkdir::WalkDir;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipArchive, ZipWriter};

use crate::error::{Result, package};

const FILE_PERMISSIONS: u32 = 0o644;
const DIRECTORY_PERMISSIONS: u32 = 0o755;

/// Archive entry names of a tree, sorted, directories ending with `/`
pub fn entry_names(root: &Path) -> Result<Vec<(String, bool)>> {
    let mut entries = Vec::new();
    for entry in WalkDir::new(root).min_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|e| package::io(root, e))?;
        let relative = entry
            .path()
            .strip_prefix(root)
            .map_err(|e| package::io(entry.path(), e))?;
        let name = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy().into_owned())
            .collect::<Vec<_>>()
            .join("/");
        let is_dir = entry.file_type().is_dir();
        entries.push(if is_dir {
            (format!("{name}/"), true)
        } else {
            (name, false)
        });
    }
    entries.sort();
    Ok(entries)
}

/// Zips the contents of `root` into `destination`
///
/// The archive is written to a temporary file next to `destination` and
/// renamed into place once complete.
pub fn write_zip(root: &Path, destination: &Path) -> Result<()> {
    let directory = destination
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    std::fs::create_dir_all(directory).map_err(|e| package::io(directory, e))?;

    let temp = tempfile::NamedTempFile::new_in(directory).map_err(|e| package::io(directory, e))?;
    let mut zip = ZipWriter::new(temp);

    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default());

    for (name, is_dir) in entry_names(root)? {
        if is_dir {
            zip.add_directory(
                name.trim_end_matches('/'),
                options.unix_permissions(DIRECTORY_PERMISSIONS),
            )
            .map_err(|e| package::io(destination, e))?;
            continue;
        }

        let source = root.join(&name);
        zip.start_file(name.as_str(), options.unix_permissions(FILE_PERMISSIONS))
            .map_err(|e| package::io(destination, e))?;
        let mut reader = BufReader::new(File::open(&source).map_err(|e| package::io(&source, e))?);
        std::io::copy(&mut reader, &mut zip).map_err(|e| package::io(&source, e))?;
    }

    let mut temp = zip.finish().map_err(|e| package::io(destination, e))?;
    temp.flush().map_err(|e| package::io(destination, e))?;
    temp.persist(destination)
        .map_err(|e| package::io(destination, e.error))?;
    Ok(())
}

/// Entry names of an existing archive, in archive order
pub fn list_entries(archive: &Path) -> Result<Vec<String>> {
    let file = File::open(archive).map_err(|e| package::io(archive, e))?;
    let mut zip = ZipArchive::new(BufReader::new(file)).map_err(|e| package::io(archive, e))?;

    let mut names = Vec::with_capacity(zip.len());
    for index in 0..zip.len() {
        let entry = zip.by_index(index).map_err(|e| package::io(archive, e))?;
        names.push(entry.name().to_string());
    }
    Ok(names)
}
