//! Working directories of assembly runs
//!
//! Every run gets its own `deliverable-generation<suffix>` directory. The base
//! is never relative, so runs are never created under the current working
//! directory (e.g. when TMPDIR=tmp or TMPDIR=./tmp).

use std::env;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Name prefix of run working directories
pub const WORK_DIR_PREFIX: &str = "deliverable-generation";

static RUN_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Returns a directory path suitable for creating temporary directories.
/// Never returns a relative path.
pub fn temp_dir_base() -> PathBuf {
    let t = env::temp_dir();
    if t.is_absolute() {
        t
    } else {
        #[cfg(windows)]
        {
            env::var("TEMP")
                .or_else(|_| env::var("TMP"))
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("C:\\Windows\\Temp"))
        }
        #[cfg(not(windows))]
        {
            PathBuf::from("/tmp")
        }
    }
}

/// Creates a fresh working directory under `root`
///
/// The directory outlives the process; the caller decides when to remove it.
pub fn create_work_dir(root: &Path) -> io::Result<PathBuf> {
    std::fs::create_dir_all(root)?;
    loop {
        let candidate = root.join(format!("{WORK_DIR_PREFIX}{}", unique_suffix()));
        match std::fs::create_dir(&candidate) {
            Ok(()) => return Ok(candidate),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {}
            Err(e) => return Err(e),
        }
    }
}

fn unique_suffix() -> String {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or_default();
    let run = RUN_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{}-{run}-{nanos:09}", std::process::id())
}
