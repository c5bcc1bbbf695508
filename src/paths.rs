//! Bundle layout and path resolution.

use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};

use crate::error::FixError;
use crate::walk::WorkItem;

/// Directory under the bundle root that every destination is relative to.
pub const CONTENTS_DIR: &str = "Contents";

/// Executable directory, relative to `Contents`.
pub const EXECUTABLES_DIR: &str = "MacOS";

/// Frameworks and shared libraries directory, relative to `Contents`.
pub const FRAMEWORKS_DIR: &str = "Frameworks";

/// An application bundle on disk, e.g. `MyApp.app`.
#[derive(Debug, Clone)]
pub struct Bundle {
    root: PathBuf,
}

impl Bundle {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn contents(&self) -> PathBuf {
        self.root.join(CONTENTS_DIR)
    }

    /// Absolute location of a `Contents`-relative destination.
    ///
    /// Absolute destinations (dependencies discovered by otool) are mirrored
    /// under `Contents` rather than replacing it. The result is normalized
    /// lexically so it can be used as a dedup key.
    ///
    /// `..` never climbs above `Contents`, the same way `/..` is `/`.
    pub fn resolve(&self, destination: &Path) -> PathBuf {
        let mut relative = PathBuf::new();
        for component in destination.components() {
            match component {
                Component::Normal(part) => relative.push(part),
                Component::ParentDir => {
                    relative.pop();
                }
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }
        normalize(&self.contents()).join(relative)
    }

    /// List the files already in `Contents/MacOS` and `Contents/Frameworks`.
    ///
    /// Only regular files directly inside each directory are returned,
    /// sorted by name. Symlinks to regular files (versioned dylib names)
    /// count as files. A missing directory yields nothing.
    pub fn scan(&self) -> Result<Vec<WorkItem>, FixError> {
        let mut items = Vec::new();
        for subdir in [EXECUTABLES_DIR, FRAMEWORKS_DIR] {
            let dir = self.contents().join(subdir);
            for name in regular_files(&dir)? {
                items.push(WorkItem::new(dir.join(&name), Path::new(subdir).join(&name)));
            }
        }
        Ok(items)
    }
}

fn regular_files(dir: &Path) -> Result<Vec<String>, FixError> {
    let scan_failure = |source: io::Error| FixError::ScanFailure {
        path: dir.to_path_buf(),
        source,
    };

    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(scan_failure(e)),
    };

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(scan_failure)?;
        if entry.path().is_file() {
            names.push(entry.file_name().to_string_lossy().into_owned());
        }
    }
    names.sort();
    Ok(names)
}

/// Drop `.` components and fold `..` without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_os_str()),
        }
    }
    normalized
}
