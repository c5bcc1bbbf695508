//! Copying files into the bundle.

use std::fs;
use std::io;
use std::path::Path;

use crate::error::FixError;

/// Copy `src` to `dest` unless something already exists at `dest`.
///
/// Missing parent directories are created. An existing destination is left
/// alone even if its contents differ from `src`.
///
/// Returns `Ok(true)` if the file was copied, `Ok(false)` if it already existed.
pub fn copy_if_missing(src: &Path, dest: &Path) -> Result<bool, FixError> {
    if dest.exists() || dest.is_symlink() {
        return Ok(false); // Already copied
    }

    let copy_failure = |source: io::Error| FixError::CopyFailure {
        source_path: src.to_path_buf(),
        destination: dest.to_path_buf(),
        source,
    };

    if !src.is_file() {
        return Err(copy_failure(io::Error::new(
            io::ErrorKind::NotFound,
            "source file does not exist",
        )));
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(copy_failure)?;
    }
    fs::copy(src, dest).map_err(copy_failure)?;

    Ok(true)
}
