//! Mach-O dependency analysis using otool.

use std::path::{Path, PathBuf};
use std::process::Command;

use tracing::debug;

use crate::error::FixError;

/// Fixed location of the inspection utility on macOS.
pub const OTOOL: &str = "/usr/bin/otool";

/// Load-path prefixes resolved by dyld relative to the bundle or a search list.
const SELF_REFERENTIAL_TOKENS: [&str; 3] = ["@executable_path", "@loader_path", "@rpath"];

/// Looks up the libraries a binary links against.
///
/// The walker calls this once for every file it has not processed yet, so a
/// test double can stand in for a whole dependency graph.
pub trait DependencyInspector {
    /// Return the absolute dependency paths declared by `path`, in the order
    /// the binary declares them.
    fn dependencies(&self, path: &Path) -> Result<Vec<String>, FixError>;
}

/// Inspector backed by `otool -L`.
#[derive(Debug, Clone)]
pub struct Otool {
    program: PathBuf,
}

impl Otool {
    pub fn new() -> Self {
        Self::at(OTOOL)
    }

    /// Use a different otool-compatible program.
    pub fn at(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for Otool {
    fn default() -> Self {
        Self::new()
    }
}

impl DependencyInspector for Otool {
    /// # Errors
    ///
    /// Returns [`FixError::InspectionFailure`] if:
    /// - The file does not exist
    /// - otool cannot be launched (missing Xcode command line tools)
    /// - otool exits unsuccessfully, e.g. for a file that is not Mach-O
    /// - the output is not valid UTF-8
    fn dependencies(&self, path: &Path) -> Result<Vec<String>, FixError> {
        // Check file exists first for a clear error message
        if !path.exists() {
            return Err(FixError::inspection(path, "file does not exist"));
        }

        debug!(program = %self.program.display(), file = %path.display(), "running otool");
        let output = Command::new(&self.program)
            .arg("-L")
            .arg(path)
            .output()
            .map_err(|e| {
                FixError::inspection(
                    path,
                    format!("could not launch {}: {e}", self.program.display()),
                )
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(FixError::inspection(
                path,
                format!(
                    "{} exited with {}: {}",
                    self.program.display(),
                    output.status,
                    stderr.trim()
                ),
            ));
        }

        let stdout = String::from_utf8(output.stdout)
            .map_err(|_| FixError::inspection(path, "otool output is not valid UTF-8"))?;
        Ok(parse_otool_output(&stdout))
    }
}

/// Parse `otool -L` output into dependency paths.
///
/// Example output:
/// ```text
/// /Applications/MyApp.app/Contents/MacOS/MyApp:
///     /opt/local/lib/libfoo.1.dylib (compatibility version 2.0.0, current version 2.4.0)
///     @rpath/QtCore.framework/Versions/5/QtCore (compatibility version 5.15.0)
///     /usr/lib/libSystem.B.dylib (compatibility version 1.0.0, current version 1311.0.0)
/// ```
///
/// Only tab-indented lines are dependencies. Self-referential load paths
/// (`@executable_path`, `@loader_path`, `@rpath`) are dropped.
pub fn parse_otool_output(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| line.strip_prefix('\t'))
        .filter_map(|rest| rest.split_whitespace().next())
        .filter(|dep| !is_self_referential(dep))
        .map(str::to_string)
        .collect()
}

/// Whether a load path resolves inside the bundle or through a search list.
pub fn is_self_referential(dep: &str) -> bool {
    SELF_REFERENTIAL_TOKENS.iter().any(|token| dep.contains(token))
}
