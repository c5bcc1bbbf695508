//! Error types for bundle fixing.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Every failure is fatal for the run; nothing here is retried.
#[derive(Error, Debug)]
pub enum FixError {
    #[error("Bundle not found: {}", path.display())]
    BundleNotFound { path: PathBuf },

    #[error("Failed to inspect {}: {reason}", path.display())]
    InspectionFailure { path: PathBuf, reason: String },

    #[error("Failed to copy {} to {}", source_path.display(), destination.display())]
    CopyFailure {
        source_path: PathBuf,
        destination: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to scan bundle directory {}", path.display())]
    ScanFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FixError {
    pub(crate) fn inspection(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InspectionFailure {
            path: path.into(),
            reason: reason.into(),
        }
    }
}
