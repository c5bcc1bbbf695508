//! Make macOS application bundles self-contained.
//!
//! Walks the shared-library dependency closure of a bundle's binaries with
//! `otool -L` and copies every dependency that is not part of the operating
//! system into `Contents/`, mirroring its absolute path. Load commands are
//! not rewritten; this only places files.

mod analyze;
mod copy;
mod error;
mod filter;
mod paths;
mod walk;

pub use analyze::{is_self_referential, parse_otool_output, DependencyInspector, Otool, OTOOL};
pub use copy::copy_if_missing;
pub use error::FixError;
pub use filter::{PathFilter, SYSTEM_LIBRARY_PATTERNS};
pub use paths::{Bundle, CONTENTS_DIR, EXECUTABLES_DIR, FRAMEWORKS_DIR};
pub use walk::{fix_bundle, Fixer, Summary, WorkItem};
