//! Breadth-first walk of the dependency closure.
//!
//! Files are processed in FIFO order. Each one is copied into the bundle if
//! it is missing, then inspected, and its non-system dependencies are
//! appended to the queue. A file whose destination was already processed is
//! skipped, which also breaks dependency cycles.

use std::collections::{HashSet, VecDeque};
use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::analyze::{DependencyInspector, Otool};
use crate::copy::copy_if_missing;
use crate::error::FixError;
use crate::filter::PathFilter;
use crate::paths::Bundle;

/// A file that has to end up inside the bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    source: PathBuf,
    destination: PathBuf,
}

impl WorkItem {
    /// `destination` is relative to the bundle's `Contents` directory.
    pub fn new(source: impl Into<PathBuf>, destination: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            destination: destination.into(),
        }
    }

    /// A discovered dependency, placed at its own absolute path under `Contents`.
    pub fn dependency(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        Self {
            source: path.clone(),
            destination: path,
        }
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn destination(&self) -> &Path {
        &self.destination
    }
}

/// What a finished run did.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    /// Absolute destinations that were copied, in the order they were copied.
    pub copied: Vec<PathBuf>,
    /// Number of files handed to the inspector.
    pub inspected: usize,
}

/// Makes a bundle self-contained by copying in its dependency closure.
pub struct Fixer<I> {
    bundle: Bundle,
    inspector: I,
    filter: PathFilter,
    queue: VecDeque<WorkItem>,
    processed: HashSet<PathBuf>,
    verbose: bool,
}

impl<I: DependencyInspector> Fixer<I> {
    /// # Errors
    ///
    /// Returns [`FixError::BundleNotFound`] if `bundle_root` does not exist.
    pub fn new(bundle_root: impl Into<PathBuf>, inspector: I) -> Result<Self, FixError> {
        let root = bundle_root.into();
        if !root.exists() {
            return Err(FixError::BundleNotFound { path: root });
        }
        Ok(Self {
            bundle: Bundle::new(root),
            inspector,
            filter: PathFilter::default(),
            queue: VecDeque::new(),
            processed: HashSet::new(),
            verbose: true,
        })
    }

    #[must_use]
    pub fn with_filter(mut self, filter: PathFilter) -> Self {
        self.filter = filter;
        self
    }

    #[must_use]
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn inspector(&self) -> &I {
        &self.inspector
    }

    pub fn add_file(&mut self, item: WorkItem) {
        self.queue.push_back(item);
    }

    /// Seed the queue with every file already in the bundle's executable and
    /// frameworks directories. Returns how many items were added.
    pub fn scan_bundle(&mut self) -> Result<usize, FixError> {
        let items = self.bundle.scan()?;
        let count = items.len();
        self.queue.extend(items);
        Ok(count)
    }

    /// Drain the queue. The first error aborts the run; files copied before
    /// it stay in the bundle.
    pub fn run(&mut self) -> Result<Summary, FixError> {
        let mut summary = Summary::default();

        while let Some(item) = self.queue.pop_front() {
            let dest = self.bundle.resolve(item.destination());
            if self.processed.contains(&dest) {
                if self.verbose {
                    warn!("Already processed: {}", dest.display());
                }
                continue;
            }

            if self.verbose {
                info!("Processing file: {}", item.source().display());
            }
            if copy_if_missing(item.source(), &dest)? {
                if self.verbose {
                    info!("Copied {} to {}", item.source().display(), dest.display());
                }
                summary.copied.push(dest.clone());
            }

            let dependencies = self.inspector.dependencies(&dest)?;
            summary.inspected += 1;
            if self.verbose {
                info!(
                    "Dependencies for {}:{}",
                    item.source().display(),
                    format_list(&dependencies)
                );
            }

            let kept: Vec<String> = dependencies
                .into_iter()
                .filter(|dep| !self.filter.is_excluded(dep))
                .filter(|dep| !is_self_reference(dep, &item, &dest))
                .collect();
            if self.verbose {
                info!(
                    "Filtered dependencies for {}:{}",
                    item.source().display(),
                    format_list(&kept)
                );
            }

            self.queue.extend(kept.into_iter().map(WorkItem::dependency));
            self.processed.insert(dest);
        }

        Ok(summary)
    }
}

/// otool lists a dylib's own install name among its dependencies.
///
/// Besides the resolved destination, a dependency equal to the item's own
/// source path counts as a self-reference too. This is wider than matching
/// the destination alone: a seeded item whose source differs from its
/// destination never has its install name mirrored into the bundle.
fn is_self_reference(dep: &str, item: &WorkItem, dest: &Path) -> bool {
    let dep = Path::new(dep);
    dep == dest || dep == item.source()
}

fn format_list(paths: &[String]) -> String {
    paths.iter().map(|p| format!("\n\t{p}")).collect()
}

/// Copy the dependency closure of `items` into the bundle at `bundle_root`
/// using `otool`.
pub fn fix_bundle(
    bundle_root: impl Into<PathBuf>,
    items: impl IntoIterator<Item = WorkItem>,
    filter: PathFilter,
    verbose: bool,
) -> Result<Summary, FixError> {
    let mut fixer = Fixer::new(bundle_root, Otool::new())?
        .with_filter(filter)
        .verbose(verbose);
    for item in items {
        fixer.add_file(item);
    }
    fixer.run()
}
