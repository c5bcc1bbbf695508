//! bundle-fixup: copy the non-system dylibs a bundle links against into it.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use bundle_fixup::{Fixer, Otool, PathFilter, WorkItem, EXECUTABLES_DIR};

/// Copy the shared-library dependencies of a macOS application bundle into it
#[derive(Parser, Debug)]
#[command(name = "bundle-fixup", version, about)]
struct Cli {
    /// Bundle root, e.g. MyApp.app
    bundle: PathBuf,

    /// Seed the worklist with every file in Contents/MacOS and Contents/Frameworks
    #[arg(short, long)]
    scan: bool,

    /// Seed an explicit file as SOURCE[=DEST]; DEST is relative to Contents
    /// and defaults to MacOS/<file name>
    #[arg(short, long, value_name = "SOURCE[=DEST]", value_parser = parse_item)]
    add: Vec<WorkItem>,

    /// Additional path substring to exclude from bundling (repeatable)
    #[arg(short, long, value_name = "PATTERN")]
    filter: Vec<String>,

    /// Print progress (default)
    #[arg(short, long, overrides_with = "quiet")]
    verbose: bool,

    /// Do not print progress
    #[arg(short, long, overrides_with = "verbose")]
    quiet: bool,
}

fn parse_item(arg: &str) -> Result<WorkItem, String> {
    match arg.split_once('=') {
        Some((source, dest)) if !source.is_empty() && !dest.is_empty() => {
            Ok(WorkItem::new(source, dest))
        }
        Some(_) => Err(format!("expected SOURCE=DEST, got '{arg}'")),
        None => {
            let name = Path::new(arg)
                .file_name()
                .ok_or_else(|| format!("'{arg}' has no file name"))?;
            Ok(WorkItem::new(arg, Path::new(EXECUTABLES_DIR).join(name)))
        }
    }
}

fn init_logging(quiet: bool) {
    let default = if quiet { "warn" } else { "info" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| default.into()))
        .with(
            tracing_subscriber::fmt::layer()
                .without_time()
                .with_target(false),
        )
        .init();
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let verbose = cli.verbose || !cli.quiet;
    init_logging(cli.quiet);

    let mut filter = PathFilter::default();
    filter.extend(cli.filter);

    let mut fixer = Fixer::new(&cli.bundle, Otool::new())?
        .with_filter(filter)
        .verbose(verbose);
    if cli.scan {
        let count = fixer.scan_bundle()?;
        tracing::debug!(count, "seeded worklist from bundle scan");
    }
    for item in cli.add {
        fixer.add_file(item);
    }

    let summary = fixer
        .run()
        .with_context(|| format!("Failed to fix bundle {}", cli.bundle.display()))?;
    if verbose {
        tracing::info!(
            "Done: {} file(s) inspected, {} copied",
            summary.inspected,
            summary.copied.len()
        );
    }
    Ok(())
}
