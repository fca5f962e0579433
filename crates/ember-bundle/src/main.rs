// Builds an asset bundle for the ember runtime.
// Run with: ember-bundle <SOURCE> <OUTPUT>

mod bundle;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use ember_engine::logging::{init_logging, LoggingConfig};

use bundle::BundleGenerator;

/// Scan an asset directory, write `assets.txt` and copy the tree next to it.
#[derive(Debug, Parser)]
#[command(name = "ember-bundle", version, about)]
struct Args {
    /// Directory holding the source assets.
    source: PathBuf,

    /// Directory the bundle is written to. Created if missing.
    output: PathBuf,

    /// Only write the manifest; do not copy the assets.
    #[arg(long)]
    no_copy: bool,

    /// Log every classified file.
    #[arg(short, long)]
    verbose: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(if args.verbose { LoggingConfig::verbose() } else { LoggingConfig::default() });

    let report = BundleGenerator::new(&args.source, &args.output).generate(!args.no_copy)?;

    log::info!(
        "bundle ready: {} assets, {:.2} KB declared, manifest at '{}'",
        report.assets.len(),
        report.total_bytes() as f64 / 1024.0,
        report.manifest.display()
    );
    Ok(())
}
