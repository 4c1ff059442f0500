//! Offline location ingest.
//!
//! Runs the boundary filter over a location CSV once and reports what was
//! accepted and dropped, optionally writing the accepted list as JSON.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use geocerca::pip::Boundary;
use geocerca::pipeline::{CsvSource, LocationStore};

#[derive(Parser, Debug)]
#[command(name = "ingest")]
#[command(about = "Filter a location CSV by a GeoJSON boundary")]
struct Args {
    /// Location CSV with a `geometry` column of `POINT (lon lat)` values
    #[arg(short, long)]
    csv: PathBuf,

    /// GeoJSON boundary; without it every valid coordinate is accepted
    #[arg(short, long)]
    boundary: Option<PathBuf>,

    /// Write accepted locations here as a JSON array
    #[arg(short, long)]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let args = Args::parse();

    info!("Geocerca Ingest");
    info!("File: {}", args.csv.display());

    let boundary = match &args.boundary {
        Some(path) => Boundary::load(path).await.ok(),
        None => None,
    };
    if boundary.is_none() {
        warn!("No boundary in use, spatial filtering disabled");
    }

    let source = CsvSource::open(&args.csv)
        .await
        .context("Failed to open location CSV")?;
    let rows = source.rows().context("Failed to read CSV header")?;

    let store = LocationStore::new();
    let report = store.rebuild(rows, boundary.as_ref());

    info!("Rows read: {}", report.total_rows());
    info!("  accepted:         {}", report.accepted);
    info!("  invalid geometry: {}", report.dropped_geometry);
    info!("  outside boundary: {}", report.dropped_outside);
    info!("  malformed:        {}", report.dropped_malformed);

    if let Some(output) = &args.output {
        let json = serde_json::to_string_pretty(&*store.snapshot())?;
        std::fs::write(output, json)
            .with_context(|| format!("Failed to write {}", output.display()))?;
        info!("Wrote {} locations to {}", report.accepted, output.display());
    }

    Ok(())
}
