//! GeoJSON to S2 covering converter.
//!
//! Reads a feature collection, covers every polygon, multipolygon and
//! linestring with S2 cells, and optionally classifies markers against the
//! coverings.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use s2cover::config::{DegeneratePolicy, PipelineConfig};
use s2cover::Pipeline;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: tikv_jemallocator::Jemalloc = tikv_jemallocator::Jemalloc;

#[derive(Parser, Debug)]
#[command(name = "s2cover")]
#[command(about = "Cover GeoJSON features with S2 cells and classify markers")]
struct Args {
    /// GeoJSON feature collection (.geojson or .geojson.gz)
    input: PathBuf,

    /// TOML config file; flags override its values
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write one file per feature instead of one combined file
    #[arg(long)]
    separate: bool,

    /// Indent output GeoJSON
    #[arg(long)]
    pretty: Option<bool>,

    /// Skip features whose outer or hole covering has more cells than this
    #[arg(long)]
    skip_cells: Option<usize>,

    /// Maximum S2 cell level
    #[arg(long)]
    max_level: Option<u8>,

    /// Minimum S2 cell level
    #[arg(long)]
    min_level: Option<u8>,

    /// Maximum cells per loop covering
    #[arg(long)]
    max_cells: Option<usize>,

    /// Output directory
    #[arg(long)]
    outdir: Option<PathBuf>,

    /// Marker CSV (name, latitude, longitude; no header)
    #[arg(long)]
    markers: Option<PathBuf>,

    /// Add marker points to the output GeoJSON
    #[arg(long)]
    include_markers: bool,

    /// Outline the ancestor cells at this level
    #[arg(long)]
    grid_level: Option<u8>,

    /// Drop features with degenerate rings instead of aborting
    #[arg(long)]
    skip_degenerate: bool,

    /// Compute coverings on all cores
    #[arg(long)]
    parallel: bool,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long)]
    verbose: bool,
}

impl Args {
    fn pipeline_config(&self) -> Result<PipelineConfig> {
        let mut config = match &self.config {
            Some(path) => PipelineConfig::load_from_file(path)
                .with_context(|| format!("Failed to load config {}", path.display()))?,
            None => PipelineConfig::default(),
        };

        if let Some(min_level) = self.min_level {
            config.covering.min_level = min_level;
        }
        if let Some(max_level) = self.max_level {
            config.covering.max_level = max_level;
        }
        if let Some(max_cells) = self.max_cells {
            config.covering.max_cells = max_cells;
        }
        if let Some(skip_cells) = self.skip_cells {
            config.guard.max_cell_features = skip_cells;
        }
        if let Some(outdir) = &self.outdir {
            config.output.directory = outdir.clone();
        }
        if let Some(pretty) = self.pretty {
            config.output.pretty = pretty;
        }
        if let Some(grid_level) = self.grid_level {
            config.output.grid_level = Some(grid_level);
        }
        config.output.separate |= self.separate;
        config.output.include_markers |= self.include_markers;
        config.parallel_covering |= self.parallel;
        if self.skip_degenerate {
            config.on_degenerate = DegeneratePolicy::Skip;
        }

        Ok(config)
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let default_level = if args.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if !args.input.exists() {
        anyhow::bail!("Input file {} does not exist", args.input.display());
    }

    let config = args.pipeline_config()?;

    info!("s2cover");
    info!("Input: {}", args.input.display());
    info!("Min level: {}", config.covering.min_level);
    info!("Max level: {}", config.covering.max_level);
    info!("Max cells: {}", config.covering.max_cells);
    info!("Skip cells: {}", config.guard.max_cell_features);
    match &args.markers {
        Some(path) => info!("Markers: {}", path.display()),
        None => info!("Markers: none"),
    }
    info!("Output: {}", config.output.directory.display());
    info!("Separate: {}", config.output.separate);
    info!("Pretty: {}", config.output.pretty);

    let pipeline = Pipeline::new(config).context("Invalid configuration")?;

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({per_sec})",
            )?
            .progress_chars("#>-"),
    );

    let summary = pipeline
        .run_with_progress(&args.input, args.markers.as_deref(), |done, total| {
            pb.set_length(total as u64);
            pb.set_position(done as u64);
        })
        .with_context(|| format!("Failed to process {}", args.input.display()))?;

    pb.finish_and_clear();

    info!(
        "Processed {} of {} features ({} skipped, {} failed)",
        summary.processed,
        summary.features_read,
        summary.skipped.len(),
        summary.failed
    );
    info!(
        "Cells: {} outer, {} hole",
        summary.outer_cells, summary.hole_cells
    );
    if let Some(rows) = summary.marker_rows {
        info!("Marker rows: {}", rows);
    }
    for path in &summary.output_files {
        debug!("Wrote {}", path.display());
    }
    info!("Wrote {} GeoJSON files", summary.output_files.len());

    info!("Done");
    Ok(())
}
