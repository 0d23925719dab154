//! Command-line front end for radmap.
//!
//! Aggregates directories of survey logs into a per-cell dose-rate table and,
//! optionally, a GeoJSON overlay and per-cell spectrum plots.
#![allow(clippy::uninlined_format_args)]

use clap::{Args, Parser, Subcommand};

use radmap_algorithms::{
    export_spectra, render_overlay, AggregationReport, Aggregator, DoseMap, ZeroDosePolicy,
};
use radmap_core::{AggregationConfig, NormalizedCellSummary};
use radmap_io::{
    load_config, read_all, GeoJsonOverlay, IngestStatistics, PngSpectrumPlotter, ReadingStream,
    SummaryFileWriter, SummaryFormat,
};
use std::path::{Path, PathBuf};
use std::time::Instant;
use thiserror::Error;

/// Result type for CLI operations.
type Result<T> = std::result::Result<T, CliError>;

/// CLI error types.
#[derive(Error, Debug)]
enum CliError {
    #[error("I/O error: {0}")]
    RadmapIo(#[from] radmap_io::Error),

    #[error("{0}")]
    Core(#[from] radmap_core::Error),
}

/// Geotagged radiation-log aggregator.
#[derive(Parser)]
#[command(name = "radmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Aggregate log directories into per-cell dose rates
    Aggregate {
        /// Log directories (or individual log files)
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Output file path (.csv, .jsonl or .json)
        #[arg(short, long)]
        output: PathBuf,

        #[command(flatten)]
        settings: Settings,

        /// Write a GeoJSON overlay to this file
        #[arg(long)]
        overlay: Option<PathBuf>,

        /// Write one spectrum PNG per cell into this directory
        #[arg(long)]
        plots: Option<PathBuf>,

        /// Emit all-zero intensities instead of failing when every cell reads zero
        #[arg(long)]
        allow_zero_dose: bool,

        /// Accumulate across all cores
        #[arg(long)]
        parallel: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Show ingest statistics for log directories
    Info {
        /// Log directories (or individual log files)
        #[arg(required = true)]
        input: Vec<PathBuf>,

        /// Only count readings integrated over exactly this many seconds
        #[arg(long)]
        window_seconds: Option<u64>,
    },
}

/// Configuration file plus per-value overrides.
#[derive(Args)]
struct Settings {
    /// JSON configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Latitude (degrees) at which the cell footprint is converted to degrees
    #[arg(long, allow_hyphen_values = true)]
    reference_lat: Option<f64>,

    /// East-west cell size (meters)
    #[arg(long)]
    cell_width_m: Option<f64>,

    /// North-south cell size (meters)
    #[arg(long)]
    cell_height_m: Option<f64>,

    /// Only accept readings integrated over exactly this many seconds
    #[arg(long)]
    window_seconds: Option<u64>,
}

impl Settings {
    fn resolve(&self) -> Result<AggregationConfig> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => AggregationConfig::default(),
        };
        if let Some(lat) = self.reference_lat {
            config.grid.reference_latitude_deg = lat;
        }
        if let Some(width) = self.cell_width_m {
            config.grid.cell_width_m = width;
        }
        if let Some(height) = self.cell_height_m {
            config.grid.cell_height_m = height;
        }
        if self.window_seconds.is_some() {
            config.window_seconds = self.window_seconds;
        }
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn accumulate(
    input: &[PathBuf],
    config: AggregationConfig,
    parallel: bool,
) -> Result<(DoseMap, IngestStatistics)> {
    let mut aggregator = Aggregator::new(config)?;
    log::debug!("configuration: {:?}", aggregator.config());
    let stats = if parallel {
        let (readings, stats) = read_all(input, config.window_seconds)?;
        aggregator.accumulate_parallel(&readings);
        stats
    } else {
        let mut stream = ReadingStream::open(input)?.with_window_seconds(config.window_seconds);
        for reading in stream.by_ref() {
            aggregator.accumulate(&reading?);
        }
        stream.statistics().clone()
    };
    log::debug!(
        "{} readings in {} cells",
        aggregator.cells().readings(),
        aggregator.cells().len()
    );
    Ok((aggregator.finalize(), stats))
}

fn write_outputs(
    map: &DoseMap,
    cells: &[NormalizedCellSummary],
    output: &Path,
    overlay: Option<&Path>,
    plots: Option<&Path>,
) -> Result<()> {
    let format = SummaryFormat::from_path(output);
    let mut writer = SummaryFileWriter::create(output)?;
    writer.write(cells, format)?;
    log::info!("wrote {} cells to {}", cells.len(), output.display());

    let mut images = Vec::new();
    if let Some(dir) = plots {
        let mut plotter = PngSpectrumPlotter::new(dir)?;
        let report = export_spectra(&mut plotter, map);
        if !report.failed.is_empty() {
            log::warn!("{} spectrum plots failed", report.failed.len());
        }
        log::info!("wrote {} spectrum plots to {}", report.exported.len(), dir.display());
        images = report.exported;
    }

    if let Some(path) = overlay {
        let mut renderer = GeoJsonOverlay::new(path).with_images(images);
        render_overlay(&mut renderer, map, cells)?;
    }
    Ok(())
}

fn print_statistics(stats: &IngestStatistics) {
    println!("Files: {}", stats.files);
    println!("Records: {}", stats.records);
    println!("Accepted readings: {}", stats.accepted);
    println!("Malformed records: {}", stats.malformed);
    println!("Records without fix: {}", stats.no_fix);
    println!("Zero integration time: {}", stats.zero_elapsed_coerced);
    println!("Outside window: {}", stats.window_rejected);
}

fn print_report(report: &AggregationReport) {
    println!("Total readings: {}", report.readings);
    println!("Total cells: {}", report.cells);
    if let Some((cell, dose)) = report.max_dose {
        println!(
            "Max dose rate: {:.4} uSv/h at ({:.6}, {:.6})",
            dose,
            cell.lat(),
            cell.lon()
        );
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Aggregate {
            input,
            output,
            settings,
            overlay,
            plots,
            allow_zero_dose,
            parallel,
            verbose,
        } => {
            init_logging(verbose);
            let config = settings.resolve()?;

            let start = Instant::now();
            let (map, stats) = accumulate(&input, config, parallel)?;
            if stats.malformed > 0 {
                log::warn!("skipped {} malformed records", stats.malformed);
            }

            let policy = if allow_zero_dose {
                ZeroDosePolicy::AllZero
            } else {
                ZeroDosePolicy::Fail
            };
            let cells = map.normalize(policy)?;
            write_outputs(&map, &cells, &output, overlay.as_deref(), plots.as_deref())?;

            println!(
                "Processed {} files in {:.2}s",
                stats.files,
                start.elapsed().as_secs_f64()
            );
            print_report(&map.report());
            if verbose {
                print_statistics(&stats);
            }
        }

        Commands::Info {
            input,
            window_seconds,
        } => {
            init_logging(false);
            if window_seconds == Some(0) {
                return Err(radmap_core::Error::InvalidConfig(
                    "window_seconds must be positive".to_string(),
                )
                .into());
            }
            let mut stream = ReadingStream::open(&input)?.with_window_seconds(window_seconds);
            for reading in stream.by_ref() {
                reading?;
            }
            print_statistics(stream.statistics());
        }
    }

    Ok(())
}
