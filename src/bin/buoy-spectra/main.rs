//! buoy-spectra CLI: wave statistics from spectrum files.

mod output;

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use buoy_spectra::{
    AnalysisConfig, HsComparison, SpectrumSeries, SpectrumSummary, load_config, read_spectrum_file,
};
use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use output::{ComparisonRow, PeriodRow, SummaryRow, hs_rows, write_metrics, write_rows};

#[derive(Parser)]
#[command(name = "buoy-spectra")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Output format
    #[arg(short, long, default_value = "text")]
    format: OutputFormat,

    /// Analysis configuration file (TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, clap::ValueEnum)]
enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Subcommand)]
enum Commands {
    /// Significant wave height with confidence bounds
    Hs {
        /// Spectrum file
        file: PathBuf,
    },

    /// Mean, lull and group period statistics
    Period {
        /// Spectrum file
        file: PathBuf,

        /// Resample onto a uniform grid with this step (Hz, default 1e-4)
        #[arg(long, num_args = 0..=1, default_missing_value = "0.0001")]
        smooth: Option<f64>,

        /// Weight group moments by the swell envelope
        #[arg(long)]
        envelope: bool,

        /// Exclude the bin at the mean frequency instead of failing
        #[arg(long)]
        exclude_peak: bool,
    },

    /// Hs, peak period and moment periods per record
    Summary {
        /// Spectrum file
        file: PathBuf,
    },

    /// Compare computed Hs against the reported values in the file
    Validate {
        /// Spectrum file
        file: PathBuf,

        /// Maximum accepted difference (m)
        #[arg(long)]
        tolerance: Option<f64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)))
        .init();

    let mut config = match &cli.config {
        Some(path) => load_config(path)?,
        None => AnalysisConfig::default(),
    };

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match cli.command {
        Commands::Hs { file } => run_hs(&file, cli.format, &mut out),
        Commands::Period {
            file,
            smooth,
            envelope,
            exclude_peak,
        } => {
            if smooth.is_some() {
                config.period.smoothing = smooth;
            }
            if envelope {
                config.period = config.period.with_envelope();
            }
            if exclude_peak {
                config.period = config.period.excluding_singular_bin();
            }
            config.validate()?;
            run_period(&file, &config, cli.format, &mut out)
        }
        Commands::Summary { file } => run_summary(&file, &config, cli.format, &mut out),
        Commands::Validate { file, tolerance } => {
            if let Some(tol) = tolerance {
                config.validation.tolerance = tol;
            }
            config.validate()?;
            run_validate(&file, &config, cli.format, &mut out)
        }
    }
}

fn load_series(file: &Path) -> Result<SpectrumSeries> {
    tracing::info!("Reading spectra from {:?}", file);
    let series = read_spectrum_file(file)
        .with_context(|| format!("Failed to read spectrum file: {:?}", file))?;
    tracing::info!("Loaded {} records", series.len());
    Ok(series)
}

fn report_skipped(skipped: usize) {
    if skipped > 0 {
        tracing::warn!("{} records skipped", skipped);
    }
}

fn run_hs(file: &Path, format: OutputFormat, out: &mut impl Write) -> Result<()> {
    let series = load_series(file)?;
    let heights = series.wave_heights();
    report_skipped(heights.skipped.len());

    let rows = hs_rows(&series, &heights.points);
    write_rows(out, &rows, format)
}

fn run_period(
    file: &Path,
    config: &AnalysisConfig,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let series = load_series(file)?;
    let periods = series.periods(&config.period);
    report_skipped(periods.skipped.len());

    let rows: Vec<PeriodRow> = periods.points.iter().map(PeriodRow::from).collect();
    write_rows(out, &rows, format)
}

fn run_summary(
    file: &Path,
    config: &AnalysisConfig,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let series = load_series(file)?;

    let mut rows = Vec::with_capacity(series.len());
    for record in series.records() {
        match SpectrumSummary::compute(&record.spectrum, &config.period) {
            Ok(summary) => rows.push(SummaryRow {
                time: record.time,
                summary,
            }),
            Err(e) => tracing::warn!("Skipping {}: {}", record.time, e),
        }
    }
    report_skipped(series.len() - rows.len());
    write_rows(out, &rows, format)
}

fn run_validate(
    file: &Path,
    config: &AnalysisConfig,
    format: OutputFormat,
    out: &mut impl Write,
) -> Result<()> {
    let series = load_series(file)?;
    let comparison = HsComparison::compute(series.records())
        .with_context(|| format!("Failed to validate {:?}", file))?;

    let rows: Vec<ComparisonRow> = comparison
        .pairs
        .iter()
        .map(|p| ComparisonRow {
            time: p.time,
            computed: p.value.computed,
            reported: p.value.reported,
            error: p.value.error(),
        })
        .collect();
    write_rows(out, &rows, format)?;
    write_metrics(out, &comparison, format)?;

    let tolerance = config.validation.tolerance;
    if !comparison.within_tolerance(tolerance) {
        let n = comparison.outliers(tolerance).count();
        anyhow::bail!("{} records differ from the reported Hs by more than {} m", n, tolerance);
    }

    tracing::info!("All records within {} m of the reported Hs", tolerance);
    Ok(())
}
