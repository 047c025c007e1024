//! # buoy-spectra
//!
//! Wave statistics from ocean buoy energy spectra.
//!
//! This crate provides:
//! - A validated spectrum model (frequency bands, bandwidths, energy densities,
//!   optional directional coefficients)
//! - Significant wave height with degrees-of-freedom confidence bounds
//! - Mean, lull and group period estimates, with optional monotone smoothing
//!   and swell-envelope weighting
//! - Spectral moments and peak period
//! - Timestamped spectrum series with batch reduction and validation against
//!   reported values
//! - A plain-text spectrum file format and analysis configuration files
//!
//! Data acquisition (HTTP, OPeNDAP, NetCDF) and plotting live outside this
//! crate; upstream code hands over [`Spectrum`] values.

pub mod analysis;
pub mod config;
pub mod error;
pub mod io;
pub mod spectrum;

pub use analysis::{
    ComparisonMetrics, HsComparison, HsEstimate, PeakEstimate, PeriodConfig, PeriodEstimate,
    SeriesOutcome, SeriesPoint, SingularBinPolicy, SpectralMoments, SpectrumRecord,
    SpectrumSeries, SpectrumSummary, Weighting, compute_hs, compute_mean_period,
    compute_moments, compute_period, peak, resample,
};
pub use config::{AnalysisConfig, ConfigError, ValidationConfig, load_config};
pub use error::{SpectrumDefect, SpectrumError, SpectrumResult};
pub use io::{SpectrumFileError, parse_spectra, read_spectrum_file, write_spectrum_file};
pub use spectrum::{DirectionalMoments, SpectralBand, Spectrum};
