//! Wave statistics from discretized energy spectra.
//!
//! This module provides tools for:
//! - Significant wave height with confidence bounds
//! - Mean frequency, spread, and group period estimates
//! - Spectral moments and peak period
//! - Monotone resampling of coarse spectra onto a fine grid
//! - Batch reduction of timestamped spectrum series
//! - Validation of computed against reported wave heights
//!
//! # Mathematical Background
//!
//! For bands with energy density Eᵢ (m²/Hz) and width Δfᵢ (Hz):
//! ```text
//! Hs   = 4·√(Σ Eᵢ·Δfᵢ)
//! TDF  = 2·(Σ Eᵢ)² / Σ Eᵢ²
//! Hs ∈ [10^(-1/√TDF)·Hs, 10^(1/√TDF)·Hs]
//! ```
//!
//! The degrees-of-freedom factor TDF measures how many independent spectral
//! estimates support Hs; a spectrum concentrated in one band gives the widest
//! bounds.
//!
//! # Example
//!
//! ```ignore
//! use buoy_spectra::Spectrum;
//! use buoy_spectra::analysis::{compute_hs, compute_mean_period};
//!
//! let spectrum = Spectrum::from_arrays(&freq, &bandwidth, &energy)?;
//!
//! let hs = compute_hs(&spectrum)?;
//! println!("Hs: {:.2} m ({:.2} - {:.2})", hs.hs, hs.hs_low, hs.hs_high);
//!
//! let period = compute_mean_period(&spectrum)?;
//! println!("Mean period: {:.1} s", period.mean_period);
//! println!("Estimated lull: {:.0} s", period.lull_estimate());
//! ```

mod interpolation;
mod moments;
mod period;
mod series;
mod validation;
mod wave_height;

pub use interpolation::{
    DEFAULT_RESAMPLE_STEP, MAX_GRID_POINTS, MonotoneCubic, resample, uniform_grid,
};
pub use moments::{MOMENT_COUNT, PeakEstimate, SpectralMoments, compute_moments, peak};
pub use period::{
    PeriodConfig, PeriodEstimate, SINGULAR_TOLERANCE, SingularBinPolicy, Weighting,
    compute_mean_period, compute_period, swell_envelope, weighted_moments,
};
pub use series::{
    NonMonotonicSeries, SeriesOutcome, SeriesPoint, SkippedRecord, SpectrumRecord,
    SpectrumSeries,
};
pub use validation::{ComparisonMetrics, HsComparison, HsPair};
pub use wave_height::{HsEstimate, compute_hs};

use serde::{Deserialize, Serialize};

use crate::error::SpectrumResult;
use crate::spectrum::Spectrum;

/// Everything computed for one spectrum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpectrumSummary {
    /// Significant wave height
    pub hs: HsEstimate,
    /// Mean and group period
    pub period: PeriodEstimate,
    /// Spectral moments
    pub moments: SpectralMoments,
    /// Spectral peak
    pub peak: PeakEstimate,
}

impl SpectrumSummary {
    /// Compute all statistics for a spectrum.
    ///
    /// # Errors
    /// The first `InvalidSpectrum` raised by any of the underlying computations.
    pub fn compute(spectrum: &Spectrum, period_config: &PeriodConfig) -> SpectrumResult<Self> {
        Ok(Self {
            hs: compute_hs(spectrum)?,
            period: compute_period(spectrum, period_config)?,
            moments: compute_moments(spectrum)?,
            peak: peak(spectrum)?,
        })
    }
}
