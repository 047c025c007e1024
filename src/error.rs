//! Error types for spectral statistics.

use thiserror::Error;

/// The reason a spectrum was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Error)]
pub enum SpectrumDefect {
    /// No spectral bands.
    #[error("spectrum has no bands")]
    Empty,

    /// Energy density below zero.
    #[error("negative energy density {value} at band {index}")]
    NegativeEnergy { index: usize, value: f64 },

    /// Bandwidth must be strictly positive.
    #[error("non-positive bandwidth {value} at band {index}")]
    NonPositiveBandwidth { index: usize, value: f64 },

    /// Frequencies must be strictly ascending.
    #[error("frequency {frequency} Hz at band {index} is not above the previous band")]
    Unsorted { index: usize, frequency: f64 },

    /// NaN or infinite value in a band.
    #[error("non-finite value at band {index}")]
    NonFinite { index: usize },

    /// All energy densities are zero.
    #[error("total spectral energy is zero")]
    ZeroEnergy,

    /// Weighted frequency variance is zero.
    #[error("spectral variance is zero")]
    ZeroVariance,

    /// `f² - f̄²` vanishes at a band that was not excluded.
    #[error("group period ratio is singular at {frequency} Hz")]
    SingularGroupRatio { frequency: f64 },

    /// Too few bands for the requested operation.
    #[error("need at least {needed} bands, got {got}")]
    TooFewBands { needed: usize, got: usize },

    /// Resampling step must be positive and finite.
    #[error("invalid resampling step {0}")]
    InvalidStep(f64),
}

/// Errors raised by spectral computations.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum SpectrumError {
    /// Malformed or degenerate input spectrum.
    #[error("Invalid spectrum: {0}")]
    InvalidSpectrum(#[from] SpectrumDefect),

    /// Validation requested but no record carries a reported Hs.
    #[error("No reported wave heights to compare against")]
    NoReportedValues,
}

impl SpectrumError {
    /// The defect behind an `InvalidSpectrum` error, if any.
    pub fn defect(&self) -> Option<SpectrumDefect> {
        match self {
            Self::InvalidSpectrum(defect) => Some(*defect),
            Self::NoReportedValues => None,
        }
    }
}

/// Result type for spectral computations.
pub type SpectrumResult<T> = Result<T, SpectrumError>;
