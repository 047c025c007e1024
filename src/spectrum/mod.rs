//! Discretized wave-energy spectra.
//!
//! A [`Spectrum`] is an ordered sequence of [`SpectralBand`]s as reported by a
//! directional wave buoy:
//!
//! ```text
//!  freq   Band      energy   Dmean     a1       b1       a2       b2    Check
//!   Hz    width     m*m/Hz    deg                                       factor
//!  0.0250  0.0050     0.0003   221   -0.1792  -0.1533  -0.3378   0.3161   2.55
//!  0.0300  0.0050     0.0006   229   -0.1814  -0.2084   0.0993  -0.1183   2.55
//! ```
//!
//! Only frequency, bandwidth and energy density take part in the statistics.
//! The directional columns ride along on [`DirectionalMoments`] so that one
//! record shape covers both the short and the full report layouts.
//!
//! # Invariants
//!
//! Every `Spectrum` value satisfies:
//! - frequencies strictly ascending
//! - bandwidth > 0
//! - energy density ≥ 0
//! - all numeric fields finite
//!
//! An empty spectrum is a valid value; operations that need bands reject it.

use serde::{Deserialize, Serialize};

use crate::error::{SpectrumDefect, SpectrumResult};

/// Directional Fourier coefficients and quality flag of one band.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DirectionalMoments {
    /// Mean wave direction (degrees, nautical convention)
    pub mean_direction: f64,
    /// First-order cosine coefficient
    pub a1: f64,
    /// First-order sine coefficient
    pub b1: f64,
    /// Second-order cosine coefficient
    pub a2: f64,
    /// Second-order sine coefficient
    pub b2: f64,
    /// Check factor (ratio of vertical to horizontal displacement)
    pub check_factor: f64,
}

impl DirectionalMoments {
    fn is_finite(&self) -> bool {
        [
            self.mean_direction,
            self.a1,
            self.b1,
            self.a2,
            self.b2,
            self.check_factor,
        ]
        .iter()
        .all(|v| v.is_finite())
    }
}

/// A single frequency band of a wave spectrum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpectralBand {
    /// Band center frequency (Hz)
    pub frequency: f64,
    /// Band width (Hz)
    pub bandwidth: f64,
    /// Energy density (m²/Hz)
    pub energy_density: f64,
    /// Optional directional data
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub direction: Option<DirectionalMoments>,
}

impl SpectralBand {
    /// Create a band without directional data.
    pub fn new(frequency: f64, bandwidth: f64, energy_density: f64) -> Self {
        Self {
            frequency,
            bandwidth,
            energy_density,
            direction: None,
        }
    }

    /// Attach directional data.
    pub fn with_direction(mut self, direction: DirectionalMoments) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Energy contained in the band: E·Δf (m²).
    pub fn energy(&self) -> f64 {
        self.energy_density * self.bandwidth
    }

    /// Band center period (s).
    pub fn period(&self) -> f64 {
        1.0 / self.frequency
    }
}

/// A validated wave-energy spectrum.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<SpectralBand>", into = "Vec<SpectralBand>")]
pub struct Spectrum {
    bands: Vec<SpectralBand>,
}

impl Spectrum {
    /// Create a spectrum from bands, checking the ordering and value invariants.
    ///
    /// # Errors
    /// `InvalidSpectrum` naming the first offending band.
    pub fn new(bands: Vec<SpectralBand>) -> SpectrumResult<Self> {
        for (index, band) in bands.iter().enumerate() {
            let direction_finite = band.direction.is_none_or(|d| d.is_finite());
            if !band.frequency.is_finite()
                || !band.bandwidth.is_finite()
                || !band.energy_density.is_finite()
                || !direction_finite
            {
                return Err(SpectrumDefect::NonFinite { index }.into());
            }
            if band.bandwidth <= 0.0 {
                return Err(SpectrumDefect::NonPositiveBandwidth {
                    index,
                    value: band.bandwidth,
                }
                .into());
            }
            if band.energy_density < 0.0 {
                return Err(SpectrumDefect::NegativeEnergy {
                    index,
                    value: band.energy_density,
                }
                .into());
            }
            if index > 0 && band.frequency <= bands[index - 1].frequency {
                return Err(SpectrumDefect::Unsorted {
                    index,
                    frequency: band.frequency,
                }
                .into());
            }
        }

        Ok(Self { bands })
    }

    /// Create a spectrum from parallel arrays of frequency, bandwidth and energy density.
    ///
    /// # Panics
    ///
    /// Panics if the arrays have different lengths.
    pub fn from_arrays(
        frequencies: &[f64],
        bandwidths: &[f64],
        energy_densities: &[f64],
    ) -> SpectrumResult<Self> {
        assert_eq!(
            frequencies.len(),
            bandwidths.len(),
            "frequencies and bandwidths must have same length"
        );
        assert_eq!(
            frequencies.len(),
            energy_densities.len(),
            "frequencies and energy densities must have same length"
        );

        let bands = frequencies
            .iter()
            .zip(bandwidths)
            .zip(energy_densities)
            .map(|((&f, &df), &e)| SpectralBand::new(f, df, e))
            .collect();

        Self::new(bands)
    }

    /// Create a spectrum on a uniform grid `f0, f0 + df, f0 + 2·df, ...`.
    pub fn uniform(f0: f64, df: f64, energy_densities: &[f64]) -> SpectrumResult<Self> {
        let bands = energy_densities
            .iter()
            .enumerate()
            .map(|(i, &e)| SpectralBand::new(f0 + i as f64 * df, df, e))
            .collect();
        Self::new(bands)
    }

    /// The bands, ascending by frequency.
    pub fn bands(&self) -> &[SpectralBand] {
        &self.bands
    }

    /// Number of bands.
    pub fn len(&self) -> usize {
        self.bands.len()
    }

    /// Check if the spectrum has no bands.
    pub fn is_empty(&self) -> bool {
        self.bands.is_empty()
    }

    /// Band center frequencies.
    pub fn frequencies(&self) -> Vec<f64> {
        self.bands.iter().map(|b| b.frequency).collect()
    }

    /// Band widths.
    pub fn bandwidths(&self) -> Vec<f64> {
        self.bands.iter().map(|b| b.bandwidth).collect()
    }

    /// Energy densities.
    pub fn energy_densities(&self) -> Vec<f64> {
        self.bands.iter().map(|b| b.energy_density).collect()
    }

    /// Total energy Σ E·Δf (m²). This is the zeroth spectral moment.
    pub fn total_energy(&self) -> f64 {
        self.bands.iter().map(SpectralBand::energy).sum()
    }

    /// Largest energy density, or 0 when empty.
    pub fn peak_energy_density(&self) -> f64 {
        self.bands
            .iter()
            .map(|b| b.energy_density)
            .fold(0.0, f64::max)
    }

    /// Frequency range (f_min, f_max) of band centers, or `None` when empty.
    pub fn frequency_range(&self) -> Option<(f64, f64)> {
        let first = self.bands.first()?;
        let last = self.bands.last()?;
        Some((first.frequency, last.frequency))
    }

    /// Whether any band carries directional data.
    pub fn has_directional_data(&self) -> bool {
        self.bands.iter().any(|b| b.direction.is_some())
    }

    /// Multiply every energy density by `factor`.
    ///
    /// # Errors
    /// `InvalidSpectrum` if `factor` is negative or not finite.
    pub fn scaled(&self, factor: f64) -> SpectrumResult<Self> {
        let bands = self
            .bands
            .iter()
            .map(|b| SpectralBand {
                energy_density: b.energy_density * factor,
                ..*b
            })
            .collect();
        Self::new(bands)
    }

    /// Keep only bands whose frequency lies in `[f_min, f_max]`.
    pub fn band_limited(&self, f_min: f64, f_max: f64) -> Self {
        let bands = self
            .bands
            .iter()
            .filter(|b| b.frequency >= f_min && b.frequency <= f_max)
            .copied()
            .collect();
        Self { bands }
    }
}

impl TryFrom<Vec<SpectralBand>> for Spectrum {
    type Error = crate::error::SpectrumError;

    fn try_from(bands: Vec<SpectralBand>) -> Result<Self, Self::Error> {
        Self::new(bands)
    }
}

impl From<Spectrum> for Vec<SpectralBand> {
    fn from(spectrum: Spectrum) -> Self {
        spectrum.bands
    }
}
