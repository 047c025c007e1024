//! Mean and group period statistics.
//!
//! The mean frequency and its spread are energy-weighted moments of the band
//! frequencies:
//!
//! ```text
//! f̄  = Σ Eᵢ·fᵢ / Σ Eᵢ
//! σ² = Σ Eᵢ·(fᵢ - f̄)² / Σ Eᵢ
//! T̄  = 1 / f̄
//! ```
//!
//! Group period statistics are the same weighted moments taken over the
//! ratio `gᵢ = f̄ / (fᵢ² - f̄²)`. The ratio is singular where `fᵢ = f̄`; such a
//! bin is either rejected or excluded, see [`SingularBinPolicy`].
//!
//! To isolate a swell peak from a mixed sea, the group moments may instead be
//! weighted by a Gaussian envelope centered on the mean frequency,
//! `E_peak·exp(-(f - f̄)² / 2σ²)`.

use serde::{Deserialize, Serialize};

use super::interpolation::resample;
use crate::error::{SpectrumDefect, SpectrumResult};
use crate::spectrum::Spectrum;

/// Bins with `|f² - f̄²|` below this (Hz²) are treated as singular.
pub const SINGULAR_TOLERANCE: f64 = 1e-12;

/// Weighting used for the group period moments.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Weighting {
    /// Raw energy density.
    #[default]
    Energy,
    /// Gaussian envelope around the mean frequency.
    SwellEnvelope,
}

/// What to do with a bin sitting on the group ratio singularity.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SingularBinPolicy {
    /// Fail with `SingularGroupRatio`.
    #[default]
    Reject,
    /// Drop the bin from the group moments.
    Exclude,
}

/// Options for [`compute_period`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PeriodConfig {
    /// Resample onto a uniform grid of this step (Hz) before computing moments.
    #[serde(default)]
    pub smoothing: Option<f64>,
    /// Weighting for the group period moments.
    #[serde(default)]
    pub weighting: Weighting,
    /// Handling of the singular bin.
    #[serde(default)]
    pub singular_bin: SingularBinPolicy,
}

impl PeriodConfig {
    /// Enable resampling with the given grid step (Hz).
    pub fn with_smoothing(mut self, step: f64) -> Self {
        self.smoothing = Some(step);
        self
    }

    /// Weight group moments by the swell envelope.
    pub fn with_envelope(mut self) -> Self {
        self.weighting = Weighting::SwellEnvelope;
        self
    }

    /// Exclude singular bins instead of failing.
    pub fn excluding_singular_bin(mut self) -> Self {
        self.singular_bin = SingularBinPolicy::Exclude;
        self
    }
}

/// Mean and group period statistics of a spectrum.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeriodEstimate {
    /// Energy-weighted mean frequency (Hz)
    pub mean_frequency: f64,
    /// Energy-weighted frequency variance (Hz²)
    pub variance: f64,
    /// 1 / mean frequency (s)
    pub mean_period: f64,
    /// Weighted mean of the group ratio
    pub group_period_mean: f64,
    /// Weighted variance of the group ratio
    pub group_period_variance: f64,
}

impl PeriodEstimate {
    /// Standard deviation of frequency (Hz).
    pub fn frequency_spread(&self) -> f64 {
        self.variance.sqrt()
    }

    /// Standard deviation of the group ratio.
    pub fn group_period_std(&self) -> f64 {
        self.group_period_variance.sqrt()
    }

    /// Estimated lull between wave groups, `2·f̄ / σ²` (s).
    ///
    /// Infinite for a single-frequency spectrum.
    pub fn lull_estimate(&self) -> f64 {
        if self.variance > 0.0 {
            2.0 * self.mean_frequency / self.variance
        } else {
            f64::INFINITY
        }
    }
}

/// Weighted mean and population variance of `values`.
///
/// Returns `None` when the weights sum to zero.
pub fn weighted_moments(values: &[f64], weights: &[f64]) -> Option<(f64, f64)> {
    let total: f64 = weights.iter().sum();
    if total <= 0.0 {
        return None;
    }

    let mean = values
        .iter()
        .zip(weights)
        .map(|(v, w)| v * w)
        .sum::<f64>()
        / total;
    let variance = values
        .iter()
        .zip(weights)
        .map(|(v, w)| (v - mean).powi(2) * w)
        .sum::<f64>()
        / total;

    Some((mean, variance))
}

/// Mean period with default options: raw energy weighting, no smoothing,
/// singular bins rejected.
pub fn compute_mean_period(spectrum: &Spectrum) -> SpectrumResult<PeriodEstimate> {
    compute_period(spectrum, &PeriodConfig::default())
}

/// Mean and group period statistics.
///
/// # Errors
/// `InvalidSpectrum` when:
/// - the spectrum is empty, or all energy is zero
/// - smoothing is requested with fewer than two bands or a bad step
/// - the envelope is requested but the spectrum has zero variance
/// - a bin is singular under [`SingularBinPolicy::Reject`]
/// - no weighted bin is left for the group moments
pub fn compute_period(spectrum: &Spectrum, config: &PeriodConfig) -> SpectrumResult<PeriodEstimate> {
    let resampled;
    let spectrum = match config.smoothing {
        Some(step) => {
            resampled = resample(spectrum, step)?;
            &resampled
        }
        None => spectrum,
    };

    if spectrum.is_empty() {
        return Err(SpectrumDefect::Empty.into());
    }

    let frequencies = spectrum.frequencies();
    let energies = spectrum.energy_densities();

    let (mean_frequency, variance) =
        weighted_moments(&frequencies, &energies).ok_or(SpectrumDefect::ZeroEnergy)?;

    let weights = match config.weighting {
        Weighting::Energy => energies,
        Weighting::SwellEnvelope => {
            swell_envelope(&frequencies, spectrum.peak_energy_density(), mean_frequency, variance)?
        }
    };

    let mut ratios = Vec::with_capacity(frequencies.len());
    let mut ratio_weights = Vec::with_capacity(frequencies.len());
    let mean_sq = mean_frequency * mean_frequency;
    for (&f, &w) in frequencies.iter().zip(&weights) {
        let denom = f * f - mean_sq;
        if denom.abs() < SINGULAR_TOLERANCE {
            match config.singular_bin {
                SingularBinPolicy::Reject => {
                    return Err(SpectrumDefect::SingularGroupRatio { frequency: f }.into());
                }
                SingularBinPolicy::Exclude => continue,
            }
        }
        ratios.push(mean_frequency / denom);
        ratio_weights.push(w);
    }

    let (group_period_mean, group_period_variance) =
        weighted_moments(&ratios, &ratio_weights).ok_or(SpectrumDefect::ZeroEnergy)?;

    Ok(PeriodEstimate {
        mean_frequency,
        variance,
        mean_period: 1.0 / mean_frequency,
        group_period_mean,
        group_period_variance,
    })
}

/// Gaussian envelope weights `peak·exp(-(f - mean)² / 2σ²)`.
pub fn swell_envelope(
    frequencies: &[f64],
    peak_energy: f64,
    mean: f64,
    variance: f64,
) -> SpectrumResult<Vec<f64>> {
    if variance <= 0.0 {
        return Err(SpectrumDefect::ZeroVariance.into());
    }
    Ok(frequencies
        .iter()
        .map(|&f| peak_energy * (-(f - mean).powi(2) / (2.0 * variance)).exp())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpectrumError;

    const TOL: f64 = 1e-10;

    /// Symmetric triangle with an even number of bands centered between two bins.
    fn triangle() -> (Spectrum, f64) {
        let s = Spectrum::uniform(0.05, 0.01, &[1.0, 2.0, 3.0, 3.0, 2.0, 1.0]).unwrap();
        (s, 0.075)
    }

    #[test]
    fn test_weighted_moments() {
        let (mean, var) = weighted_moments(&[1.0, 3.0], &[1.0, 1.0]).unwrap();
        assert!((mean - 2.0).abs() < TOL);
        assert!((var - 1.0).abs() < TOL);

        assert!(weighted_moments(&[1.0, 2.0], &[0.0, 0.0]).is_none());
    }

    #[test]
    fn test_triangle_mean() {
        let (s, f0) = triangle();
        let est = compute_mean_period(&s).unwrap();
        assert!((est.mean_frequency - f0).abs() < TOL);
        assert!((est.mean_period - 1.0 / f0).abs() < 1e-8);
        assert!(est.variance > 0.0);
    }

    #[test]
    fn test_odd_triangle_needs_exclusion() {
        let s = Spectrum::uniform(0.05, 0.01, &[1.0, 2.0, 3.0, 2.0, 1.0]).unwrap();

        let err = compute_mean_period(&s).unwrap_err();
        assert!(matches!(
            err,
            SpectrumError::InvalidSpectrum(SpectrumDefect::SingularGroupRatio { .. })
        ));

        let est = compute_period(&s, &PeriodConfig::default().excluding_singular_bin()).unwrap();
        assert!((est.mean_frequency - 0.07).abs() < TOL);
        // Ratios are antisymmetric around the peak but not equal in size
        assert!(est.group_period_mean.is_finite());
    }

    #[test]
    fn test_scale_invariance() {
        let s = Spectrum::uniform(0.04, 0.005, &[0.1, 0.4, 1.3, 0.8, 0.2, 0.05]).unwrap();
        let base = compute_mean_period(&s).unwrap();
        let scaled = compute_mean_period(&s.scaled(7.5).unwrap()).unwrap();

        assert!((base.mean_frequency - scaled.mean_frequency).abs() < TOL);
        assert!((base.variance - scaled.variance).abs() < TOL);
        assert!((base.group_period_mean - scaled.group_period_mean).abs() < 1e-8);
    }

    #[test]
    fn test_zero_energy() {
        let s = Spectrum::uniform(0.05, 0.01, &[0.0, 0.0]).unwrap();
        assert_eq!(
            compute_mean_period(&s),
            Err(SpectrumError::InvalidSpectrum(SpectrumDefect::ZeroEnergy))
        );
    }

    #[test]
    fn test_empty() {
        let s = Spectrum::default();
        assert_eq!(
            compute_mean_period(&s),
            Err(SpectrumError::InvalidSpectrum(SpectrumDefect::Empty))
        );
    }

    #[test]
    fn test_lull_estimate() {
        let (s, _) = triangle();
        let est = compute_mean_period(&s).unwrap();
        let expected = 2.0 * est.mean_frequency / est.variance;
        assert!((est.lull_estimate() - expected).abs() < 1e-8);
        assert!((est.frequency_spread() - est.variance.sqrt()).abs() < TOL);
    }

    #[test]
    fn test_envelope_needs_variance() {
        let s = Spectrum::uniform(0.05, 0.01, &[2.0]).unwrap();
        let config = PeriodConfig::default().with_envelope().excluding_singular_bin();
        assert_eq!(
            compute_period(&s, &config),
            Err(SpectrumError::InvalidSpectrum(SpectrumDefect::ZeroVariance))
        );
    }

    #[test]
    fn test_envelope_suppresses_wind_sea() {
        // Swell peak at low frequency plus a broad wind-sea tail
        let mut energies = vec![0.0; 40];
        for (i, e) in energies.iter_mut().enumerate() {
            let f = 0.03 + i as f64 * 0.005;
            *e = 4.0 * (-(f - 0.07f64).powi(2) / 2e-4).exp() + 0.3;
        }
        let s = Spectrum::uniform(0.03, 0.005, &energies).unwrap();

        let energy = compute_period(&s, &PeriodConfig::default()).unwrap();
        let envelope = compute_period(&s, &PeriodConfig::default().with_envelope()).unwrap();

        // Mean moments do not depend on the group weighting
        assert!((energy.mean_frequency - envelope.mean_frequency).abs() < TOL);
        assert!(envelope.group_period_mean != energy.group_period_mean);
    }

    #[test]
    fn test_smoothing_preserves_center() {
        let (s, f0) = triangle();
        let config = PeriodConfig::default()
            .with_smoothing(1e-4)
            .excluding_singular_bin();
        let est = compute_period(&s, &config).unwrap();
        // Grid stops short of the last band, so the center moves by less than a step
        assert!((est.mean_frequency - f0).abs() < 1e-3);
    }

    #[test]
    fn test_config_serde() {
        let config: PeriodConfig =
            serde_json::from_str(r#"{"smoothing":0.0001,"weighting":"swell_envelope"}"#).unwrap();
        assert_eq!(config.smoothing, Some(1e-4));
        assert_eq!(config.weighting, Weighting::SwellEnvelope);
        assert_eq!(config.singular_bin, SingularBinPolicy::Reject);
    }
}
