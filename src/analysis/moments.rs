//! Spectral moments and peak statistics.
//!
//! ```text
//! mₙ   = Σ fᵢⁿ·Eᵢ·Δfᵢ      n = 0..5
//! Hm0  = 4·√m₀
//! Tm01 = m₀ / m₁
//! Tm02 = √(m₀ / m₂)
//! ```

use serde::{Deserialize, Serialize};

use crate::error::{SpectrumDefect, SpectrumResult};
use crate::spectrum::Spectrum;

/// Number of moments computed (m0 through m5).
pub const MOMENT_COUNT: usize = 6;

/// Spectral moments m0..m5.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpectralMoments {
    /// `m[n]` is the n-th moment (m²·Hzⁿ)
    pub m: [f64; MOMENT_COUNT],
}

impl SpectralMoments {
    /// Zeroth moment: total variance of the surface elevation (m²).
    pub fn m0(&self) -> f64 {
        self.m[0]
    }

    /// Spectral estimate of significant wave height (m).
    pub fn hm0(&self) -> f64 {
        4.0 * self.m[0].sqrt()
    }

    /// Mean period from the first moment (s).
    pub fn tm01(&self) -> f64 {
        self.m[0] / self.m[1]
    }

    /// Zero-crossing period from the second moment (s).
    pub fn tm02(&self) -> f64 {
        (self.m[0] / self.m[2]).sqrt()
    }

    /// Spectral bandwidth parameter ν = √(m₀m₂/m₁² - 1).
    pub fn bandwidth_parameter(&self) -> f64 {
        (self.m[0] * self.m[2] / (self.m[1] * self.m[1]) - 1.0)
            .max(0.0)
            .sqrt()
    }
}

/// Compute spectral moments m0..m5.
///
/// # Errors
/// `InvalidSpectrum` if the spectrum is empty or carries no energy.
pub fn compute_moments(spectrum: &Spectrum) -> SpectrumResult<SpectralMoments> {
    if spectrum.is_empty() {
        return Err(SpectrumDefect::Empty.into());
    }

    let mut m = [0.0; MOMENT_COUNT];
    for band in spectrum.bands() {
        let de = band.energy();
        let mut power = 1.0;
        for moment in m.iter_mut() {
            *moment += power * de;
            power *= band.frequency;
        }
    }

    if m[0] <= 0.0 {
        return Err(SpectrumDefect::ZeroEnergy.into());
    }

    Ok(SpectralMoments { m })
}

/// Frequency and period of the most energetic band.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct PeakEstimate {
    /// Index of the peak band
    pub index: usize,
    /// Peak frequency (Hz)
    pub frequency: f64,
    /// Peak period Tp (s)
    pub period: f64,
    /// Energy density at the peak (m²/Hz)
    pub energy_density: f64,
}

/// Locate the spectral peak. Ties resolve to the lowest frequency.
///
/// # Errors
/// `InvalidSpectrum` if the spectrum is empty or carries no energy.
pub fn peak(spectrum: &Spectrum) -> SpectrumResult<PeakEstimate> {
    let mut best: Option<(usize, f64)> = None;
    for (i, band) in spectrum.bands().iter().enumerate() {
        if best.is_none_or(|(_, e)| band.energy_density > e) {
            best = Some((i, band.energy_density));
        }
    }

    let Some((index, energy_density)) = best else {
        return Err(SpectrumDefect::Empty.into());
    };
    if energy_density <= 0.0 {
        return Err(SpectrumDefect::ZeroEnergy.into());
    }

    let frequency = spectrum.bands()[index].frequency;
    Ok(PeakEstimate {
        index,
        frequency,
        period: 1.0 / frequency,
        energy_density,
    })
}
