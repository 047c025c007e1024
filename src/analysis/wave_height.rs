//! Significant wave height and its confidence bounds.
//!
//! Follows the NDBC wave measurement notes (wavemeas.pdf) and Donelan &
//! Pierson, "The sampling variability of estimates of spectra of
//! wind-generated gravity waves".

use serde::{Deserialize, Serialize};

use crate::error::{SpectrumDefect, SpectrumResult};
use crate::spectrum::Spectrum;

/// Significant wave height with a confidence interval.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HsEstimate {
    /// Significant wave height (m)
    pub hs: f64,
    /// Lower bound (m)
    pub hs_low: f64,
    /// Upper bound (m)
    pub hs_high: f64,
    /// Degrees-of-freedom factor behind the bounds
    pub tdf: f64,
}

impl HsEstimate {
    /// Width of the confidence interval (m).
    pub fn interval_width(&self) -> f64 {
        self.hs_high - self.hs_low
    }

    /// Check if `value` falls inside the confidence interval.
    pub fn contains(&self, value: f64) -> bool {
        value >= self.hs_low && value <= self.hs_high
    }
}

/// Compute significant wave height from a spectrum.
///
/// ```text
/// dEᵢ  = Eᵢ·Δfᵢ
/// Hs   = 4·√(Σ dEᵢ)
/// TDF  = 2·(Σ Eᵢ)² / Σ Eᵢ²
/// low  = 10^(-TDF^-½)·Hs
/// high = 10^( TDF^-½)·Hs
/// ```
///
/// # Errors
/// `InvalidSpectrum` if the spectrum is empty or carries no energy.
pub fn compute_hs(spectrum: &Spectrum) -> SpectrumResult<HsEstimate> {
    if spectrum.is_empty() {
        return Err(SpectrumDefect::Empty.into());
    }

    // Negative densities cannot reach here, Spectrum::new rejects them.
    let peak = spectrum.peak_energy_density();
    if peak <= 0.0 {
        return Err(SpectrumDefect::ZeroEnergy.into());
    }

    // TDF is scale free; densities relative to the peak keep the squares in range
    let mut total_energy = 0.0;
    let mut sum_rel = 0.0;
    let mut sum_rel_sq = 0.0;
    for band in spectrum.bands() {
        total_energy += band.energy();
        let rel = band.energy_density / peak;
        sum_rel += rel;
        sum_rel_sq += rel * rel;
    }

    let hs = 4.0 * total_energy.sqrt();
    let tdf = 2.0 * sum_rel * sum_rel / sum_rel_sq;
    let spread = tdf.powf(-0.5);

    Ok(HsEstimate {
        hs,
        hs_low: 10f64.powf(-spread) * hs,
        hs_high: 10f64.powf(spread) * hs,
        tdf,
    })
}
