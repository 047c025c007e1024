//! Monotone cubic resampling of spectra.
//!
//! Band energies are smoothed onto a fine uniform frequency grid with a
//! piecewise cubic Hermite interpolant (PCHIP) using Fritsch-Carlson slopes.
//! Unlike an unconstrained cubic spline, PCHIP has no overshoot between
//! samples, so a non-negative spectrum stays non-negative.

use crate::error::{SpectrumDefect, SpectrumResult};
use crate::spectrum::{SpectralBand, Spectrum};

/// Default resampling step (Hz).
pub const DEFAULT_RESAMPLE_STEP: f64 = 1e-4;

/// Largest grid [`resample`] will build.
pub const MAX_GRID_POINTS: usize = 1_000_000;

/// Piecewise cubic Hermite interpolant through strictly increasing samples.
#[derive(Clone, Debug)]
pub struct MonotoneCubic {
    x: Vec<f64>,
    y: Vec<f64>,
    slopes: Vec<f64>,
}

impl MonotoneCubic {
    /// Build the interpolant.
    ///
    /// `x` must be strictly increasing, which every [`Spectrum`] guarantees
    /// for its frequencies.
    ///
    /// # Errors
    /// `TooFewBands` if fewer than two samples are given.
    ///
    /// # Panics
    ///
    /// Panics if `x` and `y` have different lengths.
    pub fn new(x: Vec<f64>, y: Vec<f64>) -> SpectrumResult<Self> {
        assert_eq!(x.len(), y.len(), "x and y must have same length");
        if x.len() < 2 {
            return Err(SpectrumDefect::TooFewBands {
                needed: 2,
                got: x.len(),
            }
            .into());
        }

        let slopes = fritsch_carlson_slopes(&x, &y);
        Ok(Self { x, y, slopes })
    }

    /// Evaluate at `t`, clamping to the end values outside the sample range.
    pub fn evaluate(&self, t: f64) -> f64 {
        let n = self.x.len();
        if t <= self.x[0] {
            return self.y[0];
        }
        if t >= self.x[n - 1] {
            return self.y[n - 1];
        }

        // Find bracketing indices
        let mut lower = 0;
        let mut upper = n - 1;
        while upper - lower > 1 {
            let mid = (lower + upper) / 2;
            if self.x[mid] <= t {
                lower = mid;
            } else {
                upper = mid;
            }
        }

        let h = self.x[upper] - self.x[lower];
        let s = (t - self.x[lower]) / h;
        let s2 = s * s;
        let s3 = s2 * s;

        let h00 = 2.0 * s3 - 3.0 * s2 + 1.0;
        let h10 = s3 - 2.0 * s2 + s;
        let h01 = -2.0 * s3 + 3.0 * s2;
        let h11 = s3 - s2;

        h00 * self.y[lower]
            + h10 * h * self.slopes[lower]
            + h01 * self.y[upper]
            + h11 * h * self.slopes[upper]
    }
}

/// Node derivatives for a shape-preserving cubic.
///
/// Interior nodes use the weighted harmonic mean of the adjacent secants
/// (zero at local extrema); end nodes use the one-sided three-point formula
/// limited to keep the end intervals monotone.
fn fritsch_carlson_slopes(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let h: Vec<f64> = x.windows(2).map(|w| w[1] - w[0]).collect();
    let delta: Vec<f64> = (0..n - 1).map(|k| (y[k + 1] - y[k]) / h[k]).collect();

    if n == 2 {
        return vec![delta[0]; 2];
    }

    let mut d = vec![0.0; n];
    for k in 1..n - 1 {
        if delta[k - 1] * delta[k] > 0.0 {
            let w1 = 2.0 * h[k] + h[k - 1];
            let w2 = h[k] + 2.0 * h[k - 1];
            d[k] = (w1 + w2) / (w1 / delta[k - 1] + w2 / delta[k]);
        }
    }

    d[0] = end_slope(h[0], h[1], delta[0], delta[1]);
    d[n - 1] = end_slope(h[n - 2], h[n - 3], delta[n - 2], delta[n - 3]);
    d
}

fn end_slope(h0: f64, h1: f64, delta0: f64, delta1: f64) -> f64 {
    let d = ((2.0 * h0 + h1) * delta0 - h0 * delta1) / (h0 + h1);
    if d.signum() != delta0.signum() || delta0 == 0.0 {
        0.0
    } else if delta0.signum() != delta1.signum() && d.abs() > 3.0 * delta0.abs() {
        3.0 * delta0
    } else {
        d
    }
}

/// Uniform grid `start, start + step, ...` strictly below `end`.
///
/// # Errors
/// `InvalidStep` if `step` is not a positive finite number, or the grid would
/// need more than [`MAX_GRID_POINTS`] points.
pub fn uniform_grid(start: f64, end: f64, step: f64) -> SpectrumResult<Vec<f64>> {
    if !(step.is_finite() && step > 0.0) {
        return Err(SpectrumDefect::InvalidStep(step).into());
    }
    let count = ((end - start) / step).ceil().max(0.0);
    if count.is_nan() || count > MAX_GRID_POINTS as f64 {
        return Err(SpectrumDefect::InvalidStep(step).into());
    }

    Ok((0..count as usize)
        .map(|k| start + k as f64 * step)
        .filter(|&f| f < end - step * 1e-6)
        .collect())
}

/// Resample a spectrum onto a uniform grid of width `step`.
///
/// The grid runs from the lowest band frequency up to, but excluding, the
/// highest. Each output band has bandwidth `step`. Directional data is not
/// carried over.
///
/// # Errors
/// - `InvalidStep` if `step` is not a positive finite number, or so small
///   that the grid would exceed [`MAX_GRID_POINTS`]
/// - `TooFewBands` if the spectrum has fewer than two bands
pub fn resample(spectrum: &Spectrum, step: f64) -> SpectrumResult<Spectrum> {
    if !(step.is_finite() && step > 0.0) {
        return Err(SpectrumDefect::InvalidStep(step).into());
    }

    let interpolant = MonotoneCubic::new(spectrum.frequencies(), spectrum.energy_densities())?;
    let Some((f_min, f_max)) = spectrum.frequency_range() else {
        return Err(SpectrumDefect::Empty.into());
    };

    let bands = uniform_grid(f_min, f_max, step)?
        .into_iter()
        .map(|f| SpectralBand::new(f, step, interpolant.evaluate(f).max(0.0)))
        .collect();

    Spectrum::new(bands)
}
