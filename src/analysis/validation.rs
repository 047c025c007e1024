//! Validation of computed wave heights against reported values.
//!
//! Data sources usually publish their own Hs next to the spectrum. Comparing
//! the two catches unit mistakes and truncated spectra early: for CDIP
//! stations the values agree to within a few centimetres.

use serde::{Deserialize, Serialize};

use super::series::{SeriesPoint, SpectrumRecord};
use super::wave_height::compute_hs;
use crate::error::{SpectrumError, SpectrumResult};

/// Agreement between computed and reported Hs over a set of records.
///
/// Signed quantities are `computed - reported`, so a positive bias means the
/// spectrum carries more energy than the source reported.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ComparisonMetrics {
    /// Root mean square difference (m)
    pub rmse: f64,
    /// Mean absolute difference (m)
    pub mae: f64,
    /// Mean signed difference (m)
    pub bias: f64,
    /// Largest absolute difference (m)
    pub max_error: f64,
    /// Pearson correlation of the two Hs series. `None` when either series
    /// is flat, e.g. a single record or a calm spell reported at one value.
    pub correlation: Option<f64>,
    /// Number of compared records
    pub n_points: usize,
}

impl ComparisonMetrics {
    /// Aggregate over pairs; `None` for an empty slice.
    pub fn from_pairs(pairs: &[SeriesPoint<HsPair>]) -> Option<Self> {
        if pairs.is_empty() {
            return None;
        }
        let n = pairs.len() as f64;

        let mut sum_diff = 0.0;
        let mut sum_sq = 0.0;
        let mut sum_abs = 0.0;
        let mut max_error = 0.0_f64;
        let mut sum_computed = 0.0;
        let mut sum_reported = 0.0;
        for HsPair { computed, reported } in pairs.iter().map(|p| p.value) {
            let diff = computed - reported;
            sum_diff += diff;
            sum_sq += diff * diff;
            sum_abs += diff.abs();
            max_error = max_error.max(diff.abs());
            sum_computed += computed;
            sum_reported += reported;
        }

        Some(Self {
            rmse: (sum_sq / n).sqrt(),
            mae: sum_abs / n,
            bias: sum_diff / n,
            max_error,
            correlation: correlation(pairs, sum_computed / n, sum_reported / n),
            n_points: pairs.len(),
        })
    }
}

/// Pearson correlation about the given means.
fn correlation(pairs: &[SeriesPoint<HsPair>], mean_c: f64, mean_r: f64) -> Option<f64> {
    let (mut cov, mut var_c, mut var_r) = (0.0, 0.0, 0.0);
    for p in pairs {
        let dc = p.value.computed - mean_c;
        let dr = p.value.reported - mean_r;
        cov += dc * dr;
        var_c += dc * dc;
        var_r += dr * dr;
    }

    // Spread at rounding level carries no signal
    let n = pairs.len() as f64;
    let flat = |var: f64, mean: f64| var / n <= f64::EPSILON * mean * mean;
    if flat(var_c, mean_c) || flat(var_r, mean_r) {
        return None;
    }
    Some((cov / (var_c.sqrt() * var_r.sqrt())).clamp(-1.0, 1.0))
}

/// Computed versus reported significant wave height for one record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct HsPair {
    /// Hs from the spectrum (m)
    pub computed: f64,
    /// Hs published by the source (m)
    pub reported: f64,
}

impl HsPair {
    /// Absolute difference (m).
    pub fn error(&self) -> f64 {
        (self.computed - self.reported).abs()
    }
}

/// Comparison of computed and reported Hs over a set of records.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HsComparison {
    /// Per-record pairs, in input order
    pub pairs: Vec<SeriesPoint<HsPair>>,
    /// Aggregate metrics over all pairs
    pub metrics: ComparisonMetrics,
}

impl HsComparison {
    /// Compare every record that carries a reported Hs.
    ///
    /// Records without a reported value are ignored. Records whose spectrum
    /// is invalid fail the whole comparison, since a reported Hs with no
    /// usable spectrum is itself a data problem.
    ///
    /// # Errors
    /// - `NoReportedValues` if no record carries a reported Hs
    /// - `InvalidSpectrum` from [`compute_hs`]
    pub fn compute(records: &[SpectrumRecord]) -> SpectrumResult<Self> {
        let mut pairs = Vec::new();
        for record in records {
            let Some(reported) = record.reported_hs else {
                continue;
            };
            let computed = compute_hs(&record.spectrum)?.hs;
            pairs.push(SeriesPoint {
                time: record.time,
                value: HsPair { computed, reported },
            });
        }

        let metrics = ComparisonMetrics::from_pairs(&pairs).ok_or(SpectrumError::NoReportedValues)?;
        Ok(Self { pairs, metrics })
    }

    /// Check if every pair differs by at most `tolerance` metres.
    pub fn within_tolerance(&self, tolerance: f64) -> bool {
        self.metrics.max_error <= tolerance
    }

    /// Pairs that differ by more than `tolerance` metres.
    pub fn outliers(&self, tolerance: f64) -> impl Iterator<Item = &SeriesPoint<HsPair>> {
        self.pairs.iter().filter(move |p| p.value.error() > tolerance)
    }
}
