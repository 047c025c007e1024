//! Timestamped spectrum series and batch statistics.
//!
//! A buoy reports one spectrum per sampling interval (30 minutes for CDIP).
//! [`SpectrumSeries`] holds those records in time order and reduces each one
//! to wave height or period statistics. Records whose spectrum is degenerate
//! are skipped and reported back rather than aborting the whole batch.
//!
//! # Example
//!
//! ```ignore
//! use buoy_spectra::analysis::SpectrumSeries;
//! use buoy_spectra::io::read_spectrum_file;
//!
//! let series = read_spectrum_file(Path::new("torrey_pines.txt"))?;
//! let heights = series.wave_heights();
//! for point in &heights.points {
//!     println!("{} Hs = {:.2} m", point.time, point.value.hs);
//! }
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::period::{PeriodConfig, PeriodEstimate, compute_period};
use super::wave_height::{HsEstimate, compute_hs};
use crate::error::{SpectrumError, SpectrumResult};
use crate::spectrum::Spectrum;

/// A spectrum observed at one time by one station.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpectrumRecord {
    /// Observation time (UTC)
    pub time: DateTime<Utc>,
    /// Station identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub station: Option<String>,
    /// Significant wave height reported by the data source (m)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reported_hs: Option<f64>,
    /// The spectrum
    pub spectrum: Spectrum,
}

impl SpectrumRecord {
    /// Create a record without station or reported values.
    pub fn new(time: DateTime<Utc>, spectrum: Spectrum) -> Self {
        Self {
            time,
            station: None,
            reported_hs: None,
            spectrum,
        }
    }

    /// Set the station identifier.
    pub fn with_station(mut self, station: impl Into<String>) -> Self {
        self.station = Some(station.into());
        self
    }

    /// Set the reported significant wave height.
    pub fn with_reported_hs(mut self, hs: f64) -> Self {
        self.reported_hs = Some(hs);
        self
    }
}

/// A statistic computed for one record.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint<T> {
    /// Observation time
    pub time: DateTime<Utc>,
    /// Computed value
    pub value: T,
}

/// A record that could not be reduced.
#[derive(Clone, Debug, PartialEq)]
pub struct SkippedRecord {
    /// Observation time
    pub time: DateTime<Utc>,
    /// Why the computation failed
    pub error: SpectrumError,
}

/// Result of a batch computation over a series.
#[derive(Clone, Debug, PartialEq)]
pub struct SeriesOutcome<T> {
    /// Successfully computed values, in time order
    pub points: Vec<SeriesPoint<T>>,
    /// Records that were skipped, in time order
    pub skipped: Vec<SkippedRecord>,
}

impl<T> SeriesOutcome<T> {
    fn collect(results: impl IntoIterator<Item = (DateTime<Utc>, SpectrumResult<T>)>) -> Self {
        let mut points = Vec::new();
        let mut skipped = Vec::new();
        for (time, result) in results {
            match result {
                Ok(value) => points.push(SeriesPoint { time, value }),
                Err(error) => {
                    tracing::warn!(%time, %error, "skipping spectrum");
                    skipped.push(SkippedRecord { time, error });
                }
            }
        }
        Self { points, skipped }
    }

    /// Number of records that produced a value.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if no record produced a value.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }
}

/// Error for series construction.
#[derive(Clone, Copy, Debug, PartialEq, thiserror::Error)]
#[error("Record {index} is not later than the previous record")]
pub struct NonMonotonicSeries {
    /// Index of the offending record
    pub index: usize,
}

/// Spectrum records sorted by time.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SpectrumSeries {
    records: Vec<SpectrumRecord>,
}

impl SpectrumSeries {
    /// Create a series from records with strictly increasing times.
    pub fn from_records(records: Vec<SpectrumRecord>) -> Result<Self, NonMonotonicSeries> {
        for i in 1..records.len() {
            if records[i].time <= records[i - 1].time {
                return Err(NonMonotonicSeries { index: i });
            }
        }
        Ok(Self { records })
    }

    /// Create an empty series.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Append a record later than every record already held.
    pub fn push(&mut self, record: SpectrumRecord) -> Result<(), NonMonotonicSeries> {
        if self.records.last().is_some_and(|last| record.time <= last.time) {
            return Err(NonMonotonicSeries {
                index: self.records.len(),
            });
        }
        self.records.push(record);
        Ok(())
    }

    /// Number of records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// Check if empty.
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Access the records.
    pub fn records(&self) -> &[SpectrumRecord] {
        &self.records
    }

    /// Time range (first, last), or `None` when empty.
    pub fn time_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        Some((self.records.first()?.time, self.records.last()?.time))
    }

    /// Record closest in time to `time`. Ties go to the earlier record.
    pub fn nearest(&self, time: DateTime<Utc>) -> Option<&SpectrumRecord> {
        let idx = self.records.partition_point(|r| r.time < time);
        let after = self.records.get(idx);
        let before = idx.checked_sub(1).and_then(|i| self.records.get(i));

        match (before, after) {
            (Some(b), Some(a)) => {
                if time - b.time <= a.time - time {
                    Some(b)
                } else {
                    Some(a)
                }
            }
            (Some(b), None) => Some(b),
            (None, a) => a,
        }
    }

    /// Records with `start <= time <= end`.
    pub fn between(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> &[SpectrumRecord] {
        let lo = self.records.partition_point(|r| r.time < start);
        let hi = self.records.partition_point(|r| r.time <= end);
        &self.records[lo..hi.max(lo)]
    }

    /// Significant wave height for every record.
    pub fn wave_heights(&self) -> SeriesOutcome<HsEstimate> {
        SeriesOutcome::collect(
            self.records
                .iter()
                .map(|r| (r.time, compute_hs(&r.spectrum))),
        )
    }

    /// Period statistics for every record.
    pub fn periods(&self, config: &PeriodConfig) -> SeriesOutcome<PeriodEstimate> {
        SeriesOutcome::collect(
            self.records
                .iter()
                .map(|r| (r.time, compute_period(&r.spectrum, config))),
        )
    }

    /// Parallel version of [`Self::wave_heights`].
    #[cfg(feature = "parallel")]
    pub fn wave_heights_parallel(&self) -> SeriesOutcome<HsEstimate> {
        use rayon::prelude::*;

        let results: Vec<_> = self
            .records
            .par_iter()
            .map(|r| (r.time, compute_hs(&r.spectrum)))
            .collect();
        SeriesOutcome::collect(results)
    }

    /// Parallel version of [`Self::periods`].
    #[cfg(feature = "parallel")]
    pub fn periods_parallel(&self, config: &PeriodConfig) -> SeriesOutcome<PeriodEstimate> {
        use rayon::prelude::*;

        let results: Vec<_> = self
            .records
            .par_iter()
            .map(|r| (r.time, compute_period(&r.spectrum, config)))
            .collect();
        SeriesOutcome::collect(results)
    }
}
