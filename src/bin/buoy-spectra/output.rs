//! Result rows and their text, JSON and CSV renderings.

use std::io::Write;

use anyhow::Result;
use buoy_spectra::{
    HsComparison, HsEstimate, PeriodEstimate, SeriesPoint, SpectrumRecord, SpectrumSeries,
    SpectrumSummary,
};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::OutputFormat;

/// A row that can be printed as a table line.
pub trait Tabular: Serialize {
    fn headers() -> &'static [&'static str];
    fn values(&self) -> Vec<String>;
}

fn opt(value: Option<f64>, precision: usize) -> String {
    value.map_or_else(|| "-".to_string(), |v| format!("{v:.precision$}"))
}

#[derive(Serialize)]
pub struct HsRow {
    pub time: DateTime<Utc>,
    #[serde(flatten)]
    pub estimate: HsEstimate,
    pub reported_hs: Option<f64>,
}

impl HsRow {
    pub fn new(point: &SeriesPoint<HsEstimate>, record: Option<&SpectrumRecord>) -> Self {
        Self {
            time: point.time,
            estimate: point.value,
            reported_hs: record.and_then(|r| r.reported_hs),
        }
    }
}

/// Pair each Hs point with the record it came from.
///
/// Points are a time-ordered subset of the records, so a single forward pass
/// over the records finds every match.
pub fn hs_rows(series: &SpectrumSeries, points: &[SeriesPoint<HsEstimate>]) -> Vec<HsRow> {
    let mut records = series.records().iter();
    points
        .iter()
        .map(|p| HsRow::new(p, records.find(|r| r.time == p.time)))
        .collect()
}

impl Tabular for HsRow {
    fn headers() -> &'static [&'static str] {
        &["time", "hs", "hs_low", "hs_high", "tdf", "reported_hs"]
    }

    fn values(&self) -> Vec<String> {
        vec![
            self.time.to_rfc3339(),
            format!("{:.3}", self.estimate.hs),
            format!("{:.3}", self.estimate.hs_low),
            format!("{:.3}", self.estimate.hs_high),
            format!("{:.1}", self.estimate.tdf),
            opt(self.reported_hs, 3),
        ]
    }
}

#[derive(Serialize)]
pub struct PeriodRow {
    pub time: DateTime<Utc>,
    #[serde(flatten)]
    pub estimate: PeriodEstimate,
    pub lull: f64,
}

impl From<&SeriesPoint<PeriodEstimate>> for PeriodRow {
    fn from(point: &SeriesPoint<PeriodEstimate>) -> Self {
        Self {
            time: point.time,
            estimate: point.value,
            lull: point.value.lull_estimate(),
        }
    }
}

impl Tabular for PeriodRow {
    fn headers() -> &'static [&'static str] {
        &[
            "time",
            "mean_freq",
            "freq_std",
            "mean_period",
            "lull",
            "group_mean",
            "group_var",
        ]
    }

    fn values(&self) -> Vec<String> {
        vec![
            self.time.to_rfc3339(),
            format!("{:.4}", self.estimate.mean_frequency),
            format!("{:.4}", self.estimate.frequency_spread()),
            format!("{:.2}", self.estimate.mean_period),
            format!("{:.1}", self.lull),
            format!("{:.3}", self.estimate.group_period_mean),
            format!("{:.3}", self.estimate.group_period_variance),
        ]
    }
}

#[derive(Serialize)]
pub struct SummaryRow {
    pub time: DateTime<Utc>,
    #[serde(flatten)]
    pub summary: SpectrumSummary,
}

impl Tabular for SummaryRow {
    fn headers() -> &'static [&'static str] {
        &["time", "hs", "tp", "tm01", "tm02", "mean_period", "lull"]
    }

    fn values(&self) -> Vec<String> {
        let s = &self.summary;
        vec![
            self.time.to_rfc3339(),
            format!("{:.3}", s.hs.hs),
            format!("{:.2}", s.peak.period),
            format!("{:.2}", s.moments.tm01()),
            format!("{:.2}", s.moments.tm02()),
            format!("{:.2}", s.period.mean_period),
            format!("{:.1}", s.period.lull_estimate()),
        ]
    }
}

#[derive(Serialize)]
pub struct ComparisonRow {
    pub time: DateTime<Utc>,
    pub computed: f64,
    pub reported: f64,
    pub error: f64,
}

impl Tabular for ComparisonRow {
    fn headers() -> &'static [&'static str] {
        &["time", "computed", "reported", "error"]
    }

    fn values(&self) -> Vec<String> {
        vec![
            self.time.to_rfc3339(),
            format!("{:.3}", self.computed),
            format!("{:.3}", self.reported),
            format!("{:.3}", self.error),
        ]
    }
}

/// Write rows to `out` in the requested format.
pub fn write_rows<T: Tabular>(out: &mut impl Write, rows: &[T], format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Text => {
            let headers = T::headers();
            let cells: Vec<Vec<String>> = rows.iter().map(Tabular::values).collect();
            let widths: Vec<usize> = headers
                .iter()
                .enumerate()
                .map(|(i, h)| {
                    cells
                        .iter()
                        .map(|row| row[i].len())
                        .chain(std::iter::once(h.len()))
                        .max()
                        .unwrap_or(0)
                })
                .collect();

            let line = |fields: Vec<String>| {
                fields
                    .iter()
                    .zip(&widths)
                    .map(|(f, &w)| format!("{f:>w$}"))
                    .collect::<Vec<_>>()
                    .join("  ")
            };
            writeln!(out, "{}", line(headers.iter().map(|h| h.to_string()).collect()))?;
            for row in cells {
                writeln!(out, "{}", line(row))?;
            }
        }
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(rows)?)?;
        }
        OutputFormat::Csv => {
            writeln!(out, "{}", T::headers().join(","))?;
            for row in rows {
                writeln!(out, "{}", row.values().join(","))?;
            }
        }
    }
    Ok(())
}

/// Write the aggregate metrics of a comparison.
pub fn write_metrics(out: &mut impl Write, cmp: &HsComparison, format: OutputFormat) -> Result<()> {
    let m = &cmp.metrics;
    match format {
        OutputFormat::Text => {
            writeln!(out)?;
            writeln!(out, "Hs Validation")?;
            writeln!(out, "=============")?;
            writeln!(out, "Records:     {}", m.n_points)?;
            writeln!(out, "RMSE:        {:.4} m", m.rmse)?;
            writeln!(out, "MAE:         {:.4} m", m.mae)?;
            writeln!(out, "Bias:        {:.4} m", m.bias)?;
            writeln!(out, "Max error:   {:.4} m", m.max_error)?;
            writeln!(out, "Correlation: {}", opt(m.correlation, 4))?;
        }
        OutputFormat::Json => {
            writeln!(out, "{}", serde_json::to_string_pretty(m)?)?;
        }
        OutputFormat::Csv => {
            writeln!(out, "metric,value")?;
            writeln!(out, "n_points,{}", m.n_points)?;
            writeln!(out, "rmse,{}", m.rmse)?;
            writeln!(out, "mae,{}", m.mae)?;
            writeln!(out, "bias,{}", m.bias)?;
            writeln!(out, "max_error,{}", m.max_error)?;
            writeln!(out, "correlation,{}", opt(m.correlation, 6))?;
        }
    }
    Ok(())
}
