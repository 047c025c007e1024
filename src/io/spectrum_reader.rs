//! Reader and writer for plain-text spectrum files.
//!
//! # File Format
//!
//! ```text
//! # Torrey Pines Outer
//! # station: 100
//! # time: 2017-07-12T16:00:00Z
//! # hs: 1.23
//! # columns: frequency(Hz) bandwidth(Hz) energy(m2/Hz) [dmean a1 b1 a2 b2 check]
//! 0.0250 0.0050 0.0003
//! 0.0300 0.0050 0.0006 229 -0.1814 -0.2084 0.0993 -0.1183 2.55
//! # time: 2017-07-12T16:30:00Z
//! 0.0250 0.0050 0.0004
//! ```
//!
//! - Every `time` line starts a new record; times must strictly increase.
//!   Both RFC 3339 and compact `YYYYMMDDhhmmss` stamps are accepted.
//! - `station` applies to the record whose header it appears in and to all
//!   later records; `# station:` with no value clears it. `hs` applies to
//!   the current record only.
//! - Data rows carry 3 columns, or 9 with the directional columns.
//! - A file without any `time` line holds a single record at the Unix epoch.

use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use thiserror::Error;

use crate::analysis::{SpectrumRecord, SpectrumSeries};
use crate::error::SpectrumError;
use crate::spectrum::{DirectionalMoments, SpectralBand, Spectrum};

/// Error type for spectrum file parsing.
#[derive(Debug, Error)]
pub enum SpectrumFileError {
    /// File I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error with line number
    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    /// No data rows in the file
    #[error("Spectrum file contains no data")]
    EmptyFile,

    /// Bands of a record violate the spectrum invariants
    #[error("Invalid spectrum in record starting at line {line}: {source}")]
    InvalidSpectrum {
        line: usize,
        #[source]
        source: SpectrumError,
    },

    /// Record time not after the previous record
    #[error("Non-monotonic time at line {line}")]
    NonMonotonic { line: usize },
}

/// Record under construction.
struct PendingRecord {
    line: usize,
    /// `None` until a `time` line is seen
    time: Option<DateTime<Utc>>,
    station: Option<String>,
    reported_hs: Option<f64>,
    bands: Vec<SpectralBand>,
}

impl PendingRecord {
    fn new(line: usize, time: Option<DateTime<Utc>>, station: Option<String>) -> Self {
        Self {
            line,
            time,
            station,
            reported_hs: None,
            bands: Vec::new(),
        }
    }

    /// Header lines still apply while no data row has been read.
    fn in_header(&self) -> bool {
        self.bands.is_empty()
    }
}

#[derive(Default)]
struct Parser {
    station: Option<String>,
    pending: Option<PendingRecord>,
    series: SpectrumSeries,
    data_rows: usize,
}

impl Parser {
    fn line(&mut self, line_num: usize, line: &str) -> Result<(), SpectrumFileError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(());
        }

        if let Some(comment) = line.strip_prefix('#') {
            return self.metadata(line_num, comment.trim());
        }

        let band = parse_band(line_num, line)?;
        self.data_rows += 1;
        self.pending_or_implicit(line_num).bands.push(band);
        Ok(())
    }

    /// The record being built, or a time-less one opened at `line_num`.
    fn pending_or_implicit(&mut self, line_num: usize) -> &mut PendingRecord {
        let station = &self.station;
        self.pending
            .get_or_insert_with(|| PendingRecord::new(line_num, None, station.clone()))
    }

    fn metadata(&mut self, line_num: usize, comment: &str) -> Result<(), SpectrumFileError> {
        let Some((key, value)) = comment.split_once(':') else {
            return Ok(());
        };
        let value = value.trim();

        match key.trim() {
            "time" => {
                let time = parse_time(value).ok_or_else(|| SpectrumFileError::Parse {
                    line: line_num,
                    message: format!("Invalid time '{value}'"),
                })?;
                // Metadata seen before the first time stamp belongs to this record
                let adopt = matches!(
                    &self.pending,
                    Some(p) if p.time.is_none() && p.in_header()
                );
                if adopt {
                    if let Some(pending) = self.pending.as_mut() {
                        pending.time = Some(time);
                        pending.line = line_num;
                    }
                } else {
                    self.finish_pending()?;
                    self.pending = Some(PendingRecord::new(
                        line_num,
                        Some(time),
                        self.station.clone(),
                    ));
                }
            }
            "station" => {
                // An empty value clears the station
                let station = (!value.is_empty()).then(|| value.to_string());
                if let Some(pending) = self.pending.as_mut().filter(|p| p.in_header()) {
                    pending.station.clone_from(&station);
                }
                self.station = station;
            }
            "hs" => {
                let hs = value.parse().map_err(|_| SpectrumFileError::Parse {
                    line: line_num,
                    message: format!("Invalid hs '{value}'"),
                })?;
                self.pending_or_implicit(line_num).reported_hs = Some(hs);
            }
            _ => {}
        }
        Ok(())
    }

    fn finish_pending(&mut self) -> Result<(), SpectrumFileError> {
        let Some(pending) = self.pending.take() else {
            return Ok(());
        };
        let line = pending.line;

        let spectrum = Spectrum::new(pending.bands)
            .map_err(|source| SpectrumFileError::InvalidSpectrum { line, source })?;

        let record = SpectrumRecord {
            time: pending.time.unwrap_or(DateTime::UNIX_EPOCH),
            station: pending.station,
            reported_hs: pending.reported_hs,
            spectrum,
        };
        self.series
            .push(record)
            .map_err(|_| SpectrumFileError::NonMonotonic { line })
    }

    fn finish(mut self) -> Result<SpectrumSeries, SpectrumFileError> {
        self.finish_pending()?;
        if self.data_rows == 0 {
            return Err(SpectrumFileError::EmptyFile);
        }
        Ok(self.series)
    }
}

fn parse_time(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(t) = DateTime::parse_from_rfc3339(value) {
        return Some(t.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y%m%d%H%M%S")
        .ok()
        .map(|t| t.and_utc())
}

fn parse_band(line_num: usize, line: &str) -> Result<SpectralBand, SpectrumFileError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    if parts.len() != 3 && parts.len() != 9 {
        return Err(SpectrumFileError::Parse {
            line: line_num,
            message: format!(
                "Expected 3 or 9 columns (frequency bandwidth energy [dmean a1 b1 a2 b2 check]), got {}",
                parts.len()
            ),
        });
    }

    const NAMES: [&str; 9] = [
        "frequency",
        "bandwidth",
        "energy",
        "dmean",
        "a1",
        "b1",
        "a2",
        "b2",
        "check factor",
    ];
    let mut values = [0.0; 9];
    for (i, part) in parts.iter().enumerate() {
        values[i] = part.parse().map_err(|_| SpectrumFileError::Parse {
            line: line_num,
            message: format!("Invalid {} value '{}'", NAMES[i], part),
        })?;
    }

    let band = SpectralBand::new(values[0], values[1], values[2]);
    if parts.len() == 9 {
        Ok(band.with_direction(DirectionalMoments {
            mean_direction: values[3],
            a1: values[4],
            b1: values[5],
            a2: values[6],
            b2: values[7],
            check_factor: values[8],
        }))
    } else {
        Ok(band)
    }
}

/// Read a spectrum file.
///
/// # Example
///
/// ```ignore
/// use buoy_spectra::io::read_spectrum_file;
/// use std::path::Path;
///
/// let series = read_spectrum_file(Path::new("100p1.txt"))?;
/// println!("{} spectra", series.len());
/// ```
pub fn read_spectrum_file(path: &Path) -> Result<SpectrumSeries, SpectrumFileError> {
    let file = File::open(path)?;
    let reader = BufReader::new(file);

    let mut parser = Parser::default();
    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result?;
        parser.line(line_num + 1, &line)?;
    }

    let series = parser.finish()?;
    tracing::debug!(path = %path.display(), records = series.len(), "read spectrum file");
    Ok(series)
}

/// Parse spectra from a string.
///
/// Same format as file, useful for testing or embedded data.
pub fn parse_spectra(content: &str) -> Result<SpectrumSeries, SpectrumFileError> {
    let mut parser = Parser::default();
    for (line_num, line) in content.lines().enumerate() {
        parser.line(line_num + 1, line)?;
    }
    parser.finish()
}

/// Write records in the format read by [`read_spectrum_file`].
pub fn write_spectrum_file(path: &Path, series: &SpectrumSeries) -> Result<(), SpectrumFileError> {
    let file = File::create(path)?;
    let mut w = BufWriter::new(file);

    writeln!(
        w,
        "# columns: frequency(Hz) bandwidth(Hz) energy(m2/Hz) [dmean a1 b1 a2 b2 check]"
    )?;
    for record in series.records() {
        writeln!(w, "# time: {}", record.time.to_rfc3339())?;
        writeln!(w, "# station: {}", record.station.as_deref().unwrap_or(""))?;
        if let Some(hs) = record.reported_hs {
            writeln!(w, "# hs: {hs}")?;
        }
        for band in record.spectrum.bands() {
            write!(
                w,
                "{} {} {}",
                band.frequency, band.bandwidth, band.energy_density
            )?;
            if let Some(d) = &band.direction {
                write!(
                    w,
                    " {} {} {} {} {} {}",
                    d.mean_direction, d.a1, d.b1, d.a2, d.b2, d.check_factor
                )?;
            }
            writeln!(w)?;
        }
    }

    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SpectrumDefect;
    use chrono::TimeZone;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const TOL: f64 = 1e-12;

    #[test]
    fn test_parse_single_record_without_time() {
        let content = "0.05 0.01 1.0\n0.06 0.01 2.0";
        let series = parse_spectra(content).unwrap();

        assert_eq!(series.len(), 1);
        let record = &series.records()[0];
        assert_eq!(record.time, DateTime::UNIX_EPOCH);
        assert_eq!(record.spectrum.len(), 2);
        assert!((record.spectrum.bands()[1].energy_density - 2.0).abs() < TOL);
    }

    #[test]
    fn test_parse_multiple_records() {
        let content = r#"
# station: 100
# time: 2017-07-12T16:00:00Z
# hs: 0.25
# columns: frequency bandwidth energy
0.05 0.01 1.0
0.06 0.01 2.0
# time: 20170712163000
0.05 0.01 1.5
"#;
        let series = parse_spectra(content).unwrap();
        assert_eq!(series.len(), 2);

        let first = &series.records()[0];
        assert_eq!(first.station.as_deref(), Some("100"));
        assert_eq!(first.reported_hs, Some(0.25));
        assert_eq!(
            first.time,
            Utc.with_ymd_and_hms(2017, 7, 12, 16, 0, 0).unwrap()
        );

        let second = &series.records()[1];
        assert_eq!(second.station.as_deref(), Some("100"));
        assert_eq!(second.reported_hs, None);
        assert_eq!(
            second.time,
            Utc.with_ymd_and_hms(2017, 7, 12, 16, 30, 0).unwrap()
        );
    }

    #[test]
    fn test_station_change_applies_to_later_records() {
        let content = "\
# station: 100
# time: 2017-07-12T16:00:00Z
0.05 0.01 1.0
# station: 106
# time: 2017-07-12T16:30:00Z
0.05 0.01 1.0
# time: 2017-07-12T17:00:00Z
# station:
0.05 0.01 1.0
";
        let series = parse_spectra(content).unwrap();
        let stations: Vec<Option<&str>> = series
            .records()
            .iter()
            .map(|r| r.station.as_deref())
            .collect();
        assert_eq!(stations, vec![Some("100"), Some("106"), None]);
    }

    #[test]
    fn test_station_after_data_is_not_retroactive() {
        let content = "0.05 0.01 1.0\n# station: 106\n# time: 2017-07-12T16:30:00Z\n0.05 0.01 1.0";
        let series = parse_spectra(content).unwrap();
        assert_eq!(series.records()[0].station, None);
        assert_eq!(series.records()[1].station.as_deref(), Some("106"));
    }

    #[test]
    fn test_parse_directional_columns() {
        let content = "0.025 0.005 0.0003 221 -0.1792 -0.1533 -0.3378 0.3161 2.55";
        let series = parse_spectra(content).unwrap();
        let band = series.records()[0].spectrum.bands()[0];
        let d = band.direction.unwrap();
        assert!((d.mean_direction - 221.0).abs() < TOL);
        assert!((d.b2 - 0.3161).abs() < TOL);
        assert!((d.check_factor - 2.55).abs() < TOL);
    }

    #[test]
    fn test_parse_wrong_column_count() {
        let result = parse_spectra("0.05 0.01 1.0\n0.06 0.01");
        assert!(matches!(
            result,
            Err(SpectrumFileError::Parse { line: 2, .. })
        ));
    }

    #[test]
    fn test_parse_bad_number() {
        let result = parse_spectra("0.05 abc 1.0");
        match result {
            Err(SpectrumFileError::Parse { line, message }) => {
                assert_eq!(line, 1);
                assert!(message.contains("bandwidth"));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_empty() {
        let result = parse_spectra("# just comments\n# time: 2017-07-12T16:00:00Z");
        assert!(matches!(result, Err(SpectrumFileError::EmptyFile)));
    }

    #[test]
    fn test_parse_non_monotonic() {
        let content = "# time: 2017-07-12T16:30:00Z\n0.05 0.01 1.0\n# time: 2017-07-12T16:00:00Z\n0.05 0.01 1.0";
        let result = parse_spectra(content);
        assert!(matches!(
            result,
            Err(SpectrumFileError::NonMonotonic { line: 3 })
        ));
    }

    #[test]
    fn test_parse_invalid_spectrum() {
        let content = "# time: 2017-07-12T16:00:00Z\n0.06 0.01 1.0\n0.05 0.01 1.0";
        match parse_spectra(content) {
            Err(SpectrumFileError::InvalidSpectrum { line, source }) => {
                assert_eq!(line, 1);
                assert!(matches!(
                    source.defect(),
                    Some(SpectrumDefect::Unsorted { index: 1, .. })
                ));
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_parse_bad_time() {
        let result = parse_spectra("# time: yesterday\n0.05 0.01 1.0");
        assert!(matches!(
            result,
            Err(SpectrumFileError::Parse { line: 1, .. })
        ));
    }

    #[test]
    fn test_read_spectrum_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "# station: 100").unwrap();
        writeln!(file, "# time: 2017-07-20T15:00:00Z").unwrap();
        writeln!(file, "0.05 0.01 1.0").unwrap();
        writeln!(file, "0.06 0.01 2.0").unwrap();

        let series = read_spectrum_file(file.path()).unwrap();
        assert_eq!(series.len(), 1);
        assert_eq!(series.records()[0].spectrum.len(), 2);
    }

    #[test]
    fn test_write_then_read() {
        let t0 = Utc.with_ymd_and_hms(2017, 7, 20, 15, 0, 0).unwrap();
        let directional = SpectralBand::new(0.06, 0.01, 2.0).with_direction(DirectionalMoments {
            mean_direction: 229.0,
            a1: -0.1814,
            b1: -0.2084,
            a2: 0.0993,
            b2: -0.1183,
            check_factor: 2.55,
        });
        let spectrum = Spectrum::new(vec![SpectralBand::new(0.05, 0.01, 1.0), directional]).unwrap();
        let series = SpectrumSeries::from_records(vec![
            SpectrumRecord::new(t0, spectrum.clone())
                .with_station("100")
                .with_reported_hs(0.7),
            SpectrumRecord::new(t0 + chrono::Duration::minutes(30), spectrum.clone())
                .with_station("106"),
            SpectrumRecord::new(t0 + chrono::Duration::minutes(60), spectrum),
        ])
        .unwrap();

        let file = NamedTempFile::new().unwrap();
        write_spectrum_file(file.path(), &series).unwrap();
        let back = read_spectrum_file(file.path()).unwrap();

        assert_eq!(back, series);
    }
}
