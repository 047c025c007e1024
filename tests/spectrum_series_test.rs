//! Integration tests for spectrum files, series reduction and Hs validation.

use approx::assert_relative_eq;
use buoy_spectra::{
    AnalysisConfig, DirectionalMoments, HsComparison, PeriodConfig, SpectralBand, Spectrum,
    SpectrumError, SpectrumFileError, SpectrumRecord, SpectrumSeries, compute_hs, parse_spectra,
    read_spectrum_file, write_spectrum_file,
};
use chrono::{Duration, TimeZone, Utc};
use tempfile::TempDir;

/// Half-hourly records of a swell whose height grows linearly.
fn growing_swell(n: usize) -> SpectrumSeries {
    let start = Utc.with_ymd_and_hms(2017, 7, 12, 16, 0, 0).unwrap();
    let records = (0..n)
        .map(|i| {
            let level = 0.5 + 0.1 * i as f64;
            let energies: Vec<f64> = [0.1, 0.6, 1.0, 0.7, 0.3, 0.1]
                .iter()
                .map(|e| e * level)
                .collect();
            let spectrum = Spectrum::uniform(0.06, 0.01, &energies).unwrap();
            let hs = compute_hs(&spectrum).unwrap().hs;
            SpectrumRecord::new(start + Duration::minutes(30 * i as i64), spectrum)
                .with_station("100")
                .with_reported_hs((hs * 100.0).round() / 100.0)
        })
        .collect();
    SpectrumSeries::from_records(records).unwrap()
}

#[test]
fn test_multi_record_file_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("100p1.txt");

    let series = growing_swell(4);
    write_spectrum_file(&path, &series).unwrap();
    let loaded = read_spectrum_file(&path).unwrap();

    assert_eq!(loaded.len(), series.len());
    for (a, b) in loaded.records().iter().zip(series.records()) {
        assert_eq!(a.time, b.time);
        assert_eq!(a.station.as_deref(), Some("100"));
        assert_eq!(a.reported_hs, b.reported_hs);
        assert_eq!(a.spectrum.len(), b.spectrum.len());
        for (x, y) in a.spectrum.bands().iter().zip(b.spectrum.bands()) {
            assert_relative_eq!(x.frequency, y.frequency);
            assert_relative_eq!(x.energy_density, y.energy_density);
        }
    }
}

#[test]
fn test_station_changes_survive_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("stations.txt");

    let stations = [Some("100"), Some("106"), None, Some("106")];
    let records = growing_swell(stations.len())
        .records()
        .iter()
        .zip(stations)
        .map(|(r, station)| SpectrumRecord {
            station: station.map(str::to_string),
            ..r.clone()
        })
        .collect();
    let series = SpectrumSeries::from_records(records).unwrap();

    write_spectrum_file(&path, &series).unwrap();
    let loaded = read_spectrum_file(&path).unwrap();

    let read_back: Vec<Option<&str>> = loaded
        .records()
        .iter()
        .map(|r| r.station.as_deref())
        .collect();
    assert_eq!(read_back, stations);
    assert_eq!(loaded, series);
}

#[test]
fn test_directional_columns_survive_round_trip() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("directional.txt");

    let direction = DirectionalMoments {
        mean_direction: 265.0,
        a1: -0.31,
        b1: 0.12,
        a2: 0.05,
        b2: -0.02,
        check_factor: 1.01,
    };
    let spectrum = Spectrum::new(vec![
        SpectralBand::new(0.05, 0.01, 0.4).with_direction(direction),
        SpectralBand::new(0.06, 0.01, 1.2).with_direction(direction),
    ])
    .unwrap();
    let time = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    let series = SpectrumSeries::from_records(vec![SpectrumRecord::new(time, spectrum)]).unwrap();

    write_spectrum_file(&path, &series).unwrap();
    let loaded = read_spectrum_file(&path).unwrap();

    let record = &loaded.records()[0];
    assert!(record.spectrum.has_directional_data());
    assert_eq!(record.spectrum.bands()[1].direction, Some(direction));
}

#[test]
fn test_parse_hand_written_file() {
    let content = "\
# station: 067
# time: 2017-07-12T16:00:00Z
# hs: 0.28
# columns: frequency(Hz) bandwidth(Hz) energy(m2/Hz)
0.1000 0.0050 1.0000

# time: 2017-07-12T16:30:00Z
0.0500 0.0100 0.5000
0.0600 0.0100 0.5000
";
    let series = parse_spectra(content).unwrap();
    assert_eq!(series.len(), 2);

    let first = &series.records()[0];
    assert_eq!(first.station.as_deref(), Some("067"));
    assert_eq!(first.reported_hs, Some(0.28));
    assert_relative_eq!(compute_hs(&first.spectrum).unwrap().hs, 0.2828, epsilon = 1e-4);

    // Station carries over, reported Hs does not
    let second = &series.records()[1];
    assert_eq!(second.station.as_deref(), Some("067"));
    assert_eq!(second.reported_hs, None);
}

#[test]
fn test_bad_row_reports_line() {
    let content = "# time: 2017-07-12T16:00:00Z\n0.05 0.01 0.5\n0.06 0.01\n";
    match parse_spectra(content) {
        Err(SpectrumFileError::Parse { line, .. }) => assert_eq!(line, 3),
        other => panic!("expected parse error, got {other:?}"),
    }
}

#[test]
fn test_series_reduction() {
    let series = growing_swell(6);
    let heights = series.wave_heights();

    assert_eq!(heights.len(), 6);
    assert!(heights.skipped.is_empty());
    assert!(
        heights
            .points
            .windows(2)
            .all(|w| w[1].value.hs > w[0].value.hs && w[1].time > w[0].time)
    );

    // Shape is fixed, so the mean frequency is the same for every record
    let periods = series.periods(&PeriodConfig::default());
    let f0 = periods.points[0].value.mean_frequency;
    for p in &periods.points {
        assert_relative_eq!(p.value.mean_frequency, f0, max_relative = 1e-10);
    }
}

#[test]
fn test_nearest_and_between() {
    let series = growing_swell(4);
    let t0 = series.records()[0].time;

    let near = series.nearest(t0 + Duration::minutes(40)).unwrap();
    assert_eq!(near.time, t0 + Duration::minutes(30));

    let window = series.between(t0 + Duration::minutes(30), t0 + Duration::minutes(60));
    assert_eq!(window.len(), 2);
}

#[test]
fn test_identical_series_has_zero_error() {
    let start = Utc.with_ymd_and_hms(2018, 3, 1, 0, 0, 0).unwrap();
    let records: Vec<SpectrumRecord> = (0..5)
        .map(|i| {
            let spectrum = Spectrum::uniform(0.05, 0.01, &[0.2, 1.0 + i as f64, 0.4]).unwrap();
            let hs = compute_hs(&spectrum).unwrap().hs;
            SpectrumRecord::new(start + Duration::hours(i), spectrum).with_reported_hs(hs)
        })
        .collect();

    let comparison = HsComparison::compute(&records).unwrap();
    assert_eq!(comparison.metrics.n_points, 5);
    assert!(comparison.metrics.rmse.abs() < 1e-12);
    assert!(comparison.metrics.mae.abs() < 1e-12);
    assert!(comparison.metrics.bias.abs() < 1e-12);
    assert!(comparison.within_tolerance(0.0));
}

#[test]
fn test_validation_against_rounded_reports() {
    let series = growing_swell(8);
    let config = AnalysisConfig::default();

    let comparison = HsComparison::compute(series.records()).unwrap();
    assert!(comparison.within_tolerance(config.validation.tolerance));
    assert!(comparison.metrics.max_error <= 0.005 + 1e-12);
    assert_eq!(comparison.outliers(config.validation.tolerance).count(), 0);
    assert_eq!(comparison.outliers(0.0).count(), comparison.pairs.len() - exact(&comparison));
}

fn exact(comparison: &HsComparison) -> usize {
    comparison
        .pairs
        .iter()
        .filter(|p| p.value.error() == 0.0)
        .count()
}

#[test]
fn test_validation_without_reports() {
    let time = Utc.with_ymd_and_hms(2018, 3, 1, 0, 0, 0).unwrap();
    let spectrum = Spectrum::uniform(0.05, 0.01, &[1.0, 2.0]).unwrap();
    let records = vec![SpectrumRecord::new(time, spectrum)];

    assert!(matches!(
        HsComparison::compute(&records),
        Err(SpectrumError::NoReportedValues)
    ));
}

#[cfg(feature = "parallel")]
#[test]
fn test_parallel_matches_serial() {
    let series = growing_swell(32);
    let config = PeriodConfig::default();

    assert_eq!(series.wave_heights(), series.wave_heights_parallel());
    assert_eq!(series.periods(&config), series.periods_parallel(&config));
}
