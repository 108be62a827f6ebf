//! Unit tests for series building and re-indexing.

use chrono::{DateTime, Duration, TimeZone, Utc};
use trendcast::trends::{RawSample, SeriesBuilder};
use trendcast::EngineConfig;

fn at(day: i64, hour: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2023, 5, 1, 0, 0, 0).unwrap() + Duration::days(day) + Duration::hours(hour)
}

#[test]
fn test_every_x_at_least_one() {
    let raw = vec![
        RawSample::new(at(40, 3), 2.0),
        RawSample::new(at(0, 7), 1.0),
        RawSample::new(at(0, 7), 1.5),
        RawSample::new(at(2, 0), -4.0),
    ];
    let series = SeriesBuilder::new().build(&raw);

    assert_eq!(series.len(), 4);
    assert!(series.points().iter().all(|p| p.x >= 1.0));
    assert_eq!(series.points()[0].x, 1.0);
}

#[test]
fn test_fractional_days() {
    let raw = vec![RawSample::new(at(0, 0), 1.0), RawSample::new(at(1, 6), 2.0)];
    let series = SeriesBuilder::new().build(&raw);
    assert_eq!(series.points()[1].x, 2.25);
}

#[test]
fn test_custom_day_length() {
    // One x unit per week
    let config = EngineConfig {
        day_length_ms: 7.0 * 86_400_000.0,
        ..Default::default()
    };
    let raw = vec![RawSample::new(at(0, 0), 1.0), RawSample::new(at(14, 0), 2.0)];
    let series = SeriesBuilder::from_config(&config).build(&raw);

    assert_eq!(series.points()[1].x, 3.0);
    assert_eq!(series.from_x(2.0), Some(at(7, 0)));
}

#[test]
fn test_permutations_build_identical_series() {
    let base = vec![
        RawSample::new(at(3, 0), 3.0),
        RawSample::new(at(1, 0), 1.0),
        RawSample::new(at(2, 0), 2.0),
        RawSample::new(at(2, 0), 2.5),
    ];
    let builder = SeriesBuilder::new();
    let expected = builder.build(&base);

    let mut reversed = base.clone();
    reversed.reverse();
    assert_eq!(builder.build(&reversed), expected);

    let rotated = vec![base[2], base[3], base[0], base[1]];
    assert_eq!(builder.build(&rotated), expected);
}

#[test]
fn test_loosely_typed_input() {
    let json = r#"[
        {"timestamp": "2023-05-01T00:00:00Z", "value": 4.0},
        {"timestamp": null, "value": 5.0},
        {"timestamp": "2023-05-03T00:00:00Z", "value": null},
        {"timestamp": "2023-05-02T00:00:00Z", "value": 4.5}
    ]"#;
    let raw: Vec<RawSample> = serde_json::from_str(json).unwrap();
    let series = SeriesBuilder::new().build(&raw);

    let values: Vec<f64> = series.samples().iter().map(|s| s.value).collect();
    assert_eq!(values, vec![4.0, 4.5]);
}

#[test]
fn test_malformed_fields_drop_only_their_sample() {
    let json = r#"[
        {"timestamp": "2023-05-01T00:00:00Z", "value": 4.0},
        {"timestamp": 1682985600000, "value": "4.5"},
        {"timestamp": "not-a-date", "value": 9.0},
        {"timestamp": "2023-05-04", "value": "fast"},
        {"timestamp": true, "value": 9.0},
        {"value": 9.0},
        {"timestamp": "2023-05-05T00:00:00Z", "value": [1]},
        {"timestamp": "2023-05-06", "value": 5.0}
    ]"#;
    let raw: Vec<RawSample> = serde_json::from_str(json).unwrap();
    assert_eq!(raw.len(), 8);
    assert_eq!(raw[1].timestamp, Some(at(1, 0)));
    assert!(raw[2].timestamp.is_none());

    let series = SeriesBuilder::new().build(&raw);
    let values: Vec<f64> = series.samples().iter().map(|s| s.value).collect();
    assert_eq!(values, vec![4.0, 4.5, 5.0]);
    assert_eq!(series.samples()[2].timestamp, at(5, 0));
}

#[test]
fn test_best_value() {
    let raw = vec![
        RawSample::new(at(0, 0), 7.0),
        RawSample::new(at(1, 0), 9.0),
        RawSample::new(at(2, 0), 8.0),
    ];
    assert_eq!(SeriesBuilder::new().build(&raw).best_value(), Some(9.0));
}
