//! Integration tests for the full trend analysis pipeline.
//!
//! Tests the end-to-end flow:
//! 1. Build a series from raw samples
//! 2. Fit and select a model
//! 3. Solve for the goal
//! 4. Generate the trend curve and point projections

use chrono::{DateTime, Duration, TimeZone, Utc};
use trendcast::trends::{
    AnalysisOptions, GoalStatus, ModelFamily, RawSample, TrendAnalyzer,
};

fn day(n: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
}

fn raw(values: &[(i64, f64)]) -> Vec<RawSample> {
    values.iter().map(|&(d, v)| RawSample::new(day(d), v)).collect()
}

fn analyze(values: &[(i64, f64)], goal: f64) -> trendcast::TrendAnalysis {
    TrendAnalyzer::default()
        .analyze(&raw(values), goal, &AnalysisOptions::default())
        .expect("finite goal")
}

#[test]
fn test_exact_linear_recovery() {
    // y = 2 + 3x with x = day + 1
    let values: Vec<(i64, f64)> = (0..6).map(|d| (d, 2.0 + 3.0 * (d + 1) as f64)).collect();
    let analysis = analyze(&values, 100.0);
    let model = analysis.model.expect("model");

    assert_eq!(model.family, ModelFamily::Linear);
    assert!((model.a() - 2.0).abs() < 1e-9);
    assert!((model.b() - 3.0).abs() < 1e-9);
    assert!((analysis.r2.unwrap() - 1.0).abs() < 1e-12);
}

#[test]
fn test_reached_precedence() {
    let analysis = analyze(&[(0, 5.0), (7, 12.0)], 10.0);

    assert_eq!(analysis.status, GoalStatus::Reached);
    assert_eq!(analysis.goal_date, Some(day(7)));
    let point = analysis.goal_point.unwrap();
    assert_eq!(point.timestamp, day(7));
    assert_eq!(point.value, 12.0);
}

#[test]
fn test_input_order_does_not_matter() {
    let values = [(0, 9.0), (12, 9.1), (30, 9.5), (45, 9.55), (60, 9.8)];
    let mut shuffled = values.to_vec();
    shuffled.swap(0, 4);
    shuffled.swap(1, 3);

    let a = analyze(&values, 11.0);
    let b = analyze(&shuffled, 11.0);
    assert_eq!(a, b);
}

#[test]
fn test_empty_series_degrades_gracefully() {
    let analysis = analyze(&[], 10.0);

    assert_eq!(analysis.status, GoalStatus::None);
    assert!(analysis.trend_curve_points.is_empty());
    assert!(analysis.goal_point.is_none());
    assert!(analysis.sorted_samples.is_empty());
    assert!(analysis.candidates.is_empty());
    assert!(analysis.predict_at(day(5)).is_none());
}

#[test]
fn test_single_sample_has_no_projection() {
    let analysis = analyze(&[(0, 8.0)], 10.0);

    assert_eq!(analysis.status, GoalStatus::None);
    assert_eq!(analysis.candidates.len(), 1);
    assert_eq!(analysis.trend_curve_points.len(), 1);
    assert_eq!(analysis.summary(), "No projection");
}

#[test]
fn test_same_timestamp_samples() {
    let analysis = analyze(&[(3, 8.0), (3, 9.0)], 10.0);

    assert_eq!(analysis.status, GoalStatus::None);
    let model = analysis.model.unwrap();
    assert_eq!(model.family, ModelFamily::Linear);
    assert_eq!(model.b(), 0.0);
}

#[test]
fn test_samples_seconds_apart_still_project() {
    let raw = vec![
        RawSample::new(day(0), 5.0),
        RawSample::new(day(0) + Duration::seconds(1), 6.0),
    ];
    let analysis = TrendAnalyzer::default()
        .analyze(&raw, 7.0, &AnalysisOptions::default())
        .expect("finite goal");

    assert!(analysis.candidates.len() >= 3);
    assert!(analysis.model.expect("model").b() > 0.0);
    assert_eq!(analysis.status, GoalStatus::Projected);

    let date = analysis.goal_date.expect("goal date");
    assert!(date > day(0) + Duration::seconds(1));
    assert!(date <= day(0) + Duration::seconds(3));
}

#[test]
fn test_receding_trend_never_projects() {
    let analysis = analyze(&[(0, 10.0), (10, 9.2), (20, 8.9), (30, 8.1)], 12.0);

    assert!(analysis.candidates.iter().all(|m| m.b() < 0.0));
    assert_eq!(analysis.status, GoalStatus::None);
    assert!(analysis.goal_date.is_none());
    // The curve still covers the observed history.
    assert!(!analysis.trend_curve_points.is_empty());
}

#[test]
fn test_negative_values_skip_log_space_models() {
    let analysis = analyze(&[(0, -3.0), (5, -1.0), (10, 1.0)], 4.0);
    let families: Vec<ModelFamily> = analysis.candidates.iter().map(|m| m.family).collect();

    assert_eq!(families, vec![ModelFamily::Linear, ModelFamily::Logarithmic]);
    assert_eq!(analysis.status, GoalStatus::Projected);
}

#[test]
fn test_linear_round_trip_is_exact() {
    let values: Vec<(i64, f64)> = (0..5).map(|d| (d * 7, 20.0 + 0.5 * d as f64)).collect();
    let analysis = analyze(&values, 30.0);

    for &(d, v) in &values {
        let predicted = analysis.predict_at(day(d)).unwrap();
        assert!((predicted - v).abs() < 1e-9);
    }
}

#[test]
fn test_regression_round_trip_is_approximate() {
    let values = [(0, 9.0), (30, 9.5), (60, 9.8)];
    let analysis = analyze(&values, 11.4);
    assert!(analysis.r2.unwrap() < 1.0);

    let predicted = analysis.predict_at(day(30)).unwrap();
    assert!((predicted - 9.5).abs() > 1e-6);
    assert!((predicted - 9.5).abs() < 0.2);
}

#[test]
fn test_diminishing_returns_scenario() {
    let values = [(0, 9.0), (30, 9.5), (60, 9.8)];
    let analysis = analyze(&values, 11.4);

    assert_eq!(analysis.candidates.len(), 4);
    let best_r2 = analysis
        .candidates
        .iter()
        .map(|m| m.r2)
        .fold(f64::NEG_INFINITY, f64::max);
    let selected = analysis.model.unwrap();
    assert_eq!(selected.r2, best_r2);

    assert_eq!(analysis.status, GoalStatus::Projected);
    let goal_date = analysis.goal_date.unwrap();
    assert!(goal_date > day(60));
    assert!(analysis.summary().starts_with("Projected: "));

    // The curve runs from the first sample to the projected goal.
    let first = analysis.trend_curve_points.first().unwrap();
    let last = analysis.trend_curve_points.last().unwrap();
    assert_eq!(first.timestamp, day(0));
    assert_eq!(last.timestamp, goal_date);
    assert!((last.value - 11.4).abs() < 1e-6);
}

#[test]
fn test_point_projection_blends_below_best() {
    let analysis = TrendAnalyzer::default()
        .analyze(
            &raw(&[(0, 12.0), (10, 10.0), (20, 8.0)]),
            15.0,
            &AnalysisOptions::projecting_at(day(30)),
        )
        .unwrap();

    let projection = analysis.projection.unwrap();
    assert!(projection.raw_value < 12.0);
    assert!(projection.blended);
    assert!((projection.value - (projection.raw_value + 12.0) / 2.0).abs() < 1e-12);
}

#[test]
fn test_projection_before_first_sample() {
    let analysis = analyze(&[(10, 1.0), (20, 2.0)], 5.0);
    assert!(analysis.project_at(day(0)).is_none());
}

#[test]
fn test_analysis_serializes_for_charting() {
    let analysis = analyze(&[(0, 9.0), (30, 9.5), (60, 9.8)], 11.4);
    let json = serde_json::to_value(&analysis).unwrap();

    assert_eq!(json["status"], "projected");
    assert!(json["trend_curve_points"].as_array().unwrap().len() > 1);
    assert!(json.get("series").is_none());
}
