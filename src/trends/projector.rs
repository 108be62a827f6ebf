//! Trend curve generation and point-in-time projection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fitter::FittedModel;
use super::goal::TrendPoint;
use super::series::Series;
use crate::storage::config::{EngineConfig, DEFAULT_CURVE_POINTS};

/// A model value at a requested date.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PointProjection {
    /// Requested date
    pub timestamp: DateTime<Utc>,
    /// Raw model prediction
    pub raw_value: f64,
    /// Value to report, after the optimistic blend
    pub value: f64,
    /// Whether the blend changed the raw prediction
    pub blended: bool,
}

/// Evaluates a selected model over a series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projector {
    curve_points: usize,
}

impl Projector {
    /// Create with the default curve resolution.
    pub fn new() -> Self {
        Self {
            curve_points: DEFAULT_CURVE_POINTS,
        }
    }

    /// Create from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            curve_points: config.curve_points,
        }
    }

    /// Evenly spaced model evaluations from the first sample to the later of
    /// the last sample and `goal_x`.
    ///
    /// Non-finite evaluations are skipped.
    pub fn trend_curve(
        &self,
        series: &Series,
        model: &FittedModel,
        goal_x: Option<f64>,
    ) -> Vec<TrendPoint> {
        let (Some(first), Some(last)) = (series.first_point(), series.last_point()) else {
            return Vec::new();
        };

        let start = first.x;
        let end = goal_x
            .filter(|x| x.is_finite())
            .map_or(last.x, |x| x.max(last.x));
        let span = end - start;

        let xs: Vec<f64> = if span > 0.0 && self.curve_points >= 2 {
            let last_step = self.curve_points - 1;
            (0..self.curve_points)
                .map(|i| {
                    if i == last_step {
                        end
                    } else {
                        start + span * i as f64 / last_step as f64
                    }
                })
                .collect()
        } else {
            vec![start]
        };

        xs.into_iter()
            .filter_map(|x| {
                let value = model.predict(x);
                if !value.is_finite() {
                    return None;
                }
                let timestamp = series.from_x(x)?;
                Some(TrendPoint { timestamp, value })
            })
            .collect()
    }

    /// Raw model value at `timestamp`.
    ///
    /// Returns `None` before the axis origin (x ≤ 0), for an empty series, or
    /// when the model does not produce a finite value.
    pub fn predict_at(
        &self,
        series: &Series,
        model: &FittedModel,
        timestamp: DateTime<Utc>,
    ) -> Option<f64> {
        let x = series.to_x(timestamp)?;
        if x <= 0.0 {
            return None;
        }

        let value = model.predict(x);
        value.is_finite().then_some(value)
    }

    /// Projected value at `timestamp`, with the optimistic blend applied
    /// against the best observed value.
    pub fn project_at(
        &self,
        series: &Series,
        model: &FittedModel,
        timestamp: DateTime<Utc>,
    ) -> Option<PointProjection> {
        let raw_value = self.predict_at(series, model, timestamp)?;
        let value = series
            .best_value()
            .map_or(raw_value, |best| optimistic_blend(raw_value, best));

        Some(PointProjection {
            timestamp,
            raw_value,
            value,
            blended: value != raw_value,
        })
    }
}

impl Default for Projector {
    fn default() -> Self {
        Self::new()
    }
}

/// Optimistic blend heuristic.
///
/// A projection below the best value ever observed is reported as the
/// midpoint between the two, rather than showing a drop below a known
/// personal best.
pub fn optimistic_blend(projected: f64, best_observed: f64) -> f64 {
    if projected < best_observed {
        (projected + best_observed) / 2.0
    } else {
        projected
    }
}
