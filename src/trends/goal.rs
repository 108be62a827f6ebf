//! Goal solving.
//!
//! Actual history always wins: if any sample already meets the goal, the
//! first such sample is the answer. Otherwise the selected model is inverted
//! algebraically for the x at which it reaches the goal, and the result is
//! mapped back onto the calendar.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::fitter::{FittedModel, ModelFamily, TrendDirection};
use super::series::Series;

/// Whether and how the goal is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalStatus {
    /// An actual sample already meets the goal
    Reached,
    /// The model reaches the goal at a future date
    Projected,
    /// No data, or the trend never reaches the goal
    None,
}

impl GoalStatus {
    pub fn label(&self) -> &'static str {
        match self {
            GoalStatus::Reached => "Reached",
            GoalStatus::Projected => "Projected",
            GoalStatus::None => "None",
        }
    }
}

impl std::fmt::Display for GoalStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// A dated value, used for goal markers and trend curves.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    /// Point in time
    pub timestamp: DateTime<Utc>,
    /// Metric value
    pub value: f64,
}

/// Outcome of solving for a goal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GoalSolution {
    pub status: GoalStatus,
    /// Goal marker (the reaching sample, or the projected goal)
    pub point: Option<TrendPoint>,
    /// Position of the marker on the series x axis
    pub x: Option<f64>,
}

impl GoalSolution {
    fn none() -> Self {
        Self {
            status: GoalStatus::None,
            point: None,
            x: None,
        }
    }
}

/// Decides whether and when a target value is reached.
#[derive(Debug, Clone, Copy, Default)]
pub struct GoalSolver;

impl GoalSolver {
    pub fn new() -> Self {
        Self
    }

    /// Solve for `goal` against the series and its selected model.
    pub fn solve(&self, series: &Series, model: Option<&FittedModel>, goal: f64) -> GoalSolution {
        if let Some(solution) = self.reached(series, goal) {
            return solution;
        }

        let Some(model) = model else {
            return GoalSolution::none();
        };

        self.project(series, model, goal)
            .unwrap_or_else(GoalSolution::none)
    }

    /// First sample (in time order) whose value meets the goal.
    fn reached(&self, series: &Series, goal: f64) -> Option<GoalSolution> {
        let point = series.points().iter().find(|p| p.y >= goal)?;
        Some(GoalSolution {
            status: GoalStatus::Reached,
            point: Some(TrendPoint {
                timestamp: point.ts,
                value: point.y,
            }),
            x: Some(point.x),
        })
    }

    fn project(&self, series: &Series, model: &FittedModel, goal: f64) -> Option<GoalSolution> {
        let last = series.last_point()?;
        if !approaches_goal(model, last.x, goal) {
            tracing::debug!("{} trend is moving away from goal {}", model.family, goal);
            return None;
        }

        // The goal is at or ahead of the last prediction, so any x below the
        // last sample is inversion round-off.
        let x = invert(model, goal)?.max(last.x);
        if x <= 0.0 {
            return None;
        }

        let timestamp = series.from_x(x)?;
        Some(GoalSolution {
            status: GoalStatus::Projected,
            point: Some(TrendPoint {
                timestamp,
                value: goal,
            }),
            x: Some(x),
        })
    }
}

/// Check that the model is heading towards the goal from its latest value.
fn approaches_goal(model: &FittedModel, last_x: f64, goal: f64) -> bool {
    let latest = model.predict(last_x);
    if !latest.is_finite() {
        return false;
    }

    match model.direction() {
        TrendDirection::Rising => goal >= latest,
        TrendDirection::Falling => goal <= latest,
        TrendDirection::Flat => false,
    }
}

/// Solve `model(x) = goal` for x.
///
/// Returns `None` whenever the inversion is undefined for the parameters.
pub fn invert(model: &FittedModel, goal: f64) -> Option<f64> {
    let [a, b] = model.params;
    if b == 0.0 {
        return None;
    }

    let x = match model.family {
        ModelFamily::Linear => (goal - a) / b,
        ModelFamily::Exponential => {
            if a <= 0.0 || goal <= 0.0 {
                return None;
            }
            (goal / a).ln() / b
        }
        ModelFamily::Logarithmic => ((goal - a) / b).exp(),
        ModelFamily::Power => {
            if a <= 0.0 || goal <= 0.0 {
                return None;
            }
            (goal / a).powf(1.0 / b)
        }
    };

    x.is_finite().then_some(x)
}
