//! End-to-end trend analysis.
//!
//! Raw samples flow one way through the engine:
//!
//! ```text
//! raw samples → SeriesBuilder → CurveFitter → select_best → GoalSolver
//!                                                         → Projector
//! ```
//!
//! Every call builds everything from scratch; nothing is retained between
//! analyses.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::error::{TrendError, TrendResult};
use super::fitter::{CurveFitter, FittedModel};
use super::goal::{GoalSolver, GoalStatus, TrendPoint};
use super::projector::{PointProjection, Projector};
use super::selector::select_best;
use super::series::{RawSample, Sample, Series, SeriesBuilder};
use crate::storage::config::EngineConfig;

/// Optional extras for a single analysis.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct AnalysisOptions {
    /// Also project the metric at this date
    pub project_at: Option<DateTime<Utc>>,
}

impl AnalysisOptions {
    pub fn projecting_at(timestamp: DateTime<Utc>) -> Self {
        Self {
            project_at: Some(timestamp),
        }
    }
}

/// One independent analysis in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRequest {
    pub samples: Vec<RawSample>,
    pub goal: f64,
    #[serde(default)]
    pub options: AnalysisOptions,
}

/// Result of analysing one metric against one goal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendAnalysis {
    /// Samples used, in time order
    pub sorted_samples: Vec<Sample>,
    /// Renderable trend line of the selected model
    pub trend_curve_points: Vec<TrendPoint>,
    /// Target value analysed against
    pub goal: f64,
    /// Goal marker: the reaching sample, or the projected goal
    pub goal_point: Option<TrendPoint>,
    /// Date the goal was (or is projected to be) reached
    pub goal_date: Option<DateTime<Utc>>,
    /// Selected model
    pub model: Option<FittedModel>,
    /// Every model that fitted, in fitting order
    pub candidates: Vec<FittedModel>,
    /// Display label of the selected model
    pub model_label: String,
    /// R² of the selected model
    pub r2: Option<f64>,
    pub status: GoalStatus,
    /// Point-in-time projection, when one was requested
    pub projection: Option<PointProjection>,
    #[serde(skip)]
    series: Series,
    #[serde(skip)]
    projector: Projector,
}

impl TrendAnalysis {
    /// Time-ordered series the analysis was computed from.
    pub fn series(&self) -> &Series {
        &self.series
    }

    /// Raw model value at an arbitrary date.
    pub fn predict_at(&self, timestamp: DateTime<Utc>) -> Option<f64> {
        let model = self.model.as_ref()?;
        self.projector.predict_at(&self.series, model, timestamp)
    }

    /// Blended projection at an arbitrary date.
    pub fn project_at(&self, timestamp: DateTime<Utc>) -> Option<PointProjection> {
        let model = self.model.as_ref()?;
        self.projector.project_at(&self.series, model, timestamp)
    }

    /// One-line summary for display.
    pub fn summary(&self) -> String {
        match (self.status, self.goal_date) {
            (GoalStatus::Reached, Some(date)) => {
                format!("Goal reached: {}", date.format("%Y-%m-%d"))
            }
            (GoalStatus::Projected, Some(date)) => {
                format!("Projected: {}", date.format("%Y-%m-%d"))
            }
            _ => "No projection".to_string(),
        }
    }
}

impl std::fmt::Display for TrendAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.summary())
    }
}

/// Runs the full fitting and projection pipeline.
#[derive(Debug, Clone)]
pub struct TrendAnalyzer {
    config: EngineConfig,
    builder: SeriesBuilder,
    fitter: CurveFitter,
    solver: GoalSolver,
    projector: Projector,
}

impl TrendAnalyzer {
    /// Create an analyzer, validating the configuration.
    pub fn new(config: EngineConfig) -> TrendResult<Self> {
        config.validate()?;
        Ok(Self {
            builder: SeriesBuilder::from_config(&config),
            fitter: CurveFitter::new(),
            solver: GoalSolver::new(),
            projector: Projector::from_config(&config),
            config,
        })
    }

    /// Configuration in use.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Analyse raw samples against a goal.
    ///
    /// Only a non-finite goal is rejected; sparse or degenerate data degrades
    /// to fewer models or a `None` status.
    pub fn analyze(
        &self,
        samples: &[RawSample],
        goal: f64,
        options: &AnalysisOptions,
    ) -> TrendResult<TrendAnalysis> {
        if !goal.is_finite() {
            return Err(TrendError::InvalidInput(format!(
                "goal must be a finite number, got {}",
                goal
            )));
        }

        let series = self.builder.build(samples);
        let candidates = self.fitter.fit_all(series.points());
        let model = select_best(&candidates);
        let solution = self.solver.solve(&series, model.as_ref(), goal);

        let trend_curve_points = model
            .as_ref()
            .map(|m| self.projector.trend_curve(&series, m, solution.x))
            .unwrap_or_default();

        let projection = match (options.project_at, model.as_ref()) {
            (Some(timestamp), Some(m)) => self.projector.project_at(&series, m, timestamp),
            _ => None,
        };

        tracing::debug!(
            "Analysed {} samples: model={}, status={}",
            series.len(),
            model.map_or("none", |m| m.family.label()),
            solution.status
        );

        Ok(TrendAnalysis {
            sorted_samples: series.samples().to_vec(),
            trend_curve_points,
            goal,
            goal_point: solution.point,
            goal_date: solution.point.map(|p| p.timestamp),
            model_label: model.map_or_else(|| "No model".to_string(), |m| m.label()),
            r2: model.map(|m| m.r2),
            model,
            candidates,
            status: solution.status,
            projection,
            series,
            projector: self.projector,
        })
    }

    /// Analyse strict samples against a goal.
    pub fn analyze_samples(
        &self,
        samples: &[Sample],
        goal: f64,
        options: &AnalysisOptions,
    ) -> TrendResult<TrendAnalysis> {
        let raw: Vec<RawSample> = samples.iter().copied().map(RawSample::from).collect();
        self.analyze(&raw, goal, options)
    }

    /// Run independent analyses in parallel.
    ///
    /// Results are returned in request order.
    pub fn analyze_batch(&self, requests: &[AnalysisRequest]) -> Vec<TrendResult<TrendAnalysis>> {
        requests
            .par_iter()
            .map(|request| self.analyze(&request.samples, request.goal, &request.options))
            .collect()
    }
}

impl Default for TrendAnalyzer {
    fn default() -> Self {
        let config = EngineConfig::default();
        Self {
            builder: SeriesBuilder::from_config(&config),
            fitter: CurveFitter::new(),
            solver: GoalSolver::new(),
            projector: Projector::from_config(&config),
            config,
        }
    }
}
