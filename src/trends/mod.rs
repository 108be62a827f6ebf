//! Performance trend projection.
//!
//! This module turns a history of dated performance samples into:
//! - A best-fit model (linear, exponential, logarithmic or power)
//! - The date a numeric goal was or will be reached
//! - An estimate of the metric at any future date
//!
//! Every operation is a pure, synchronous function of its inputs.

pub mod analysis;
pub mod cache;
pub mod error;
pub mod extract;
pub mod fitter;
pub mod goal;
pub mod normalizer;
pub mod projector;
pub mod selector;
pub mod series;

// Re-exports for convenience
pub use analysis::{AnalysisOptions, AnalysisRequest, TrendAnalysis, TrendAnalyzer};
pub use cache::{AnalysisCache, CacheStats};
pub use error::{TrendError, TrendResult};
pub use extract::{ActivityRecord, Effort, ExtractOptions, SampleExtractor};
pub use fitter::{CurveFitter, FittedModel, ModelFamily, TrendDirection};
pub use goal::{GoalSolution, GoalSolver, GoalStatus, TrendPoint};
pub use normalizer::Normalizer;
pub use projector::{optimistic_blend, PointProjection, Projector};
pub use selector::select_best;
pub use series::{IndexedPoint, RawSample, Sample, Series, SeriesBuilder};
