//! Trendcast - Workout Performance Trend Projection
//!
//! Fits long-term performance history (sprint speed, pull-up count, ...) to
//! a best-fit model, projects when a numeric goal will be reached and
//! estimates the metric at any future date.

pub mod storage;
pub mod trends;

// Re-export commonly used types
pub use storage::config::EngineConfig;
pub use trends::{AnalysisCache, GoalStatus, RawSample, TrendAnalysis, TrendAnalyzer};
