//! Integration test modules.

mod trend_analysis_test;
