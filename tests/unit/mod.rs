//! Unit test modules.

mod config_test;
mod series_test;
