//! Sample extraction from activity records.
//!
//! Turns logged sessions into one normalized sample per session: ignored
//! sessions and other routines are skipped, every effort is normalized to the
//! target distance, implausible rates are discarded and the session's best
//! remaining rate becomes its sample.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::normalizer::Normalizer;
use super::series::RawSample;
use crate::storage::config::EngineConfig;

/// A single effort within a session.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Effort {
    /// Observed rate (speed, reps per minute, ...)
    pub rate: Option<f64>,
    /// Distance or volume the rate was held over
    pub distance: Option<f64>,
}

impl Effort {
    pub fn new(rate: f64, distance: f64) -> Self {
        Self {
            rate: Some(rate),
            distance: Some(distance),
        }
    }
}

/// A logged training session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActivityRecord {
    /// When the session took place
    pub timestamp: DateTime<Utc>,
    /// Routine the session belongs to
    pub routine: String,
    /// Excluded from analysis by the user
    #[serde(default)]
    pub ignore: bool,
    /// Efforts recorded in the session
    #[serde(default)]
    pub efforts: Vec<Effort>,
}

/// Extraction filters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ExtractOptions {
    /// Only use sessions of this routine
    pub routine: Option<String>,
    /// Distance every rate is normalized to
    pub target_distance: Option<f64>,
    /// Keep only sessions that set a new best
    pub personal_bests_only: bool,
}

/// Extracts normalized samples from activity records.
#[derive(Debug, Clone, Copy)]
pub struct SampleExtractor {
    normalizer: Normalizer,
    max_plausible_rate: Option<f64>,
}

impl SampleExtractor {
    /// Create from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            normalizer: Normalizer::from_config(config),
            max_plausible_rate: config.max_plausible_rate,
        }
    }

    /// Extract one sample per usable session.
    pub fn extract(&self, records: &[ActivityRecord], options: &ExtractOptions) -> Vec<RawSample> {
        let mut samples: Vec<RawSample> = records
            .iter()
            .filter(|r| !r.ignore)
            .filter(|r| options.routine.as_ref().map_or(true, |name| &r.routine == name))
            .filter_map(|r| {
                let best = self.session_best(r, options.target_distance)?;
                Some(RawSample::new(r.timestamp, best))
            })
            .collect();

        if options.personal_bests_only {
            samples = personal_bests(samples);
        }

        samples
    }

    /// Best normalized, plausible rate of a session.
    fn session_best(&self, record: &ActivityRecord, target_distance: Option<f64>) -> Option<f64> {
        record
            .efforts
            .iter()
            .filter_map(|effort| {
                let rate = effort.rate.filter(|r| r.is_finite() && *r > 0.0)?;
                Some(self.normalizer.normalize(rate, effort.distance, target_distance))
            })
            .filter(|rate| self.is_plausible(*rate))
            .reduce(f64::max)
    }

    fn is_plausible(&self, rate: f64) -> bool {
        self.max_plausible_rate.map_or(true, |max| rate <= max)
    }
}

impl Default for SampleExtractor {
    fn default() -> Self {
        Self::from_config(&EngineConfig::default())
    }
}

/// Keep samples that strictly beat every earlier one.
fn personal_bests(mut samples: Vec<RawSample>) -> Vec<RawSample> {
    samples.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));

    let mut best = f64::NEG_INFINITY;
    samples.retain(|s| match s.value {
        Some(value) if value > best => {
            best = value;
            true
        }
        _ => false,
    });
    samples
}
