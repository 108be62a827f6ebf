//! Distance-fatigue normalization.
//!
//! A rate observed over a short effort is not comparable with one held over a
//! long effort: fatigue accumulates with distance. Rates are scaled to a common
//! target distance with a Riegel-style power law:
//!
//! ```text
//! normalized = observed × (observed_distance / target_distance) ^ (k − 1)
//! ```
//!
//! With k > 1, a rate held over a longer distance than the target is scaled
//! up, and one held over a shorter distance is scaled down.

use crate::storage::config::{EngineConfig, DEFAULT_FATIGUE_EXPONENT};

/// Riegel-style rate normalizer.
#[derive(Debug, Clone, Copy)]
pub struct Normalizer {
    /// Fatigue exponent `k`.
    fatigue_exponent: f64,
}

impl Normalizer {
    /// Create with the default exponent (1.06).
    pub fn new() -> Self {
        Self {
            fatigue_exponent: DEFAULT_FATIGUE_EXPONENT,
        }
    }

    /// Create with a custom fatigue exponent.
    pub fn with_exponent(fatigue_exponent: f64) -> Self {
        Self { fatigue_exponent }
    }

    /// Create from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self::with_exponent(config.fatigue_exponent)
    }

    /// Fatigue exponent in use.
    pub fn fatigue_exponent(&self) -> f64 {
        self.fatigue_exponent
    }

    /// Normalize an observed rate to the target distance.
    ///
    /// Returns `observed_rate` unchanged whenever normalization is not
    /// possible: a missing or non-positive distance, or any non-finite input
    /// or result.
    pub fn normalize(
        &self,
        observed_rate: f64,
        observed_distance: Option<f64>,
        target_distance: Option<f64>,
    ) -> f64 {
        let (Some(observed), Some(target)) = (observed_distance, target_distance) else {
            return observed_rate;
        };

        if !observed_rate.is_finite() || !self.fatigue_exponent.is_finite() {
            return observed_rate;
        }

        if !is_positive(observed) || !is_positive(target) {
            return observed_rate;
        }

        let scaled = observed_rate * (observed / target).powf(self.fatigue_exponent - 1.0);
        if scaled.is_finite() {
            scaled
        } else {
            observed_rate
        }
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

fn is_positive(value: f64) -> bool {
    value.is_finite() && value > 0.0
}
