//! Series building and time re-indexing.
//!
//! Raw samples arrive loosely typed and in any order. The builder drops
//! unusable samples, sorts the rest and maps time onto a strictly positive
//! axis:
//!
//! ```text
//! x = (timestamp − first_timestamp) / day_length + 1
//! ```
//!
//! The `+ 1` keeps every x at or above 1, which the logarithmic and power
//! fits need.

use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::storage::config::{EngineConfig, DEFAULT_DAY_LENGTH_MS};

/// A possibly incomplete measurement as handed over by the caller.
///
/// Deserialization never fails on a field: timestamps are read from RFC 3339
/// strings, `YYYY-MM-DD` dates or epoch milliseconds, values from numbers or
/// numeric strings, and anything else becomes `None`.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct RawSample {
    /// When the measurement was taken
    #[serde(default, deserialize_with = "deserialize_lenient_timestamp")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Measured (already normalized) value
    #[serde(default, deserialize_with = "deserialize_lenient_number")]
    pub value: Option<f64>,
}

fn deserialize_lenient_timestamp<'de, D>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(n) => millis_to_timestamp(n.as_f64()),
        Value::String(s) => parse_timestamp(s.trim()),
        _ => None,
    })
}

fn deserialize_lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let number = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|v| v.is_finite()))
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()?;
    Some(Utc.from_utc_datetime(&date.and_hms_opt(0, 0, 0)?))
}

fn millis_to_timestamp(ms: Option<f64>) -> Option<DateTime<Utc>> {
    ms.filter(|ms| ms.is_finite())
        .and_then(|ms| Utc.timestamp_millis_opt(ms.round() as i64).single())
}

impl RawSample {
    /// Create a complete raw sample.
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self {
            timestamp: Some(timestamp),
            value: Some(value),
        }
    }

    /// Create from a millisecond epoch timestamp.
    ///
    /// Non-finite or out-of-range timestamps become `None`.
    pub fn from_millis(timestamp_ms: Option<f64>, value: Option<f64>) -> Self {
        Self {
            timestamp: millis_to_timestamp(timestamp_ms),
            value,
        }
    }

    /// Convert into a strict sample, if both fields are present and finite.
    pub fn into_sample(self) -> Option<Sample> {
        match (self.timestamp, self.value) {
            (Some(timestamp), Some(value)) if value.is_finite() => Some(Sample { timestamp, value }),
            _ => None,
        }
    }
}

impl From<Sample> for RawSample {
    fn from(sample: Sample) -> Self {
        Self::new(sample.timestamp, sample.value)
    }
}

/// One observed, normalized measurement.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    /// When the measurement was taken
    pub timestamp: DateTime<Utc>,
    /// Measured value
    pub value: f64,
}

impl Sample {
    /// Create a new sample.
    pub fn new(timestamp: DateTime<Utc>, value: f64) -> Self {
        Self { timestamp, value }
    }
}

/// A sample expressed on the positive, unit-agnostic x axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndexedPoint {
    /// Position on the time axis (always ≥ 1)
    pub x: f64,
    /// Sample value
    pub y: f64,
    /// Original timestamp
    pub ts: DateTime<Utc>,
}

/// Time-ordered samples plus their indexed points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    samples: Vec<Sample>,
    points: Vec<IndexedPoint>,
    day_length_ms: f64,
}

impl Series {
    /// Create an empty series.
    pub fn empty(day_length_ms: f64) -> Self {
        Self {
            samples: Vec::new(),
            points: Vec::new(),
            day_length_ms,
        }
    }

    /// Samples in ascending time order.
    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    /// Indexed points, parallel to [`Series::samples`].
    pub fn points(&self) -> &[IndexedPoint] {
        &self.points
    }

    /// Check if the series is empty.
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Get number of samples.
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Timestamp mapped to x = 1.
    pub fn origin(&self) -> Option<DateTime<Utc>> {
        self.samples.first().map(|s| s.timestamp)
    }

    /// First indexed point.
    pub fn first_point(&self) -> Option<&IndexedPoint> {
        self.points.first()
    }

    /// Last indexed point.
    pub fn last_point(&self) -> Option<&IndexedPoint> {
        self.points.last()
    }

    /// Highest observed value.
    pub fn best_value(&self) -> Option<f64> {
        self.samples.iter().map(|s| s.value).reduce(f64::max)
    }

    /// Map a timestamp onto the x axis of this series.
    pub fn to_x(&self, timestamp: DateTime<Utc>) -> Option<f64> {
        let origin = self.origin()?;
        Some(index_of(origin, timestamp, self.day_length_ms))
    }

    /// Map an x value back to a timestamp (inverse of [`Series::to_x`]).
    ///
    /// Returns `None` for non-finite x or a timestamp chrono cannot represent.
    pub fn from_x(&self, x: f64) -> Option<DateTime<Utc>> {
        let origin = self.origin()?;
        let offset_ms = (x - 1.0) * self.day_length_ms;
        if !offset_ms.is_finite() {
            return None;
        }

        let offset = Duration::try_milliseconds(offset_ms.round() as i64)?;
        origin.checked_add_signed(offset)
    }
}

/// Builds clean, indexed series from raw samples.
#[derive(Debug, Clone, Copy)]
pub struct SeriesBuilder {
    day_length_ms: f64,
}

impl SeriesBuilder {
    /// Create with a one-day x unit.
    pub fn new() -> Self {
        Self {
            day_length_ms: DEFAULT_DAY_LENGTH_MS,
        }
    }

    /// Create from engine configuration.
    pub fn from_config(config: &EngineConfig) -> Self {
        Self {
            day_length_ms: config.day_length_ms,
        }
    }

    /// Build a series from raw samples.
    ///
    /// Samples with a missing timestamp or a missing/non-finite value are
    /// dropped, exact duplicates collapse to one, and ties on timestamp are
    /// ordered by value so the result does not depend on input order.
    pub fn build(&self, raw: &[RawSample]) -> Series {
        let mut samples: Vec<Sample> = raw.iter().filter_map(|r| r.into_sample()).collect();

        if samples.len() < raw.len() {
            tracing::debug!(
                "Dropped {} unusable samples of {}",
                raw.len() - samples.len(),
                raw.len()
            );
        }

        samples.sort_by(|a, b| {
            a.timestamp
                .cmp(&b.timestamp)
                .then_with(|| a.value.total_cmp(&b.value))
        });
        samples.dedup_by(|a, b| a.timestamp == b.timestamp && a.value.to_bits() == b.value.to_bits());

        let Some(origin) = samples.first().map(|s| s.timestamp) else {
            return Series::empty(self.day_length_ms);
        };

        let points = samples
            .iter()
            .map(|s| IndexedPoint {
                x: index_of(origin, s.timestamp, self.day_length_ms),
                y: s.value,
                ts: s.timestamp,
            })
            .collect();

        Series {
            samples,
            points,
            day_length_ms: self.day_length_ms,
        }
    }

    /// Build from already-strict samples.
    pub fn build_from_samples(&self, samples: &[Sample]) -> Series {
        let raw: Vec<RawSample> = samples.iter().copied().map(RawSample::from).collect();
        self.build(&raw)
    }
}

impl Default for SeriesBuilder {
    fn default() -> Self {
        Self::new()
    }
}

fn index_of(origin: DateTime<Utc>, timestamp: DateTime<Utc>, day_length_ms: f64) -> f64 {
    (timestamp - origin).num_milliseconds() as f64 / day_length_ms + 1.0
}
