//! Meter reading types at each stage of the pipeline.
//!
//! A batch moves one way through the pipeline: `RawReading` (as ingested)
//! becomes `NormalizedReading` (parsed, ordered, feature-annotated) and
//! finally `AnnotatedReading` (rolling statistics plus the anomaly flag).
//! Every value is owned by the pipeline run that produced it; nothing is
//! shared or mutated after creation.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// One raw record from a meter consumption log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawReading {
    /// Timestamp text in a day-first format, e.g. `03/02/2024 10:00`.
    /// May arrive out of order or duplicated within the batch.
    pub timestamp: String,
    /// Metered consumption for the interval. `None` when the field was
    /// missing from the log; the normalizer coerces it to zero.
    pub consumption: Option<f64>,
}

impl RawReading {
    /// Creates a raw reading from timestamp text and an optional consumption.
    #[must_use]
    pub fn new(timestamp: impl Into<String>, consumption: Option<f64>) -> Self {
        Self {
            timestamp: timestamp.into(),
            consumption,
        }
    }
}

/// A reading after normalization: canonical timestamp plus derived features.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedReading {
    /// Canonical timestamp parsed under the day-first convention.
    pub timestamp: NaiveDateTime,
    /// Consumption with missing values already coerced to zero.
    pub consumption: f64,
    /// Hour of day, 0-23.
    pub hour: u32,
    /// Day of week, Monday = 0.
    pub day_of_week: u32,
    /// Backward first difference of consumption in chronological order.
    /// `None` for the first reading of the sequence, which has no
    /// predecessor; consumers must not read that as a zero change.
    pub consumption_change: Option<f64>,
    /// Length of the unbroken run of zero readings ending at this record.
    /// Resets to 0 on every non-zero reading, so the zero immediately
    /// after a non-zero reading has count 1.
    pub consecutive_zeros: u32,
}

impl NormalizedReading {
    /// Returns true if this reading recorded no consumption.
    #[must_use]
    pub fn is_idle(&self) -> bool {
        self.consumption == 0.0
    }
}

/// A normalized reading annotated with rolling statistics and the
/// classification result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedReading {
    #[serde(flatten)]
    pub reading: NormalizedReading,
    /// Mean consumption over the centered rolling window.
    pub rolling_mean: f64,
    /// Sample standard deviation of consumption over the centered window.
    pub rolling_std: f64,
    /// True when the reading was classified as anomalous.
    pub is_anomaly: bool,
}

impl AnnotatedReading {
    /// Upper display threshold at the given deviation factor, e.g.
    /// `upper_threshold(3.0)` for the usual anomaly threshold line.
    #[must_use]
    pub fn upper_threshold(&self, factor: f64) -> f64 {
        self.rolling_mean + factor * self.rolling_std
    }

    /// Returns true if this reading counts as normal usage for display:
    /// non-zero consumption at or below two rolling deviations above the
    /// rolling mean.
    #[must_use]
    pub fn is_normal_usage(&self) -> bool {
        self.reading.consumption > 0.0 && self.reading.consumption <= self.upper_threshold(2.0)
    }
}
