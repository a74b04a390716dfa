//! Display-oriented views over the annotated reading sequence.
//!
//! The dashboard that renders consumption charts is an external
//! collaborator; this crate computes the data it reads — an inclusive
//! date-range filter, the overlay point sets (normal usage, anomalies),
//! the upper threshold series, and a plain-text summary. Nothing here
//! renders or holds UI state.

use chrono::NaiveDateTime;
use meterwatch_core::AnnotatedReading;
use serde::Serialize;
use std::fmt;

/// One point of an overlay or threshold series.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ChartPoint {
    pub timestamp: NaiveDateTime,
    pub value: f64,
}

/// Filters readings to an inclusive timestamp range. Either bound may be
/// omitted to leave that side open.
#[must_use]
pub fn filter_range(
    readings: &[AnnotatedReading],
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Vec<AnnotatedReading> {
    readings
        .iter()
        .filter(|annotated| {
            let timestamp = annotated.reading.timestamp;
            start.is_none_or(|bound| timestamp >= bound)
                && end.is_none_or(|bound| timestamp <= bound)
        })
        .cloned()
        .collect()
}

/// Points for the "normal usage" overlay: non-zero consumption at or below
/// two rolling deviations above the rolling mean.
#[must_use]
pub fn normal_usage_points(readings: &[AnnotatedReading]) -> Vec<ChartPoint> {
    readings
        .iter()
        .filter(|annotated| annotated.is_normal_usage())
        .map(|annotated| ChartPoint {
            timestamp: annotated.reading.timestamp,
            value: annotated.reading.consumption,
        })
        .collect()
}

/// Points for the anomaly overlay, which the dashboard always shows.
#[must_use]
pub fn anomaly_points(readings: &[AnnotatedReading]) -> Vec<ChartPoint> {
    readings
        .iter()
        .filter(|annotated| annotated.is_anomaly)
        .map(|annotated| ChartPoint {
            timestamp: annotated.reading.timestamp,
            value: annotated.reading.consumption,
        })
        .collect()
}

/// The upper threshold line at three rolling deviations above the rolling
/// mean, one point per reading.
#[must_use]
pub fn upper_threshold_series(readings: &[AnnotatedReading]) -> Vec<ChartPoint> {
    readings
        .iter()
        .map(|annotated| ChartPoint {
            timestamp: annotated.reading.timestamp,
            value: annotated.upper_threshold(3.0),
        })
        .collect()
}

/// Headline numbers for a batch of annotated readings.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub records: usize,
    pub first_timestamp: Option<NaiveDateTime>,
    pub last_timestamp: Option<NaiveDateTime>,
    pub anomalies: usize,
    pub normal_usage: usize,
    pub idle: usize,
}

impl Summary {
    #[must_use]
    pub fn from_readings(readings: &[AnnotatedReading]) -> Self {
        Self {
            records: readings.len(),
            first_timestamp: readings.first().map(|r| r.reading.timestamp),
            last_timestamp: readings.last().map(|r| r.reading.timestamp),
            anomalies: readings.iter().filter(|r| r.is_anomaly).count(),
            normal_usage: readings.iter().filter(|r| r.is_normal_usage()).count(),
            idle: readings.iter().filter(|r| r.reading.is_idle()).count(),
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let format_bound = |bound: Option<NaiveDateTime>| {
            bound
                .map(|timestamp| timestamp.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "n/a".to_string())
        };
        writeln!(f, "records:      {}", self.records)?;
        writeln!(f, "from:         {}", format_bound(self.first_timestamp))?;
        writeln!(f, "to:           {}", format_bound(self.last_timestamp))?;
        writeln!(f, "anomalies:    {}", self.anomalies)?;
        writeln!(f, "normal usage: {}", self.normal_usage)?;
        write!(f, "idle:         {}", self.idle)
    }
}
