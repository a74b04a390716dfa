//! Anomaly classification over the normalized sequence.
//!
//! The detector computes an idle-excluded global baseline, centered rolling
//! statistics for display, and flags readings that deviate extremely from
//! the baseline. Spikes that directly follow a long idle run are treated
//! as resumption-of-service artifacts and suppressed.

use meterwatch_core::{AnnotatedReading, DetectorConfig, NormalizedReading, PipelineError};

use crate::rolling::{centered_stats, mean_of, sample_std};

/// Global consumption baseline computed over non-idle readings only.
///
/// Zero-consumption idle periods are excluded so they cannot depress the
/// anomaly threshold. Undefined (no `Baseline` at all) when the batch has
/// fewer than two positive readings, since the sample standard deviation
/// needs at least two observations; with no defined baseline nothing can
/// be flagged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Baseline {
    pub mean: f64,
    pub std: f64,
}

impl Baseline {
    /// Computes the baseline for a normalized batch, if defined.
    #[must_use]
    pub fn from_readings(readings: &[NormalizedReading]) -> Option<Self> {
        let positive: Vec<f64> = readings
            .iter()
            .filter(|reading| reading.consumption > 0.0)
            .map(|reading| reading.consumption)
            .collect();
        if positive.len() < 2 {
            return None;
        }
        Some(Self {
            mean: mean_of(&positive),
            std: sample_std(&positive),
        })
    }

    /// The consumption level a reading must exceed to count as a spike.
    #[must_use]
    pub fn spike_threshold(&self, deviation_factor: f64) -> f64 {
        self.mean + deviation_factor * self.std
    }
}

/// Classifies every reading of a normalized batch, annotating it with
/// centered rolling statistics and an anomaly flag.
///
/// A reading is flagged when it exceeds the baseline spike threshold and
/// the run of zero readings immediately preceding it is shorter than
/// `config.idle_run_limit`. A spike right after a longer idle run is an
/// expected resumption-of-service jump, not an anomaly.
///
/// # Errors
///
/// Returns `PipelineError::InsufficientData` when the batch is empty. Any
/// non-empty batch, including one of all-zero consumption, produces fully
/// defined output.
pub fn detect(
    readings: Vec<NormalizedReading>,
    config: &DetectorConfig,
) -> Result<Vec<AnnotatedReading>, PipelineError> {
    if readings.is_empty() {
        return Err(PipelineError::InsufficientData);
    }

    let baseline = Baseline::from_readings(&readings);
    let spike_threshold = baseline.map(|base| base.spike_threshold(config.deviation_factor));

    let consumption: Vec<f64> = readings.iter().map(|reading| reading.consumption).collect();
    let stats = centered_stats(&consumption, config.window_size);

    // Length of the zero run directly before each reading: the previous
    // reading's run counter, or 0 for the first reading.
    let prior_zeros: Vec<u32> = std::iter::once(0)
        .chain(readings.iter().map(|reading| reading.consecutive_zeros))
        .take(readings.len())
        .collect();

    let mut annotated = Vec::with_capacity(readings.len());
    let mut flagged = 0usize;
    for (i, reading) in readings.into_iter().enumerate() {
        let exceeds = spike_threshold.is_some_and(|threshold| reading.consumption > threshold);
        let after_long_idle = prior_zeros[i] >= config.idle_run_limit;
        if exceeds && after_long_idle {
            tracing::warn!(
                timestamp = %reading.timestamp,
                consumption = reading.consumption,
                idle_run = prior_zeros[i],
                "suppressed spike after idle run"
            );
        }

        let is_anomaly = exceeds && !after_long_idle;
        flagged += usize::from(is_anomaly);
        annotated.push(AnnotatedReading {
            reading,
            rolling_mean: stats.mean[i],
            rolling_std: stats.std[i],
            is_anomaly,
        });
    }

    tracing::debug!(
        records = annotated.len(),
        anomalies = flagged,
        "classified meter batch"
    );
    Ok(annotated)
}
