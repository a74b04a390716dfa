//! Preprocessing and anomaly-detection pipeline for utility-meter logs.
//!
//! Two batch transforms evaluated in sequence: the normalizer parses and
//! canonicalizes raw readings into a strictly time-ordered, deduplicated
//! sequence with derived features, and the detector computes rolling
//! baseline statistics and flags abnormal readings. Both are deterministic
//! pure functions of their input batch; no state survives a run.

pub mod detector;
pub mod normalizer;
pub mod rolling;

pub use detector::{detect, Baseline};
pub use normalizer::{normalize, parse_timestamp};
pub use rolling::{centered_stats, RollingStats};

use meterwatch_core::{AnnotatedReading, DetectorConfig, PipelineError, RawReading};

/// Runs the full pipeline over one raw batch: normalization followed by
/// anomaly detection.
///
/// # Errors
///
/// Returns `PipelineError::Timestamp` if any raw timestamp cannot be parsed
/// under the day-first convention, or `PipelineError::InsufficientData` if
/// the batch is empty.
pub fn run(
    raw: &[RawReading],
    config: &DetectorConfig,
) -> Result<Vec<AnnotatedReading>, PipelineError> {
    let normalized = normalizer::normalize(raw)?;
    detector::detect(normalized, config)
}
