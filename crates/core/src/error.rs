use thiserror::Error;

/// Errors raised by the meter pipeline.
///
/// Both variants are raised synchronously at the point of failure; a
/// malformed batch is rejected wholesale rather than partially processed.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// A raw timestamp could not be interpreted under the day-first convention.
    #[error("unparseable day-first timestamp: {value:?}")]
    Timestamp {
        /// The offending raw timestamp text.
        value: String,
    },

    /// Anomaly detection was invoked on an empty batch.
    #[error("cannot detect anomalies over an empty batch")]
    InsufficientData,
}
