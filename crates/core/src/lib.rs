pub mod config;
pub mod error;
pub mod reading;

pub use config::DetectorConfig;
pub use error::PipelineError;
pub use reading::{AnnotatedReading, NormalizedReading, RawReading};
