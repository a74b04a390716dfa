mod analyze;

pub use analyze::{run_analyze, AnalyzeArgs};
