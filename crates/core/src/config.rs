//! Detection thresholds and window sizing.

/// Configuration for the anomaly detector.
#[derive(Debug, Clone)]
pub struct DetectorConfig {
    /// Number of records in the centered rolling-statistics window.
    pub window_size: usize,
    /// Multiple of the baseline standard deviation a reading must exceed
    /// the baseline mean by before it is considered a spike.
    pub deviation_factor: f64,
    /// A spike preceded by at least this many consecutive zero readings is
    /// treated as a resumption-of-service artifact and not flagged.
    pub idle_run_limit: u32,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            window_size: 72,      // 3 days of hourly readings
            deviation_factor: 3.0,
            idle_run_limit: 3,
        }
    }
}

impl DetectorConfig {
    /// Sets the rolling window size (minimum 1).
    #[must_use]
    pub fn with_window_size(mut self, window_size: usize) -> Self {
        self.window_size = window_size.max(1);
        self
    }

    /// Sets the baseline deviation factor.
    #[must_use]
    pub fn with_deviation_factor(mut self, factor: f64) -> Self {
        self.deviation_factor = factor.abs();
        self
    }

    /// Sets the idle-run length at which spikes are suppressed.
    #[must_use]
    pub fn with_idle_run_limit(mut self, limit: u32) -> Self {
        self.idle_run_limit = limit;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_default_values() {
        let config = DetectorConfig::default();

        assert_eq!(config.window_size, 72);
        assert!((config.deviation_factor - 3.0).abs() < f64::EPSILON);
        assert_eq!(config.idle_run_limit, 3);
    }

    #[test]
    fn builder_methods_override_defaults() {
        let config = DetectorConfig::default()
            .with_window_size(24)
            .with_deviation_factor(2.5)
            .with_idle_run_limit(5);

        assert_eq!(config.window_size, 24);
        assert!((config.deviation_factor - 2.5).abs() < f64::EPSILON);
        assert_eq!(config.idle_run_limit, 5);
    }

    #[test]
    fn window_size_is_floored_at_one() {
        let config = DetectorConfig::default().with_window_size(0);
        assert_eq!(config.window_size, 1);
    }

    #[test]
    fn deviation_factor_takes_absolute_value() {
        let config = DetectorConfig::default().with_deviation_factor(-2.0);
        assert!((config.deviation_factor - 2.0).abs() < f64::EPSILON);
    }
}
