//! Raw-batch normalization: day-first timestamp parsing, chronological
//! ordering, duplicate removal, and derived per-reading features.

use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use meterwatch_core::{NormalizedReading, PipelineError, RawReading};

/// Accepted day-first date-time layouts, tried in order.
const DATETIME_FORMATS: &[&str] = &[
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
    "%d-%m-%Y %H:%M:%S",
    "%d-%m-%Y %H:%M",
];

/// Accepted day-first date-only layouts; the time defaults to midnight.
const DATE_FORMATS: &[&str] = &["%d/%m/%Y", "%d-%m-%Y"];

/// Parses a meter timestamp under the day-first convention, so
/// `03/02/2024` is February 3rd, not March 2nd.
///
/// # Errors
///
/// Returns `PipelineError::Timestamp` if no accepted layout matches.
pub fn parse_timestamp(value: &str) -> Result<NaiveDateTime, PipelineError> {
    let trimmed = value.trim();

    for format in DATETIME_FORMATS {
        if let Ok(timestamp) = NaiveDateTime::parse_from_str(trimmed, format) {
            return Ok(timestamp);
        }
    }
    for format in DATE_FORMATS {
        if let Ok(date) = NaiveDate::parse_from_str(trimmed, format) {
            return Ok(date.and_time(NaiveTime::MIN));
        }
    }

    Err(PipelineError::Timestamp {
        value: value.to_string(),
    })
}

/// Normalizes one raw batch into a strictly time-ordered, deduplicated
/// sequence of feature-annotated readings.
///
/// The batch is sorted by parsed timestamp (stable, so equal timestamps
/// keep their input order), exact `(timestamp, consumption)` duplicates are
/// dropped keeping the first post-sort occurrence, and missing consumption
/// values are coerced to zero before any feature is computed.
///
/// # Errors
///
/// Returns `PipelineError::Timestamp` for the first raw timestamp that
/// cannot be parsed; the batch is rejected wholesale.
#[allow(clippy::float_cmp)] // duplicate removal and zero-run detection are exact comparisons
pub fn normalize(raw: &[RawReading]) -> Result<Vec<NormalizedReading>, PipelineError> {
    let mut parsed: Vec<(NaiveDateTime, f64)> = Vec::with_capacity(raw.len());
    for reading in raw {
        let timestamp = parse_timestamp(&reading.timestamp)?;
        // Missing (and non-finite) consumption counts as zero.
        let consumption = reading
            .consumption
            .filter(|value| value.is_finite())
            .unwrap_or(0.0);
        parsed.push((timestamp, consumption));
    }

    parsed.sort_by_key(|(timestamp, _)| *timestamp);

    // Equal timestamps are adjacent after the sort, so scanning back over
    // the current timestamp group is enough to spot exact duplicates.
    let mut deduped: Vec<(NaiveDateTime, f64)> = Vec::with_capacity(parsed.len());
    for (timestamp, consumption) in parsed {
        let duplicate = deduped
            .iter()
            .rev()
            .take_while(|(kept, _)| *kept == timestamp)
            .any(|(_, kept_consumption)| *kept_consumption == consumption);
        if !duplicate {
            deduped.push((timestamp, consumption));
        }
    }

    let mut normalized = Vec::with_capacity(deduped.len());
    let mut previous: Option<f64> = None;
    let mut zero_run: u32 = 0;
    for (timestamp, consumption) in deduped {
        // Run counter: resets on every non-zero reading, so the zero right
        // after a non-zero reading has count 1.
        zero_run = if consumption == 0.0 { zero_run + 1 } else { 0 };

        normalized.push(NormalizedReading {
            timestamp,
            consumption,
            hour: timestamp.hour(),
            day_of_week: timestamp.weekday().num_days_from_monday(),
            consumption_change: previous.map(|prior| consumption - prior),
            consecutive_zeros: zero_run,
        });
        previous = Some(consumption);
    }

    tracing::debug!(
        raw = raw.len(),
        normalized = normalized.len(),
        "normalized meter batch"
    );
    Ok(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hourly_timestamp(offset_hours: i64) -> String {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();
        (start + chrono::Duration::hours(offset_hours))
            .format("%d/%m/%Y %H:%M:%S")
            .to_string()
    }

    fn hourly_batch(values: &[f64]) -> Vec<RawReading> {
        values
            .iter()
            .enumerate()
            .map(|(i, &value)| RawReading::new(hourly_timestamp(i as i64), Some(value)))
            .collect()
    }

    // ============================================
    // Timestamp Parsing Tests
    // ============================================

    #[test]
    fn parses_day_first_datetime() {
        let parsed = parse_timestamp("03/02/2024 10:30").unwrap();
        assert_eq!(parsed.month(), 2);
        assert_eq!(parsed.day(), 3);
        assert_eq!(parsed.hour(), 10);
        assert_eq!(parsed.minute(), 30);
    }

    #[test]
    fn parses_day_first_datetime_with_seconds_and_dashes() {
        let parsed = parse_timestamp("25-12-2023 23:59:59").unwrap();
        assert_eq!(parsed.month(), 12);
        assert_eq!(parsed.day(), 25);
        assert_eq!(parsed.second(), 59);
    }

    #[test]
    fn parses_date_only_as_midnight() {
        let parsed = parse_timestamp("03/02/2024").unwrap();
        assert_eq!(parsed.hour(), 0);
        assert_eq!(parsed.minute(), 0);
    }

    #[test]
    fn rejects_month_first_iso_layout() {
        let result = parse_timestamp("2024-02-03T10:00:00");
        assert!(matches!(
            result,
            Err(PipelineError::Timestamp { ref value }) if value == "2024-02-03T10:00:00"
        ));
    }

    #[test]
    fn rejects_impossible_day_first_date() {
        // Valid month-first, impossible day-first: there is no month 13.
        assert!(parse_timestamp("13/13/2024 00:00").is_err());
    }

    // ============================================
    // Ordering and Deduplication Tests
    // ============================================

    #[test]
    fn sorts_out_of_order_batch_chronologically() {
        let raw = vec![
            RawReading::new(hourly_timestamp(2), Some(3.0)),
            RawReading::new(hourly_timestamp(0), Some(1.0)),
            RawReading::new(hourly_timestamp(1), Some(2.0)),
        ];

        let normalized = normalize(&raw).unwrap();

        let consumptions: Vec<f64> = normalized.iter().map(|r| r.consumption).collect();
        assert_eq!(consumptions, vec![1.0, 2.0, 3.0]);
        for pair in normalized.windows(2) {
            assert!(pair[0].timestamp <= pair[1].timestamp);
        }
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let raw = vec![
            RawReading::new(hourly_timestamp(0), Some(5.0)),
            RawReading::new(hourly_timestamp(0), Some(7.0)),
        ];

        let normalized = normalize(&raw).unwrap();

        assert_eq!(normalized.len(), 2);
        assert!((normalized[0].consumption - 5.0).abs() < f64::EPSILON);
        assert!((normalized[1].consumption - 7.0).abs() < f64::EPSILON);
    }

    #[test]
    fn removes_exact_duplicates_keeping_one() {
        let raw = vec![
            RawReading::new(hourly_timestamp(0), Some(5.0)),
            RawReading::new(hourly_timestamp(0), Some(7.0)),
            RawReading::new(hourly_timestamp(0), Some(5.0)),
            RawReading::new(hourly_timestamp(1), Some(5.0)),
        ];

        let normalized = normalize(&raw).unwrap();

        // The second (t0, 5.0) is an exact duplicate; (t0, 7.0) and the
        // later (t1, 5.0) are not.
        assert_eq!(normalized.len(), 3);
        assert!((normalized[0].consumption - 5.0).abs() < f64::EPSILON);
        assert!((normalized[1].consumption - 7.0).abs() < f64::EPSILON);
    }

    // ============================================
    // Derived Feature Tests
    // ============================================

    #[test]
    fn missing_consumption_becomes_zero() {
        let raw = vec![
            RawReading::new(hourly_timestamp(0), Some(5.0)),
            RawReading::new(hourly_timestamp(1), None),
        ];

        let normalized = normalize(&raw).unwrap();

        assert!(normalized[1].consumption.abs() < f64::EPSILON);
        assert_eq!(normalized[1].consecutive_zeros, 1);
    }

    #[test]
    fn hour_and_day_of_week_come_from_the_timestamp() {
        // 2024-01-01 was a Monday.
        let raw = vec![RawReading::new("01/01/2024 15:00", Some(1.0))];

        let normalized = normalize(&raw).unwrap();

        assert_eq!(normalized[0].hour, 15);
        assert_eq!(normalized[0].day_of_week, 0);
    }

    #[test]
    fn first_reading_has_no_consumption_change() {
        let normalized = normalize(&hourly_batch(&[4.0, 6.0, 1.0])).unwrap();

        assert_eq!(normalized[0].consumption_change, None);
        assert_eq!(normalized[1].consumption_change, Some(2.0));
        assert_eq!(normalized[2].consumption_change, Some(-5.0));
    }

    #[test]
    fn consumption_change_follows_chronological_order_not_input_order() {
        let raw = vec![
            RawReading::new(hourly_timestamp(1), Some(9.0)),
            RawReading::new(hourly_timestamp(0), Some(4.0)),
        ];

        let normalized = normalize(&raw).unwrap();

        assert_eq!(normalized[0].consumption_change, None);
        assert_eq!(normalized[1].consumption_change, Some(5.0));
    }

    #[test]
    fn consecutive_zeros_run_length_scan() {
        let normalized = normalize(&hourly_batch(&[0.0, 0.0, 5.0, 0.0, 0.0, 0.0, 7.0])).unwrap();

        let runs: Vec<u32> = normalized.iter().map(|r| r.consecutive_zeros).collect();
        assert_eq!(runs, vec![1, 2, 0, 1, 2, 3, 0]);
    }

    #[test]
    fn normalization_is_idempotent() {
        let raw = vec![
            RawReading::new(hourly_timestamp(3), Some(2.0)),
            RawReading::new(hourly_timestamp(0), None),
            RawReading::new(hourly_timestamp(1), Some(0.0)),
            RawReading::new(hourly_timestamp(1), Some(0.0)),
            RawReading::new(hourly_timestamp(2), Some(8.0)),
        ];

        let first = normalize(&raw).unwrap();

        // Feed the normalized sequence back through as raw readings.
        let round_trip: Vec<RawReading> = first
            .iter()
            .map(|r| {
                RawReading::new(
                    r.timestamp.format("%d/%m/%Y %H:%M:%S").to_string(),
                    Some(r.consumption),
                )
            })
            .collect();
        let second = normalize(&round_trip).unwrap();

        assert_eq!(second, first);
    }

    #[test]
    fn empty_batch_normalizes_to_empty() {
        assert!(normalize(&[]).unwrap().is_empty());
    }
}
