use anyhow::{Context, Result};
use csv::{StringRecord, Writer};
use meterwatch_core::{AnnotatedReading, RawReading};
use std::fs::File;
use std::path::Path;

/// Header names recognized for the timestamp column.
const TIMESTAMP_HEADERS: &[&str] = &["made_at", "timestamp", "time"];

/// Header names recognized for the consumption column.
const CONSUMPTION_HEADERS: &[&str] = &["consumption", "usage", "value"];

/// Timestamp layout used for exported rows; round-trips through the
/// pipeline's day-first parser.
const EXPORT_TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

fn find_column(headers: &StringRecord, names: &[&str], fallback: usize) -> usize {
    headers
        .iter()
        .position(|header| {
            names
                .iter()
                .any(|name| header.trim().eq_ignore_ascii_case(name))
        })
        .unwrap_or(fallback)
}

/// Reads a raw meter log from a headered CSV file.
///
/// The timestamp column is matched by name (`made_at`, `timestamp`, `time`)
/// and left as text for the normalizer to parse; the consumption column
/// (`consumption`, `usage`, `value`) is parsed as a number, with an empty
/// field becoming a missing value. Unrecognized headers fall back to the
/// first two columns.
///
/// # Errors
///
/// Returns an error if the file cannot be opened, a row is malformed, or a
/// non-empty consumption field is not numeric.
pub fn read_raw_csv(path: impl AsRef<Path>) -> Result<Vec<RawReading>> {
    let path = path.as_ref();
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("failed to open meter log {}", path.display()))?;

    let headers = reader
        .headers()
        .with_context(|| format!("failed to read header row of {}", path.display()))?
        .clone();
    let timestamp_column = find_column(&headers, TIMESTAMP_HEADERS, 0);
    let consumption_column = find_column(&headers, CONSUMPTION_HEADERS, 1);

    let mut readings = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("malformed CSV row {}", row + 2))?;

        let timestamp = record.get(timestamp_column).unwrap_or("").to_string();
        let consumption = match record.get(consumption_column).map(str::trim) {
            None | Some("") => None,
            Some(field) => Some(field.parse::<f64>().with_context(|| {
                format!("non-numeric consumption {field:?} at row {}", row + 2)
            })?),
        };
        readings.push(RawReading::new(timestamp, consumption));
    }

    tracing::debug!(path = %path.display(), records = readings.len(), "read meter log");
    Ok(readings)
}

/// Writes an annotated batch to CSV.
///
/// Format: `made_at,consumption,hour,day_of_week,consumption_change,consecutive_zeros,rolling_mean,rolling_std,is_anomaly`.
/// A first reading with no predecessor writes an empty `consumption_change`
/// field rather than a zero.
///
/// # Errors
///
/// Returns an error if the file cannot be created or writing fails.
pub fn write_annotated_csv(path: impl AsRef<Path>, readings: &[AnnotatedReading]) -> Result<()> {
    let path = path.as_ref();
    let file = File::create(path)
        .with_context(|| format!("failed to create output file {}", path.display()))?;
    let mut writer = Writer::from_writer(file);

    writer.write_record([
        "made_at",
        "consumption",
        "hour",
        "day_of_week",
        "consumption_change",
        "consecutive_zeros",
        "rolling_mean",
        "rolling_std",
        "is_anomaly",
    ])?;

    for annotated in readings {
        let reading = &annotated.reading;
        writer.write_record(&[
            reading
                .timestamp
                .format(EXPORT_TIMESTAMP_FORMAT)
                .to_string(),
            reading.consumption.to_string(),
            reading.hour.to_string(),
            reading.day_of_week.to_string(),
            reading
                .consumption_change
                .map(|change| change.to_string())
                .unwrap_or_default(),
            reading.consecutive_zeros.to_string(),
            annotated.rolling_mean.to_string(),
            annotated.rolling_std.to_string(),
            annotated.is_anomaly.to_string(),
        ])?;
    }

    writer.flush()?;
    tracing::debug!(path = %path.display(), records = readings.len(), "wrote annotated log");
    Ok(())
}
