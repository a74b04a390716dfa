//! The analyze command: meter log in, anomaly report out.

use anyhow::{Context, Result};
use chrono::{Duration, NaiveDateTime};
use clap::Args;
use meterwatch_core::DetectorConfig;
use meterwatch_pipeline::parse_timestamp;
use meterwatch_report::{anomaly_points, normal_usage_points, Summary};

/// Arguments for the analyze command.
#[derive(Args, Debug, Clone)]
pub struct AnalyzeArgs {
    /// Input CSV meter log (columns: made_at, consumption)
    #[arg(short, long)]
    pub input: String,

    /// Write the annotated readings to this CSV file
    #[arg(short, long)]
    pub output: Option<String>,

    /// Rolling window size in records
    #[arg(long, default_value_t = 72)]
    pub window_size: usize,

    /// Report start bound, day-first (e.g. "01/02/2024" or "01/02/2024 08:00")
    #[arg(long)]
    pub start: Option<String>,

    /// Report end bound, day-first; a date-only bound covers the whole day
    #[arg(long)]
    pub end: Option<String>,

    /// Print the filtered annotated readings as JSON lines instead of a summary
    #[arg(long)]
    pub json: bool,

    /// List normal-usage readings alongside the anomalies
    #[arg(long)]
    pub show_pattern: bool,
}

fn parse_start_bound(value: &str) -> Result<NaiveDateTime> {
    parse_timestamp(value).with_context(|| format!("invalid --start bound {value:?}"))
}

fn parse_end_bound(value: &str) -> Result<NaiveDateTime> {
    let parsed = parse_timestamp(value).with_context(|| format!("invalid --end bound {value:?}"))?;
    if value.contains(':') {
        Ok(parsed)
    } else {
        // Date-only bound: include the whole end day.
        Ok(parsed + Duration::days(1) - Duration::seconds(1))
    }
}

/// Runs the analyze command.
///
/// # Errors
///
/// Returns an error on unreadable input, unparseable timestamps or range
/// bounds, an empty batch, or a failed export.
pub fn run_analyze(args: AnalyzeArgs) -> Result<()> {
    let raw = meterwatch_data::read_raw_csv(&args.input)?;
    tracing::info!(input = %args.input, records = raw.len(), "loaded meter log");

    let config = DetectorConfig::default().with_window_size(args.window_size);
    let annotated = meterwatch_pipeline::run(&raw, &config)
        .with_context(|| format!("analysis of {} failed", args.input))?;

    if let Some(output) = &args.output {
        meterwatch_data::write_annotated_csv(output, &annotated)?;
        tracing::info!(output = %output, "wrote annotated readings");
    }

    let start = args.start.as_deref().map(parse_start_bound).transpose()?;
    let end = args.end.as_deref().map(parse_end_bound).transpose()?;
    let filtered = meterwatch_report::filter_range(&annotated, start, end);

    if args.json {
        for reading in &filtered {
            println!("{}", serde_json::to_string(reading)?);
        }
        return Ok(());
    }

    println!("{}", Summary::from_readings(&filtered));

    let anomalies = anomaly_points(&filtered);
    if !anomalies.is_empty() {
        println!("\nanomalous readings:");
        for point in &anomalies {
            println!(
                "  {}  {:.3}",
                point.timestamp.format("%Y-%m-%d %H:%M:%S"),
                point.value
            );
        }
    }

    if args.show_pattern {
        let normal = normal_usage_points(&filtered);
        println!("\nnormal usage readings: {}", normal.len());
    }

    Ok(())
}
