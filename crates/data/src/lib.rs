//! Ingestion collaborator for the meter pipeline: reads raw consumption
//! logs from CSV and exports annotated results back to CSV. The pipeline
//! itself performs no I/O; this crate owns the file boundary.

pub mod csv_log;

pub use csv_log::{read_raw_csv, write_annotated_csv};
