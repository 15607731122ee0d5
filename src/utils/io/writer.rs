//! Table and tracking log writers

use std::path::Path;
use std::time::Instant;

use arrow::csv::WriterBuilder;
use arrow::record_batch::RecordBatch;
use parquet::arrow::ArrowWriter;

use crate::error::Result;
use crate::error::util::safe_create_file;
use crate::loader::{TableFormat, read_table};
use crate::models::TrackingLog;
use crate::utils::arrow::combine_batches;
use crate::utils::logging::{log_operation_complete, log_operation_start};

/// Timestamp layout used in CSV output
pub const CSV_TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Write one record batch in the format implied by the extension
///
/// # Errors
/// Returns an error for an unsupported extension or if writing fails
pub fn write_table(path: &Path, batch: &RecordBatch) -> Result<()> {
    let format = TableFormat::from_path(path)?;
    let start = Instant::now();
    log_operation_start("Writing table", path);

    let file = safe_create_file(path, "writing table")?;
    match format {
        TableFormat::Csv => {
            let mut writer = WriterBuilder::new()
                .with_header(true)
                .with_timestamp_format(CSV_TIMESTAMP_FORMAT.to_string())
                .build(file);
            writer.write(batch)?;
        }
        TableFormat::Parquet => {
            let mut writer = ArrowWriter::try_new(file, batch.schema(), None)?;
            writer.write(batch)?;
            writer.close()?;
        }
    }

    log_operation_complete("wrote", path, 1, Some(start.elapsed()));
    Ok(())
}

/// Write a tracking log with columns `Timestamp`, `Status`, `Order Type`
pub fn write_tracking_log(path: &Path, log: &TrackingLog) -> Result<()> {
    write_table(path, &log.to_record_batch()?)?;
    log::info!("Tracking log with {} events saved to {}", log.len(), path.display());
    Ok(())
}

/// Read a tracking log written by [`write_tracking_log`]
pub fn read_tracking_log(path: &Path) -> Result<TrackingLog> {
    let batches = read_table(path)?;
    match combine_batches(&batches)? {
        Some(batch) => TrackingLog::from_record_batch(&batch),
        None => Ok(TrackingLog::new()),
    }
}
