//! IO utilities for run outputs
//!
//! Record batches are written as CSV or Parquet depending on the file
//! extension, mirroring how input tables are read.

pub mod writer;

pub use writer::{read_tracking_log, write_table, write_tracking_log};
