//! Test helper functions

use std::io::Write;
use std::path::Path;

use chrono::{NaiveDate, NaiveDateTime};

use crate::error::Result;
use crate::error::util::safe_create_file;

/// Midnight of the given day, `None` for an invalid date
#[must_use]
pub fn datetime(year: i32, month: u32, day: u32) -> Option<NaiveDateTime> {
    NaiveDate::from_ymd_opt(year, month, day)?.and_hms_opt(0, 0, 0)
}

/// Write text to a file, creating parent directories
pub fn write_text(path: &Path, content: &str) -> Result<()> {
    let mut file = safe_create_file(path, "writing test fixture")?;
    file.write_all(content.as_bytes())?;
    Ok(())
}
