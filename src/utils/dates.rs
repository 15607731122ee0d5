//! Order date parsing
//!
//! Order sources hand over dates as free-form text. Each configured format is
//! tried in turn; datetime formats first, then date-only formats which map to
//! midnight. Anything that matches no format is treated as a missing date.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// Configuration for date format handling
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DateFormatConfig {
    /// Datetime formats tried before the date-only formats
    pub datetime_formats: Vec<String>,
    /// Date formats; a match is interpreted as midnight
    pub date_formats: Vec<String>,
}

impl Default for DateFormatConfig {
    fn default() -> Self {
        Self {
            datetime_formats: vec![
                "%Y-%m-%d %H:%M:%S".to_string(),    // 2024-01-05 13:45:00
                "%Y-%m-%dT%H:%M:%S".to_string(),    // 2024-01-05T13:45:00
                "%Y-%m-%d %H:%M:%S%.f".to_string(), // 2024-01-05 13:45:00.250
                "%Y-%m-%dT%H:%M:%S%.f".to_string(), // 2024-01-05T13:45:00.250
                "%Y-%m-%d %H:%M".to_string(),       // 2024-01-05 13:45
            ],
            date_formats: vec![
                "%Y-%m-%d".to_string(), // ISO format: 2024-01-05
                "%d-%m-%Y".to_string(), // European: 05-01-2024
                "%m/%d/%Y".to_string(), // US: 01/05/2024
                "%d.%m.%Y".to_string(), // German/Danish: 05.01.2024
                "%Y%m%d".to_string(),   // Compact: 20240105
                "%d %b %Y".to_string(), // 05 Jan 2024
                "%d %B %Y".to_string(), // 05 January 2024
            ],
        }
    }
}

/// Parse an order date, returning `None` for empty or unparseable input
#[must_use]
pub fn parse_order_date(raw: Option<&str>, config: &DateFormatConfig) -> Option<NaiveDateTime> {
    let value = raw.map(str::trim).filter(|v| !v.is_empty())?;

    for format in &config.datetime_formats {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(value, format) {
            return Some(parsed);
        }
    }

    for format in &config.date_formats {
        if let Ok(parsed) = NaiveDate::parse_from_str(value, format) {
            return parsed.and_hms_opt(0, 0, 0);
        }
    }

    log::debug!("Could not parse order date '{value}'");
    None
}
