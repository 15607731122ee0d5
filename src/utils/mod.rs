//! Utility modules
//!
//! Arrow helpers, date and shop identifier normalization, output writers,
//! logging and test support.

pub mod arrow;
pub mod dates;
pub mod io;
pub mod logging;
pub mod normalize;
pub mod test;

pub use dates::{DateFormatConfig, parse_order_date};
pub use io::{read_tracking_log, write_table, write_tracking_log};
pub use logging::{log_operation_complete, log_operation_start, log_warning};
pub use normalize::{ShopNameMapping, normalize_shop_id};
