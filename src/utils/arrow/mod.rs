//! Arrow data handling utilities
//!
//! Column lookup, downcasting and whole-column conversions for record batches.

pub mod array_utils;
pub mod conversion;

// Re-export commonly used functions for convenience
pub use array_utils::{combine_batches, downcast_array, get_column, get_column_index};
pub use conversion::{column_to_f64, column_to_strings, is_numeric};
