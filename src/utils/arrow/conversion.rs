//! Arrow utility functions for data type conversions
//!
//! Whole-column conversions used when building feature matrices: every value
//! of a column is materialized as `Option<f64>` or `Option<String>`.

use arrow::array::{Array, ArrayRef, BooleanArray, Float64Array, StringArray};
use arrow::compute::kernels::cast::cast;
use arrow::datatypes::DataType;

use crate::error::Result;
use crate::utils::arrow::array_utils::downcast_array;

/// Check if a data type is numeric
#[must_use]
pub const fn is_numeric(data_type: &DataType) -> bool {
    matches!(
        data_type,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float16
            | DataType::Float32
            | DataType::Float64
            | DataType::Decimal128(_, _)
            | DataType::Decimal256(_, _)
    )
}

/// Convert a numeric or boolean column into `f64` values
pub fn column_to_f64(array: &ArrayRef, column_name: &str) -> Result<Vec<Option<f64>>> {
    if let DataType::Boolean = array.data_type() {
        let bools = downcast_array::<BooleanArray>(array, column_name, "Boolean")?;
        return Ok(bools
            .iter()
            .map(|value| value.map(|b| if b { 1.0 } else { 0.0 }))
            .collect());
    }

    let converted = cast(array, &DataType::Float64)?;
    let floats = downcast_array::<Float64Array>(&converted, column_name, "Float64")?;
    Ok(floats.iter().collect())
}

/// Convert any castable column into string values
pub fn column_to_strings(array: &ArrayRef, column_name: &str) -> Result<Vec<Option<String>>> {
    let converted = cast(array, &DataType::Utf8)?;
    let strings = downcast_array::<StringArray>(&converted, column_name, "String")?;
    Ok(strings
        .iter()
        .map(|value| value.map(ToString::to_string))
        .collect())
}
