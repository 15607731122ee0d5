//! Feature construction for the ranking run
//!
//! Sales and review tables are inner-joined on the shop identifier and the
//! joined table is flattened into a numeric [`FeatureMatrix`]:
//!
//! - numeric columns are cast to `f64`, booleans become `0.0`/`1.0`;
//! - text columns are one-hot encoded as `{column}_{value}`, one indicator per
//!   distinct value in lexicographic order, appended after the numeric columns;
//! - the identifier, the sales total and the configured excluded columns are
//!   left out, the sales total becoming the label vector.

use std::borrow::Cow;
use std::collections::BTreeSet;
use std::sync::Arc;

use arrow::array::{ArrayRef, StringArray, UInt64Array};
use arrow::compute::take;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use rustc_hash::{FxHashMap, FxHashSet};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{FeatureMatrix, ShopFeatures};
use crate::utils::arrow::{column_to_f64, column_to_strings, get_column, is_numeric};
use crate::utils::normalize::normalize_shop_id;

/// Suffix for a non-key column that exists in both tables, sales side
pub const LEFT_SUFFIX: &str = "_x";
/// Suffix for a non-key column that exists in both tables, review side
pub const RIGHT_SUFFIX: &str = "_y";

/// Column roles in the sales and review tables
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableColumns {
    /// Shop identifier, the join key
    pub shop_id: String,
    /// Sales total, used as the label
    pub sales_total: String,
    /// Columns never used as features
    pub excluded: Vec<String>,
}

impl Default for TableColumns {
    fn default() -> Self {
        Self {
            shop_id: "Shop_ID".to_string(),
            sales_total: "Total_Sales_Amount".to_string(),
            excluded: vec![
                "Month".to_string(),
                "Review Text".to_string(),
                "Review ID".to_string(),
            ],
        }
    }
}

impl TableColumns {
    /// Whether a joined column feeds the feature matrix
    ///
    /// Roles are matched on the name without its join suffix, so `Month_x`
    /// and `Month_y` are excluded whenever `Month` is.
    #[must_use]
    pub fn is_feature(&self, column: &str) -> bool {
        let base = base_name(column);
        base != self.shop_id
            && base != self.sales_total
            && !self.excluded.iter().any(|excluded| excluded == base)
    }

    /// Name of the label column in a joined table
    ///
    /// A sales total present in both tables is taken from the sales side.
    fn label_column<'a>(&'a self, joined: &RecordBatch) -> Cow<'a, str> {
        let schema = joined.schema();
        if schema.index_of(&self.sales_total).is_ok() {
            Cow::Borrowed(self.sales_total.as_str())
        } else {
            Cow::Owned(format!("{}{LEFT_SUFFIX}", self.sales_total))
        }
    }
}

/// Column name with any join suffix removed
fn base_name(column: &str) -> &str {
    column
        .strip_suffix(LEFT_SUFFIX)
        .or_else(|| column.strip_suffix(RIGHT_SUFFIX))
        .unwrap_or(column)
}

/// Join sales and reviews and encode the result
///
/// # Errors
/// Returns [`Error::EmptyJoin`] if no shop appears in both tables, or a data
/// source error if a required column is missing
pub fn build_features(
    sales: &RecordBatch,
    reviews: &RecordBatch,
    columns: &TableColumns,
) -> Result<ShopFeatures> {
    let joined = inner_join(sales, reviews, &columns.shop_id)?;
    let features = encode_features(&joined, columns)?;
    log::info!(
        "Built {} feature rows with {} columns from {} sales and {} review rows",
        features.len(),
        features.features.num_columns(),
        sales.num_rows(),
        reviews.num_rows()
    );
    Ok(features)
}

/// Inner join on a normalized key column
///
/// Every left row is paired, in order, with every right row carrying the same
/// key. The result holds the normalized key column at its left position, the
/// remaining left columns and then the remaining right columns. Non-key names
/// present on both sides get [`LEFT_SUFFIX`] and [`RIGHT_SUFFIX`]. Rows with a
/// null key never match.
///
/// # Errors
/// Returns [`Error::EmptyJoin`] if no row pairs up
pub fn inner_join(left: &RecordBatch, right: &RecordBatch, key: &str) -> Result<RecordBatch> {
    let left_keys = normalized_keys(left, key)?;
    let right_keys = normalized_keys(right, key)?;

    let mut right_rows_by_key: FxHashMap<&str, Vec<u64>> = FxHashMap::default();
    for (row, shop_id) in right_keys.iter().enumerate() {
        if let Some(shop_id) = shop_id {
            right_rows_by_key
                .entry(shop_id.as_str())
                .or_default()
                .push(row as u64);
        }
    }

    let mut joined_keys = Vec::new();
    let mut left_rows = Vec::new();
    let mut right_rows = Vec::new();
    for (row, shop_id) in left_keys.iter().enumerate() {
        let Some(shop_id) = shop_id else { continue };
        if let Some(matches) = right_rows_by_key.get(shop_id.as_str()) {
            for &right_row in matches {
                joined_keys.push(shop_id.as_str());
                left_rows.push(row as u64);
                right_rows.push(right_row);
            }
        }
    }

    if joined_keys.is_empty() {
        return Err(Error::EmptyJoin {
            key: key.to_string(),
        });
    }

    let left_schema = left.schema();
    let right_schema = right.schema();
    let left_names: FxHashSet<&str> = left_schema
        .fields()
        .iter()
        .map(|field| field.name().as_str())
        .filter(|name| *name != key)
        .collect();
    let shared: FxHashSet<&str> = right_schema
        .fields()
        .iter()
        .map(|field| field.name().as_str())
        .filter(|name| left_names.contains(name))
        .collect();
    let output_name = |name: &str, suffix: &str| {
        if shared.contains(name) {
            format!("{name}{suffix}")
        } else {
            name.to_string()
        }
    };

    let left_indices = UInt64Array::from(left_rows);
    let right_indices = UInt64Array::from(right_rows);
    let mut fields = Vec::with_capacity(left.num_columns() + right.num_columns());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(fields.capacity());

    for (field, column) in left_schema.fields().iter().zip(left.columns()) {
        if field.name() == key {
            fields.push(Field::new(key, DataType::Utf8, false));
            arrays.push(Arc::new(StringArray::from(joined_keys.clone())));
        } else {
            fields.push(Field::new(
                output_name(field.name(), LEFT_SUFFIX),
                field.data_type().clone(),
                true,
            ));
            arrays.push(take(column.as_ref(), &left_indices, None)?);
        }
    }
    for (field, column) in right_schema.fields().iter().zip(right.columns()) {
        if field.name() == key {
            continue;
        }
        fields.push(Field::new(
            output_name(field.name(), RIGHT_SUFFIX),
            field.data_type().clone(),
            true,
        ));
        arrays.push(take(column.as_ref(), &right_indices, None)?);
    }

    log::debug!(
        "Joined {} x {} rows on '{key}' into {} rows",
        left.num_rows(),
        right.num_rows(),
        joined_keys.len()
    );
    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}

fn normalized_keys(batch: &RecordBatch, key: &str) -> Result<Vec<Option<String>>> {
    let column = get_column(batch, key)?;
    Ok(column_to_strings(&column, key)?
        .into_iter()
        .map(|value| value.map(|shop_id| normalize_shop_id(&shop_id)))
        .collect())
}

/// Encode a joined table into shop identifiers, features and labels
///
/// # Errors
/// Returns an error if the identifier or sales total column is missing, or if
/// a column cannot be converted
pub fn encode_features(joined: &RecordBatch, columns: &TableColumns) -> Result<ShopFeatures> {
    let shop_ids = column_to_strings(&get_column(joined, &columns.shop_id)?, &columns.shop_id)?
        .into_iter()
        .map(Option::unwrap_or_default)
        .collect();
    let label = columns.label_column(joined);
    let labels = fill_nulls(column_to_f64(&get_column(joined, &label)?, &label)?, &label);

    let schema = joined.schema();
    let mut numeric: Vec<(String, Vec<f64>)> = Vec::new();
    let mut encoded: Vec<(String, Vec<f64>)> = Vec::new();

    for (field, array) in schema.fields().iter().zip(joined.columns()) {
        let name = field.name();
        if !columns.is_feature(name) {
            continue;
        }
        let data_type = field.data_type();
        if is_numeric(data_type) || *data_type == DataType::Boolean {
            numeric.push((name.clone(), fill_nulls(column_to_f64(array, name)?, name)));
        } else {
            encoded.extend(one_hot(array, name)?);
        }
    }

    let (names, values): (Vec<String>, Vec<Vec<f64>>) = numeric.into_iter().chain(encoded).unzip();
    let rows = joined.num_rows();
    let mut row_major = Vec::with_capacity(rows * names.len());
    for row in 0..rows {
        row_major.extend(values.iter().map(|column| column[row]));
    }

    Ok(ShopFeatures {
        shop_ids,
        features: FeatureMatrix::new(names, rows, row_major)?,
        labels,
    })
}

fn fill_nulls(values: Vec<Option<f64>>, column: &str) -> Vec<f64> {
    let nulls = values.iter().filter(|value| value.is_none()).count();
    if nulls > 0 {
        log::warn!("Column '{column}' has {nulls} missing values; using 0.0");
    }
    values.into_iter().map(|value| value.unwrap_or(0.0)).collect()
}

/// Indicator columns for every distinct value of a column
fn one_hot(array: &ArrayRef, column: &str) -> Result<Vec<(String, Vec<f64>)>> {
    let values = column_to_strings(array, column)?;
    let categories: BTreeSet<&str> = values.iter().flatten().map(String::as_str).collect();

    Ok(categories
        .into_iter()
        .map(|category| {
            let indicator = values
                .iter()
                .map(|value| {
                    if value.as_deref() == Some(category) {
                        1.0
                    } else {
                        0.0
                    }
                })
                .collect();
            (format!("{column}_{category}"), indicator)
        })
        .collect())
}
