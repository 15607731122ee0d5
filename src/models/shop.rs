//! Shop models used by the ranking run

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Dense row-major matrix of named numeric features
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    columns: Vec<String>,
    values: Vec<f64>,
    rows: usize,
}

impl FeatureMatrix {
    /// Create a matrix from row-major values
    ///
    /// # Errors
    /// Returns an error if `values` does not hold `rows * columns.len()` entries
    pub fn new(columns: Vec<String>, rows: usize, values: Vec<f64>) -> Result<Self> {
        if values.len() != rows * columns.len() {
            return Err(Error::InvalidInput(format!(
                "Feature matrix expects {} values for {rows} rows x {} columns, got {}",
                rows * columns.len(),
                columns.len(),
                values.len()
            )));
        }
        Ok(Self {
            columns,
            values,
            rows,
        })
    }

    /// Build a matrix from rows of equal width
    pub fn from_rows(columns: Vec<String>, rows: &[Vec<f64>]) -> Result<Self> {
        let width = columns.len();
        if let Some(bad) = rows.iter().position(|row| row.len() != width) {
            return Err(Error::InvalidInput(format!(
                "Row {bad} has {} values, expected {width}",
                rows[bad].len()
            )));
        }
        Self::new(columns, rows.len(), rows.concat())
    }

    /// Feature column names
    #[must_use]
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Number of rows
    #[must_use]
    pub const fn num_rows(&self) -> usize {
        self.rows
    }

    /// Number of feature columns
    #[must_use]
    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }

    /// Values of one row
    ///
    /// # Panics
    /// Panics if `index` is out of bounds
    #[must_use]
    pub fn row(&self, index: usize) -> &[f64] {
        let width = self.columns.len();
        &self.values[index * width..(index + 1) * width]
    }

    /// Iterate over rows
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        (0..self.rows).map(move |index| self.row(index))
    }
}

/// Joined sales and review data, ready for scoring
#[derive(Debug, Clone)]
pub struct ShopFeatures {
    /// Shop identifier of every row
    pub shop_ids: Vec<String>,
    /// Feature values, one row per joined record
    pub features: FeatureMatrix,
    /// Sales total of every row, kept out of the features
    pub labels: Vec<f64>,
}

impl ShopFeatures {
    /// Number of joined rows
    #[must_use]
    pub fn len(&self) -> usize {
        self.shop_ids.len()
    }

    /// Whether no row survived the join
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.shop_ids.is_empty()
    }
}

/// A shop and its predicted sales
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedEntry {
    /// Shop identifier
    pub shop_id: String,
    /// Predicted sales
    pub score: f64,
}

impl RankedEntry {
    /// Create a new entry
    #[must_use]
    pub fn new(shop_id: impl Into<String>, score: f64) -> Self {
        Self {
            shop_id: shop_id.into(),
            score,
        }
    }
}

impl fmt::Display for RankedEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:.2})", self.shop_id, self.score)
    }
}
