//! Error handling for the ranking and tracking pipeline.

pub mod util;

use std::io;
use std::path::{Path, PathBuf};

use arrow::error::ArrowError;
use parquet::errors::ParquetError;

use crate::models::OrderKind;

/// Errors raised by the ranking and tracking pipeline
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An input table could not be read or is malformed
    #[error("Data source error{}: {message}", display_path(.path))]
    DataSource {
        /// File the table was read from, if any
        path: Option<PathBuf>,
        /// What went wrong
        message: String,
    },

    /// Sales and reviews share no shop identifier
    #[error("Joining sales and reviews on '{key}' produced no rows; check the input tables for consistency")]
    EmptyJoin {
        /// Join key column
        key: String,
    },

    /// Scorer parameters are unreadable or do not fit the features
    #[error("Model load error: {0}")]
    ModelLoad(String),

    /// A sub-order that cannot be simulated
    #[error("Invalid sub-order ({kind}) for shop '{shop_id}': {reason}")]
    InvalidSubOrder {
        /// Shop the sub-order belongs to
        shop_id: String,
        /// Quick or normal leg
        kind: OrderKind,
        /// Why it was rejected
        reason: String,
    },

    /// A caller broke a documented precondition
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Configuration could not be loaded
    #[error("Configuration error: {0}")]
    Config(String),

    /// Arrow error
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Parquet error
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Conversion between Rust values and record batches failed
    #[error("Serialization error: {0}")]
    Serialization(String),
}

fn display_path(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" ({})", p.display()))
        .unwrap_or_default()
}

impl Error {
    /// Create a data source error without a file
    pub fn data_source(message: impl Into<String>) -> Self {
        Self::DataSource {
            path: None,
            message: message.into(),
        }
    }

    /// Create a data source error for a file
    pub fn data_source_at(path: &Path, message: impl Into<String>) -> Self {
        Self::DataSource {
            path: Some(path.to_path_buf()),
            message: message.into(),
        }
    }

    /// Create a column not found error
    pub fn column_not_found(column: &str) -> Self {
        Self::data_source(format!("Column '{column}' not found"))
    }

    /// Whether this error only concerns the advisory ranking path
    #[must_use]
    pub const fn is_ranking_error(&self) -> bool {
        matches!(
            self,
            Self::DataSource { .. } | Self::EmptyJoin { .. } | Self::ModelLoad(_)
        )
    }
}

impl From<serde_arrow::Error> for Error {
    fn from(error: serde_arrow::Error) -> Self {
        Self::Serialization(error.to_string())
    }
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, Error>;
