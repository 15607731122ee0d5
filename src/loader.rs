//! Table loading
//!
//! Sales, review and order tables are read as Arrow record batches from CSV
//! (header row, inferred schema) or Parquet, picked by file extension. Orders
//! are then narrowed to their four columns and deserialized into
//! [`RawOrder`]s with normalized shop identifiers and parsed dates.

use std::io::Seek;
use std::path::Path;
use std::sync::Arc;
use std::time::Instant;

use arrow::array::ArrayRef;
use arrow::compute::kernels::cast::cast;
use arrow::csv::ReaderBuilder;
use arrow::csv::reader::Format;
use arrow::datatypes::{DataType, Field, Schema};
use arrow::error::ArrowError;
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use crate::config::OrderColumns;
use crate::error::util::safe_open_file;
use crate::error::{Error, Result};
use crate::models::RawOrder;
use crate::utils::arrow::get_column;
use crate::utils::dates::{DateFormatConfig, parse_order_date};
use crate::utils::logging::{log_operation_complete, log_operation_start};
use crate::utils::normalize::{ShopNameMapping, normalize_shop_id};

/// Rows inspected when inferring a CSV schema
pub const SCHEMA_INFERENCE_RECORDS: usize = 1000;

/// On-disk table format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma-separated values with a header row
    Csv,
    /// Apache Parquet
    Parquet,
}

impl TableFormat {
    /// Format implied by the file extension
    ///
    /// # Errors
    /// Returns a data source error for any extension other than `csv` or
    /// `parquet`
    pub fn from_path(path: &Path) -> Result<Self> {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("csv") => Ok(Self::Csv),
            Some("parquet") => Ok(Self::Parquet),
            _ => Err(Error::data_source_at(
                path,
                "Unsupported table format; expected a .csv or .parquet file",
            )),
        }
    }
}

/// Read a table in the format implied by its extension
pub fn read_table(path: &Path) -> Result<Vec<RecordBatch>> {
    match TableFormat::from_path(path)? {
        TableFormat::Csv => read_csv(path, None),
        TableFormat::Parquet => read_parquet(path),
    }
}

/// Read a CSV file with a header row
///
/// Without an explicit schema every column type is inferred from the first
/// [`SCHEMA_INFERENCE_RECORDS`] rows.
pub fn read_csv(path: &Path, schema: Option<Arc<Schema>>) -> Result<Vec<RecordBatch>> {
    let start = Instant::now();
    log_operation_start("Reading CSV file", path);

    let mut file = safe_open_file(path, "reading CSV table")?;
    let schema = match schema {
        Some(schema) => schema,
        None => {
            let (inferred, _) = Format::default()
                .with_header(true)
                .infer_schema(&mut file, Some(SCHEMA_INFERENCE_RECORDS))
                .map_err(|e| Error::data_source_at(path, e.to_string()))?;
            file.rewind()?;
            Arc::new(inferred)
        }
    };

    let reader = ReaderBuilder::new(schema)
        .with_header(true)
        .build(file)
        .map_err(|e| Error::data_source_at(path, e.to_string()))?;
    let batches = reader
        .collect::<std::result::Result<Vec<_>, ArrowError>>()
        .map_err(|e| Error::data_source_at(path, e.to_string()))?;

    log_operation_complete("read", path, batches.len(), Some(start.elapsed()));
    Ok(batches)
}

/// Read a Parquet file
pub fn read_parquet(path: &Path) -> Result<Vec<RecordBatch>> {
    let start = Instant::now();
    log_operation_start("Reading parquet file", path);

    let file = safe_open_file(path, "reading parquet table")?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .and_then(|builder| builder.build())
        .map_err(|e| Error::data_source_at(path, e.to_string()))?;
    let batches = reader
        .collect::<std::result::Result<Vec<_>, ArrowError>>()
        .map_err(|e| Error::data_source_at(path, e.to_string()))?;

    log_operation_complete("read", path, batches.len(), Some(start.elapsed()));
    Ok(batches)
}

/// Canonical names of the order columns after narrowing
const PRODUCT_NAME: &str = "product_name";
const SHOP: &str = "shop";
const ORDER_DATE: &str = "order_date";
const QUANTITY: &str = "quantity";

#[derive(Debug, Deserialize)]
struct OrderRow {
    product_name: Option<String>,
    shop: Option<String>,
    order_date: Option<String>,
    quantity: Option<i64>,
}

/// Load raw orders from a CSV or Parquet file
///
/// CSV order files are read with every order column as text except the
/// quantity, so dates are never reinterpreted by schema inference.
pub fn load_orders(
    path: &Path,
    columns: &OrderColumns,
    dates: &DateFormatConfig,
    names: &ShopNameMapping,
) -> Result<Vec<RawOrder>> {
    let batches = match TableFormat::from_path(path)? {
        TableFormat::Csv => {
            let schema = order_csv_schema(path, columns)?;
            read_csv(path, Some(schema))?
        }
        TableFormat::Parquet => read_parquet(path)?,
    };

    let mut orders = Vec::new();
    for batch in &batches {
        orders.extend(orders_from_batch(batch, columns, dates, names)?);
    }
    log::info!("Loaded {} orders from {}", orders.len(), path.display());
    Ok(orders)
}

/// Inferred CSV schema with the order columns forced to their intake types
fn order_csv_schema(path: &Path, columns: &OrderColumns) -> Result<Arc<Schema>> {
    let mut file = safe_open_file(path, "inferring order schema")?;
    let (inferred, _) = Format::default()
        .with_header(true)
        .infer_schema(&mut file, Some(SCHEMA_INFERENCE_RECORDS))
        .map_err(|e| Error::data_source_at(path, e.to_string()))?;

    let fields: Vec<Field> = inferred
        .fields()
        .iter()
        .map(|field| {
            let name = field.name();
            let data_type = if *name == columns.quantity {
                DataType::Int64
            } else if *name == columns.product_name
                || *name == columns.shop
                || *name == columns.order_date
            {
                DataType::Utf8
            } else {
                field.data_type().clone()
            };
            Field::new(name, data_type, true)
        })
        .collect();
    Ok(Arc::new(Schema::new(fields)))
}

/// Deserialize the orders of one batch
///
/// A missing quantity counts as zero, which leaves the order unschedulable.
/// A missing shop becomes an empty identifier.
pub fn orders_from_batch(
    batch: &RecordBatch,
    columns: &OrderColumns,
    dates: &DateFormatConfig,
    names: &ShopNameMapping,
) -> Result<Vec<RawOrder>> {
    let narrowed = narrow_orders(batch, columns)?;
    let rows: Vec<OrderRow> = serde_arrow::from_record_batch(&narrowed)?;

    Ok(rows
        .into_iter()
        .map(|row| {
            let shop_id = row
                .shop
                .map(|shop| names.rename(&normalize_shop_id(&shop)).to_string())
                .unwrap_or_default();
            RawOrder::new(
                row.product_name.unwrap_or_default(),
                shop_id,
                parse_order_date(row.order_date.as_deref(), dates),
                row.quantity.unwrap_or(0),
            )
        })
        .collect())
}

/// The four order columns under canonical names and types
fn narrow_orders(batch: &RecordBatch, columns: &OrderColumns) -> Result<RecordBatch> {
    let wanted = [
        (columns.product_name.as_str(), PRODUCT_NAME, DataType::Utf8),
        (columns.shop.as_str(), SHOP, DataType::Utf8),
        (columns.order_date.as_str(), ORDER_DATE, DataType::Utf8),
        (columns.quantity.as_str(), QUANTITY, DataType::Int64),
    ];

    let mut fields = Vec::with_capacity(wanted.len());
    let mut arrays: Vec<ArrayRef> = Vec::with_capacity(wanted.len());
    for (source, target, data_type) in wanted {
        let column = get_column(batch, source)?;
        arrays.push(cast(&column, &data_type)?);
        fields.push(Field::new(target, data_type, true));
    }

    Ok(RecordBatch::try_new(Arc::new(Schema::new(fields)), arrays)?)
}
