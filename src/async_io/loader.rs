//! Concurrent loading of the pipeline inputs

use std::path::PathBuf;
use std::time::Instant;

use arrow::record_batch::RecordBatch;

use crate::config::PipelineConfig;
use crate::error::{Error, Result};
use crate::loader::{load_orders, read_table};
use crate::models::RawOrder;
use crate::pipeline::PipelineInputs;

/// Run a blocking closure on the blocking thread pool
async fn spawn_blocking<T, F>(task: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(task)
        .await
        .map_err(|e| Error::data_source(format!("Loading task failed: {e}")))
}

/// Read a CSV or Parquet table without blocking the runtime
pub async fn read_table_async(path: PathBuf) -> Result<Vec<RecordBatch>> {
    spawn_blocking(move || read_table(&path)).await?
}

/// Load the configured order table without blocking the runtime
pub async fn load_orders_async(config: &PipelineConfig) -> Result<Vec<RawOrder>> {
    let path = config.paths.orders.clone();
    let columns = config.order_columns.clone();
    let dates = config.date_formats.clone();
    let names = config.shop_name_mapping();
    spawn_blocking(move || load_orders(&path, &columns, &dates, &names)).await?
}

/// Load sales, reviews and orders concurrently
///
/// Sales and review failures are kept in the inputs, where they only disable
/// the ranking run.
///
/// # Errors
/// Returns an error if the orders cannot be loaded
pub async fn load_inputs(config: &PipelineConfig) -> Result<PipelineInputs> {
    let start = Instant::now();
    let (sales, reviews, orders) = futures::try_join!(
        async { Ok::<_, Error>(read_table_async(config.paths.sales.clone()).await) },
        async { Ok::<_, Error>(read_table_async(config.paths.reviews.clone()).await) },
        load_orders_async(config),
    )?;

    log::info!("Loaded pipeline inputs in {:?}", start.elapsed());
    Ok(PipelineInputs {
        sales,
        reviews,
        orders,
    })
}
