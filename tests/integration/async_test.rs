//! Concurrent input loading

use shop_logistics::async_io::read_table_async;
use shop_logistics::{Pipeline, PipelineConfig, load_inputs};

use crate::utils::{TEST_HIDDEN_SIZE, missing_file, write_inputs};

#[tokio::test]
async fn test_load_inputs_reads_all_sources() -> shop_logistics::Result<()> {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_inputs(dir.path())?;
    let config = PipelineConfig {
        paths,
        ..PipelineConfig::builder()
            .product_name("Laptop")
            .hidden_size(TEST_HIDDEN_SIZE)
            .seed(3)
            .build()
    };

    let inputs = load_inputs(&config).await?;

    assert_eq!(inputs.sales.as_ref().map(|b| b.len()).unwrap_or(0), 1);
    assert!(inputs.reviews.is_ok());
    assert_eq!(inputs.orders.len(), 5);

    let report = Pipeline::new(config).run(&inputs)?;
    assert_eq!(report.ranking.ranking.len(), 3);
    assert!(report.tracking.report().is_some());
    Ok(())
}

#[tokio::test]
async fn test_missing_orders_fail_the_load() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = write_inputs(dir.path()).unwrap();
    paths.orders = missing_file(dir.path(), "orders.csv");
    let config = PipelineConfig {
        paths,
        ..PipelineConfig::default()
    };

    assert!(load_inputs(&config).await.is_err());
}

#[tokio::test]
async fn test_concurrent_table_reads() {
    let dir = tempfile::tempdir().unwrap();
    let paths = write_inputs(dir.path()).unwrap();

    let (sales, reviews) = futures::join!(
        read_table_async(paths.sales.clone()),
        read_table_async(paths.reviews.clone()),
    );

    let rows = |batches: &[shop_logistics::RecordBatch]| -> usize {
        batches.iter().map(|batch| batch.num_rows()).sum()
    };
    assert_eq!(rows(&sales.unwrap()), 3);
    assert_eq!(rows(&reviews.unwrap()), 3);
}
