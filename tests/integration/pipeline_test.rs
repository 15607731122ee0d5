//! End-to-end pipeline runs over files on disk

use shop_logistics::utils::io::read_tracking_log;
use shop_logistics::{
    Pipeline, PipelineConfig, PipelineInputs, TrackingOutcome, load_orders, read_table,
    write_tracking_log,
};

use crate::utils::{TEST_HIDDEN_SIZE, missing_file, write_inputs};

fn config_for(paths: shop_logistics::config::PathsConfig) -> PipelineConfig {
    PipelineConfig {
        paths,
        ..PipelineConfig::builder()
            .product_name("Laptop")
            .hidden_size(TEST_HIDDEN_SIZE)
            .shop_name("shop1", "Shop_B")
            .shop_name("shop2", "Shop_C")
            .shop_name("shop3", "Shop_A")
            .quick_quantity_for("Shop_B", 2)
            .seed(42)
            .build()
    }
}

fn inputs_for(config: &PipelineConfig) -> PipelineInputs {
    PipelineInputs {
        sales: read_table(&config.paths.sales),
        reviews: read_table(&config.paths.reviews),
        orders: load_orders(
            &config.paths.orders,
            &config.order_columns,
            &config.date_formats,
            &config.shop_name_mapping(),
        )
        .unwrap(),
    }
}

#[test]
fn test_full_run_ranks_and_tracks() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_for(write_inputs(dir.path()).unwrap());
    let inputs = inputs_for(&config);

    let report = Pipeline::new(config.clone()).run(&inputs).unwrap();

    let shops: Vec<&str> = report
        .ranking
        .ranking
        .iter()
        .map(|entry| entry.shop_id.as_str())
        .collect();
    assert_eq!(shops, ["Shop_A", "Shop_B", "Shop_C"]);

    let TrackingOutcome::Tracked(tracking) = &report.tracking else {
        panic!("expected tracked orders");
    };
    let shops: Vec<&str> = tracking
        .aggregated
        .iter()
        .map(|order| order.shop_id.as_str())
        .collect();
    assert_eq!(shops, ["Shop_B", "Shop_C"]);
    assert_eq!(tracking.aggregated[0].quantity, 5);
    assert_eq!(tracking.shipments.len(), 3);
    assert!(tracking.rejected.is_empty());

    let log = tracking.log();
    write_tracking_log(&config.paths.output, &log).unwrap();
    let restored = read_tracking_log(&config.paths.output).unwrap();
    assert_eq!(restored, log);
}

#[test]
fn test_missing_reviews_only_disables_ranking() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = write_inputs(dir.path()).unwrap();
    paths.reviews = missing_file(dir.path(), "reviews.csv");
    let config = config_for(paths);
    let inputs = inputs_for(&config);

    let report = Pipeline::new(config).run(&inputs).unwrap();

    assert!(!report.ranking.is_available());
    assert!(report.ranking.ranking.is_empty());
    assert!(report.tracking.report().is_some());
}

#[test]
fn test_missing_model_only_disables_ranking() {
    let dir = tempfile::tempdir().unwrap();
    let mut paths = write_inputs(dir.path()).unwrap();
    paths.model = missing_file(dir.path(), "model.json");
    let config = config_for(paths);
    let inputs = inputs_for(&config);

    let report = Pipeline::new(config).run(&inputs).unwrap();

    assert!(matches!(
        report.ranking.error,
        Some(shop_logistics::Error::ModelLoad(_))
    ));
    assert!(report.tracking.report().is_some());
}

#[test]
fn test_product_without_orders() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_for(write_inputs(dir.path()).unwrap());
    config.product_name = "Tablet".to_string();
    let inputs = inputs_for(&config);

    let report = Pipeline::new(config).run(&inputs).unwrap();

    assert!(report.ranking.is_available());
    assert!(matches!(
        report.tracking,
        TrackingOutcome::NoValidOrders { .. }
    ));
}
