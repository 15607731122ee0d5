//! Configuration files

use std::path::PathBuf;

use shop_logistics::utils::test::write_text;
use shop_logistics::{Error, PipelineConfig};

#[test]
fn test_partial_file_keeps_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.json");
    write_text(
        &path,
        r#"{
            "product_name": "Laptop",
            "paths": { "orders": "data/orders.parquet" },
            "quick_orders": { "enabled": true, "per_shop": { "Shop_B": 2 } },
            "simulation": { "seed": 11, "parallel": false },
            "shop_names": { "shop1": "Shop_B" }
        }"#,
    )
    .unwrap();

    let config = PipelineConfig::from_file(&path).unwrap();

    assert_eq!(config.product_name, "Laptop");
    assert_eq!(config.paths.orders, PathBuf::from("data/orders.parquet"));
    assert_eq!(config.paths.sales, PathBuf::from("shop_sale.csv"));
    assert_eq!(config.quick_orders.quantity_for("Shop_B"), 2);
    assert_eq!(config.quick_orders.quantity_for("Shop_C"), 0);
    assert_eq!(config.simulation.seed, Some(11));
    assert!(!config.simulation.parallel);
    assert_eq!(config.shop_name_mapping().rename("shop1"), "Shop_B");
    assert_eq!(config.table_columns.shop_id, "Shop_ID");
}

#[test]
fn test_invalid_transit_profile_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.json");
    write_text(
        &path,
        r#"{ "simulation": { "normal": { "mean_hours": 120.0, "std_dev_hours": -1.0 } } }"#,
    )
    .unwrap();

    assert!(matches!(
        PipelineConfig::from_file(&path),
        Err(Error::Config(_))
    ));
}

#[test]
fn test_example_config_is_valid() {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("config/pipeline.example.json");

    let config = PipelineConfig::from_file(&path).unwrap();

    assert!(!config.product_name.is_empty());
    assert_eq!(config.shop_name_mapping().rename("shop3"), "Shop_A");
}
