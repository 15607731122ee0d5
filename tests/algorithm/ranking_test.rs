//! Tests for store ranking

use std::sync::Arc;

use shop_logistics::algorithm::{TableColumns, build_features, inner_join};
use shop_logistics::pipeline::rank_stores;
use shop_logistics::utils::test::{reviews_batch, sales_batch, visitor_model};
use shop_logistics::{DemandScorer, Error, LinearScorer, Pipeline, PipelineConfig};

#[test]
fn test_ranking_follows_predicted_sales() {
    let sales = sales_batch(&[("Shop A", 10.0, 500.0), ("Shop B", 2.0, 900.0)]).unwrap();
    let reviews = reviews_batch(&[("Shop_A", 4.0), ("Shop_B", 5.0)]).unwrap();
    let scorer = DemandScorer::from_parameters(visitor_model(8), 8).unwrap();

    let ranking = rank_stores(&sales, &reviews, &scorer, &TableColumns::default()).unwrap();

    let shops: Vec<&str> = ranking.iter().map(|entry| entry.shop_id.as_str()).collect();
    assert_eq!(shops, ["Shop_A", "Shop_B"]);
    assert!((ranking[0].score - 24.0).abs() < 1e-9);
    assert!((ranking[1].score - 9.0).abs() < 1e-9);
}

#[test]
fn test_shop_missing_from_reviews_is_dropped() {
    let sales = sales_batch(&[("Shop A", 10.0, 500.0), ("Shop B", 2.0, 900.0)]).unwrap();
    let reviews = reviews_batch(&[("Shop_A", 4.0)]).unwrap();
    let scorer = LinearScorer::new(vec![1.0, 0.0], 0.0);

    let ranking = rank_stores(&sales, &reviews, &scorer, &TableColumns::default()).unwrap();

    assert_eq!(ranking.len(), 1);
    assert_eq!(ranking[0].shop_id, "Shop_A");
}

#[test]
fn test_disjoint_tables_are_an_empty_join() {
    let sales = sales_batch(&[("Shop A", 10.0, 500.0)]).unwrap();
    let reviews = reviews_batch(&[("Shop_Z", 4.0)]).unwrap();

    let result = build_features(&sales, &reviews, &TableColumns::default());
    assert!(matches!(result, Err(Error::EmptyJoin { .. })));
}

#[test]
fn test_join_keeps_one_key_column() {
    let sales = sales_batch(&[("Shop A", 10.0, 500.0)]).unwrap();
    let reviews = reviews_batch(&[("Shop_A", 4.0), ("Shop_A", 2.0)]).unwrap();

    let joined = inner_join(&sales, &reviews, "Shop_ID").unwrap();
    let schema = joined.schema();
    let shop_columns = schema
        .fields()
        .iter()
        .filter(|field| field.name().starts_with("Shop_ID"))
        .count();

    assert_eq!(joined.num_rows(), 2);
    assert_eq!(shop_columns, 1);
}

#[test]
fn test_scorer_width_mismatch_empties_ranking() {
    let sales = vec![sales_batch(&[("Shop A", 10.0, 500.0)]).unwrap()];
    let reviews = vec![reviews_batch(&[("Shop_A", 4.0)]).unwrap()];
    let pipeline = Pipeline::new(PipelineConfig::default())
        .with_scorer(Arc::new(LinearScorer::new(vec![1.0, 1.0, 1.0], 0.0)));

    let outcome = pipeline.rank(Ok(sales.as_slice()), Ok(reviews.as_slice()));

    assert!(!outcome.is_available());
    assert!(outcome.ranking.is_empty());
    assert!(matches!(outcome.error, Some(Error::ModelLoad(_))));
}

#[test]
fn test_missing_sales_empties_ranking() {
    let reviews = vec![reviews_batch(&[("Shop_A", 4.0)]).unwrap()];
    let pipeline = Pipeline::new(PipelineConfig::default())
        .with_scorer(Arc::new(LinearScorer::new(vec![1.0, 1.0], 0.0)));

    let outcome = pipeline.rank(
        Err(Error::data_source("sales unavailable")),
        Ok(reviews.as_slice()),
    );

    assert!(outcome.ranking.is_empty());
    assert!(matches!(outcome.error, Some(Error::DataSource { .. })));
}
