//! Core algorithms of the ranking and tracking runs
//!
//! Ranking: [`features`] builds the feature matrix, [`scoring`] predicts sales
//! and [`ranking`] orders shops. Tracking: [`aggregation`] groups orders per
//! shop, [`splitting`] applies the quick order policy and [`shipment`]
//! simulates each leg.

pub mod aggregation;
pub mod features;
pub mod ranking;
pub mod scoring;
pub mod shipment;
pub mod splitting;

pub use aggregation::{aggregate, select_orders};
pub use features::{TableColumns, build_features, encode_features, inner_join};
pub use ranking::{collapse_per_shop, rank};
pub use scoring::{DemandScorer, LinearScorer, ModelParameters, Scorer};
pub use shipment::{ShipmentSimulator, TransitProfile};
pub use splitting::{PolicyNotice, SplitOutcome, split};
