//! Shop ranking and shipment tracking.
//!
//! Ranks shops by the sales a learned scorer predicts from their sales and
//! review records, and simulates shipment tracking for the aggregated orders
//! of a product, producing a consolidated tracking log.

pub mod algorithm;
pub mod async_io;
pub mod config;
pub mod error;
pub mod loader;
pub mod models;
pub mod pipeline;
pub mod utils;

// Core types
pub use config::PipelineConfig;
pub use error::{Error, Result};
pub use pipeline::{
    Pipeline, PipelineInputs, PipelineReport, RankingOutcome, TrackingOutcome, TrackingReport,
};

// Algorithms
pub use algorithm::{
    DemandScorer, LinearScorer, PolicyNotice, Scorer, ShipmentSimulator, TransitProfile,
    aggregate, build_features, rank, split,
};

// Models
pub use models::{
    AggregatedOrder, OrderKind, RankedEntry, RawOrder, ShipmentStatus, SubOrder, TrackingEvent,
    TrackingLog,
};

// Arrow types
pub use arrow::record_batch::RecordBatch;

// Loading and writing
pub use async_io::load_inputs;
pub use loader::{load_orders, read_table};
pub use utils::io::write_tracking_log;
