//! Data models for the ranking and tracking runs
//!
//! - `shop` - feature matrices and ranked shops
//! - `order` - raw, aggregated and split orders
//! - `tracking` - tracking events and the consolidated log

pub mod order;
pub mod shop;
pub mod tracking;

pub use order::{AggregatedOrder, OrderKind, RawOrder, SubOrder};
pub use shop::{FeatureMatrix, RankedEntry, ShopFeatures};
pub use tracking::{ShipmentStatus, SimulatedShipment, TrackingEvent, TrackingLog};
