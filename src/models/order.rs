//! Order models
//!
//! Orders move through three shapes during a tracking run: raw rows from the
//! order source, one aggregated order per shop, and the quick/normal legs
//! that are handed to the shipment simulator.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Shipment profile of a sub-order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderKind {
    /// Expedited shipment with a shorter mean transit time
    #[serde(rename = "Quick Order")]
    Quick,
    /// Default shipment profile
    #[serde(rename = "Normal Order")]
    Normal,
}

impl OrderKind {
    /// Label written to the tracking log
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Quick => "Quick Order",
            Self::Normal => "Normal Order",
        }
    }
}

impl FromStr for OrderKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "Quick Order" | "quick" => Ok(Self::Quick),
            "Normal Order" | "normal" => Ok(Self::Normal),
            other => Err(Error::data_source(format!("Unknown order type '{other}'"))),
        }
    }
}

impl fmt::Display for OrderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A single order row as supplied by the order source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawOrder {
    /// Product the order is for
    pub product_name: String,
    /// Shop identifier
    pub shop_id: String,
    /// Order date, `None` when missing or unparseable
    pub order_date: Option<NaiveDateTime>,
    /// Ordered quantity
    pub quantity: i64,
}

impl RawOrder {
    /// Create a new raw order
    #[must_use]
    pub fn new(
        product_name: impl Into<String>,
        shop_id: impl Into<String>,
        order_date: Option<NaiveDateTime>,
        quantity: i64,
    ) -> Self {
        Self {
            product_name: product_name.into(),
            shop_id: shop_id.into(),
            order_date,
            quantity,
        }
    }

    /// Whether the row can take part in aggregation
    #[must_use]
    pub const fn is_schedulable(&self) -> bool {
        self.order_date.is_some() && self.quantity > 0
    }
}

/// All orders of one shop for one product
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatedOrder {
    /// Shop identifier
    pub shop_id: String,
    /// Date of the first row seen for the shop (may be `None`)
    pub order_date: Option<NaiveDateTime>,
    /// Sum of all quantities for the shop
    pub quantity: i64,
}

/// One shipment leg of an aggregated order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubOrder {
    /// Shop identifier
    pub shop_id: String,
    /// Shipment start, `None` makes the leg unschedulable
    pub order_date: Option<NaiveDateTime>,
    /// Quantity shipped in this leg
    pub quantity: i64,
    /// Shipment profile
    pub kind: OrderKind,
}

impl SubOrder {
    /// Create a leg of `order` with the given quantity and kind
    #[must_use]
    pub fn from_aggregated(order: &AggregatedOrder, quantity: i64, kind: OrderKind) -> Self {
        Self {
            shop_id: order.shop_id.clone(),
            order_date: order.order_date,
            quantity,
            kind,
        }
    }
}

impl fmt::Display for SubOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.order_date {
            Some(date) => write!(
                f,
                "{} for {} on {} for {} units",
                self.kind, self.shop_id, date, self.quantity
            ),
            None => write!(
                f,
                "{} for {} (no date) for {} units",
                self.kind, self.shop_id, self.quantity
            ),
        }
    }
}
