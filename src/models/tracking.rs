//! Tracking log models
//!
//! A tracking log is the concatenation of the simulated timelines of every
//! shipped sub-order in a run. It converts to an Arrow record batch with the
//! fixed column order `Timestamp`, `Status`, `Order Type`.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, StringArray, TimestampMillisecondArray};
use arrow::compute::kernels::cast::cast;
use arrow::record_batch::RecordBatch;
use arrow_schema::{DataType, Field, Schema, SchemaRef, TimeUnit};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::order::{OrderKind, SubOrder};
use crate::utils::arrow::{column_to_strings, downcast_array, get_column};

/// Column holding the event timestamp
pub const TIMESTAMP_COLUMN: &str = "Timestamp";
/// Column holding the shipment status
pub const STATUS_COLUMN: &str = "Status";
/// Column holding the order type label
pub const ORDER_TYPE_COLUMN: &str = "Order Type";

/// Status of a shipment at a point in time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ShipmentStatus {
    /// On its way
    #[serde(rename = "In Transit")]
    InTransit,
    /// Arrived; terminal
    Delivered,
}

impl ShipmentStatus {
    /// Label written to the tracking log
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InTransit => "In Transit",
            Self::Delivered => "Delivered",
        }
    }
}

impl FromStr for ShipmentStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "In Transit" => Ok(Self::InTransit),
            "Delivered" => Ok(Self::Delivered),
            other => Err(Error::data_source(format!("Unknown shipment status '{other}'"))),
        }
    }
}

impl fmt::Display for ShipmentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One timestamped status record of a simulated shipment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingEvent {
    /// When the status was observed
    #[serde(rename = "Timestamp")]
    pub timestamp: NaiveDateTime,
    /// Status at that time
    #[serde(rename = "Status")]
    pub status: ShipmentStatus,
    /// Profile of the shipment the event belongs to
    #[serde(rename = "Order Type")]
    pub order_kind: OrderKind,
}

/// A sub-order together with its simulated timeline
#[derive(Debug, Clone)]
pub struct SimulatedShipment {
    /// The leg that was shipped
    pub sub_order: SubOrder,
    /// Its events, ordered by timestamp
    pub events: Vec<TrackingEvent>,
}

impl SimulatedShipment {
    /// Simulated transit time in hours
    #[must_use]
    pub fn transit_hours(&self) -> usize {
        self.events.len()
    }

    /// Timestamp of the delivery event
    #[must_use]
    pub fn delivered_at(&self) -> Option<NaiveDateTime> {
        self.events
            .last()
            .filter(|event| event.status == ShipmentStatus::Delivered)
            .map(|event| event.timestamp)
    }
}

/// Consolidated tracking log of a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TrackingLog {
    events: Vec<TrackingEvent>,
}

impl TrackingLog {
    /// Create an empty log
    #[must_use]
    pub const fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append the timeline of one shipment
    pub fn extend_from_slice(&mut self, events: &[TrackingEvent]) {
        self.events.extend_from_slice(events);
    }

    /// All events in insertion order
    #[must_use]
    pub fn events(&self) -> &[TrackingEvent] {
        &self.events
    }

    /// Number of events
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Whether the log holds no events
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Arrow schema of the log, in output column order
    #[must_use]
    pub fn schema() -> SchemaRef {
        Arc::new(Schema::new(vec![
            Field::new(
                TIMESTAMP_COLUMN,
                DataType::Timestamp(TimeUnit::Millisecond, None),
                false,
            ),
            Field::new(STATUS_COLUMN, DataType::Utf8, false),
            Field::new(ORDER_TYPE_COLUMN, DataType::Utf8, false),
        ]))
    }

    /// Convert the log into a record batch
    pub fn to_record_batch(&self) -> Result<RecordBatch> {
        let timestamps: ArrayRef = Arc::new(TimestampMillisecondArray::from_iter_values(
            self.events
                .iter()
                .map(|event| event.timestamp.and_utc().timestamp_millis()),
        ));
        let statuses: ArrayRef = Arc::new(StringArray::from_iter_values(
            self.events.iter().map(|event| event.status.label()),
        ));
        let kinds: ArrayRef = Arc::new(StringArray::from_iter_values(
            self.events.iter().map(|event| event.order_kind.label()),
        ));

        Ok(RecordBatch::try_new(
            Self::schema(),
            vec![timestamps, statuses, kinds],
        )?)
    }

    /// Rebuild a log from a record batch written by [`TrackingLog::to_record_batch`]
    pub fn from_record_batch(batch: &RecordBatch) -> Result<Self> {
        let timestamps = cast(
            &get_column(batch, TIMESTAMP_COLUMN)?,
            &DataType::Timestamp(TimeUnit::Millisecond, None),
        )?;
        let timestamps =
            downcast_array::<TimestampMillisecondArray>(&timestamps, TIMESTAMP_COLUMN, "Timestamp")?;
        let statuses = column_to_strings(&get_column(batch, STATUS_COLUMN)?, STATUS_COLUMN)?;
        let kinds = column_to_strings(&get_column(batch, ORDER_TYPE_COLUMN)?, ORDER_TYPE_COLUMN)?;

        let mut events = Vec::with_capacity(batch.num_rows());
        for (row, (status, kind)) in statuses.into_iter().zip(kinds).enumerate() {
            let timestamp = timestamps
                .value_as_datetime(row)
                .filter(|_| timestamps.is_valid(row))
                .ok_or_else(|| Error::data_source(format!("Row {row} has no timestamp")))?;
            let status = status
                .as_deref()
                .unwrap_or_default()
                .parse::<ShipmentStatus>()?;
            let order_kind = kind.as_deref().unwrap_or_default().parse::<OrderKind>()?;
            events.push(TrackingEvent {
                timestamp,
                status,
                order_kind,
            });
        }

        Ok(Self { events })
    }
}

impl From<Vec<TrackingEvent>> for TrackingLog {
    fn from(events: Vec<TrackingEvent>) -> Self {
        Self { events }
    }
}

impl FromIterator<TrackingEvent> for TrackingLog {
    fn from_iter<I: IntoIterator<Item = TrackingEvent>>(iter: I) -> Self {
        Self {
            events: iter.into_iter().collect(),
        }
    }
}
