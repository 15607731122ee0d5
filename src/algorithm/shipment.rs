//! Stochastic shipment simulation
//!
//! A sub-order is turned into an hourly timeline. The transit time is drawn
//! from a normal distribution that depends on the order kind, truncated to
//! whole hours and clamped to between one hour and one year. Every hour before arrival
//! yields an `In Transit` event; the final hour yields the single
//! `Delivered` event.

use chrono::{Duration, NaiveDateTime};
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::models::{OrderKind, ShipmentStatus, SubOrder, TrackingEvent};

/// Shortest possible transit time in hours
pub const MIN_TRANSIT_HOURS: i64 = 1;
/// Longest possible transit time in hours, one year
pub const MAX_TRANSIT_HOURS: i64 = 24 * 365;

/// Normal distribution of transit times for one order kind
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TransitProfile {
    /// Mean transit time in hours
    pub mean_hours: f64,
    /// Standard deviation of the transit time in hours
    pub std_dev_hours: f64,
}

impl TransitProfile {
    /// Around two days
    pub const QUICK: Self = Self {
        mean_hours: 48.0,
        std_dev_hours: 12.0,
    };

    /// Around five days
    pub const NORMAL: Self = Self {
        mean_hours: 120.0,
        std_dev_hours: 24.0,
    };

    /// Create a profile
    #[must_use]
    pub const fn new(mean_hours: f64, std_dev_hours: f64) -> Self {
        Self {
            mean_hours,
            std_dev_hours,
        }
    }

    /// Check that the profile describes a usable distribution
    pub fn validate(&self) -> Result<()> {
        if !self.mean_hours.is_finite() {
            return Err(Error::Config(format!(
                "Transit mean must be finite, got {}",
                self.mean_hours
            )));
        }
        if !self.std_dev_hours.is_finite() || self.std_dev_hours < 0.0 {
            return Err(Error::Config(format!(
                "Transit standard deviation must be a non-negative number, got {}",
                self.std_dev_hours
            )));
        }
        let max = MAX_TRANSIT_HOURS as f64;
        if self.mean_hours > max || self.std_dev_hours > max {
            return Err(Error::Config(format!(
                "Transit mean {} and standard deviation {} must not exceed {MAX_TRANSIT_HOURS} hours",
                self.mean_hours, self.std_dev_hours
            )));
        }
        Ok(())
    }

    /// Draw a transit time in whole hours
    pub fn sample_hours<R: Rng>(&self, rng: &mut R) -> i64 {
        let draw = self.std_dev_hours.mul_add(standard_normal(rng), self.mean_hours);
        // `as` truncates toward zero and saturates
        (draw as i64).clamp(MIN_TRANSIT_HOURS, MAX_TRANSIT_HOURS)
    }
}

/// Standard normal variate by inverse transform sampling
fn standard_normal<R: Rng>(rng: &mut R) -> f64 {
    // p in (0, 1] keeps the logarithm finite
    normal_quantile(1.0 - rng.random::<f64>())
}

/// Standard normal quantile, Abramowitz and Stegun 26.2.23
///
/// Absolute error below 4.5e-4 on `0 < p < 1`.
fn normal_quantile(p: f64) -> f64 {
    const C: [f64; 3] = [2.515_517, 0.802_853, 0.010_328];
    const D: [f64; 3] = [1.432_788, 0.189_269, 0.001_308];

    let q = (if p < 0.5 { p } else { 1.0 - p }).max(f64::EPSILON);
    let t = (-2.0 * q.ln()).sqrt();
    let numerator = C[2].mul_add(t, C[1]).mul_add(t, C[0]);
    let denominator = D[2].mul_add(t, D[1]).mul_add(t, D[0]).mul_add(t, 1.0);
    let x = t - numerator / denominator;
    if p < 0.5 { -x } else { x }
}

/// Generates tracking timelines for sub-orders
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShipmentSimulator {
    quick: TransitProfile,
    normal: TransitProfile,
}

impl Default for ShipmentSimulator {
    fn default() -> Self {
        Self::new(TransitProfile::QUICK, TransitProfile::NORMAL)
    }
}

impl ShipmentSimulator {
    /// Create a simulator with explicit transit profiles
    #[must_use]
    pub const fn new(quick: TransitProfile, normal: TransitProfile) -> Self {
        Self { quick, normal }
    }

    /// Transit profile used for `kind`
    #[must_use]
    pub const fn profile(&self, kind: OrderKind) -> &TransitProfile {
        match kind {
            OrderKind::Quick => &self.quick,
            OrderKind::Normal => &self.normal,
        }
    }

    /// Simulate the shipment of one sub-order
    ///
    /// # Errors
    /// Returns [`Error::InvalidSubOrder`] if the sub-order has no date or a
    /// non-positive quantity
    pub fn simulate<R: Rng>(
        &self,
        sub_order: &SubOrder,
        rng: &mut R,
    ) -> Result<Vec<TrackingEvent>> {
        let start = validate_sub_order(sub_order)?;
        let hours = self.profile(sub_order.kind).sample_hours(rng);
        log::debug!("Simulated {hours}h transit for {sub_order}");
        Ok(timeline(start, hours, sub_order.kind))
    }
}

/// Start date of a schedulable sub-order
fn validate_sub_order(sub_order: &SubOrder) -> Result<NaiveDateTime> {
    let invalid = |reason: &str| Error::InvalidSubOrder {
        shop_id: sub_order.shop_id.clone(),
        kind: sub_order.kind,
        reason: reason.to_string(),
    };

    if sub_order.quantity <= 0 {
        return Err(invalid(&format!(
            "quantity must be positive, got {}",
            sub_order.quantity
        )));
    }

    sub_order
        .order_date
        .ok_or_else(|| invalid("order date is missing"))
}

/// Hourly events from `start`, the last one marking delivery
#[must_use]
pub fn timeline(start: NaiveDateTime, hours: i64, kind: OrderKind) -> Vec<TrackingEvent> {
    let hours = hours.clamp(MIN_TRANSIT_HOURS, MAX_TRANSIT_HOURS);
    (0..hours)
        .map(|offset| TrackingEvent {
            timestamp: start + Duration::hours(offset),
            status: if offset == hours - 1 {
                ShipmentStatus::Delivered
            } else {
                ShipmentStatus::InTransit
            },
            order_kind: kind,
        })
        .collect()
}
