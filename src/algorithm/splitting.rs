//! Quick/normal order splitting
//!
//! An aggregated order is shipped as up to two legs. With quick orders
//! enabled and a quick quantity in `1..=order.quantity`, the quick leg takes
//! that quantity and a normal leg takes the remainder, if any. Any other quick
//! quantity falls back to shipping everything as a normal order and records a
//! [`PolicyNotice`].

use std::fmt;

use smallvec::{SmallVec, smallvec};

use crate::models::{AggregatedOrder, OrderKind, SubOrder};

/// Observable record of a split that did not go as requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PolicyNotice {
    /// The requested quick quantity was outside `1..=available`
    InvalidQuickQuantity {
        /// Shop whose order fell back to normal shipping
        shop_id: String,
        /// Quantity that was requested
        requested: i64,
        /// Quantity that was available
        available: i64,
    },
}

impl fmt::Display for PolicyNotice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidQuickQuantity {
                shop_id,
                requested,
                available,
            } => write!(
                f,
                "Invalid quick order quantity {requested} for {shop_id} (max {available}); processing as normal order"
            ),
        }
    }
}

/// Legs produced for one aggregated order
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitOutcome {
    /// Quick leg first, if any, then the normal leg, if any
    pub legs: SmallVec<[SubOrder; 2]>,
    /// Set when the quick request was ignored
    pub notice: Option<PolicyNotice>,
}

impl SplitOutcome {
    /// The quick leg, if one was produced
    #[must_use]
    pub fn quick(&self) -> Option<&SubOrder> {
        self.legs.iter().find(|leg| leg.kind == OrderKind::Quick)
    }

    /// The normal leg, if one was produced
    #[must_use]
    pub fn normal(&self) -> Option<&SubOrder> {
        self.legs.iter().find(|leg| leg.kind == OrderKind::Normal)
    }

    /// Total quantity over all legs
    #[must_use]
    pub fn total_quantity(&self) -> i64 {
        self.legs.iter().map(|leg| leg.quantity).sum()
    }
}

/// Split `order` into quick and normal legs
#[must_use]
pub fn split(order: &AggregatedOrder, quick_quantity: i64, quick_enabled: bool) -> SplitOutcome {
    let all_normal = || -> SmallVec<[SubOrder; 2]> {
        smallvec![SubOrder::from_aggregated(order, order.quantity, OrderKind::Normal)]
    };

    if !quick_enabled {
        return SplitOutcome {
            legs: all_normal(),
            notice: None,
        };
    }

    if quick_quantity <= 0 || quick_quantity > order.quantity {
        let notice = PolicyNotice::InvalidQuickQuantity {
            shop_id: order.shop_id.clone(),
            requested: quick_quantity,
            available: order.quantity,
        };
        log::warn!("{notice}");
        return SplitOutcome {
            legs: all_normal(),
            notice: Some(notice),
        };
    }

    let mut legs: SmallVec<[SubOrder; 2]> =
        smallvec![SubOrder::from_aggregated(order, quick_quantity, OrderKind::Quick)];
    let remainder = order.quantity - quick_quantity;
    if remainder > 0 {
        legs.push(SubOrder::from_aggregated(order, remainder, OrderKind::Normal));
    }

    SplitOutcome { legs, notice: None }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn order(quantity: i64) -> AggregatedOrder {
        AggregatedOrder {
            shop_id: "Shop_B".to_string(),
            order_date: NaiveDate::from_ymd_opt(2024, 1, 5)
                .unwrap()
                .and_hms_opt(0, 0, 0),
            quantity,
        }
    }

    #[test]
    fn test_disabled_ships_everything_normal() {
        let outcome = split(&order(5), 3, false);
        assert_eq!(outcome.legs.len(), 1);
        assert_eq!(outcome.legs[0].kind, OrderKind::Normal);
        assert_eq!(outcome.legs[0].quantity, 5);
        assert!(outcome.notice.is_none());
    }

    #[test]
    fn test_invalid_quick_quantity_falls_back() {
        for requested in [0, -1, 6] {
            let outcome = split(&order(5), requested, true);
            assert_eq!(outcome.legs.len(), 1);
            assert_eq!(outcome.legs[0].kind, OrderKind::Normal);
            assert_eq!(outcome.legs[0].quantity, 5);
            assert_eq!(
                outcome.notice,
                Some(PolicyNotice::InvalidQuickQuantity {
                    shop_id: "Shop_B".to_string(),
                    requested,
                    available: 5,
                })
            );
        }
    }

    #[test]
    fn test_full_quick_has_no_normal_leg() {
        let outcome = split(&order(5), 5, true);
        assert_eq!(outcome.legs.len(), 1);
        assert_eq!(outcome.quick().map(|leg| leg.quantity), Some(5));
        assert!(outcome.normal().is_none());
        assert!(outcome.notice.is_none());
    }

    #[test]
    fn test_partial_quick_produces_both_legs() {
        for requested in 1..5 {
            let outcome = split(&order(5), requested, true);
            assert_eq!(outcome.legs.len(), 2);
            assert_eq!(outcome.legs[0].kind, OrderKind::Quick);
            assert_eq!(outcome.legs[1].kind, OrderKind::Normal);
            assert_eq!(outcome.quick().unwrap().quantity, requested);
            assert_eq!(outcome.total_quantity(), 5);
        }
    }

    #[test]
    fn test_legs_keep_shop_and_date() {
        let source = order(4);
        let outcome = split(&source, 1, true);
        for leg in &outcome.legs {
            assert_eq!(leg.shop_id, source.shop_id);
            assert_eq!(leg.order_date, source.order_date);
        }
    }
}
