//! Order selection and per-shop aggregation

use itertools::Itertools;
use rustc_hash::FxHashMap;

use crate::models::{AggregatedOrder, RawOrder};

/// Orders for `product_name` that can be scheduled
///
/// Keeps rows for the product with a date and a positive quantity, in their
/// original order.
#[must_use]
pub fn select_orders<'a>(orders: &'a [RawOrder], product_name: &str) -> Vec<&'a RawOrder> {
    orders
        .iter()
        .filter(|order| order.product_name == product_name && order.is_schedulable())
        .collect()
}

/// Group orders by shop
///
/// Each shop gets the date of its first row in input order (a missing date is
/// kept, not skipped) and the sum of all its quantities, saturating at
/// `i64::MAX`. Output is sorted by shop identifier.
#[must_use]
pub fn aggregate<'a, I>(orders: I) -> Vec<AggregatedOrder>
where
    I: IntoIterator<Item = &'a RawOrder>,
{
    let mut groups: FxHashMap<&str, AggregatedOrder> = FxHashMap::default();

    for order in orders {
        groups
            .entry(order.shop_id.as_str())
            .and_modify(|group| group.quantity = group.quantity.saturating_add(order.quantity))
            .or_insert_with(|| AggregatedOrder {
                shop_id: order.shop_id.clone(),
                order_date: order.order_date,
                quantity: order.quantity,
            });
    }

    groups
        .into_values()
        .sorted_by(|a, b| a.shop_id.cmp(&b.shop_id))
        .collect()
}
