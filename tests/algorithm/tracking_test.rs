//! Tests for order aggregation, splitting and shipment simulation

use shop_logistics::config::{QuickOrderConfig, SimulationConfig};
use shop_logistics::models::ShipmentStatus;
use shop_logistics::pipeline::{track_aggregated, track_orders};
use shop_logistics::utils::test::{datetime, order};
use shop_logistics::{Error, OrderKind, TrackingOutcome, aggregate, split};

fn seeded(parallel: bool) -> SimulationConfig {
    SimulationConfig {
        seed: Some(7),
        parallel,
        threads: Some(4),
        ..SimulationConfig::default()
    }
}

#[test]
fn test_null_first_date_is_rejected_at_simulation() {
    let orders = [
        order("Laptop", "shop1", None, 3),
        order("Laptop", "shop1", Some((2024, 1, 5)), 2),
    ];

    let aggregated = aggregate(orders.iter());
    assert_eq!(aggregated.len(), 1);
    assert_eq!(aggregated[0].quantity, 5);
    assert_eq!(aggregated[0].order_date, None);

    let report =
        track_aggregated(aggregated, &QuickOrderConfig::default(), &seeded(false)).unwrap();

    assert!(report.shipments.is_empty());
    assert_eq!(report.event_count(), 0);
    assert_eq!(report.rejected.len(), 1);
    assert!(matches!(
        &report.rejected[0],
        Error::InvalidSubOrder { shop_id, .. } if shop_id == "shop1"
    ));
}

#[test]
fn test_quick_split_ships_two_legs() {
    let orders = [order("Laptop", "Shop_B", Some((2024, 1, 5)), 5)];
    let quick = QuickOrderConfig {
        enabled: true,
        requested_quantity: 2,
        ..QuickOrderConfig::default()
    };

    let outcome = track_orders(&orders, "Laptop", &quick, &seeded(false)).unwrap();
    let report = outcome.report().unwrap();

    assert_eq!(report.shipments.len(), 2);
    assert_eq!(report.shipments[0].sub_order.kind, OrderKind::Quick);
    assert_eq!(report.shipments[0].sub_order.quantity, 2);
    assert_eq!(report.shipments[1].sub_order.kind, OrderKind::Normal);
    assert_eq!(report.shipments[1].sub_order.quantity, 3);
    assert!(report.notices.is_empty());
}

#[test]
fn test_oversized_quick_request_falls_back_to_normal() {
    let aggregated = aggregate(&[order("Laptop", "Shop_B", Some((2024, 1, 5)), 5)]);

    let outcome = split(&aggregated[0], 9, true);

    assert_eq!(outcome.legs.len(), 1);
    assert_eq!(outcome.legs[0].kind, OrderKind::Normal);
    assert_eq!(outcome.legs[0].quantity, 5);
    assert!(outcome.notice.is_some());
}

#[test]
fn test_timelines_are_hourly_and_end_delivered() {
    let orders = [
        order("Laptop", "Shop_A", Some((2024, 3, 1)), 1),
        order("Laptop", "Shop_C", Some((2024, 3, 2)), 4),
    ];

    let outcome = track_orders(
        &orders,
        "Laptop",
        &QuickOrderConfig::default(),
        &seeded(true),
    )
    .unwrap();
    let report = outcome.report().unwrap();

    for shipment in &report.shipments {
        let events = &shipment.events;
        assert!(!events.is_empty());
        assert_eq!(Some(events[0].timestamp), shipment.sub_order.order_date);
        for pair in events.windows(2) {
            assert_eq!((pair[1].timestamp - pair[0].timestamp).num_hours(), 1);
            assert_eq!(pair[0].status, ShipmentStatus::InTransit);
        }
        assert_eq!(events.last().map(|e| e.status), Some(ShipmentStatus::Delivered));
    }
    assert_eq!(report.log().len(), report.event_count());
}

#[test]
fn test_parallel_and_sequential_runs_agree() {
    let orders: Vec<_> = (1..=8)
        .map(|shop| order("Laptop", &format!("shop{shop}"), Some((2024, 1, shop)), 10))
        .collect();
    let quick = QuickOrderConfig {
        enabled: true,
        requested_quantity: 4,
        ..QuickOrderConfig::default()
    };

    let sequential = track_orders(&orders, "Laptop", &quick, &seeded(false)).unwrap();
    let parallel = track_orders(&orders, "Laptop", &quick, &seeded(true)).unwrap();

    assert_eq!(
        sequential.report().unwrap().log(),
        parallel.report().unwrap().log()
    );
}

#[test]
fn test_unknown_product_has_no_valid_orders() {
    let orders = [order("Laptop", "shop1", Some((2024, 1, 5)), 3)];

    let outcome = track_orders(
        &orders,
        "Tablet",
        &QuickOrderConfig::default(),
        &seeded(false),
    )
    .unwrap();

    assert!(matches!(
        outcome,
        TrackingOutcome::NoValidOrders { ref product } if product == "Tablet"
    ));
}

#[test]
fn test_aggregation_keeps_first_date() {
    let orders = [
        order("Laptop", "shop2", Some((2024, 1, 9)), 1),
        order("Laptop", "shop2", Some((2024, 1, 2)), 1),
    ];

    let aggregated = aggregate(orders.iter());
    assert_eq!(aggregated[0].order_date, datetime(2024, 1, 9));
    assert_eq!(aggregated[0].quantity, 2);
}
