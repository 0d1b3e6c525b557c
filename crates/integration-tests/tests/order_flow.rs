//! Cart to order to back-office views, across the core and admin crates.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use shopfloor_admin::export::csv::{HEADERS, orders_csv};
use shopfloor_core::{
    Cart, CustomerProfile, DashboardStats, DeliveryStatus, OrderStats, OrderStatusUpdate,
    PaymentMethod, PaymentStatus, customers_from_orders,
};
use shopfloor_integration_tests::{apron, cart_item, customer, place_order};

#[test]
fn test_order_snapshots_cart_lines() {
    let product = apron();
    let mut cart = Cart::new();
    cart.add(cart_item(&product, 0));
    cart.add(cart_item(&product, 0));
    cart.add(cart_item(&product, 1));

    let record = place_order("a1b2c3", &cart, customer("Thandi", "thandi@example.com"));
    let order = &record.data;

    assert_eq!(order.order_number, "SF-20240514-A1B2C3");
    assert_eq!(order.items.len(), 2);
    assert_eq!(order.items[0].product_id, "apron:0");
    assert_eq!(order.items[0].quantity, 2);
    assert_eq!(order.items[0].total, Decimal::new(49998, 2));
    assert_eq!(order.total, cart.total());
    assert_eq!(order.payment_status, PaymentStatus::Pending);
    assert_eq!(order.delivery_status, DeliveryStatus::NotDelivered);

    // The cart is untouched; clearing is the checkout handler's job
    assert_eq!(cart.item_count(), 3);
}

#[test]
fn test_orders_csv_lists_every_order() {
    let product = apron();
    let mut cart = Cart::new();
    cart.add(cart_item(&product, 0));
    let first = place_order("aaa111", &cart, customer("Thandi", "thandi@example.com"));

    cart.add(cart_item(&product, 1));
    let second = place_order("bbb222", &cart, customer("Sipho \"Sip\"", "sipho@example.com"));

    let csv = orders_csv(&[first, second]).expect("orders present");
    let lines: Vec<&str> = csv.lines().collect();

    assert_eq!(lines.len(), 3);
    assert!(lines[0].starts_with(&format!("\"{}\"", HEADERS[0])));
    assert!(lines[1].starts_with("\"SF-20240514-AAA111\",\"Thandi Nkosi\""));
    assert!(lines[2].contains("\"Sipho \"\"Sip\"\" Nkosi\""));
    assert!(lines[2].contains("Premium Apron - Medium Red x1"));
    assert!(!csv.ends_with('\n'));
}

#[test]
fn test_status_update_patch_applies_to_order() {
    let mut cart = Cart::new();
    cart.add(cart_item(&apron(), 0));
    let mut record = place_order("ccc333", &cart, customer("Thandi", "thandi@example.com"));

    let update = OrderStatusUpdate {
        payment_method: PaymentMethod::Yoco,
        payment_status: PaymentStatus::Paid,
        delivery_status: DeliveryStatus::Processing,
    };
    let patch = update.to_patch();
    assert_eq!(patch["paymentStatus"], "paid");
    assert_eq!(patch["deliveryStatus"], "processing");

    record.data.apply_status(&update);
    assert_eq!(OrderStatusUpdate::of(&record.data), update);

    let stats = OrderStats::compute([&record.data]);
    assert_eq!(stats.paid, 1);
    assert_eq!(stats.pending, 0);
    assert_eq!(stats.revenue, record.data.total);
}

#[test]
fn test_customers_and_dashboard_from_orders() {
    let product = apron();
    let mut cart = Cart::new();
    cart.add(cart_item(&product, 0));

    let orders = vec![
        place_order("d1", &cart, customer("Thandi", "thandi@example.com")),
        place_order("d2", &cart, customer("Thandi", "THANDI@example.com ")),
        place_order("d3", &cart, customer("Sipho", "sipho@example.com")),
    ];

    // Same email in different case is one customer document
    let (first_key, _) = CustomerProfile::from_order(&orders[0].data);
    let (second_key, _) = CustomerProfile::from_order(&orders[1].data);
    assert_eq!(first_key, second_key);

    let customers = customers_from_orders(orders.iter().map(|o| &o.data));
    assert_eq!(customers.len(), 2);
    assert_eq!(customers[0].contact.first_name, "Thandi");
    assert_eq!(customers[0].order_count, 2);

    let today = NaiveDate::from_ymd_opt(2024, 5, 20).expect("valid date");
    let stats = DashboardStats::compute(&[product], &orders, customers.len(), today);
    assert_eq!(stats.total_orders, 3);
    assert_eq!(stats.pending_orders, 3);
    assert_eq!(stats.customers, 2);
    assert_eq!(stats.monthly_revenue, Decimal::new(24999 * 3, 2));
    assert_eq!(stats.top_products[0].name, "Premium Apron");
    assert_eq!(stats.top_products[0].units, 3);
}
