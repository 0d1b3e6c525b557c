//! Orders CSV export.
//!
//! Every field is double-quoted with embedded quotes doubled. Rows are
//! joined by `\n` with no trailing newline.

use shopfloor_core::{Order, Record, format_price};

/// Column headers, in output order.
pub const HEADERS: [&str; 8] = [
    "Order ID",
    "Customer",
    "Phone",
    "Items",
    "Total",
    "Payment Method",
    "Payment Status",
    "Delivery Status",
];

fn quote(field: &str) -> String {
    format!("\"{}\"", field.replace('"', "\"\""))
}

fn join_row<S: AsRef<str>>(fields: &[S]) -> String {
    fields
        .iter()
        .map(|f| quote(f.as_ref()))
        .collect::<Vec<_>>()
        .join(",")
}

fn order_row(record: &Record<Order>) -> [String; 8] {
    let order = &record.data;
    let order_id = if order.order_number.is_empty() {
        record.id_str().to_owned()
    } else {
        order.order_number.clone()
    };

    [
        order_id,
        order.customer.full_name(),
        order.customer.phone.clone(),
        order.items_summary(),
        format_price(order.total),
        order.payment_method.as_str().to_owned(),
        order.payment_status.as_str().to_owned(),
        order.delivery_status.as_str().to_owned(),
    ]
}

/// Render orders as CSV, or `None` when there is nothing to export.
#[must_use]
pub fn orders_csv(orders: &[Record<Order>]) -> Option<String> {
    if orders.is_empty() {
        return None;
    }

    let rows: Vec<String> = std::iter::once(join_row(&HEADERS))
        .chain(orders.iter().map(|record| join_row(&order_row(record))))
        .collect();
    Some(rows.join("\n"))
}

/// Download file name for an export made on `date`.
#[must_use]
pub fn export_filename(date: chrono::NaiveDate) -> String {
    format!("orders-{}.csv", date.format("%Y-%m-%d"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{NaiveDate, TimeZone, Utc};
    use rust_decimal::Decimal;
    use shopfloor_core::{
        CustomerSnapshot, DeliveryStatus, OrderId, OrderItem, PaymentMethod, PaymentStatus,
    };

    use super::*;

    fn order(first: &str, phone: &str, items: &[(&str, u32)], cents: i64) -> Order {
        Order {
            order_number: "SF-20240501-AAAAAA".to_owned(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            items: items
                .iter()
                .map(|(name, quantity)| OrderItem {
                    product_id: String::new(),
                    name: (*name).to_owned(),
                    quantity: *quantity,
                    price: Decimal::ZERO,
                    total: Decimal::ZERO,
                })
                .collect(),
            subtotal: Decimal::new(cents, 2),
            total: Decimal::new(cents, 2),
            payment_method: PaymentMethod::Yoco,
            payment_status: PaymentStatus::Paid,
            delivery_status: DeliveryStatus::NotDelivered,
            customer: CustomerSnapshot {
                first_name: first.to_owned(),
                last_name: "Dlamini".to_owned(),
                phone: phone.to_owned(),
                ..CustomerSnapshot::default()
            },
        }
    }

    fn record(id: &str, order: Order) -> Record<Order> {
        let at = order.created_at;
        Record::new(OrderId::new(id), order, at)
    }

    #[test]
    fn test_empty_export_is_none() {
        assert!(orders_csv(&[]).is_none());
    }

    #[test]
    fn test_header_and_row_layout() {
        let csv = orders_csv(&[record(
            "doc1",
            order("Sipho", "0821234567", &[("Mug", 2), ("Apron", 1)], 17900),
        )])
        .unwrap();

        let lines: Vec<&str> = csv.split('\n').collect();
        assert_eq!(lines.len(), 2);
        assert_eq!(
            lines[0],
            "\"Order ID\",\"Customer\",\"Phone\",\"Items\",\"Total\",\"Payment Method\",\"Payment Status\",\"Delivery Status\""
        );
        assert_eq!(
            lines[1],
            "\"SF-20240501-AAAAAA\",\"Sipho Dlamini\",\"0821234567\",\"Mug x2, Apron x1\",\"R179.00\",\"yoco\",\"paid\",\"not delivered\""
        );
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_embedded_quotes_are_doubled() {
        let csv = orders_csv(&[record(
            "doc1",
            order("Sipho \"Sips\"", "", &[("12\" Umbrella", 1)], 100),
        )])
        .unwrap();
        assert!(csv.contains("\"Sipho \"\"Sips\"\" Dlamini\""));
        assert!(csv.contains("\"12\"\" Umbrella x1\""));
    }

    #[test]
    fn test_missing_order_number_uses_document_id() {
        let mut o = order("A", "", &[], 0);
        o.order_number = String::new();
        let csv = orders_csv(&[record("abc123", o)]).unwrap();
        assert!(csv.lines().nth(1).unwrap().starts_with("\"abc123\","));
    }

    #[test]
    fn test_export_filename() {
        let date = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap();
        assert_eq!(export_filename(date), "orders-2024-05-01.csv");
    }
}
