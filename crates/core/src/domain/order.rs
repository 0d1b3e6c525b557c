//! Orders, checkout input and the customer aggregate derived from orders.

use std::collections::HashMap;

use chrono::{DateTime, Days, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::cart::Cart;
use super::record::{Collection, Entity};
use crate::types::{CustomerId, DeliveryStatus, Email, OrderId, PaymentMethod, PaymentStatus};
use crate::validation::{ValidationError, parse_required, required};

/// Days between order date and invoice due date.
pub const INVOICE_DUE_DAYS: u64 = 7;

/// A placed order with an embedded copy of the customer's details.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    #[serde(rename = "orderId")]
    pub order_number: String,
    pub created_at: DateTime<Utc>,
    pub items: Vec<OrderItem>,
    pub subtotal: Decimal,
    pub total: Decimal,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub delivery_status: DeliveryStatus,
    pub customer: CustomerSnapshot,
}

impl Entity for Order {
    const COLLECTION: Collection = Collection::Orders;
    type Id = OrderId;
}

/// One order line, priced at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Cart line id (`<product id>:<variant index>`); empty on legacy orders.
    #[serde(default)]
    pub product_id: String,
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
    pub total: Decimal,
}

impl OrderItem {
    /// Product document id without the variant suffix.
    #[must_use]
    pub fn product_key(&self) -> &str {
        self.product_id
            .split_once(':')
            .map_or(self.product_id.as_str(), |(id, _)| id)
    }
}

/// Customer details as entered at checkout.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerSnapshot {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub postal_code: String,
    pub province: String,
}

impl CustomerSnapshot {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
            .trim()
            .to_owned()
    }

    /// Address lines joined for display.
    #[must_use]
    pub fn full_address(&self) -> String {
        [&self.address, &self.city, &self.province, &self.postal_code]
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Grouping key: lowercased email, or name and phone when no email was
    /// captured.
    #[must_use]
    pub fn key(&self) -> String {
        let email = self.email.trim().to_lowercase();
        if email.is_empty() {
            format!(
                "{}|{}",
                self.full_name().to_lowercase(),
                self.phone.trim()
            )
        } else {
            email
        }
    }
}

/// Build an order number such as `SF-20240501-K3J9QZ`.
#[must_use]
pub fn order_number(now: DateTime<Utc>, suffix: &str) -> String {
    format!("SF-{}-{suffix}", now.format("%Y%m%d"))
}

impl Order {
    /// Snapshot a cart into a new pending order.
    #[must_use]
    pub fn from_cart(
        cart: &Cart,
        customer: CustomerSnapshot,
        payment_method: PaymentMethod,
        order_number: String,
        now: DateTime<Utc>,
    ) -> Self {
        let items = cart
            .items()
            .iter()
            .map(|line| OrderItem {
                product_id: line.id.clone(),
                name: line.name.clone(),
                quantity: line.quantity,
                price: line.price,
                total: line.line_total(),
            })
            .collect();

        Self {
            order_number,
            created_at: now,
            items,
            subtotal: cart.subtotal(),
            total: cart.total(),
            payment_method,
            payment_status: PaymentStatus::Pending,
            delivery_status: DeliveryStatus::NotDelivered,
            customer,
        }
    }

    /// "Premium Apron - Medium Navy Blue x2, Mug x1"
    #[must_use]
    pub fn items_summary(&self) -> String {
        self.items
            .iter()
            .map(|item| format!("{} x{}", item.name, item.quantity))
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .map(|item| item.quantity)
            .fold(0, u32::saturating_add)
    }

    #[must_use]
    pub fn invoice_number(&self) -> String {
        format!("INV-{}", self.order_number)
    }

    #[must_use]
    pub fn order_date(&self) -> NaiveDate {
        self.created_at.date_naive()
    }

    #[must_use]
    pub fn due_date(&self) -> NaiveDate {
        let date = self.order_date();
        date.checked_add_days(Days::new(INVOICE_DUE_DAYS))
            .unwrap_or(date)
    }

    /// Overwrite the status fields.
    pub fn apply_status(&mut self, update: &OrderStatusUpdate) {
        self.payment_method = update.payment_method;
        self.payment_status = update.payment_status;
        self.delivery_status = update.delivery_status;
    }
}

/// Status fields editable from the back office.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderStatusUpdate {
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub delivery_status: DeliveryStatus,
}

impl OrderStatusUpdate {
    /// Current status of an order, used to prefill the edit form.
    #[must_use]
    pub const fn of(order: &Order) -> Self {
        Self {
            payment_method: order.payment_method,
            payment_status: order.payment_status,
            delivery_status: order.delivery_status,
        }
    }

    /// Partial document holding only the status fields.
    #[must_use]
    pub fn to_patch(&self) -> serde_json::Value {
        serde_json::json!({
            "paymentMethod": self.payment_method,
            "paymentStatus": self.payment_status,
            "deliveryStatus": self.delivery_status,
        })
    }
}

/// Checkout form input.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutForm {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub payment_method: String,
}

impl CheckoutForm {
    /// Check required fields and the email address.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] in form order.
    pub fn validate(&self) -> Result<(CustomerSnapshot, PaymentMethod), ValidationError> {
        let first_name = required("first name", &self.first_name)?;
        let last_name = required("last name", &self.last_name)?;
        let email = Email::parse(&self.email)?;
        let phone = required("phone", &self.phone)?;
        let address = required("address", &self.address)?;
        let city = required("city", &self.city)?;
        let postal_code = required("postal code", &self.postal_code)?;
        let province = required("province", &self.province)?;
        let payment_method =
            parse_required("payment method", &self.payment_method, "cash or yoco")?;

        Ok((
            CustomerSnapshot {
                first_name,
                last_name,
                email: email.into_inner(),
                phone,
                address,
                city,
                postal_code,
                province,
            },
            payment_method,
        ))
    }
}

/// Customer document upserted at checkout, keyed by [`CustomerSnapshot::key`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerProfile {
    #[serde(flatten)]
    pub contact: CustomerSnapshot,
    pub last_order_number: String,
    pub last_order_at: DateTime<Utc>,
}

impl Entity for CustomerProfile {
    const COLLECTION: Collection = Collection::Customers;
    type Id = CustomerId;
}

impl CustomerProfile {
    #[must_use]
    pub fn from_order(order: &Order) -> (CustomerId, Self) {
        (
            CustomerId::new(order.customer.key()),
            Self {
                contact: order.customer.clone(),
                last_order_number: order.order_number.clone(),
                last_order_at: order.created_at,
            },
        )
    }
}

/// A customer as seen through their orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerSummary {
    pub contact: CustomerSnapshot,
    pub order_count: usize,
    pub total_spent: Decimal,
    pub last_order_at: DateTime<Utc>,
}

/// Group orders by customer. The most recent order supplies the contact
/// details; results are sorted by total spent, highest first.
#[must_use]
pub fn customers_from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Vec<CustomerSummary> {
    let mut by_key: HashMap<String, CustomerSummary> = HashMap::new();

    for order in orders {
        by_key
            .entry(order.customer.key())
            .and_modify(|summary| {
                summary.order_count += 1;
                summary.total_spent += order.total;
                if order.created_at > summary.last_order_at {
                    summary.last_order_at = order.created_at;
                    summary.contact = order.customer.clone();
                }
            })
            .or_insert_with(|| CustomerSummary {
                contact: order.customer.clone(),
                order_count: 1,
                total_spent: order.total,
                last_order_at: order.created_at,
            });
    }

    let mut customers: Vec<_> = by_key.into_values().collect();
    customers.sort_by(|a, b| {
        b.total_spent
            .cmp(&a.total_spent)
            .then_with(|| a.contact.full_name().cmp(&b.contact.full_name()))
    });
    customers
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::domain::cart::NewCartItem;

    pub(crate) fn customer(first: &str, last: &str, email: &str) -> CustomerSnapshot {
        CustomerSnapshot {
            first_name: first.to_owned(),
            last_name: last.to_owned(),
            email: email.to_owned(),
            phone: "0821234567".to_owned(),
            address: "1 Long St".to_owned(),
            city: "Cape Town".to_owned(),
            postal_code: "8001".to_owned(),
            province: "Western Cape".to_owned(),
        }
    }

    pub(crate) fn order_at(
        customer: CustomerSnapshot,
        total_cents: i64,
        at: DateTime<Utc>,
    ) -> Order {
        let total = Decimal::new(total_cents, 2);
        Order {
            order_number: "SF-1".to_owned(),
            created_at: at,
            items: vec![OrderItem {
                product_id: "p1:0".to_owned(),
                name: "Mug".to_owned(),
                quantity: 1,
                price: total,
                total,
            }],
            subtotal: total,
            total,
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Pending,
            delivery_status: DeliveryStatus::NotDelivered,
            customer,
        }
    }

    fn checkout_form() -> CheckoutForm {
        CheckoutForm {
            first_name: "Jane".to_owned(),
            last_name: "Doe".to_owned(),
            email: "jane@example.com".to_owned(),
            phone: "0821234567".to_owned(),
            address: "1 Long St".to_owned(),
            city: "Cape Town".to_owned(),
            postal_code: "8001".to_owned(),
            province: "Western Cape".to_owned(),
            payment_method: "yoco".to_owned(),
        }
    }

    #[test]
    fn test_from_cart_snapshots_lines() {
        let mut cart = Cart::new();
        let apron = NewCartItem {
            id: "abc:0".to_owned(),
            name: "Apron - Medium Navy".to_owned(),
            price: Decimal::new(4599, 2),
            category: "Aprons".to_owned(),
            image: String::new(),
        };
        cart.add(apron.clone());
        cart.add(apron);

        let now = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let order = Order::from_cart(
            &cart,
            customer("Jane", "Doe", "jane@example.com"),
            PaymentMethod::Yoco,
            order_number(now, "ABC123"),
            now,
        );

        assert_eq!(order.order_number, "SF-20240501-ABC123");
        assert_eq!(order.items[0].quantity, 2);
        assert_eq!(order.items[0].total, Decimal::new(9198, 2));
        assert_eq!(order.total, order.subtotal);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.items_summary(), "Apron - Medium Navy x2");
        assert_eq!(order.items[0].product_key(), "abc");
    }

    #[test]
    fn test_invoice_dates() {
        let now = Utc.with_ymd_and_hms(2024, 12, 28, 23, 0, 0).unwrap();
        let order = order_at(customer("A", "B", "a@b.co"), 100, now);
        assert_eq!(order.due_date(), NaiveDate::from_ymd_opt(2025, 1, 4).unwrap());
        assert_eq!(order.invoice_number(), "INV-SF-1");
    }

    #[test]
    fn test_status_update_patch_uses_stored_names() {
        let update = OrderStatusUpdate {
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Paid,
            delivery_status: DeliveryStatus::NotDelivered,
        };
        let patch = update.to_patch();
        assert_eq!(patch["paymentStatus"], "paid");
        assert_eq!(patch["deliveryStatus"], "not delivered");

        let mut order = order_at(customer("A", "B", "a@b.co"), 100, Utc::now());
        order.apply_status(&update);
        assert_eq!(OrderStatusUpdate::of(&order), update);
    }

    #[test]
    fn test_checkout_validation() {
        let (snapshot, method) = checkout_form().validate().unwrap();
        assert_eq!(snapshot.full_name(), "Jane Doe");
        assert_eq!(method, PaymentMethod::Yoco);

        let mut form = checkout_form();
        form.city = String::new();
        assert_eq!(form.validate(), Err(ValidationError::Required("city")));

        let mut form = checkout_form();
        form.email = "jane".to_owned();
        assert!(matches!(form.validate(), Err(ValidationError::Email(_))));
    }

    #[test]
    fn test_customers_grouped_by_email() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let orders = [
            order_at(customer("Jane", "Doe", "Jane@Example.com"), 1000, early),
            order_at(customer("Janet", "Doe", "jane@example.com"), 2000, late),
            order_at(customer("Sam", "Lee", "sam@example.com"), 500, early),
        ];

        let customers = customers_from_orders(&orders);
        assert_eq!(customers.len(), 2);
        assert_eq!(customers[0].order_count, 2);
        assert_eq!(customers[0].total_spent, Decimal::new(3000, 2));
        assert_eq!(customers[0].contact.first_name, "Janet");
        assert_eq!(customers[0].last_order_at, late);
    }

    #[test]
    fn test_customer_key_falls_back_to_name_and_phone() {
        let c = customer("Jane", "Doe", "");
        assert_eq!(c.key(), "jane doe|0821234567");
    }

    #[test]
    fn test_legacy_document_parses() {
        let json = serde_json::json!({
            "orderId": "1001",
            "createdAt": "2024-05-01T10:00:00Z",
            "items": [{"name": "Mug", "price": 29.99, "quantity": 1, "total": 29.99}],
            "subtotal": 29.99,
            "total": 29.99,
            "paymentMethod": "cash",
            "paymentStatus": "Pending",
            "deliveryStatus": "not delivered",
            "customer": {"firstName": "Jane", "lastName": "Doe", "phone": "1"}
        });
        let order: Order = serde_json::from_value(json).unwrap();
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.items[0].product_key(), "");
        assert_eq!(order.customer.email, "");
    }
}
