//! Customers list route handler.
//!
//! Customers are derived from orders, so the list also covers buyers whose
//! customer document was never written.

use askama::Template;
use axum::{extract::State, response::Html};
use shopfloor_core::{CustomerSummary, Order, customers_from_orders, format_price};
use tracing::instrument;

use super::render;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Customer view for templates.
#[derive(Debug, Clone)]
pub struct CustomerView {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub location: String,
    pub orders_count: usize,
    pub total_spent: String,
    pub last_order: String,
}

impl From<&CustomerSummary> for CustomerView {
    fn from(summary: &CustomerSummary) -> Self {
        let contact = &summary.contact;
        let location = [contact.city.trim(), contact.province.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            name: contact.full_name(),
            email: contact.email.clone(),
            phone: contact.phone.clone(),
            location,
            orders_count: summary.order_count,
            total_spent: format_price(summary.total_spent),
            last_order: summary.last_order_at.format("%Y-%m-%d").to_string(),
        }
    }
}

/// Customers list template.
#[derive(Template)]
#[template(path = "customers.html")]
pub struct CustomersIndexTemplate {
    pub current_path: String,
    pub customers: Vec<CustomerView>,
}

/// Customers list handler.
///
/// # Errors
///
/// Returns an error if the order collection cannot be read.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let orders = state.store().list::<Order>().await?;
    let customers = customers_from_orders(orders.iter().map(|r| &r.data));

    let template = CustomersIndexTemplate {
        current_path: "/customers".to_owned(),
        customers: customers.iter().map(CustomerView::from).collect(),
    };
    render(&template)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use shopfloor_core::CustomerSnapshot;

    use super::*;

    #[test]
    fn test_customer_view_location() {
        let summary = CustomerSummary {
            contact: CustomerSnapshot {
                first_name: "Ayanda".to_owned(),
                last_name: "Khumalo".to_owned(),
                city: "Pretoria".to_owned(),
                province: "Gauteng".to_owned(),
                ..CustomerSnapshot::default()
            },
            order_count: 3,
            total_spent: Decimal::new(45000, 2),
            last_order_at: Utc.with_ymd_and_hms(2024, 6, 9, 12, 0, 0).unwrap(),
        };
        let view = CustomerView::from(&summary);
        assert_eq!(view.location, "Pretoria, Gauteng");
        assert_eq!(view.total_spent, "R450.00");
        assert_eq!(view.last_order, "2024-06-09");

        let summary = CustomerSummary {
            contact: CustomerSnapshot::default(),
            ..summary
        };
        assert_eq!(CustomerView::from(&summary).location, "");
    }
}
