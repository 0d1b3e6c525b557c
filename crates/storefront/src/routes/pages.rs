//! Receipt, business info and not-found pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use shopfloor_core::{Order, format_price};
use tower_sessions::Session;
use tracing::instrument;

use super::PageContext;
use crate::filters;
use crate::models::{LastOrder, keys};
use crate::state::AppState;

/// Receipt line display data.
#[derive(Clone)]
pub struct ReceiptLineView {
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub total: String,
}

/// Receipt display data for templates.
#[derive(Clone)]
pub struct ReceiptView {
    pub order_id: String,
    pub order_number: String,
    pub date: String,
    pub customer_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub items: Vec<ReceiptLineView>,
    pub subtotal: String,
    pub total: String,
    pub payment_method: String,
    pub payment_status: String,
    pub payment_badge: &'static str,
    pub delivery_status: String,
}

impl ReceiptView {
    fn new(order_id: &str, order: &Order) -> Self {
        Self {
            order_id: order_id.to_owned(),
            order_number: order.order_number.clone(),
            date: order.created_at.format("%d %B %Y, %H:%M").to_string(),
            customer_name: order.customer.full_name(),
            email: order.customer.email.clone(),
            phone: order.customer.phone.clone(),
            address: order.customer.full_address(),
            items: order
                .items
                .iter()
                .map(|item| ReceiptLineView {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    price: format_price(item.price),
                    total: format_price(item.total),
                })
                .collect(),
            subtotal: format_price(order.subtotal),
            total: format_price(order.total),
            payment_method: order.payment_method.label().to_owned(),
            payment_status: order.payment_status.label().to_owned(),
            payment_badge: order.payment_status.badge().class(),
            delivery_status: order.delivery_status.label().to_owned(),
        }
    }
}

/// Order success (receipt) page template.
#[derive(Template, WebTemplate)]
#[template(path = "order_success.html")]
pub struct OrderSuccessTemplate {
    pub page: PageContext,
    pub receipt: Option<ReceiptView>,
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "about.html")]
pub struct AboutTemplate {
    pub page: PageContext,
    pub category: String,
}

/// Contact page template.
#[derive(Template, WebTemplate)]
#[template(path = "contact.html")]
pub struct ContactTemplate {
    pub page: PageContext,
}

/// Not-found page template.
#[derive(Template, WebTemplate)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub page: PageContext,
    pub message: String,
}

/// Display the receipt for the last order placed in this session.
///
/// Without one, the page shows a "no order" message.
#[instrument(skip(state, session))]
pub async fn order_success(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let receipt = match session.get::<LastOrder>(keys::LAST_ORDER).await {
        Ok(last) => last.map(|last| ReceiptView::new(last.id.as_str(), &last.order)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to read last order from session");
            None
        }
    };

    OrderSuccessTemplate {
        page: PageContext::load(&state, &session).await,
        receipt,
    }
}

/// Display the about page.
#[instrument(skip(state, session))]
pub async fn about(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let info = state.business().get(state.pool()).await;
    AboutTemplate {
        page: PageContext::load(&state, &session).await,
        category: info.category.clone(),
    }
}

/// Display the contact page.
#[instrument(skip(state, session))]
pub async fn contact(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    ContactTemplate {
        page: PageContext::load(&state, &session).await,
    }
}

/// Fallback for unknown paths.
#[instrument(skip(state, session))]
pub async fn not_found(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        NotFoundTemplate {
            page: PageContext::load(&state, &session).await,
            message: "The page you are looking for does not exist.".to_owned(),
        },
    )
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use rust_decimal::Decimal;
    use shopfloor_core::{
        CustomerSnapshot, DeliveryStatus, OrderItem, PaymentMethod, PaymentStatus,
    };

    use super::*;

    fn order() -> Order {
        Order {
            order_number: "SF-20240501-ABC123".to_owned(),
            created_at: Utc.with_ymd_and_hms(2024, 5, 1, 14, 30, 0).unwrap(),
            items: vec![OrderItem {
                product_id: "p1:0".to_owned(),
                name: "Mug - Large White".to_owned(),
                quantity: 2,
                price: Decimal::new(8950, 2),
                total: Decimal::new(17900, 2),
            }],
            subtotal: Decimal::new(17900, 2),
            total: Decimal::new(17900, 2),
            payment_method: PaymentMethod::Yoco,
            payment_status: PaymentStatus::Pending,
            delivery_status: DeliveryStatus::NotDelivered,
            customer: CustomerSnapshot {
                first_name: "Thandi".to_owned(),
                last_name: "Nkosi".to_owned(),
                email: "thandi@example.com".to_owned(),
                ..CustomerSnapshot::default()
            },
        }
    }

    #[test]
    fn test_receipt_view() {
        let view = ReceiptView::new("doc1", &order());
        assert_eq!(view.order_id, "doc1");
        assert_eq!(view.date, "01 May 2024, 14:30");
        assert_eq!(view.customer_name, "Thandi Nkosi");
        assert_eq!(view.items[0].price, "R89.50");
        assert_eq!(view.total, "R179.00");
        assert_eq!(view.payment_method, "Yoco (card)");
        assert_eq!(view.payment_badge, "badge-secondary");
        assert_eq!(view.delivery_status, "Not delivered");
    }
}
