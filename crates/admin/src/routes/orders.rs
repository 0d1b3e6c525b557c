//! Order list, status editing and CSV export handlers.

use askama::Template;
use axum::{
    Form,
    extract::{Path, Query, State},
    http::{StatusCode, header},
    response::{Html, IntoResponse, Redirect, Response},
};
use chrono::Utc;
use shopfloor_core::{
    Collection, DeliveryStatus, ListFilter, Order, OrderId, OrderStats, OrderStatusUpdate,
    PaymentMethod, PaymentStatus, Record, filter_orders, format_price,
};
use tracing::instrument;

use super::{SelectOption, not_found_page, render};
use crate::error::Result;
use crate::export::csv::{export_filename, orders_csv};
use crate::filters;
use crate::state::AppState;

/// Order row for the orders table.
#[derive(Debug, Clone)]
pub struct OrderRowView {
    pub id: String,
    pub order_number: String,
    pub date: String,
    pub customer_name: String,
    pub email: String,
    pub items: String,
    pub total: String,
    pub payment_method: &'static str,
    pub payment_status: &'static str,
    pub payment_badge: &'static str,
    pub delivery_status: &'static str,
    pub delivery_badge: &'static str,
}

impl From<&Record<Order>> for OrderRowView {
    fn from(record: &Record<Order>) -> Self {
        let order = &record.data;
        Self {
            id: record.id_str().to_owned(),
            order_number: order.order_number.clone(),
            date: order.created_at.format("%Y-%m-%d %H:%M").to_string(),
            customer_name: order.customer.full_name(),
            email: order.customer.email.clone(),
            items: order.items_summary(),
            total: format_price(order.total),
            payment_method: order.payment_method.label(),
            payment_status: order.payment_status.label(),
            payment_badge: order.payment_status.badge().class(),
            delivery_status: order.delivery_status.label(),
            delivery_badge: order.delivery_status.badge().class(),
        }
    }
}

/// Figures above the orders table.
#[derive(Debug, Clone)]
pub struct OrderStatsView {
    pub count: usize,
    pub pending: usize,
    pub paid: usize,
    pub revenue: String,
}

impl From<&OrderStats> for OrderStatsView {
    fn from(stats: &OrderStats) -> Self {
        Self {
            count: stats.count,
            pending: stats.pending,
            paid: stats.paid,
            revenue: format_price(stats.revenue),
        }
    }
}

/// Orders list template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersIndexTemplate {
    pub current_path: String,
    pub orders: Vec<OrderRowView>,
    pub stats: OrderStatsView,
    pub search: String,
    pub statuses: Vec<SelectOption>,
}

impl OrdersIndexTemplate {
    /// Rows follow the filter; the stats cover every order.
    fn new(orders: &[Record<Order>], filter: &ListFilter) -> Self {
        Self {
            current_path: "/orders".to_owned(),
            orders: filter_orders(orders, filter)
                .into_iter()
                .map(OrderRowView::from)
                .collect(),
            stats: OrderStatsView::from(&OrderStats::compute(orders.iter().map(|r| &r.data))),
            search: filter.search.trim().to_owned(),
            statuses: payment_status_filter(filter.selector_or_all()),
        }
    }
}

/// Order line on the edit page.
#[derive(Debug, Clone)]
pub struct OrderLineView {
    pub name: String,
    pub quantity: u32,
    pub price: String,
    pub total: String,
}

/// Order edit template.
#[derive(Template)]
#[template(path = "orders/edit.html")]
pub struct OrderEditTemplate {
    pub current_path: String,
    pub order: OrderRowView,
    pub address: String,
    pub phone: String,
    pub lines: Vec<OrderLineView>,
    pub subtotal: String,
    pub payment_methods: Vec<SelectOption>,
    pub payment_statuses: Vec<SelectOption>,
    pub delivery_statuses: Vec<SelectOption>,
    pub pdf_enabled: bool,
}

fn payment_status_filter(selected: &str) -> Vec<SelectOption> {
    PaymentStatus::all()
        .iter()
        .map(|s| SelectOption::new(s.as_str(), s.label(), s.as_str().eq_ignore_ascii_case(selected)))
        .collect()
}

impl OrderEditTemplate {
    fn new(record: &Record<Order>, pdf_enabled: bool) -> Self {
        let order = &record.data;
        let current = OrderStatusUpdate::of(order);

        Self {
            current_path: "/orders".to_owned(),
            order: OrderRowView::from(record),
            address: order.customer.full_address(),
            phone: order.customer.phone.clone(),
            lines: order
                .items
                .iter()
                .map(|item| OrderLineView {
                    name: item.name.clone(),
                    quantity: item.quantity,
                    price: format_price(item.price),
                    total: format_price(item.total),
                })
                .collect(),
            subtotal: format_price(order.subtotal),
            payment_methods: PaymentMethod::all()
                .iter()
                .map(|m| SelectOption::new(m.as_str(), m.label(), *m == current.payment_method))
                .collect(),
            payment_statuses: PaymentStatus::all()
                .iter()
                .map(|s| SelectOption::new(s.as_str(), s.label(), *s == current.payment_status))
                .collect(),
            delivery_statuses: DeliveryStatus::all()
                .iter()
                .map(|s| SelectOption::new(s.as_str(), s.label(), *s == current.delivery_status))
                .collect(),
            pdf_enabled,
        }
    }
}

/// Orders list handler, filtered by `q` (customer name or id) and `status`
/// (payment status).
///
/// # Errors
///
/// Returns an error if the order collection cannot be read.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(filter): Query<ListFilter>,
) -> Result<Html<String>> {
    let orders = state.store().list::<Order>().await?;
    render(&OrdersIndexTemplate::new(&orders, &filter))
}

/// Order detail and status form handler.
///
/// # Errors
///
/// Returns an error if the order cannot be read.
#[instrument(skip(state))]
pub async fn edit(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response> {
    let Some(record) = state.store().get::<Order>(&OrderId::new(id)).await? else {
        return not_found_page("/orders", "Order not found.");
    };

    let template = OrderEditTemplate::new(&record, state.renderer().is_some());
    Ok(render(&template)?.into_response())
}

/// Update payment method, payment status and delivery status.
///
/// The status fields are merged into the stored document. Unknown orders get
/// the not-found page and nothing is written.
///
/// # Errors
///
/// Returns an error if the order cannot be read or the write fails.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(update): Form<OrderStatusUpdate>,
) -> Result<Response> {
    let store = state.store();
    if store.get::<Order>(&OrderId::new(id.as_str())).await?.is_none() {
        tracing::warn!(order_id = %id, "Status update for unknown order");
        return not_found_page("/orders", "Order not found.");
    }

    // A concurrent delete between the read and the merge would recreate a
    // status-only document; the merge result reports that case.
    let existed = store
        .merge(Collection::Orders, &id, &update.to_patch())
        .await?;
    if !existed {
        store.delete(Collection::Orders, &id).await?;
        tracing::warn!(order_id = %id, "Order deleted during status update");
        return not_found_page("/orders", "Order not found.");
    }

    tracing::info!(
        order_id = %id,
        payment_method = update.payment_method.as_str(),
        payment_status = update.payment_status.as_str(),
        delivery_status = update.delivery_status.as_str(),
        "Order status updated"
    );

    Ok(Redirect::to("/orders").into_response())
}

/// Download every order as CSV. Responds 204 No Content when there are no
/// orders.
///
/// # Errors
///
/// Returns an error if the order collection cannot be read.
#[instrument(skip(state))]
pub async fn export_csv(State(state): State<AppState>) -> Result<Response> {
    let orders = state.store().list::<Order>().await?;
    let Some(csv) = orders_csv(&orders) else {
        tracing::info!("CSV export requested with no orders");
        return Ok(StatusCode::NO_CONTENT.into_response());
    };

    let filename = export_filename(Utc::now().date_naive());
    tracing::info!(orders = orders.len(), filename = %filename, "Orders exported");

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_owned()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{filename}\""),
            ),
        ],
        csv,
    )
        .into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::TimeZone;
    use rust_decimal::Decimal;
    use shopfloor_core::{CustomerSnapshot, OrderItem};

    use super::*;

    fn record() -> Record<Order> {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 14, 30, 0).unwrap();
        let order = Order {
            order_number: "SF-20240501-ABC123".to_owned(),
            created_at,
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
            delivery_status: DeliveryStatus::Processing,
            customer: CustomerSnapshot {
                first_name: "Thandi".to_owned(),
                last_name: "Nkosi".to_owned(),
                email: "thandi@example.com".to_owned(),
                ..CustomerSnapshot::default()
            },
        };
        Record::new(OrderId::new("o1"), order, created_at)
    }

    #[test]
    fn test_order_row_view() {
        let row = OrderRowView::from(&record());
        assert_eq!(row.date, "2024-05-01 14:30");
        assert_eq!(row.items, "Mug - Large White x2");
        assert_eq!(row.total, "R179.00");
        assert_eq!(row.payment_badge, "badge-secondary");
        assert_eq!(row.delivery_badge, "badge-secondary");
    }

    #[test]
    fn test_edit_template_preselects_current_status() {
        let template = OrderEditTemplate::new(&record(), false);
        let selected = |options: &[SelectOption]| {
            options
                .iter()
                .filter(|o| o.selected)
                .map(|o| o.value.clone())
                .collect::<Vec<_>>()
        };
        assert_eq!(selected(&template.payment_methods), vec!["yoco"]);
        assert_eq!(selected(&template.payment_statuses), vec!["pending"]);
        assert_eq!(selected(&template.delivery_statuses), vec!["processing"]);
        assert_eq!(template.lines[0].price, "R89.50");
    }

    #[test]
    fn test_index_stats_cover_all_orders() {
        let pending = record();
        let mut paid = record();
        paid.id = OrderId::new("o2");
        paid.data.payment_status = PaymentStatus::Paid;
        paid.data.customer.first_name = "Pieter".to_owned();
        let orders = vec![pending, paid];

        let template = OrdersIndexTemplate::new(&orders, &ListFilter::new("thandi", "all"));
        assert_eq!(template.orders.len(), 1);
        assert_eq!(template.orders[0].id, "o1");
        assert_eq!(template.stats.count, 2);
        assert_eq!(template.stats.pending, 1);
        assert_eq!(template.stats.paid, 1);
        assert_eq!(template.stats.revenue, "R358.00");

        let template = OrdersIndexTemplate::new(&orders, &ListFilter::new("", "paid"));
        assert_eq!(template.orders.len(), 1);
        assert_eq!(template.stats.count, 2);
    }

    #[test]
    fn test_status_filter_marks_selector() {
        let options = payment_status_filter("Paid");
        assert_eq!(options.iter().filter(|o| o.selected).count(), 1);
        assert!(payment_status_filter("all").iter().all(|o| !o.selected));
    }
}
