//! Dashboard route handler.

use askama::Template;
use axum::{extract::State, response::Html};
use chrono::Utc;
use shopfloor_core::{
    Collection, DashboardStats, Order, Product, ProductSales, Record, format_price, low_stock,
};
use tracing::instrument;

use super::render;
use crate::error::Result;
use crate::filters;
use crate::state::AppState;

/// Number of orders listed under "Recent orders".
const RECENT_ORDERS: usize = 5;

/// Dashboard metrics, formatted for display.
#[derive(Debug, Clone)]
pub struct DashboardMetrics {
    pub total_products: usize,
    pub low_stock: usize,
    pub total_orders: usize,
    pub pending_orders: usize,
    pub customers: usize,
    pub monthly_revenue: String,
    pub total_revenue: String,
}

impl From<&DashboardStats> for DashboardMetrics {
    fn from(stats: &DashboardStats) -> Self {
        Self {
            total_products: stats.total_products,
            low_stock: stats.low_stock,
            total_orders: stats.total_orders,
            pending_orders: stats.pending_orders,
            customers: stats.customers,
            monthly_revenue: format_price(stats.monthly_revenue),
            total_revenue: format_price(stats.total_revenue),
        }
    }
}

/// Best-seller row.
#[derive(Debug, Clone)]
pub struct TopProductView {
    pub name: String,
    pub units: u32,
    pub revenue: String,
}

impl From<&ProductSales> for TopProductView {
    fn from(sales: &ProductSales) -> Self {
        Self {
            name: sales.name.clone(),
            units: sales.units,
            revenue: format_price(sales.revenue),
        }
    }
}

/// Low-stock row.
#[derive(Debug, Clone)]
pub struct LowStockView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub stock: u32,
}

/// Recent order row.
#[derive(Debug, Clone)]
pub struct RecentOrderView {
    pub id: String,
    pub number: String,
    pub customer_name: String,
    pub total: String,
    pub status: &'static str,
    pub status_badge: &'static str,
}

impl From<&Record<Order>> for RecentOrderView {
    fn from(record: &Record<Order>) -> Self {
        let order = &record.data;
        Self {
            id: record.id_str().to_owned(),
            number: order.order_number.clone(),
            customer_name: order.customer.full_name(),
            total: format_price(order.total),
            status: order.payment_status.label(),
            status_badge: order.payment_status.badge().class(),
        }
    }
}

/// Dashboard template.
#[derive(Template)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub current_path: String,
    pub metrics: DashboardMetrics,
    pub low_stock: Vec<LowStockView>,
    pub top_products: Vec<TopProductView>,
    pub recent_orders: Vec<RecentOrderView>,
}

/// Newest orders first, at most `limit`.
fn recent_orders(orders: &[Record<Order>], limit: usize) -> Vec<RecentOrderView> {
    let mut sorted: Vec<&Record<Order>> = orders.iter().collect();
    sorted.sort_by(|a, b| b.data.created_at.cmp(&a.data.created_at));
    sorted
        .into_iter()
        .take(limit)
        .map(RecentOrderView::from)
        .collect()
}

/// Dashboard page handler.
///
/// # Errors
///
/// Returns an error if a collection cannot be read.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<Html<String>> {
    let store = state.store();
    let products = store.list::<Product>().await?;
    let orders = store.list::<Order>().await?;
    let customers = store.count(Collection::Customers).await?;

    let stats = DashboardStats::compute(
        &products,
        &orders,
        usize::try_from(customers).unwrap_or(usize::MAX),
        Utc::now().date_naive(),
    );

    let template = DashboardTemplate {
        current_path: "/".to_owned(),
        metrics: DashboardMetrics::from(&stats),
        low_stock: low_stock(&products)
            .into_iter()
            .map(|record| LowStockView {
                id: record.id_str().to_owned(),
                name: record.data.name.clone(),
                category: record.data.category.clone(),
                stock: record.data.total_stock(),
            })
            .collect(),
        top_products: stats.top_products.iter().map(TopProductView::from).collect(),
        recent_orders: recent_orders(&orders, RECENT_ORDERS),
    };

    render(&template)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{Duration, TimeZone, Utc};
    use rust_decimal::Decimal;
    use shopfloor_core::{
        CustomerSnapshot, DeliveryStatus, OrderId, PaymentMethod, PaymentStatus,
    };

    use super::*;

    fn order(number: &str, days: i64) -> Record<Order> {
        let created_at = Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap() + Duration::days(days);
        let order = Order {
            order_number: number.to_owned(),
            created_at,
            items: vec![],
            subtotal: Decimal::new(10000, 2),
            total: Decimal::new(10000, 2),
            payment_method: PaymentMethod::Cash,
            payment_status: PaymentStatus::Paid,
            delivery_status: DeliveryStatus::Delivered,
            customer: CustomerSnapshot {
                first_name: "Sipho".to_owned(),
                last_name: "Dlamini".to_owned(),
                ..CustomerSnapshot::default()
            },
        };
        Record::new(OrderId::new(number), order, created_at)
    }

    #[test]
    fn test_recent_orders_newest_first() {
        let orders = vec![order("A", 0), order("B", 2), order("C", 1)];
        let recent = recent_orders(&orders, 2);
        let numbers: Vec<_> = recent.iter().map(|o| o.number.as_str()).collect();
        assert_eq!(numbers, vec!["B", "C"]);
        assert_eq!(recent[0].total, "R100.00");
        assert_eq!(recent[0].customer_name, "Sipho Dlamini");
        assert_eq!(recent[0].status_badge, "badge-default");
    }
}
