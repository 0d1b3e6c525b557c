//! Dashboard and order-page aggregates computed from full collections.

use std::collections::HashMap;

use chrono::{Datelike, NaiveDate};
use rust_decimal::Decimal;

use super::catalog::Product;
use super::order::Order;
use super::record::Record;
use crate::types::PaymentStatus;

/// Number of entries in the top-products list.
pub const TOP_PRODUCTS: usize = 3;

/// Units sold and revenue for one product across all orders.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductSales {
    pub name: String,
    pub units: u32,
    pub revenue: Decimal,
}

/// Headline numbers for the back-office dashboard.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardStats {
    pub total_products: usize,
    pub low_stock: usize,
    pub total_orders: usize,
    pub pending_orders: usize,
    pub customers: usize,
    pub monthly_revenue: Decimal,
    pub total_revenue: Decimal,
    pub top_products: Vec<ProductSales>,
}

impl DashboardStats {
    /// Compute all dashboard figures. `today` fixes the calendar month used
    /// for monthly revenue.
    #[must_use]
    pub fn compute(
        products: &[Record<Product>],
        orders: &[Record<Order>],
        customers: usize,
        today: NaiveDate,
    ) -> Self {
        let pending_orders = orders
            .iter()
            .filter(|o| o.data.payment_status == PaymentStatus::Pending)
            .count();

        Self {
            total_products: products.len(),
            low_stock: low_stock(products).len(),
            total_orders: orders.len(),
            pending_orders,
            customers,
            monthly_revenue: monthly_revenue(orders.iter().map(|o| &o.data), today),
            total_revenue: orders.iter().map(|o| o.data.total).sum(),
            top_products: top_products(products, orders, TOP_PRODUCTS),
        }
    }
}

/// Products whose aggregate stock is at or below the low-stock threshold.
#[must_use]
pub fn low_stock(products: &[Record<Product>]) -> Vec<&Record<Product>> {
    products.iter().filter(|p| p.data.is_low_stock()).collect()
}

/// Sum of order totals placed in the same calendar month and year as `today`.
#[must_use]
pub fn monthly_revenue<'a>(orders: impl IntoIterator<Item = &'a Order>, today: NaiveDate) -> Decimal {
    orders
        .into_iter()
        .filter(|order| {
            let date = order.order_date();
            date.month() == today.month() && date.year() == today.year()
        })
        .map(|order| order.total)
        .sum()
}

/// Best sellers by units sold, ties broken by revenue and then name.
///
/// Lines are grouped by product document id; lines from orders that predate
/// product ids are grouped by item name. Names come from the current catalog
/// when the product still exists.
#[must_use]
pub fn top_products(
    products: &[Record<Product>],
    orders: &[Record<Order>],
    limit: usize,
) -> Vec<ProductSales> {
    let catalog_names: HashMap<&str, &str> = products
        .iter()
        .map(|p| (p.id_str(), p.data.name.as_str()))
        .collect();

    let mut sales: HashMap<&str, ProductSales> = HashMap::new();
    for item in orders.iter().flat_map(|o| o.data.items.iter()) {
        let key = match item.product_key() {
            "" => item.name.as_str(),
            id => id,
        };
        let entry = sales.entry(key).or_insert_with(|| ProductSales {
            name: catalog_names
                .get(key)
                .map_or_else(|| item.name.clone(), |name| (*name).to_owned()),
            units: 0,
            revenue: Decimal::ZERO,
        });
        entry.units = entry.units.saturating_add(item.quantity);
        entry.revenue += item.total;
    }

    let mut ranked: Vec<_> = sales.into_values().collect();
    ranked.sort_by(|a, b| {
        b.units
            .cmp(&a.units)
            .then_with(|| b.revenue.cmp(&a.revenue))
            .then_with(|| a.name.cmp(&b.name))
    });
    ranked.truncate(limit);
    ranked
}

/// Figures shown above the orders table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderStats {
    pub count: usize,
    pub pending: usize,
    pub paid: usize,
    pub revenue: Decimal,
}

impl OrderStats {
    #[must_use]
    pub fn compute<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        orders.into_iter().fold(Self::default(), |mut stats, order| {
            stats.count += 1;
            stats.revenue += order.total;
            match order.payment_status {
                PaymentStatus::Pending => stats.pending += 1,
                PaymentStatus::Paid => stats.paid += 1,
                PaymentStatus::Failed => {}
            }
            stats
        })
    }
}
