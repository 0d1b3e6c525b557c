//! Search and selector filtering for list pages.
//!
//! Lists are filtered in memory after a whole-collection fetch; the result
//! keeps the input order.

use serde::{Deserialize, Serialize};

use super::catalog::Product;
use super::order::Order;
use super::record::Record;

/// Selector value that matches every record.
pub const ALL: &str = "all";

/// Query-string filter: free-text search plus a category or status selector.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListFilter {
    #[serde(alias = "q")]
    pub search: String,
    #[serde(alias = "category", alias = "status")]
    pub selector: String,
}

impl ListFilter {
    #[must_use]
    pub fn new(search: impl Into<String>, selector: impl Into<String>) -> Self {
        Self {
            search: search.into(),
            selector: selector.into(),
        }
    }

    /// Lowercased, trimmed search term.
    fn needle(&self) -> String {
        self.search.trim().to_lowercase()
    }

    /// Whether the selector is unset or "all".
    #[must_use]
    pub fn selects_all(&self) -> bool {
        let selector = self.selector.trim();
        selector.is_empty() || selector.eq_ignore_ascii_case(ALL)
    }

    /// Selector value for re-rendering the form, "all" when unset.
    #[must_use]
    pub fn selector_or_all(&self) -> &str {
        if self.selects_all() {
            ALL
        } else {
            self.selector.trim()
        }
    }

    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.search.trim().is_empty() || !self.selects_all()
    }
}

/// Products whose name contains the search term (case-insensitive) and whose
/// category equals the selector.
#[must_use]
pub fn filter_products<'a>(
    products: &'a [Record<Product>],
    filter: &ListFilter,
) -> Vec<&'a Record<Product>> {
    let needle = filter.needle();
    let all = filter.selects_all();
    let category = filter.selector.trim();

    products
        .iter()
        .filter(|record| record.data.name.to_lowercase().contains(&needle))
        .filter(|record| all || record.data.category == category)
        .collect()
}

/// Orders whose customer name or document id contains the search term and
/// whose payment status equals the selector, both case-insensitive.
#[must_use]
pub fn filter_orders<'a>(
    orders: &'a [Record<Order>],
    filter: &ListFilter,
) -> Vec<&'a Record<Order>> {
    let needle = filter.needle();
    let all = filter.selects_all();
    let status = filter.selector.trim().to_lowercase();

    orders
        .iter()
        .filter(|record| {
            record
                .data
                .customer
                .full_name()
                .to_lowercase()
                .contains(&needle)
                || record.id_str().to_lowercase().contains(&needle)
                || record.data.order_number.to_lowercase().contains(&needle)
        })
        .filter(|record| all || record.data.payment_status.as_str() == status)
        .collect()
}
