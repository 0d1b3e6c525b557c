//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                       - Liveness check (main.rs)
//! GET  /health/ready                 - Readiness check (main.rs)
//!
//! # Dashboard
//! GET  /                             - Headline figures, low stock, best sellers
//!
//! # Inventory
//! GET  /inventory                    - Product list (?q=, ?category=)
//! GET  /inventory/new                - New product form
//! POST /inventory                    - Create product
//! GET  /inventory/{id}/edit          - Edit product form
//! POST /inventory/{id}               - Update product
//! POST /inventory/{id}/delete        - Delete product
//!
//! # Orders
//! GET  /orders                       - Order list (?q=, ?status=)
//! GET  /orders/export.csv            - Download all orders as CSV
//! GET  /orders/{id}/edit             - Order detail and status form
//! POST /orders/{id}                  - Update payment/delivery status
//!
//! # Invoices
//! GET  /invoice/{id}                 - Printable invoice
//! GET  /invoice/{id}/pdf             - Invoice as A4 PDF (needs render service)
//!
//! # Business info
//! GET  /business-info                - Records, counts and create form
//! POST /business-info                - Create record
//! GET  /business-info/{id}/edit      - Edit record form
//! POST /business-info/{id}           - Update record
//! POST /business-info/{id}/delete    - Delete record
//!
//! # Customers
//! GET  /customers                    - Customers aggregated from orders
//! ```

use askama::Template;
use axum::{
    Router,
    http::StatusCode,
    response::{Html, IntoResponse, Response},
    routing::{get, post},
};

use crate::error::Result;
use crate::filters;
use crate::state::AppState;

pub mod business_info;
pub mod customers;
pub mod dashboard;
pub mod inventory;
pub mod invoice;
pub mod orders;

/// Render a template into an HTML response.
///
/// # Errors
///
/// Returns `AppError::Template` if rendering fails.
pub fn render(template: &impl Template) -> Result<Html<String>> {
    Ok(Html(template.render()?))
}

/// Select option for templates.
#[derive(Debug, Clone)]
pub struct SelectOption {
    pub value: String,
    pub label: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>, label: impl Into<String>, selected: bool) -> Self {
        Self {
            value: value.into(),
            label: label.into(),
            selected,
        }
    }
}

/// Not-found page template.
#[derive(Template)]
#[template(path = "not_found.html")]
pub struct NotFoundTemplate {
    pub current_path: String,
    pub message: String,
}

/// 404 page with a specific message.
///
/// # Errors
///
/// Returns `AppError::Template` if rendering fails.
pub fn not_found_page(current_path: &str, message: impl Into<String>) -> Result<Response> {
    let template = NotFoundTemplate {
        current_path: current_path.to_owned(),
        message: message.into(),
    };
    Ok((StatusCode::NOT_FOUND, render(&template)?).into_response())
}

async fn fallback() -> Result<Response> {
    not_found_page("", "The page you are looking for does not exist.")
}

/// Build the admin router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(dashboard::index))
        // Inventory
        .route("/inventory", get(inventory::index).post(inventory::create))
        .route("/inventory/new", get(inventory::new_product))
        .route("/inventory/{id}", post(inventory::update))
        .route("/inventory/{id}/edit", get(inventory::edit))
        .route("/inventory/{id}/delete", post(inventory::delete))
        // Orders
        .route("/orders", get(orders::index))
        .route("/orders/export.csv", get(orders::export_csv))
        .route("/orders/{id}", post(orders::update))
        .route("/orders/{id}/edit", get(orders::edit))
        // Invoices
        .route("/invoice/{id}", get(invoice::show))
        .route("/invoice/{id}/pdf", get(invoice::pdf))
        // Business info
        .route(
            "/business-info",
            get(business_info::index).post(business_info::create),
        )
        .route("/business-info/{id}", post(business_info::update))
        .route("/business-info/{id}/edit", get(business_info::edit))
        .route("/business-info/{id}/delete", post(business_info::delete))
        // Customers
        .route("/customers", get(customers::index))
        .fallback(fallback)
}
