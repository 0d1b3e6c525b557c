//! Integration tests for Shopfloor.
//!
//! # Running Tests
//!
//! ```bash
//! # Cross-crate tests, no services needed
//! cargo test -p shopfloor-integration-tests
//!
//! # HTTP tests against running servers and a seeded database
//! sf-cli migrate
//! sf-cli seed catalog crates/cli/seed/catalog.yaml
//! cargo test -p shopfloor-integration-tests -- --ignored
//! ```
//!
//! # Test Categories
//!
//! - `order_flow` - cart to order to exports, no I/O
//! - `admin_forms` - product form parsing and invoice PDF assembly
//! - `storefront_http` - storefront over HTTP (ignored by default)
//! - `admin_http` - back office over HTTP (ignored by default)
//! - `store_live` - document store against `DATABASE_URL` (ignored by default)
//!
//! Server addresses come from `STOREFRONT_BASE_URL` and `ADMIN_BASE_URL`.

use chrono::{DateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use shopfloor_core::{
    Cart, CustomerSnapshot, NewCartItem, Order, OrderId, PaymentMethod, Product, ProductId,
    ProductStatus, Record, Variant,
};

/// Base URL for the storefront.
#[must_use]
pub fn storefront_base_url() -> String {
    std::env::var("STOREFRONT_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_owned())
}

/// Base URL for the back office.
#[must_use]
pub fn admin_base_url() -> String {
    std::env::var("ADMIN_BASE_URL").unwrap_or_else(|_| "http://localhost:3001".to_owned())
}

/// HTTP client that keeps cookies (the storefront cart lives in the session)
/// and does not follow redirects, so tests can assert on them.
///
/// # Panics
///
/// Panics if the client cannot be built.
#[must_use]
pub fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("Failed to create HTTP client")
}

/// Fixed timestamp for deterministic order numbers and dates.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 5, 14, 9, 30, 0)
        .single()
        .expect("valid timestamp")
}

/// Apron with two variants, one of them low on stock.
#[must_use]
pub fn apron() -> Record<Product> {
    let variant = |color: &str, stock: u32| Variant {
        variant_type: "Apron".to_owned(),
        color: color.to_owned(),
        size: "Medium".to_owned(),
        selling_price: Decimal::new(24999, 2),
        stock_price: Decimal::new(12000, 2),
        stock_quantity: stock,
        description: String::new(),
        images: Vec::new(),
    };

    Record::new(
        ProductId::new("apron"),
        Product {
            product_number: 1,
            name: "Premium Apron".to_owned(),
            category: "Aprons".to_owned(),
            supplier: "Acme Textiles".to_owned(),
            product_image: "https://img.example/apron.png".to_owned(),
            batch_number: "APR-1".to_owned(),
            status: ProductStatus::InStock,
            last_restocked: None,
            variants: vec![variant("Navy Blue", 12), variant("Red", 2)],
        },
        fixed_now(),
    )
}

/// Cart line for variant `index` of `product`, the way the storefront
/// builds one.
///
/// # Panics
///
/// Panics if the product has no variant at `index`.
#[must_use]
pub fn cart_item(product: &Record<Product>, index: usize) -> NewCartItem {
    let variant = product
        .data
        .variant(index)
        .expect("variant index out of range");
    NewCartItem {
        id: format!("{}:{index}", product.id_str()),
        name: format!("{} - {}", product.data.name, variant.label()),
        price: variant.selling_price,
        category: product.data.category.clone(),
        image: product.data.product_image.clone(),
    }
}

/// Customer details as captured at checkout.
#[must_use]
pub fn customer(first_name: &str, email: &str) -> CustomerSnapshot {
    CustomerSnapshot {
        first_name: first_name.to_owned(),
        last_name: "Nkosi".to_owned(),
        email: email.to_owned(),
        phone: "082 555 0101".to_owned(),
        address: "12 Long Street".to_owned(),
        city: "Cape Town".to_owned(),
        postal_code: "8001".to_owned(),
        province: "Western Cape".to_owned(),
    }
}

/// Place an order for `cart` and wrap it as a stored record.
#[must_use]
pub fn place_order(id: &str, cart: &Cart, customer: CustomerSnapshot) -> Record<Order> {
    let now = fixed_now();
    let order = Order::from_cart(
        cart,
        customer,
        PaymentMethod::Cash,
        shopfloor_core::order_number(now, &id.to_ascii_uppercase()),
        now,
    );
    Record::new(OrderId::new(id), order, now)
}
