//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Catalog (same as /store)
//! GET  /store                  - Catalog with ?q= and ?category= filters
//!
//! # Products
//! GET  /products/{id}          - Product detail with variant selection
//! POST /products/{id}/add      - Add `quantity` units of one variant
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add one unit of a variant
//! POST /cart/update            - Set line quantity (0 removes the line)
//! POST /cart/remove            - Remove a line
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Customer details form
//! POST /checkout               - Place order, clear cart
//! GET  /order-success          - Receipt for the last order in this session
//!
//! # Pages
//! GET  /about                  - About the business
//! GET  /contact                - Contact details
//! ```

pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod pages;
pub mod products;

use axum::{
    Router,
    routing::{get, post},
};
use shopfloor_core::BusinessInfo;
use tower_sessions::Session;

use crate::middleware::{cart_rate_limiter, checkout_rate_limiter};
use crate::models::SessionCart;
use crate::state::AppState;

/// Business details shown in the navbar and footer.
#[derive(Clone)]
pub struct ShopView {
    pub name: String,
    pub description: String,
    pub address: String,
    pub phone: String,
    pub email: String,
    pub website: String,
    pub logo: Option<String>,
}

impl From<&BusinessInfo> for ShopView {
    fn from(info: &BusinessInfo) -> Self {
        Self {
            name: info.name.clone(),
            description: info.description.clone(),
            address: info.full_address(),
            phone: info.phone.clone(),
            email: info.email.clone(),
            website: info.website.clone(),
            logo: (!info.logo.is_empty()).then(|| info.logo.clone()),
        }
    }
}

/// Data shared by every full page: business details and the cart badge.
#[derive(Clone)]
pub struct PageContext {
    pub shop: ShopView,
    pub cart_count: u32,
}

impl PageContext {
    /// Load the shared page data for one request.
    pub async fn load(state: &AppState, session: &Session) -> Self {
        let info = state.business().get(state.pool()).await;
        let cart_count = SessionCart::new(session).load().await.item_count();
        Self {
            shop: ShopView::from(info.as_ref()),
            cart_count,
        }
    }
}

/// Create the cart routes router.
///
/// Writes share one rate limiter; reads are unlimited.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/count", get(cart::count))
        .merge(
            Router::new()
                .route("/add", post(cart::add))
                .route("/update", post(cart::update))
                .route("/remove", post(cart::remove))
                .route_layer(cart_rate_limiter()),
        )
}

/// Create all storefront routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(catalog::index))
        .route("/store", get(catalog::index))
        .route("/products/{id}", get(products::show))
        .route(
            "/products/{id}/add",
            post(products::add_to_cart).layer(cart_rate_limiter()),
        )
        .nest("/cart", cart_routes())
        .route(
            "/checkout",
            get(checkout::show).merge(post(checkout::place).layer(checkout_rate_limiter())),
        )
        .route("/order-success", get(pages::order_success))
        .route("/about", get(pages::about))
        .route("/contact", get(pages::contact))
        .fallback(pages::not_found)
}
