//! Cart route handlers.
//!
//! The cart lives in the session. Writes redirect back to the cart page, or
//! return the count badge fragment with an `HX-Trigger` header when the
//! request comes from htmx.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use shopfloor_core::{
    Cart, CartItem, NewCartItem, Product, ProductId, capped_quantity, format_price,
};
use shopfloor_store::DocumentStore;
use tower_sessions::Session;
use tracing::instrument;

use super::PageContext;
use crate::error::{AppError, Result};
use crate::filters;
use crate::models::SessionCart;
use crate::state::AppState;

/// Cart line display data for templates.
#[derive(Clone)]
pub struct CartItemView {
    pub id: String,
    pub name: String,
    pub category: String,
    pub image: Option<String>,
    pub quantity: u32,
    pub price: String,
    pub line_total: String,
}

impl From<&CartItem> for CartItemView {
    fn from(item: &CartItem) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            category: item.category.clone(),
            image: (!item.image.is_empty()).then(|| item.image.clone()),
            quantity: item.quantity,
            price: format_price(item.price),
            line_total: format_price(item.line_total()),
        }
    }
}

/// Cart display data for templates.
#[derive(Clone)]
pub struct CartView {
    pub items: Vec<CartItemView>,
    pub subtotal: String,
    pub total: String,
    pub item_count: u32,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            items: cart.items().iter().map(CartItemView::from).collect(),
            subtotal: format_price(cart.subtotal()),
            total: format_price(cart.total()),
            item_count: cart.item_count(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub product_id: String,
    #[serde(default)]
    pub variant: usize,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub id: String,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart/show.html")]
pub struct CartShowTemplate {
    pub page: PageContext,
    pub cart: CartView,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

/// Put `quantity` units of one product variant in the session cart.
///
/// The quantity is capped so the cart never holds more of a variant than is
/// in stock. Returns the new cart item count.
///
/// # Errors
///
/// - `NotFound` if the product does not exist or has no such variant
/// - `BadRequest` if the variant is out of stock or already fully in the cart
/// - `Store`/`Session` errors from the underlying backends
pub async fn add_variant(
    state: &AppState,
    session: &Session,
    product_id: &ProductId,
    variant_index: usize,
    quantity: u32,
) -> Result<u32> {
    let record = DocumentStore::new(state.pool())
        .get::<Product>(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;
    let product = &record.data;

    let variant = product
        .variant(variant_index)
        .ok_or_else(|| AppError::NotFound(format!("variant {variant_index} of {product_id}")))?;
    if !product.in_stock() || !variant.in_stock() {
        return Err(AppError::BadRequest(format!(
            "{} is out of stock",
            product.line_name(variant)
        )));
    }

    let line_id = Product::cart_item_id(product_id, variant_index);
    let carts = SessionCart::new(session);
    let mut cart = carts.load().await;

    let allowed = capped_quantity(quantity, cart.quantity_of(&line_id), variant.stock_quantity);
    if allowed == 0 {
        return Err(AppError::BadRequest(format!(
            "Only {} of {} in stock, all already in your cart",
            variant.stock_quantity,
            product.line_name(variant)
        )));
    }
    if allowed < quantity {
        tracing::debug!(requested = quantity, allowed, line_id = %line_id, "Quantity capped to stock");
    }

    let image = variant
        .images
        .first()
        .cloned()
        .unwrap_or_else(|| product.product_image.clone());

    cart.add_quantity(
        NewCartItem {
            id: line_id,
            name: product.line_name(variant),
            price: variant.selling_price,
            category: product.category.clone(),
            image,
        },
        allowed,
    );
    carts.save(&cart).await?;

    tracing::info!(
        product_id = %product_id,
        variant = variant_index,
        quantity = allowed,
        "Added to cart"
    );

    Ok(cart.item_count())
}

/// Split a cart line id (`<product id>:<variant index>`) into its parts.
fn parse_line_id(id: &str) -> Option<(ProductId, usize)> {
    let (product_id, index) = id.rsplit_once(':')?;
    if product_id.is_empty() {
        return None;
    }
    Some((ProductId::new(product_id), index.parse().ok()?))
}

/// Stock of the variant behind a cart line, or `None` when the product or
/// variant no longer exists.
async fn line_stock(state: &AppState, line_id: &str) -> Result<Option<u32>> {
    let Some((product_id, index)) = parse_line_id(line_id) else {
        return Ok(None);
    };
    let product = DocumentStore::new(state.pool())
        .get::<Product>(&product_id)
        .await?;
    Ok(product.and_then(|r| r.data.variant(index).map(|v| v.stock_quantity)))
}

/// Whether the request was issued by htmx.
fn is_htmx(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Display cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> impl IntoResponse {
    let cart = SessionCart::new(&session).load().await;

    CartShowTemplate {
        page: PageContext::load(&state, &session).await,
        cart: CartView::from(&cart),
    }
}

/// Add one unit of a variant to the cart.
///
/// # Errors
///
/// See [`add_variant`].
#[instrument(skip(state, session, headers))]
pub async fn add(
    State(state): State<AppState>,
    session: Session,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product_id = ProductId::new(form.product_id);
    let count = add_variant(&state, &session, &product_id, form.variant, 1).await?;

    if is_htmx(&headers) {
        return Ok((
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate { count },
        )
            .into_response());
    }
    Ok(Redirect::to("/cart").into_response())
}

/// Set the quantity of a cart line, capped to the variant's stock; zero
/// removes it.
///
/// # Errors
///
/// Returns an error if the product cannot be read or the session cannot be
/// written.
#[instrument(skip(state, session))]
pub async fn update(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<UpdateCartForm>,
) -> Result<Redirect> {
    let carts = SessionCart::new(&session);
    let mut cart = carts.load().await;

    let quantity = match line_stock(&state, &form.id).await? {
        Some(stock) => capped_quantity(form.quantity, 0, stock),
        None => form.quantity,
    };

    if cart.set_quantity(&form.id, quantity) {
        carts.save(&cart).await?;
    } else {
        tracing::debug!(id = %form.id, "Cart line not found for update");
    }

    Ok(Redirect::to("/cart"))
}

/// Remove a line from the cart.
///
/// # Errors
///
/// Returns an error if the session cannot be written.
#[instrument(skip(session))]
pub async fn remove(session: Session, Form(form): Form<RemoveFromCartForm>) -> Result<Redirect> {
    let carts = SessionCart::new(&session);
    let mut cart = carts.load().await;

    if cart.remove(&form.id) {
        carts.save(&cart).await?;
    }

    Ok(Redirect::to("/cart"))
}

/// Get cart count badge.
#[instrument(skip(session))]
pub async fn count(session: Session) -> impl IntoResponse {
    let count = SessionCart::new(&session).load().await.item_count();
    CartCountTemplate { count }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;

    fn item(id: &str, cents: i64, image: &str) -> NewCartItem {
        NewCartItem {
            id: id.to_owned(),
            name: format!("Item {id}"),
            price: Decimal::new(cents, 2),
            category: "Mugs".to_owned(),
            image: image.to_owned(),
        }
    }

    #[test]
    fn test_cart_view_formats_prices() {
        let mut cart = Cart::new();
        cart.add_quantity(item("a:0", 4599, ""), 2);
        cart.add(item("b:1", 1000, "https://img.example/b.png"));

        let view = CartView::from(&cart);
        assert_eq!(view.item_count, 3);
        assert_eq!(view.subtotal, "R101.98");
        assert_eq!(view.total, view.subtotal);
        assert_eq!(view.items[0].line_total, "R91.98");
        assert!(view.items[0].image.is_none());
        assert_eq!(
            view.items[1].image.as_deref(),
            Some("https://img.example/b.png")
        );
    }

    #[test]
    fn test_count_fragment_renders_number() {
        let html = CartCountTemplate { count: 4 }.render().unwrap();
        assert!(html.contains('4'));
    }

    #[test]
    fn test_parse_line_id() {
        assert_eq!(
            parse_line_id("apron-1:2"),
            Some((ProductId::new("apron-1"), 2))
        );
        assert_eq!(parse_line_id("a:b:0"), Some((ProductId::new("a:b"), 0)));
        assert_eq!(parse_line_id("apron-1"), None);
        assert_eq!(parse_line_id(":0"), None);
        assert_eq!(parse_line_id("apron-1:x"), None);
    }

    #[test]
    fn test_is_htmx() {
        let mut headers = HeaderMap::new();
        assert!(!is_htmx(&headers));
        headers.insert("hx-request", "true".parse().unwrap());
        assert!(is_htmx(&headers));
    }
}
