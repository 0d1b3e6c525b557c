//! Checkout route handlers.
//!
//! Placing an order writes the order document, upserts the customer
//! document, remembers the order in the session for the receipt page and
//! clears the cart.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use rand::Rng;
use rand::distr::Alphanumeric;
use shopfloor_core::{CheckoutForm, CustomerProfile, Order, PaymentMethod, order_number};
use shopfloor_store::DocumentStore;
use tower_sessions::Session;
use tracing::instrument;

use super::PageContext;
use super::cart::CartView;
use crate::error::Result;
use crate::filters;
use crate::models::{LastOrder, SessionCart, keys};
use crate::state::AppState;

/// Length of the random part of an order number.
const ORDER_SUFFIX_LEN: usize = 6;

/// Payment method radio option.
#[derive(Clone)]
pub struct PaymentOptionView {
    pub value: &'static str,
    pub label: &'static str,
    pub checked: bool,
}

fn payment_options(selected: &str) -> Vec<PaymentOptionView> {
    let selected = selected.parse::<PaymentMethod>().unwrap_or_default();
    PaymentMethod::all()
        .iter()
        .map(|method| PaymentOptionView {
            value: method.as_str(),
            label: method.label(),
            checked: *method == selected,
        })
        .collect()
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub page: PageContext,
    pub cart: CartView,
    pub form: CheckoutForm,
    pub payment_options: Vec<PaymentOptionView>,
    pub error: Option<String>,
}

/// Random uppercase alphanumeric order number suffix.
fn order_suffix() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(ORDER_SUFFIX_LEN)
        .map(|b| char::from(b).to_ascii_uppercase())
        .collect()
}

/// Display the checkout form. An empty cart redirects to the cart page.
#[instrument(skip(state, session))]
pub async fn show(State(state): State<AppState>, session: Session) -> Response {
    let cart = SessionCart::new(&session).load().await;
    if cart.is_empty() {
        return Redirect::to("/cart").into_response();
    }

    CheckoutTemplate {
        page: PageContext::load(&state, &session).await,
        cart: CartView::from(&cart),
        form: CheckoutForm::default(),
        payment_options: payment_options(""),
        error: None,
    }
    .into_response()
}

/// Place an order from the session cart.
///
/// Validation failures re-render the form with the first error and
/// status 422.
///
/// # Errors
///
/// Returns an error if the order cannot be stored or the session cannot be
/// written.
#[instrument(skip(state, session, form))]
pub async fn place(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let carts = SessionCart::new(&session);
    let cart = carts.load().await;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let (customer, payment_method) = match form.validate() {
        Ok(valid) => valid,
        Err(e) => {
            tracing::debug!(error = %e, "Checkout validation failed");
            let template = CheckoutTemplate {
                page: PageContext::load(&state, &session).await,
                cart: CartView::from(&cart),
                payment_options: payment_options(&form.payment_method),
                form,
                error: Some(e.to_string()),
            };
            return Ok((StatusCode::UNPROCESSABLE_ENTITY, template).into_response());
        }
    };

    let now = Utc::now();
    let order = Order::from_cart(
        &cart,
        customer,
        payment_method,
        order_number(now, &order_suffix()),
        now,
    );

    let store = DocumentStore::new(state.pool());
    let record = store.insert(&order).await?;

    // The order is placed at this point; the customer document is derived
    // data and a failed write only loses the profile refresh.
    let (customer_id, profile) = CustomerProfile::from_order(&order);
    if let Err(e) = store.set(&customer_id, &profile).await {
        tracing::warn!(error = %e, customer_id = %customer_id, "Failed to upsert customer");
    }

    tracing::info!(
        order_id = %record.id,
        order_number = %order.order_number,
        total = %order.total,
        items = order.item_count(),
        "Order placed"
    );

    session
        .insert(
            keys::LAST_ORDER,
            LastOrder {
                id: record.id,
                order,
            },
        )
        .await?;
    carts.clear().await?;

    Ok(Redirect::to("/order-success").into_response())
}
