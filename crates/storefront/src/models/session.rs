//! Session-related types.
//!
//! The cart lives in the session, so its lifetime is the session's lifetime.
//! Checkout clears it explicitly.

use serde::{Deserialize, Serialize};
use shopfloor_core::{Cart, Order, OrderId};
use tower_sessions::Session;

/// Session keys.
pub mod keys {
    /// Key for the shopping cart.
    pub const CART: &str = "cart";

    /// Key for the most recently placed order (receipt page).
    pub const LAST_ORDER: &str = "last_order";
}

/// Most recently placed order, kept so the receipt survives a reload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LastOrder {
    pub id: OrderId,
    pub order: Order,
}

/// Cart handle bound to one session.
pub struct SessionCart<'a> {
    session: &'a Session,
}

impl<'a> SessionCart<'a> {
    #[must_use]
    pub const fn new(session: &'a Session) -> Self {
        Self { session }
    }

    /// Load the cart, starting empty when none is stored or it cannot be read.
    pub async fn load(&self) -> Cart {
        match self.session.get::<Cart>(keys::CART).await {
            Ok(cart) => cart.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read cart from session");
                Cart::default()
            }
        }
    }

    /// Persist the cart.
    ///
    /// # Errors
    ///
    /// Returns the session store error if the write fails.
    pub async fn save(&self, cart: &Cart) -> Result<(), tower_sessions::session::Error> {
        self.session.insert(keys::CART, cart).await
    }

    /// Drop the cart from the session.
    ///
    /// # Errors
    ///
    /// Returns the session store error if the write fails.
    pub async fn clear(&self) -> Result<(), tower_sessions::session::Error> {
        self.session.remove_value(keys::CART).await.map(|_| ())
    }
}
