//! Shopping cart aggregation.
//!
//! The cart is a plain value: the storefront loads it from the session,
//! mutates it and writes it back, so nothing here touches I/O.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Item details captured when a product is put in the cart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCartItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub image: String,
}

/// Units of an item that may still be added when `in_cart` are already in
/// the cart and `stock` are available.
#[must_use]
pub const fn capped_quantity(requested: u32, in_cart: u32, stock: u32) -> u32 {
    let room = stock.saturating_sub(in_cart);
    if requested < room { requested } else { room }
}

/// One cart line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    pub id: String,
    pub name: String,
    pub price: Decimal,
    pub category: String,
    pub image: String,
    pub quantity: u32,
}

impl CartItem {
    /// Unit price times quantity.
    #[must_use]
    pub fn line_total(&self) -> Decimal {
        self.price * Decimal::from(self.quantity)
    }
}

/// Ordered list of cart lines, at most one per item id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,
}

impl Cart {
    #[must_use]
    pub const fn new() -> Self {
        Self { items: Vec::new() }
    }

    #[must_use]
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    /// Add one unit: bumps the quantity of an existing line or appends a new
    /// line with quantity 1.
    pub fn add(&mut self, item: NewCartItem) {
        self.add_quantity(item, 1);
    }

    /// Add `quantity` units of an item. Zero is ignored.
    pub fn add_quantity(&mut self, item: NewCartItem, quantity: u32) {
        if quantity == 0 {
            return;
        }
        if let Some(line) = self.items.iter_mut().find(|line| line.id == item.id) {
            line.quantity = line.quantity.saturating_add(quantity);
            return;
        }
        self.items.push(CartItem {
            id: item.id,
            name: item.name,
            price: item.price,
            category: item.category,
            image: item.image,
            quantity,
        });
    }

    /// Set a line's quantity; zero removes the line. Returns false when the
    /// id is not in the cart.
    pub fn set_quantity(&mut self, id: &str, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(id);
        }
        match self.items.iter_mut().find(|line| line.id == id) {
            Some(line) => {
                line.quantity = quantity;
                true
            }
            None => false,
        }
    }

    /// Remove a line. Returns whether anything was removed.
    pub fn remove(&mut self, id: &str) -> bool {
        let before = self.items.len();
        self.items.retain(|line| line.id != id);
        self.items.len() != before
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Sum of quantities across all lines, saturating at `u32::MAX`.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.items
            .iter()
            .map(|line| line.quantity)
            .fold(0, u32::saturating_add)
    }

    /// Quantity already in the cart for `id`, zero when absent.
    #[must_use]
    pub fn quantity_of(&self, id: &str) -> u32 {
        self.items
            .iter()
            .find(|line| line.id == id)
            .map_or(0, |line| line.quantity)
    }

    #[must_use]
    pub fn subtotal(&self) -> Decimal {
        self.items.iter().map(CartItem::line_total).sum()
    }

    /// Amount due. No delivery fee or tax is charged, so this equals the
    /// subtotal.
    #[must_use]
    pub fn total(&self) -> Decimal {
        self.subtotal()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn item(id: &str, cents: i64) -> NewCartItem {
        NewCartItem {
            id: id.to_owned(),
            name: format!("Item {id}"),
            price: Decimal::new(cents, 2),
            category: "Mugs".to_owned(),
            image: String::new(),
        }
    }

    #[test]
    fn test_adding_same_id_twice_increments_quantity() {
        let mut cart = Cart::new();
        cart.add(item("1", 2999));
        cart.add(item("1", 2999));

        assert_eq!(cart.items().len(), 1);
        assert_eq!(cart.items()[0].quantity, 2);
        assert_eq!(cart.total(), Decimal::new(2999, 2) * Decimal::from(2));
    }

    #[test]
    fn test_item_count_is_sum_of_quantities() {
        let mut cart = Cart::new();
        cart.add(item("1", 100));
        cart.add_quantity(item("2", 250), 3);
        cart.add(item("1", 100));

        assert_eq!(cart.items().len(), 2);
        assert_eq!(cart.item_count(), 5);
        assert_eq!(cart.subtotal(), Decimal::new(950, 2));
        assert_eq!(cart.total(), cart.subtotal());
    }

    #[test]
    fn test_set_quantity_zero_removes() {
        let mut cart = Cart::new();
        cart.add(item("1", 100));
        cart.add(item("2", 100));

        assert!(cart.set_quantity("1", 4));
        assert_eq!(cart.item_count(), 5);
        assert!(cart.set_quantity("1", 0));
        assert_eq!(cart.items().len(), 1);
        assert!(!cart.set_quantity("missing", 2));
    }

    #[test]
    fn test_remove_and_clear() {
        let mut cart = Cart::new();
        cart.add(item("1", 100));
        assert!(!cart.remove("2"));
        assert!(cart.remove("1"));
        assert!(cart.is_empty());

        cart.add(item("3", 100));
        cart.clear();
        assert_eq!(cart.item_count(), 0);
        assert_eq!(cart.total(), Decimal::ZERO);
    }

    #[test]
    fn test_item_count_saturates_across_lines() {
        let mut cart = Cart::new();
        cart.add_quantity(item("p:0", 100), u32::MAX);
        cart.add_quantity(item("p:1", 100), 1);
        assert_eq!(cart.item_count(), u32::MAX);
    }

    #[test]
    fn test_capped_quantity_respects_stock_in_cart() {
        assert_eq!(capped_quantity(3, 0, 10), 3);
        assert_eq!(capped_quantity(u32::MAX, 2, 10), 8);
        assert_eq!(capped_quantity(1, 10, 10), 0);
        assert_eq!(capped_quantity(5, 12, 10), 0);
    }

    #[test]
    fn test_quantity_of() {
        let mut cart = Cart::new();
        cart.add_quantity(item("a", 100), 4);
        assert_eq!(cart.quantity_of("a"), 4);
        assert_eq!(cart.quantity_of("b"), 0);
    }

    #[test]
    fn test_add_zero_quantity_is_ignored() {
        let mut cart = Cart::new();
        cart.add_quantity(item("1", 100), 0);
        assert!(cart.is_empty());
    }

    #[test]
    fn test_serde_preserves_lines() {
        let mut cart = Cart::new();
        cart.add_quantity(item("a", 4599), 2);
        let json = serde_json::to_value(&cart).unwrap();
        let back: Cart = serde_json::from_value(json).unwrap();
        assert_eq!(back, cart);
    }
}
