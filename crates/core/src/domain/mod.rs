//! Domain logic: catalog, cart, orders, business info and the aggregates
//! derived from them.

pub mod business;
pub mod cart;
pub mod catalog;
pub mod filter;
pub mod order;
pub mod record;
pub mod stats;

pub use business::{BusinessInfo, BusinessInfoCounts, BusinessInfoForm};
pub use cart::{Cart, CartItem, NewCartItem, capped_quantity};
pub use catalog::{
    CATEGORIES, LOW_STOCK_THRESHOLD, Product, ProductDraft, Variant, VariantDraft,
    next_product_number,
};
pub use filter::{ListFilter, filter_orders, filter_products};
pub use order::{
    CheckoutForm, CustomerProfile, CustomerSnapshot, CustomerSummary, Order, OrderItem,
    OrderStatusUpdate, customers_from_orders, order_number,
};
pub use record::{Collection, Entity, Record};
pub use stats::{DashboardStats, OrderStats, ProductSales, low_stock};
