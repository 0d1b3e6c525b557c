//! Shopfloor Core - Shared types and domain logic.
//!
//! This crate is used by every Shopfloor component:
//! - `storefront` - Public catalog, cart and checkout
//! - `admin` - Back office (inventory, orders, invoices, business info)
//! - `cli` - Migrations and catalog seeding
//!
//! # Architecture
//!
//! The core crate holds types and pure functions only - no database access,
//! no HTTP. Cart aggregation, list filtering and dashboard statistics all
//! operate on values the callers have already fetched.
//!
//! # Modules
//!
//! - [`types`] - Newtype wrappers for IDs, prices, emails, and statuses
//! - [`domain`] - Products, carts, orders, business info and aggregates
//! - [`validation`] - Form validation errors

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod domain;
pub mod types;
pub mod validation;

pub use domain::*;
pub use types::*;
pub use validation::ValidationError;
