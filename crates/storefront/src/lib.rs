//! Shopfloor storefront library.
//!
//! Public catalog, session cart, checkout and receipt pages. The binary in
//! `main.rs` wires these modules into an axum server; keeping them in a
//! library lets tests and the integration-tests crate reuse them.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod business;
pub mod config;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod state;
