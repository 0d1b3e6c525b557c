//! Shopfloor Admin library.
//!
//! This crate provides the back office as a library, allowing it to be
//! tested and reused.
//!
//! # Security
//!
//! The back office has no login of its own and can edit every collection.
//! It binds to loopback unless explicitly allowed otherwise; see
//! [`config`].

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod export;
pub mod filters;
pub mod middleware;
pub mod routes;
pub mod state;
