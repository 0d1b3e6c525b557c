//! Shopfloor Store - document collections over `PostgreSQL`.
//!
//! # Database
//!
//! All four collections live in a single `documents` table keyed by
//! `(collection, id)` with the document body in a `JSONB` column:
//!
//! - `products` - Catalog products with embedded variants
//! - `orders` - Placed orders with an embedded customer snapshot
//! - `customers` - Last-known contact details, upserted at checkout
//! - `businessInfo` - Business details records
//!
//! Sessions are stored by `tower-sessions-sqlx-store` in
//! `tower_sessions.session`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/store/migrations/` and run via:
//! ```bash
//! cargo run -p shopfloor-cli -- migrate
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

mod documents;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};
use sqlx::PgPool;
use sqlx::migrate::Migrator;
use sqlx::postgres::PgPoolOptions;

pub use documents::{DOCUMENT_ID_LEN, DocumentStore, generate_document_id};
pub use shopfloor_core::{Collection, Entity, Record};

/// Embedded schema migrations.
pub static MIGRATOR: Migrator = sqlx::migrate!("./migrations");

/// Errors from document store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A stored document no longer matches its type.
    #[error("corrupt document {collection}/{id}: {source}")]
    DataCorruption {
        collection: Collection,
        id: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("document {collection}/{id} not found")]
    NotFound { collection: Collection, id: String },
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
