//! Database migration command.
//!
//! Migrations live in `crates/store/migrations/` and are embedded in the
//! binary. They create the `documents` table and the `tower_sessions`
//! schema used by the storefront.

use super::{CommandError, connect};

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    tracing::info!("Running migrations...");
    shopfloor_store::MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
