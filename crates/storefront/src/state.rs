//! Application state shared across handlers.

use std::sync::Arc;

use sqlx::PgPool;

use crate::business::BusinessContext;
use crate::config::StorefrontConfig;

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: StorefrontConfig,
    pool: PgPool,
    business: BusinessContext,
}

impl AppState {
    #[must_use]
    pub fn new(config: StorefrontConfig, pool: PgPool) -> Self {
        let business =
            BusinessContext::new(config.business_info_id.clone(), config.business_info_ttl);

        Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                business,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &StorefrontConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    /// Business info context (cached).
    #[must_use]
    pub fn business(&self) -> &BusinessContext {
        &self.inner.business
    }
}
