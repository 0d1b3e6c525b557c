//! Application state shared across handlers.

use std::sync::Arc;

use shopfloor_core::{BusinessInfo, Record};
use shopfloor_store::{DocumentStore, StoreError};
use sqlx::PgPool;

use crate::config::AdminConfig;
use crate::export::{RenderClient, RenderError};

/// Application state shared across all handlers.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    pool: PgPool,
    renderer: Option<RenderClient>,
}

impl AppState {
    /// Build the state, creating the render client when one is configured.
    ///
    /// # Errors
    ///
    /// Returns an error if the render service HTTP client cannot be built.
    pub fn new(config: AdminConfig, pool: PgPool) -> Result<Self, RenderError> {
        let renderer = config.render.as_ref().map(RenderClient::new).transpose()?;
        if renderer.is_none() {
            tracing::info!("RENDER_SERVICE_URL not set, invoice PDF export disabled");
        }

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                pool,
                renderer,
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn pool(&self) -> &PgPool {
        &self.inner.pool
    }

    #[must_use]
    pub fn store(&self) -> DocumentStore<'_> {
        DocumentStore::new(&self.inner.pool)
    }

    /// Render service client, `None` when PDF export is disabled.
    #[must_use]
    pub fn renderer(&self) -> Option<&RenderClient> {
        self.inner.renderer.as_ref()
    }

    /// Business info printed on invoices: the configured record, else the
    /// oldest one.
    ///
    /// # Errors
    ///
    /// Returns an error if the store cannot be read.
    pub async fn business_info(&self) -> Result<Option<Record<BusinessInfo>>, StoreError> {
        let store = self.store();
        match &self.inner.config.business_info_id {
            Some(id) => store.get::<BusinessInfo>(id).await,
            None => store.first::<BusinessInfo>().await,
        }
    }
}
