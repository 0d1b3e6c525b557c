//! Business info context shared by the navbar, footer, receipt and
//! about/contact pages.
//!
//! The record is loaded lazily on first use and cached for a configurable
//! TTL. Admin edits become visible once the entry expires, or immediately
//! after the process receives `SIGHUP`.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use shopfloor_core::{BusinessInfo, BusinessInfoId};
use shopfloor_store::{DocumentStore, StoreError};
use sqlx::PgPool;

/// Name shown when no business info record can be loaded.
pub const FALLBACK_BUSINESS_NAME: &str = "Shopfloor";

#[derive(Debug, thiserror::Error)]
enum LoadError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("no business info record")]
    Missing,
}

async fn load(
    pool: &PgPool,
    id: Option<&BusinessInfoId>,
) -> Result<Arc<BusinessInfo>, LoadError> {
    let store = DocumentStore::new(pool);
    let record = match id {
        Some(id) => store.get::<BusinessInfo>(id).await?,
        None => store.first::<BusinessInfo>().await?,
    };
    record.map(|r| Arc::new(r.data)).ok_or(LoadError::Missing)
}

/// Cached business info.
#[derive(Clone)]
pub struct BusinessContext {
    id: Option<BusinessInfoId>,
    cache: Cache<(), Arc<BusinessInfo>>,
}

impl BusinessContext {
    /// Create a context for a fixed record id, or the oldest record when
    /// `id` is `None`.
    #[must_use]
    pub fn new(id: Option<BusinessInfoId>, ttl: Duration) -> Self {
        Self {
            id,
            cache: Cache::builder().max_capacity(1).time_to_live(ttl).build(),
        }
    }

    /// Current business info, falling back to a placeholder when the record
    /// is missing or the store is unreachable. Failures are not cached.
    pub async fn get(&self, pool: &PgPool) -> Arc<BusinessInfo> {
        let result = self
            .cache
            .try_get_with((), load(pool, self.id.as_ref()))
            .await;

        result.unwrap_or_else(|e| {
            tracing::warn!(error = %e, "Business info unavailable, using fallback");
            Arc::new(BusinessInfo::fallback(FALLBACK_BUSINESS_NAME))
        })
    }

    /// Drop the cached record so the next read goes to the store.
    pub async fn invalidate(&self) {
        self.cache.invalidate(&()).await;
    }

    /// Listen for `SIGHUP` and return a task that clears the cache on each
    /// one. The handler is installed before this returns.
    ///
    /// # Errors
    ///
    /// Returns an error if the signal handler cannot be installed.
    #[cfg(unix)]
    pub fn reload_on_hangup(self) -> std::io::Result<impl Future<Output = ()> + Send> {
        use tokio::signal::unix::{SignalKind, signal};

        let mut hangups = signal(SignalKind::hangup())?;
        Ok(async move {
            while hangups.recv().await.is_some() {
                self.invalidate().await;
                tracing::info!("Business info cache cleared");
            }
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_invalidate_drops_cached_record() {
        let context = BusinessContext::new(None, Duration::from_secs(60));
        context
            .cache
            .insert((), Arc::new(BusinessInfo::fallback("Harbour Prints")))
            .await;
        assert_eq!(context.cache.get(&()).await.unwrap().name, "Harbour Prints");

        context.invalidate().await;
        assert!(context.cache.get(&()).await.is_none());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_hangup_clears_cache() {
        let context = BusinessContext::new(None, Duration::from_secs(60));
        context
            .cache
            .insert((), Arc::new(BusinessInfo::fallback("Harbour Prints")))
            .await;

        tokio::spawn(context.clone().reload_on_hangup().unwrap());
        let status = std::process::Command::new("kill")
            .args(["-HUP", &std::process::id().to_string()])
            .status()
            .unwrap();
        assert!(status.success());

        tokio::time::timeout(Duration::from_secs(5), async {
            while context.cache.get(&()).await.is_some() {
                tokio::time::sleep(Duration::from_millis(10)).await;
            }
        })
        .await
        .unwrap();
    }
}
