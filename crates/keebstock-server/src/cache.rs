//! Single-slot response caches for the two upstream data tiers.
//!
//! Each tier holds the most recent successful fetch result for its entire
//! data set. A read within the TTL is served from the slot with no upstream
//! call. A read past the TTL but within the grace window is served stale
//! while one background refresh runs. A read past the grace window fetches
//! inline, and a fetch failure there propagates to the caller rather than
//! silently serving the expired slot.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::time::Instant;

/// Content tier freshness window.
pub const CATALOG_TTL: Duration = Duration::from_secs(600);

/// Inventory tier freshness window.
pub const INVENTORY_TTL: Duration = Duration::from_secs(120);

/// How a cached read was satisfied, surfaced in response metadata.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Served from the slot within its TTL.
    Hit,
    /// Served from the slot past its TTL but within the grace window,
    /// with a background refresh triggered.
    Stale,
    /// Fetched inline because the slot was empty or past its grace window.
    Miss,
}

impl CacheOutcome {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            CacheOutcome::Hit => "hit",
            CacheOutcome::Stale => "stale",
            CacheOutcome::Miss => "miss",
        }
    }
}

struct Slot<T> {
    value: T,
    stored_at: Instant,
}

/// One single-slot cache with a fixed TTL and stale-serve grace window.
///
/// The slot is replaced atomically under a write lock; readers only ever see
/// a complete payload or none at all. Concurrent cold misses each fetch
/// independently (last successful write wins), but background refreshes are
/// coalesced through [`CacheTier::spawn_refresh`] so a burst of stale reads
/// costs at most one upstream call.
pub struct CacheTier<T> {
    name: &'static str,
    ttl: Duration,
    grace: Duration,
    slot: RwLock<Option<Slot<T>>>,
    refreshing: AtomicBool,
}

impl<T> CacheTier<T>
where
    T: Clone + Send + Sync + 'static,
{
    #[must_use]
    pub fn new(name: &'static str, ttl: Duration, grace: Duration) -> Self {
        Self {
            name,
            ttl,
            grace,
            slot: RwLock::new(None),
            refreshing: AtomicBool::new(false),
        }
    }

    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    #[must_use]
    pub fn grace(&self) -> Duration {
        self.grace
    }

    /// Read through the cache, invoking `fetch` only when the slot cannot
    /// satisfy the request.
    ///
    /// Returns the payload together with the [`CacheOutcome`] describing how
    /// it was obtained. On a stale read the returned payload is the old slot
    /// value and `fetch` runs in a background task; its failure is logged and
    /// the slot left untouched.
    ///
    /// # Errors
    ///
    /// Propagates the `fetch` error on an inline miss. The expired slot, if
    /// any, is not served in that case.
    pub async fn get_or_refresh<F, Fut, E>(
        self: &Arc<Self>,
        fetch: F,
    ) -> Result<(T, CacheOutcome), E>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        {
            let guard = self.slot.read().await;
            if let Some(slot) = guard.as_ref() {
                let age = slot.stored_at.elapsed();
                if age < self.ttl {
                    return Ok((slot.value.clone(), CacheOutcome::Hit));
                }
                if age < self.ttl + self.grace {
                    let value = slot.value.clone();
                    drop(guard);
                    self.spawn_refresh(fetch);
                    return Ok((value, CacheOutcome::Stale));
                }
            }
        }

        let fresh = fetch().await?;
        self.store(fresh.clone()).await;
        Ok((fresh, CacheOutcome::Miss))
    }

    /// Drop the slot so the next read fetches from upstream.
    pub async fn clear(&self) {
        let mut guard = self.slot.write().await;
        *guard = None;
    }

    async fn store(&self, value: T) {
        let mut guard = self.slot.write().await;
        *guard = Some(Slot {
            value,
            stored_at: Instant::now(),
        });
    }

    /// Launch `fetch` on the runtime unless a refresh is already in flight.
    fn spawn_refresh<F, Fut, E>(self: &Arc<Self>, fetch: F)
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, E>> + Send + 'static,
        E: std::fmt::Display + Send + 'static,
    {
        if self
            .refreshing
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return;
        }

        let tier = Arc::clone(self);
        tokio::spawn(async move {
            match fetch().await {
                Ok(value) => {
                    tier.store(value).await;
                    tracing::debug!(tier = tier.name, "background cache refresh completed");
                }
                Err(e) => {
                    tracing::warn!(
                        tier = tier.name,
                        error = %e,
                        "background cache refresh failed, keeping stale value"
                    );
                }
            }
            tier.refreshing.store(false, Ordering::Release);
        });
    }
}

/// The two fixed tiers, constructed once at startup and shared by handle.
pub struct Caches {
    /// Content catalog, backing `/products/basic`.
    pub catalog: Arc<CacheTier<Vec<keebstock_core::ContentProduct>>>,
    /// Inventory rows, backing `/products/stock`.
    pub inventory: Arc<CacheTier<Vec<keebstock_core::InventoryRecord>>>,
}

impl Caches {
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalog: Arc::new(CacheTier::new("catalog", CATALOG_TTL, CATALOG_TTL)),
            inventory: Arc::new(CacheTier::new("inventory", INVENTORY_TTL, INVENTORY_TTL)),
        }
    }

    /// Drops both tiers so the next reads fetch from upstream.
    pub async fn clear_all(&self) {
        self.catalog.clear().await;
        self.inventory.clear().await;
    }
}

impl Default for Caches {
    fn default() -> Self {
        Self::new()
    }
}
