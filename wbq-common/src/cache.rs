//! Expiring cache for fetched statistics
//!
//! The dashboard must not hit the upstream API more often than every
//! `ttl` seconds. Callers depend on the [`StatsCache`] capability rather than
//! on a particular store; [`MemoryCache`] is the in-process implementation.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::sync::RwLock;

/// Key-value store whose entries expire
#[async_trait]
pub trait StatsCache<V>: Send + Sync
where
    V: Clone + Send + Sync + 'static,
{
    /// Value stored under `key`, if present and not expired
    async fn get(&self, key: &str) -> Option<V>;

    /// Store `value` under `key` for `ttl`
    ///
    /// A zero `ttl` stores nothing.
    async fn put(&self, key: &str, value: V, ttl: Duration);
}

struct CacheEntry<V> {
    value: V,
    /// `None` when `ttl` reaches past what `Instant` can represent
    expires_at: Option<Instant>,
}

impl<V> CacheEntry<V> {
    fn is_live(&self, now: Instant) -> bool {
        self.expires_at.map_or(true, |expires_at| now < expires_at)
    }
}

/// In-memory [`StatsCache`] shared across request handlers
pub struct MemoryCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
}

impl<V> MemoryCache<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Number of entries held, expired ones included until the next `put`
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }
}

impl<V> Default for MemoryCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<V> StatsCache<V> for MemoryCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    async fn get(&self, key: &str) -> Option<V> {
        let entries = self.entries.read().await;
        entries
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    async fn put(&self, key: &str, value: V, ttl: Duration) {
        if ttl.is_zero() {
            return;
        }
        let now = Instant::now();
        let mut entries = self.entries.write().await;
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                expires_at: now.checked_add(ttl),
            },
        );
    }

}
