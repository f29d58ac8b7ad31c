//! Bounded in-process cache with per-entry TTL.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use lru::LruCache;
use tokio::sync::RwLock;

use crate::clock::Clock;

#[derive(Debug, Clone)]
struct TtlEntry<V> {
    value: V,
    expires_at: DateTime<Utc>,
}

/// An LRU map whose entries expire after a fixed TTL, measured on the
/// injected [`Clock`].
///
/// Expired entries are dropped lazily when read. Clones share storage.
#[derive(Clone)]
pub struct TtlCache<K: Hash + Eq, V> {
    store: Arc<RwLock<LruCache<K, TtlEntry<V>>>>,
    ttl: TimeDelta,
    clock: Arc<dyn Clock>,
}

impl<K: Hash + Eq, V: Clone> TtlCache<K, V> {
    /// Creates a cache holding at most `max_entries` (at least one).
    pub fn new(max_entries: usize, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            store: Arc::new(RwLock::new(LruCache::new(capacity))),
            ttl: TimeDelta::from_std(ttl).unwrap_or(TimeDelta::MAX),
            clock,
        }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let now = self.clock.now();
        let mut store = self.store.write().await;
        let entry = store.get(key)?;
        if now < entry.expires_at {
            return Some(entry.value.clone());
        }
        store.pop(key);
        None
    }

    pub async fn insert(&self, key: K, value: V) {
        let expires_at = self
            .clock
            .now()
            .checked_add_signed(self.ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        self.store
            .write()
            .await
            .put(key, TtlEntry { value, expires_at });
    }

    pub async fn invalidate(&self, key: &K) -> bool {
        self.store.write().await.pop(key).is_some()
    }

    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.store.read().await.len()
    }
}
