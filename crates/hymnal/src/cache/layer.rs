//! Time-stamped list cache in front of remote fetches.

use std::future::Future;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use hymnal_core::cache::{pattern_matches, CacheEnvelope, Result as CacheResult};
use hymnal_core::storage::{KeyValueStore, PrefValue, Result};

use crate::clock::Clock;

/// Reads a fresh cached value, or `None` on a miss.
///
/// Entries that fail to decode are logged and treated as misses.
async fn read_fresh<T: DeserializeOwned>(
    store: &dyn KeyValueStore,
    now: chrono::DateTime<chrono::Utc>,
    key: &str,
    list_key: &str,
    ttl: Duration,
) -> Option<T> {
    let raw = match store.get(key).await {
        Ok(Some(PrefValue::String(raw))) => raw,
        Ok(Some(_)) => {
            tracing::warn!(key = %key, "Cache entry has unexpected type");
            return None;
        }
        Ok(None) => return None,
        Err(err) => {
            tracing::warn!(key = %key, error = %err, "Failed to read cache entry");
            return None;
        }
    };

    let envelope = match CacheEnvelope::decode(list_key, &raw) {
        Ok(envelope) => envelope,
        Err(err) => {
            tracing::warn!(key = %key, error = %err, "Cache entry is corrupt");
            return None;
        }
    };

    if !envelope.is_fresh(now, ttl) {
        tracing::trace!(key = %key, fetched_at = %envelope.timestamp, "Cache entry expired");
        return None;
    }

    match envelope.items() {
        Ok(items) => Some(items),
        Err(err) => {
            tracing::warn!(key = %key, error = %err, "Cache entry deserialization failed");
            None
        }
    }
}

/// Returns the cached value under `key` if it is younger than `ttl`;
/// otherwise awaits `remote_fetch`, stores its result stamped with the
/// current time and returns it.
///
/// Remote errors propagate unchanged. A failing local write is logged and
/// does not affect the returned value.
pub async fn fetch_with_cache<T, F, Fut>(
    store: &dyn KeyValueStore,
    clock: &dyn Clock,
    key: &str,
    list_key: &str,
    ttl: Duration,
    remote_fetch: F,
) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let now = clock.now();

    if let Some(value) = read_fresh(store, now, key, list_key, ttl).await {
        tracing::trace!(key = %key, "Cache hit");
        return Ok(value);
    }

    tracing::trace!(key = %key, "Cache miss");
    let value = remote_fetch().await?;

    match CacheEnvelope::wrap(list_key, &value, clock.now()).and_then(|e| e.encode()) {
        Ok(raw) => {
            if let Err(err) = store.set(key, PrefValue::String(raw)).await {
                tracing::warn!(key = %key, error = %err, "Failed to write cache entry");
            }
        }
        Err(err) => {
            tracing::warn!(key = %key, error = %err, "Failed to encode cache entry");
        }
    }

    Ok(value)
}

/// Removes every key matching one of `patterns`. Returns how many were removed.
pub async fn clear_cache(store: &dyn KeyValueStore, patterns: &[&str]) -> CacheResult<usize> {
    let mut removed = 0;
    for key in store.keys().await? {
        if patterns.iter().any(|p| pattern_matches(p, &key)) && store.remove(&key).await? {
            removed += 1;
        }
    }
    tracing::debug!(removed, "Cache cleared");
    Ok(removed)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{TimeZone, Utc};
    use hymnal_core::cache::CACHE_PATTERNS;
    use hymnal_core::storage::RepositoryError;

    use crate::clock::ManualClock;
    use crate::local::MemoryKeyValueStore;

    const TTL: Duration = Duration::from_secs(24 * 60 * 60);

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap())
    }

    async fn fetch(
        store: &MemoryKeyValueStore,
        clock: &ManualClock,
        calls: &AtomicUsize,
        value: Vec<String>,
    ) -> Result<Vec<String>> {
        fetch_with_cache(store, clock, "bible_books_cache", "books", TTL, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            Ok(value)
        })
        .await
    }

    #[tokio::test]
    async fn test_hit_within_ttl_skips_remote() {
        let store = MemoryKeyValueStore::new();
        let clock = clock();
        let calls = AtomicUsize::new(0);

        let first = fetch(&store, &clock, &calls, vec!["GEN".into()]).await.unwrap();
        clock.advance(chrono::Duration::hours(23));
        let second = fetch(&store, &clock, &calls, vec!["EXO".into()]).await.unwrap();

        assert_eq!(first, vec!["GEN"]);
        assert_eq!(second, vec!["GEN"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_expired_entry_is_refetched() {
        let store = MemoryKeyValueStore::new();
        let clock = clock();
        let calls = AtomicUsize::new(0);

        fetch(&store, &clock, &calls, vec!["GEN".into()]).await.unwrap();
        clock.advance(chrono::Duration::hours(25));
        let refreshed = fetch(&store, &clock, &calls, vec!["EXO".into()]).await.unwrap();

        assert_eq!(refreshed, vec!["EXO"]);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_corrupt_entry_is_a_miss() {
        let store = MemoryKeyValueStore::new();
        store
            .set("bible_books_cache", PrefValue::String("{broken".into()))
            .await
            .unwrap();
        let clock = clock();
        let calls = AtomicUsize::new(0);

        let value = fetch(&store, &clock, &calls, vec!["GEN".into()]).await.unwrap();

        assert_eq!(value, vec!["GEN"]);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        let stored = store.get("bible_books_cache").await.unwrap();
        assert!(matches!(stored, Some(PrefValue::String(raw)) if raw.contains("timestamp")));
    }

    #[tokio::test]
    async fn test_remote_error_propagates_and_stores_nothing() {
        let store = MemoryKeyValueStore::new();
        let clock = clock();

        let result: Result<Vec<String>> =
            fetch_with_cache(&store, &clock, "bible_books_cache", "books", TTL, || async {
                Err(RepositoryError::RemoteUnavailable("offline".into()))
            })
            .await;

        assert!(matches!(result, Err(RepositoryError::RemoteUnavailable(_))));
        assert!(store.keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_clear_cache_only_touches_cache_keys() {
        let store = MemoryKeyValueStore::new();
        for key in [
            "song_collection_cache_LPMI",
            "song_collections_cache",
            "bible_books_cache",
            "bible_chapters_GEN",
            "premium_status_u1",
            "bible_font_size",
            "theme_mode",
        ] {
            store.set(key, PrefValue::String("x".into())).await.unwrap();
        }

        let removed = clear_cache(&store, &CACHE_PATTERNS).await.unwrap();

        assert_eq!(removed, 5);
        assert_eq!(
            store.keys().await.unwrap(),
            vec!["bible_font_size", "theme_mode"]
        );
    }
}
