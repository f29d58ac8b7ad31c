//! Typed access to the local key-value store.

use std::sync::Arc;

use hymnal_core::cache::Result as CacheResult;
use hymnal_core::storage::{KeyValueStore, PrefValue};

/// Typed getters and setters over a [`KeyValueStore`].
///
/// Getters never fail: a missing key, a value of another type, or a store
/// error all yield the caller's default.
#[derive(Clone)]
pub struct Preferences {
    store: Arc<dyn KeyValueStore>,
}

impl Preferences {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    async fn read(&self, key: &str) -> Option<PrefValue> {
        match self.store.get(key).await {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!(key = %key, error = %e, "Failed to read preference");
                None
            }
        }
    }

    pub async fn get_bool(&self, key: &str, default: bool) -> bool {
        self.read(key)
            .await
            .and_then(|v| v.as_bool())
            .unwrap_or(default)
    }

    pub async fn get_int(&self, key: &str, default: i64) -> i64 {
        self.read(key)
            .await
            .and_then(|v| v.as_int())
            .unwrap_or(default)
    }

    pub async fn get_double(&self, key: &str, default: f64) -> f64 {
        self.read(key)
            .await
            .and_then(|v| v.as_double())
            .unwrap_or(default)
    }

    pub async fn get_string(&self, key: &str, default: &str) -> String {
        self.read(key)
            .await
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_else(|| default.to_string())
    }

    pub async fn get_string_list(&self, key: &str, default: &[String]) -> Vec<String> {
        self.read(key)
            .await
            .and_then(|v| v.as_string_list().map(<[String]>::to_vec))
            .unwrap_or_else(|| default.to_vec())
    }

    pub async fn set_bool(&self, key: &str, value: bool) -> CacheResult<()> {
        self.store.set(key, PrefValue::Bool(value)).await
    }

    pub async fn set_int(&self, key: &str, value: i64) -> CacheResult<()> {
        self.store.set(key, PrefValue::Int(value)).await
    }

    pub async fn set_double(&self, key: &str, value: f64) -> CacheResult<()> {
        self.store.set(key, PrefValue::Double(value)).await
    }

    pub async fn set_string(&self, key: &str, value: impl Into<String>) -> CacheResult<()> {
        self.store.set(key, PrefValue::String(value.into())).await
    }

    pub async fn set_string_list(&self, key: &str, value: Vec<String>) -> CacheResult<()> {
        self.store.set(key, PrefValue::StringList(value)).await
    }

    pub async fn remove(&self, key: &str) -> CacheResult<bool> {
        self.store.remove(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::local::MemoryKeyValueStore;

    #[tokio::test]
    async fn test_defaults_on_miss() {
        let prefs = Preferences::new(Arc::new(MemoryKeyValueStore::new()));

        assert!(prefs.get_bool("dark_mode", true).await);
        assert_eq!(prefs.get_int("launch_count", 0).await, 0);
        assert_eq!(prefs.get_string("theme", "light").await, "light");
        assert!(prefs.get_string_list("recent", &[]).await.is_empty());
    }

    #[tokio::test]
    async fn test_typed_round_trip() {
        let prefs = Preferences::new(Arc::new(MemoryKeyValueStore::new()));

        prefs.set_double("font_size", 18.5).await.unwrap();
        prefs.set_int("launch_count", 3).await.unwrap();
        prefs
            .set_string_list("recent", vec!["001".into(), "002".into()])
            .await
            .unwrap();

        assert_eq!(prefs.get_double("font_size", 16.0).await, 18.5);
        assert_eq!(prefs.get_double("launch_count", 0.0).await, 3.0);
        assert_eq!(prefs.get_string_list("recent", &[]).await.len(), 2);
    }

    #[tokio::test]
    async fn test_type_mismatch_returns_default() {
        let prefs = Preferences::new(Arc::new(MemoryKeyValueStore::new()));
        prefs.set_string("font_size", "large").await.unwrap();

        assert_eq!(prefs.get_double("font_size", 16.0).await, 16.0);
        assert!(!prefs.get_bool("font_size", false).await);
    }
}
