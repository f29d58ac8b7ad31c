//! In-memory document store.

use std::path::Path;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{Map, Value};
use tokio::sync::RwLock;

use hymnal_core::snapshot::children;
use hymnal_core::storage::{DocumentStore, RemoteError, RemotePath, RemoteResult, TransactionFn};

use super::tree::{get_at, remove_at, set_at, update_at};

/// A document store holding the whole tree in memory.
///
/// Used for tests and for running against a seed file without a backend.
/// The `offline` switch makes every call fail with
/// [`RemoteError::Unavailable`].
#[derive(Debug, Clone, Default)]
pub struct InMemoryDocumentStore {
    root: Arc<RwLock<Value>>,
    offline: Arc<AtomicBool>,
    reads: Arc<AtomicUsize>,
    writes: Arc<AtomicUsize>,
}

impl InMemoryDocumentStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store seeded with `data`.
    pub fn with_data(data: Value) -> Self {
        Self {
            root: Arc::new(RwLock::new(data)),
            ..Self::default()
        }
    }

    /// Creates a store seeded from a JSON export of the remote database.
    pub async fn from_json_file(path: impl AsRef<Path>) -> RemoteResult<Self> {
        let path = path.as_ref();
        let raw = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| RemoteError::Unavailable(format!("{}: {e}", path.display())))?;
        let data = serde_json::from_str(&raw)
            .map_err(|e| RemoteError::Serialization(format!("{}: {e}", path.display())))?;
        Ok(Self::with_data(data))
    }

    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    pub fn is_offline(&self) -> bool {
        self.offline.load(Ordering::SeqCst)
    }

    /// Number of read calls served so far.
    pub fn read_count(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    /// Number of committed writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }

    /// A copy of the whole tree.
    pub async fn snapshot(&self) -> Value {
        self.root.read().await.clone()
    }

    fn check_online(&self) -> RemoteResult<()> {
        if self.is_offline() {
            return Err(RemoteError::Unavailable("in-memory store is offline".to_string()));
        }
        Ok(())
    }

    fn record_read(&self) -> RemoteResult<()> {
        self.check_online()?;
        self.reads.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn record_write(&self) -> RemoteResult<()> {
        self.check_online()?;
        self.writes.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[async_trait]
impl DocumentStore for InMemoryDocumentStore {
    async fn get(&self, path: &RemotePath) -> RemoteResult<Option<Value>> {
        self.record_read()?;
        let root = self.root.read().await;
        Ok(get_at(&root, path).cloned())
    }

    async fn query_equal(
        &self,
        path: &RemotePath,
        child: &str,
        value: &Value,
    ) -> RemoteResult<Value> {
        self.record_read()?;
        let root = self.root.read().await;
        let matches: Map<String, Value> = get_at(&root, path)
            .map(children)
            .unwrap_or_default()
            .into_iter()
            .filter(|(_, node)| node.get(child) == Some(value))
            .map(|(key, node)| (key, node.clone()))
            .collect();
        Ok(Value::Object(matches))
    }

    async fn set(&self, path: &RemotePath, value: Value) -> RemoteResult<()> {
        self.record_write()?;
        set_at(&mut *self.root.write().await, path, value);
        tracing::debug!(path = %path, "Document set");
        Ok(())
    }

    async fn update(&self, path: &RemotePath, fields: Map<String, Value>) -> RemoteResult<()> {
        self.record_write()?;
        update_at(&mut *self.root.write().await, path, fields);
        tracing::debug!(path = %path, "Document updated");
        Ok(())
    }

    async fn remove(&self, path: &RemotePath) -> RemoteResult<()> {
        self.record_write()?;
        remove_at(&mut *self.root.write().await, path);
        tracing::debug!(path = %path, "Document removed");
        Ok(())
    }

    async fn transaction(
        &self,
        path: &RemotePath,
        f: TransactionFn,
    ) -> RemoteResult<Option<Value>> {
        self.check_online()?;
        let mut root = self.root.write().await;

        let current = get_at(&root, path).cloned();
        let next = f(current.as_ref());
        if next == current {
            return Ok(current);
        }

        set_at(&mut root, path, next.clone().unwrap_or(Value::Null));
        self.writes.fetch_add(1, Ordering::SeqCst);
        tracing::debug!(path = %path, removed = next.is_none(), "Transaction committed");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn store() -> InMemoryDocumentStore {
        InMemoryDocumentStore::with_data(json!({
            "bible": {
                "chapters": {
                    "GEN_1": { "book_id": "GEN", "chapter": 1 },
                    "GEN_2": { "book_id": "GEN", "chapter": 2 },
                    "EXO_1": { "book_id": "EXO", "chapter": 1 }
                }
            }
        }))
    }

    #[tokio::test]
    async fn test_get_and_set() {
        let store = store();
        let path = RemotePath::new("users/u1/role");

        assert_eq!(store.get(&path).await.unwrap(), None);
        store.set(&path, json!("admin")).await.unwrap();
        assert_eq!(store.get(&path).await.unwrap(), Some(json!("admin")));
    }

    #[tokio::test]
    async fn test_query_equal_filters_children() {
        let store = store();

        let result = store
            .query_equal(&RemotePath::new("bible/chapters"), "book_id", &json!("GEN"))
            .await
            .unwrap();

        let keys: Vec<_> = result.as_object().unwrap().keys().cloned().collect();
        assert_eq!(keys, vec!["GEN_1", "GEN_2"]);
    }

    #[tokio::test]
    async fn test_query_equal_on_missing_path_is_empty() {
        let store = store();
        let result = store
            .query_equal(&RemotePath::new("nothing"), "book_id", &json!("GEN"))
            .await
            .unwrap();
        assert_eq!(result, json!({}));
    }

    #[tokio::test]
    async fn test_offline_fails_every_call() {
        let store = store();
        store.set_offline(true);

        let err = store.get(&RemotePath::new("bible")).await.unwrap_err();
        assert!(matches!(err, RemoteError::Unavailable(_)));
        assert!(store
            .transaction(
                &RemotePath::new("x"),
                Box::new(|_: Option<&Value>| Some(json!(1)))
            )
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_transaction_removes_and_skips_noop() {
        let store = InMemoryDocumentStore::new();
        let path = RemotePath::new("user_favorites/u1/global/001");

        let first = store
            .transaction(&path, Box::new(|_: Option<&Value>| Some(json!(true))))
            .await
            .unwrap();
        assert_eq!(first, Some(json!(true)));

        let same = store
            .transaction(&path, Box::new(|current: Option<&Value>| current.cloned()))
            .await
            .unwrap();
        assert_eq!(same, Some(json!(true)));
        assert_eq!(store.write_count(), 1);

        let removed = store
            .transaction(&path, Box::new(|_: Option<&Value>| None))
            .await
            .unwrap();
        assert_eq!(removed, None);
        assert_eq!(store.snapshot().await, Value::Null);
    }

    #[tokio::test]
    async fn test_concurrent_transactions_do_not_lose_updates() {
        let store = InMemoryDocumentStore::new();
        let path = RemotePath::new("counter");

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = store.clone();
            let path = path.clone();
            handles.push(tokio::spawn(async move {
                store
                    .transaction(
                        &path,
                        Box::new(|current: Option<&Value>| {
                            let n = current.and_then(Value::as_i64).unwrap_or(0);
                            Some(json!(n + 1))
                        }),
                    )
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(store.get(&path).await.unwrap(), Some(json!(20)));
    }

    #[tokio::test]
    async fn test_from_json_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("seed.json");
        std::fs::write(&path, r#"{"song_collection":{"LPMI":{"metadata":{"name":"LPMI"}}}}"#)
            .unwrap();

        let store = InMemoryDocumentStore::from_json_file(&path).await.unwrap();

        assert_eq!(
            store
                .get(&RemotePath::new("song_collection/LPMI/metadata/name"))
                .await
                .unwrap(),
            Some(json!("LPMI"))
        );
    }
}
