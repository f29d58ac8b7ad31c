//! Key-value store persisted as a single JSON file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;

use hymnal_core::cache::{CacheError, Result};
use hymnal_core::storage::{KeyValueStore, PrefValue};

/// A key-value store backed by one JSON file.
///
/// The whole map is loaded at open and kept in memory. Every mutation
/// rewrites the file through a temporary sibling and a rename, so a crash
/// leaves either the old or the new file, never a truncated one.
#[derive(Debug, Clone)]
pub struct FileKeyValueStore {
    path: PathBuf,
    values: Arc<RwLock<BTreeMap<String, PrefValue>>>,
}

impl FileKeyValueStore {
    /// Opens the store at `path`. A missing file starts empty; a corrupt
    /// file is logged and also starts empty (it is replaced on first write).
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let values = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => match serde_json::from_str(&raw) {
                Ok(values) => values,
                Err(err) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %err,
                        "Local store is corrupt, starting empty"
                    );
                    BTreeMap::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => BTreeMap::new(),
            Err(err) => return Err(CacheError::Unavailable(err.to_string())),
        };

        tracing::debug!(path = %path.display(), keys = values.len(), "Local store opened");

        Ok(Self {
            path,
            values: Arc::new(RwLock::new(values)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn persist(&self, values: &BTreeMap<String, PrefValue>) -> Result<()> {
        let raw = serde_json::to_vec_pretty(values)
            .map_err(|e| CacheError::Serialization(e.to_string()))?;

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        tokio::fs::write(&tmp, raw)
            .await
            .map_err(|e| CacheError::OperationFailed(e.to_string()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| CacheError::OperationFailed(e.to_string()))
    }
}

#[async_trait]
impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<PrefValue>> {
        Ok(self.values.read().await.get(key).cloned())
    }

    async fn set(&self, key: &str, value: PrefValue) -> Result<()> {
        let mut values = self.values.write().await;
        let previous = values.insert(key.to_string(), value);
        if let Err(err) = self.persist(&values).await {
            // Keep memory and disk in agreement.
            match previous {
                Some(previous) => values.insert(key.to_string(), previous),
                None => values.remove(key),
            };
            return Err(err);
        }
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<bool> {
        let mut values = self.values.write().await;
        let Some(previous) = values.remove(key) else {
            return Ok(false);
        };
        if let Err(err) = self.persist(&values).await {
            values.insert(key.to_string(), previous);
            return Err(err);
        }
        Ok(true)
    }

    async fn keys(&self) -> Result<Vec<String>> {
        Ok(self.values.read().await.keys().cloned().collect())
    }
}
