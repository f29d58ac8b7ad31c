//! The JSON envelope cached lists are stored in.
//!
//! An envelope is persisted as `{ "<list_key>": [...], "timestamp": "<RFC 3339>" }`,
//! which is the layout older clients left in the local store, so existing
//! caches stay readable.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur during cache serialization/deserialization.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SerializationError {
    /// Failed to serialize a value.
    #[error("Failed to serialize: {0}")]
    SerializeFailed(String),
    /// Failed to deserialize a value.
    #[error("Failed to deserialize: {0}")]
    DeserializeFailed(String),
}

/// Result type for serialization operations.
pub type Result<T> = std::result::Result<T, SerializationError>;

/// A cached list stamped with the time it was fetched.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEnvelope {
    pub list_key: String,
    pub items: Value,
    pub timestamp: DateTime<Utc>,
}

impl CacheEnvelope {
    pub fn new(list_key: impl Into<String>, items: Value, timestamp: DateTime<Utc>) -> Self {
        Self {
            list_key: list_key.into(),
            items,
            timestamp,
        }
    }

    /// Wraps a serializable value.
    pub fn wrap<T: Serialize>(
        list_key: impl Into<String>,
        items: &T,
        timestamp: DateTime<Utc>,
    ) -> Result<Self> {
        let items = serde_json::to_value(items)
            .map_err(|e| SerializationError::SerializeFailed(e.to_string()))?;
        Ok(Self::new(list_key, items, timestamp))
    }

    /// Encodes the envelope as a JSON string.
    pub fn encode(&self) -> Result<String> {
        let mut node = Map::new();
        node.insert(self.list_key.clone(), self.items.clone());
        node.insert(
            "timestamp".to_string(),
            Value::String(self.timestamp.to_rfc3339()),
        );
        serde_json::to_string(&Value::Object(node))
            .map_err(|e| SerializationError::SerializeFailed(e.to_string()))
    }

    /// Decodes an envelope whose items are stored under `list_key`.
    pub fn decode(list_key: &str, raw: &str) -> Result<Self> {
        let node: Value = serde_json::from_str(raw)
            .map_err(|e| SerializationError::DeserializeFailed(e.to_string()))?;

        let timestamp = node
            .get("timestamp")
            .and_then(Value::as_str)
            .ok_or_else(|| SerializationError::DeserializeFailed("missing timestamp".into()))
            .and_then(|ts| {
                DateTime::parse_from_rfc3339(ts)
                    .map(|dt| dt.with_timezone(&Utc))
                    .map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
            })?;

        let items = node.get(list_key).cloned().ok_or_else(|| {
            SerializationError::DeserializeFailed(format!("missing list key: {list_key}"))
        })?;

        Ok(Self::new(list_key, items, timestamp))
    }

    /// Deserializes the items into a typed value.
    pub fn items<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(self.items.clone())
            .map_err(|e| SerializationError::DeserializeFailed(e.to_string()))
    }

    /// True while `now - timestamp < ttl`.
    pub fn is_fresh(&self, now: DateTime<Utc>, ttl: std::time::Duration) -> bool {
        match chrono::Duration::from_std(ttl) {
            Ok(ttl) => now.signed_duration_since(self.timestamp) < ttl,
            Err(_) => true,
        }
    }
}
