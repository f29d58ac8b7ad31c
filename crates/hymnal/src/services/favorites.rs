//! Favorites backed by the remote store.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::Value;
use tokio::sync::broadcast;

use hymnal_core::favorites::{
    favorites_from_snapshot, is_legacy_shape, migrate_legacy, toggled_in, FavoriteSet,
    GLOBAL_CONTEXT,
};
use hymnal_core::storage::{paths, DocumentStore, FavoritesStore, Result};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// Published after every committed toggle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FavoriteEvent {
    pub uid: String,
    pub collection: String,
    pub number: String,
    pub is_favorite: bool,
}

/// The single source of truth for a user's favorites.
///
/// Song values never carry a favorite flag; observers subscribe to
/// [`FavoriteEvent`]s and re-derive it from the set.
pub struct FavoritesRepository {
    remote: Arc<dyn DocumentStore>,
    default_collection: String,
    events: broadcast::Sender<FavoriteEvent>,
}

impl FavoritesRepository {
    pub fn new(remote: Arc<dyn DocumentStore>, default_collection: impl Into<String>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            remote,
            default_collection: default_collection.into(),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<FavoriteEvent> {
        self.events.subscribe()
    }

    pub fn default_collection(&self) -> &str {
        &self.default_collection
    }

    /// True if the song is a favorite in `collection`. Global favorites
    /// count for the default collection.
    pub async fn is_favorite(&self, uid: &str, collection: &str, number: &str) -> Result<bool> {
        let favorites = self.load(uid).await?;
        Ok(favorites.contains_song(collection, number, &self.default_collection))
    }

    /// Rewrites a legacy flat node inside a transaction.
    ///
    /// The transaction re-checks the shape, so a reader that lost the race
    /// to another migrating reader commits nothing.
    async fn migrate(&self, uid: &str, node: &Value) -> Result<Option<Value>> {
        if !is_legacy_shape(node) {
            return Ok(Some(node.clone()));
        }

        let rewrote = Arc::new(AtomicBool::new(false));
        let flag = rewrote.clone();
        let committed = self
            .remote
            .transaction(
                &paths::user_favorites_path(uid),
                Box::new(move |current: Option<&Value>| {
                    let migrated = current.and_then(migrate_legacy);
                    flag.store(migrated.is_some(), Ordering::SeqCst);
                    migrated.or_else(|| current.cloned())
                }),
            )
            .await?;

        if rewrote.load(Ordering::SeqCst) {
            tracing::info!(uid = %uid, "Migrated legacy favorites");
        }
        Ok(committed)
    }
}

#[async_trait]
impl FavoritesStore for FavoritesRepository {
    async fn load(&self, uid: &str) -> Result<FavoriteSet> {
        let Some(node) = self.remote.get(&paths::user_favorites_path(uid)).await? else {
            return Ok(FavoriteSet::new());
        };

        let node = self.migrate(uid, &node).await?;
        Ok(node.as_ref().map(favorites_from_snapshot).unwrap_or_default())
    }

    async fn toggle(&self, uid: &str, number: &str, collection: Option<&str>) -> Result<bool> {
        let collection = collection.unwrap_or(GLOBAL_CONTEXT);
        let default_collection = self.default_collection.clone();
        let (target, song) = (collection.to_string(), number.to_string());

        let committed = self
            .remote
            .transaction(
                &paths::user_favorites_path(uid),
                Box::new(move |current: Option<&Value>| {
                    toggled_in(current, &target, &song, &default_collection)
                }),
            )
            .await?;
        let is_favorite = committed
            .as_ref()
            .map(favorites_from_snapshot)
            .is_some_and(|set| set.contains_song(collection, number, &self.default_collection));

        tracing::debug!(
            uid = %uid,
            collection = %collection,
            number = %number,
            is_favorite,
            "Favorite toggled"
        );

        // No receivers is fine.
        let _ = self.events.send(FavoriteEvent {
            uid: uid.to_string(),
            collection: collection.to_string(),
            number: number.to_string(),
            is_favorite,
        });

        Ok(is_favorite)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    use hymnal_core::storage::RemotePath;

    use crate::remote::InMemoryDocumentStore;

    fn repository(data: Value) -> (Arc<InMemoryDocumentStore>, FavoritesRepository) {
        let remote = Arc::new(InMemoryDocumentStore::with_data(data));
        let repo = FavoritesRepository::new(remote.clone(), "LPMI");
        (remote, repo)
    }

    #[tokio::test]
    async fn test_load_migrates_legacy_once() {
        let (remote, repo) = repository(json!({
            "user_favorites": { "u1": { "001": true, "004": true } }
        }));

        let favorites = repo.load("u1").await.unwrap();
        assert!(favorites.is_favorite(GLOBAL_CONTEXT, "001"));
        assert!(favorites.is_favorite(GLOBAL_CONTEXT, "004"));
        assert_eq!(
            remote
                .get(&RemotePath::new("user_favorites/u1"))
                .await
                .unwrap(),
            Some(json!({ "global": { "001": true, "004": true } }))
        );
        assert_eq!(remote.write_count(), 1);

        repo.load("u1").await.unwrap();
        assert_eq!(remote.write_count(), 1);
    }

    #[tokio::test]
    async fn test_concurrent_migration_writes_once() {
        let (remote, repo) = repository(json!({
            "user_favorites": { "u1": { "001": true } }
        }));
        let repo = Arc::new(repo);

        let first = tokio::spawn({
            let repo = repo.clone();
            async move { repo.load("u1").await }
        });
        let second = tokio::spawn({
            let repo = repo.clone();
            async move { repo.load("u1").await }
        });

        let first = first.await.unwrap().unwrap();
        let second = second.await.unwrap().unwrap();

        assert_eq!(first, second);
        assert_eq!(remote.write_count(), 1);
    }

    #[tokio::test]
    async fn test_toggle_twice_leaves_no_record() {
        let (remote, repo) = repository(json!({}));

        assert!(repo.toggle("u1", "012", Some("SRD")).await.unwrap());
        assert!(repo.is_favorite("u1", "SRD", "012").await.unwrap());

        assert!(!repo.toggle("u1", "012", Some("SRD")).await.unwrap());
        assert!(!repo.is_favorite("u1", "SRD", "012").await.unwrap());
        assert_eq!(remote.snapshot().await, Value::Null);
    }

    #[tokio::test]
    async fn test_toggle_defaults_to_global_context() {
        let (_, repo) = repository(json!({}));

        repo.toggle("u1", "004", None).await.unwrap();

        assert!(repo.is_favorite("u1", "LPMI", "004").await.unwrap());
        assert!(!repo.is_favorite("u1", "SRD", "004").await.unwrap());
    }

    #[tokio::test]
    async fn test_toggle_migrates_before_writing() {
        let (remote, repo) = repository(json!({
            "user_favorites": { "u1": { "001": true } }
        }));

        repo.toggle("u1", "002", Some("LPMI")).await.unwrap();

        assert_eq!(
            remote
                .get(&RemotePath::new("user_favorites/u1"))
                .await
                .unwrap(),
            Some(json!({ "global": { "001": true }, "LPMI": { "002": true } }))
        );
    }

    #[tokio::test]
    async fn test_toggle_unfavorites_legacy_global_entry() {
        let (remote, repo) = repository(json!({
            "user_favorites": { "u1": { "001": true } }
        }));

        assert!(repo.is_favorite("u1", "LPMI", "001").await.unwrap());

        assert!(!repo.toggle("u1", "001", Some("LPMI")).await.unwrap());
        assert!(!repo.is_favorite("u1", "LPMI", "001").await.unwrap());
        assert_eq!(remote.snapshot().await, Value::Null);

        assert!(repo.toggle("u1", "001", Some("LPMI")).await.unwrap());
        assert!(repo.is_favorite("u1", "LPMI", "001").await.unwrap());
        assert_eq!(
            remote.snapshot().await,
            json!({ "user_favorites": { "u1": { "LPMI": { "001": true } } } })
        );
    }

    #[tokio::test]
    async fn test_toggle_from_other_collection_keeps_global_entry() {
        let (_, repo) = repository(json!({
            "user_favorites": { "u1": { "global": { "001": true } } }
        }));

        assert!(repo.toggle("u1", "001", Some("SRD")).await.unwrap());
        assert!(repo.is_favorite("u1", "LPMI", "001").await.unwrap());
        assert!(repo.is_favorite("u1", "SRD", "001").await.unwrap());
    }

    #[tokio::test]
    async fn test_migration_already_done_commits_nothing() {
        let (remote, repo) = repository(json!({
            "user_favorites": { "u1": { "global": { "001": true } } }
        }));
        let stale = json!({ "001": true });

        let committed = repo.migrate("u1", &stale).await.unwrap();

        assert_eq!(committed, Some(json!({ "global": { "001": true } })));
        assert_eq!(remote.write_count(), 0);
    }

    #[tokio::test]
    async fn test_toggle_publishes_event() {
        let (_, repo) = repository(json!({}));
        let mut events = repo.subscribe();

        repo.toggle("u1", "001", Some("LPMI")).await.unwrap();

        let event = events.recv().await.unwrap();
        assert_eq!(
            event,
            FavoriteEvent {
                uid: "u1".to_string(),
                collection: "LPMI".to_string(),
                number: "001".to_string(),
                is_favorite: true,
            }
        );
    }
}
