//! Song repository reading the remote document tree.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use hymnal_core::catalog::{
    collection_from_snapshot, find_song, song_from_snapshot, song_number_value,
    songs_from_snapshot, Song, SongCollection,
};
use hymnal_core::snapshot::children;
use hymnal_core::storage::paths::{collection_songs_path, collections_root, song_path};
use hymnal_core::storage::{DocumentStore, Result, SongRepository};

/// Reads `song_collection/<id>/{metadata,songs}` and normalizes it.
#[derive(Clone)]
pub struct RemoteSongRepository {
    store: Arc<dyn DocumentStore>,
}

impl RemoteSongRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl SongRepository for RemoteSongRepository {
    async fn list_collections(&self) -> Result<Vec<SongCollection>> {
        let Some(root) = self.store.get(&collections_root()).await? else {
            return Ok(Vec::new());
        };

        let collections = children(&root)
            .into_iter()
            .map(|(id, node)| {
                let songs_seen = node
                    .get("songs")
                    .map(|songs| children(songs).len())
                    .unwrap_or(0);
                let metadata = node.get("metadata").unwrap_or(&Value::Null);
                collection_from_snapshot(
                    &id,
                    metadata,
                    u32::try_from(songs_seen).unwrap_or(u32::MAX),
                )
            })
            .collect();
        Ok(collections)
    }

    async fn collection_songs(&self, collection_id: &str) -> Result<Vec<Song>> {
        let songs = self
            .store
            .get(&collection_songs_path(collection_id))
            .await?
            .map(|node| songs_from_snapshot(&node, collection_id))
            .unwrap_or_default();
        tracing::trace!(collection_id = %collection_id, count = songs.len(), "Songs fetched");
        Ok(songs)
    }

    /// Reads the song's own node; a miss on a numeric number falls back to
    /// scanning the collection (`"1"` finds `"001"`).
    async fn song(&self, collection_id: &str, number: &str) -> Result<Option<Song>> {
        if let Some(node) = self.store.get(&song_path(collection_id, number)).await? {
            return Ok(Some(song_from_snapshot(number, &node, Some(collection_id))));
        }
        if song_number_value(number) == 0 {
            return Ok(None);
        }
        let songs = self.collection_songs(collection_id).await?;
        Ok(find_song(songs, number))
    }
}
