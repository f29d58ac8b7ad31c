//! Cached song repository decorator.
//!
//! Wraps a `SongRepository` with the time-stamped list cache.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use hymnal_core::cache::{
    song_collection_key, song_collections_key, COLLECTIONS_LIST_KEY, SONGS_LIST_KEY,
};
use hymnal_core::catalog::{find_song, Song, SongCollection};
use hymnal_core::storage::{KeyValueStore, Result, SongRepository};

use crate::cache::fetch_with_cache;
use crate::clock::Clock;

/// Cached song repository decorator.
///
/// List reads go through the local store first and only reach the wrapped
/// repository on a miss or after the TTL. Single songs are picked from the
/// cached collection list.
///
/// # Type Parameters
///
/// * `R` - The underlying repository implementation
pub struct CachedSongRepository<R>
where
    R: SongRepository,
{
    repository: Arc<R>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<R> CachedSongRepository<R>
where
    R: SongRepository,
{
    /// Creates a new cached song repository.
    ///
    /// # Arguments
    ///
    /// * `repository` - The underlying repository to cache
    /// * `store` - The local key-value store holding cache entries
    /// * `clock` - Source of the fetch timestamps
    /// * `ttl` - Time-to-live for cached lists
    pub fn new(
        repository: Arc<R>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            repository,
            store,
            clock,
            ttl,
        }
    }
}

#[async_trait]
impl<R> SongRepository for CachedSongRepository<R>
where
    R: SongRepository + 'static,
{
    async fn list_collections(&self) -> Result<Vec<SongCollection>> {
        fetch_with_cache(
            self.store.as_ref(),
            self.clock.as_ref(),
            &song_collections_key(),
            COLLECTIONS_LIST_KEY,
            self.ttl,
            || self.repository.list_collections(),
        )
        .await
    }

    async fn collection_songs(&self, collection_id: &str) -> Result<Vec<Song>> {
        fetch_with_cache(
            self.store.as_ref(),
            self.clock.as_ref(),
            &song_collection_key(collection_id),
            SONGS_LIST_KEY,
            self.ttl,
            || self.repository.collection_songs(collection_id),
        )
        .await
    }

    async fn song(&self, collection_id: &str, number: &str) -> Result<Option<Song>> {
        let songs = self.collection_songs(collection_id).await?;
        Ok(find_song(songs, number))
    }
}
