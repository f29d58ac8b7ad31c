use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::bible::{BibleBook, BibleChapter};
use crate::cache::Result as CacheResult;
use crate::catalog::{Song, SongCollection};
use crate::favorites::FavoriteSet;

use super::{PrefValue, RemotePath, RemoteResult, Result};

/// Body of a [`DocumentStore::transaction`].
///
/// Receives the current value at the path (`None` when absent) and returns
/// the value to commit (`None` removes the node). It may run more than once
/// when a store retries after a conflicting write.
pub type TransactionFn = Box<dyn Fn(Option<&Value>) -> Option<Value> + Send + Sync>;

/// A tree-structured remote database addressed by `/`-separated paths.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Reads the full subtree at `path`. `None` when nothing is stored there.
    async fn get(&self, path: &RemotePath) -> RemoteResult<Option<Value>>;

    /// Returns the children of `path` whose `child` field equals `value`,
    /// as an object keyed like the source children.
    async fn query_equal(&self, path: &RemotePath, child: &str, value: &Value)
        -> RemoteResult<Value>;

    /// Replaces the subtree at `path`.
    async fn set(&self, path: &RemotePath, value: Value) -> RemoteResult<()>;

    /// Merges `fields` into the node at `path`; a `null` field removes it.
    async fn update(&self, path: &RemotePath, fields: Map<String, Value>) -> RemoteResult<()>;

    /// Removes the subtree at `path`.
    async fn remove(&self, path: &RemotePath) -> RemoteResult<()>;

    /// Atomically applies `f` to the value at `path` and returns the
    /// committed value. Nothing is written when `f` returns the current value.
    async fn transaction(&self, path: &RemotePath, f: TransactionFn)
        -> RemoteResult<Option<Value>>;
}

/// The local persisted key-value map used for preferences and the cache.
#[async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> CacheResult<Option<PrefValue>>;

    async fn set(&self, key: &str, value: PrefValue) -> CacheResult<()>;

    /// Removes a key. Returns true if it existed.
    async fn remove(&self, key: &str) -> CacheResult<bool>;

    /// All keys currently stored.
    async fn keys(&self) -> CacheResult<Vec<String>>;
}

/// Read access to song collections.
#[async_trait]
pub trait SongRepository: Send + Sync {
    /// Every collection, active or not.
    async fn list_collections(&self) -> Result<Vec<SongCollection>>;

    /// All songs of a collection in storage order.
    async fn collection_songs(&self, collection_id: &str) -> Result<Vec<Song>>;

    /// A single song. `None` when the collection has no such number.
    async fn song(&self, collection_id: &str, number: &str) -> Result<Option<Song>>;
}

/// Read access to the Bible text.
#[async_trait]
pub trait BibleRepository: Send + Sync {
    async fn books(&self) -> Result<Vec<BibleBook>>;

    /// All chapters of a book in storage order.
    async fn chapters(&self, book_id: &str) -> Result<Vec<BibleChapter>>;

    async fn chapter(&self, book_id: &str, chapter: u32) -> Result<Option<BibleChapter>>;
}

/// A user's favorite songs.
#[async_trait]
pub trait FavoritesStore: Send + Sync {
    async fn load(&self, uid: &str) -> Result<FavoriteSet>;

    /// Flips one favorite and returns whether the song is now a favorite.
    /// `collection` defaults to the global context.
    async fn toggle(&self, uid: &str, number: &str, collection: Option<&str>) -> Result<bool>;
}
