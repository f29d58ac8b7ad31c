//! Song catalog facade.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use serde::Serialize;

use hymnal_core::access::{AccessLevel, AuthState};
use hymnal_core::catalog::{
    filter_active_collections, search_songs, sort_songs, CollectionAccess, Song, SongCollection,
    SongQuery, SongSortOrder, SongView,
};
use hymnal_core::favorites::{FavoriteSet, GLOBAL_CONTEXT};
use hymnal_core::storage::{FavoritesStore, RepositoryError, Result, SongRepository};

use super::AccessGate;

/// Everything a session can see, loaded in one pass.
#[derive(Debug, Clone, Default, Serialize)]
pub struct CatalogSnapshot {
    pub collections: Vec<CollectionAccess>,
    /// Songs of every granted collection, keyed by collection id.
    pub songs: BTreeMap<String, Vec<Song>>,
    /// True when nothing could be loaded and a remote call failed.
    pub offline: bool,
}

impl CatalogSnapshot {
    pub fn song_count(&self) -> usize {
        self.songs.values().map(Vec::len).sum()
    }
}

/// Songs and collections as seen by one session.
pub struct SongService {
    repository: Arc<dyn SongRepository>,
    favorites: Arc<dyn FavoritesStore>,
    gate: Arc<AccessGate>,
    default_collection: String,
}

impl SongService {
    pub fn new(
        repository: Arc<dyn SongRepository>,
        favorites: Arc<dyn FavoritesStore>,
        gate: Arc<AccessGate>,
        default_collection: impl Into<String>,
    ) -> Self {
        Self {
            repository,
            favorites,
            gate,
            default_collection: default_collection.into(),
        }
    }

    /// Active collections with the session's access state for each.
    pub async fn collections(&self, auth: &AuthState) -> Result<Vec<CollectionAccess>> {
        let collections = filter_active_collections(self.repository.list_collections().await?);

        let mut annotated = Vec::with_capacity(collections.len());
        for collection in collections {
            let access = self.gate.check(collection.access_level, auth).await;
            annotated.push(CollectionAccess { collection, access });
        }
        Ok(annotated)
    }

    /// Loads every accessible collection. Never fails; failures are logged
    /// and reflected in [`CatalogSnapshot::offline`].
    pub async fn load_all(&self, auth: &AuthState) -> CatalogSnapshot {
        let collections = match self.collections(auth).await {
            Ok(collections) => collections,
            Err(err) => {
                tracing::warn!(error = %err, "Failed to load collections");
                return CatalogSnapshot {
                    offline: err.is_offline(),
                    ..CatalogSnapshot::default()
                };
            }
        };

        let mut songs = BTreeMap::new();
        let mut remote_failed = false;
        for entry in collections.iter().filter(|c| c.access.is_granted()) {
            let id = &entry.collection.id;
            match self.repository.collection_songs(id).await {
                Ok(list) => {
                    songs.insert(id.clone(), list);
                }
                Err(err) => {
                    remote_failed |= err.is_offline();
                    tracing::warn!(collection = %id, error = %err, "Failed to load songs");
                }
            }
        }

        let snapshot = CatalogSnapshot {
            offline: remote_failed && songs.values().all(Vec::is_empty),
            collections,
            songs,
        };
        tracing::debug!(
            collections = snapshot.collections.len(),
            songs = snapshot.song_count(),
            offline = snapshot.offline,
            "Catalog loaded"
        );
        snapshot
    }

    /// All songs of a collection, sorted.
    pub async fn get_all(
        &self,
        collection_id: &str,
        auth: &AuthState,
        order: SongSortOrder,
    ) -> Result<Vec<Song>> {
        self.ensure_collection(collection_id, auth).await?;

        let mut songs = self.repository.collection_songs(collection_id).await?;
        sort_songs(&mut songs, order);
        Ok(songs)
    }

    pub async fn get_by_id(
        &self,
        collection_id: &str,
        number: &str,
        auth: &AuthState,
    ) -> Result<Song> {
        self.ensure_collection(collection_id, auth).await?;

        self.repository
            .song(collection_id, number)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Song", format!("{collection_id}/{number}")))
    }

    /// Searches one collection, or every granted collection when the query
    /// names none. Results keep storage order unless `order` is given.
    pub async fn search(
        &self,
        query: &SongQuery,
        auth: &AuthState,
        order: Option<SongSortOrder>,
    ) -> Result<Vec<Song>> {
        let songs = match &query.collection_id {
            Some(id) => {
                self.ensure_collection(id, auth).await?;
                self.repository.collection_songs(id).await?
            }
            None => {
                let mut all = Vec::new();
                for entry in self.collections(auth).await? {
                    if entry.access.is_granted() {
                        all.extend(self.repository.collection_songs(&entry.collection.id).await?);
                    }
                }
                all
            }
        };

        let mut results = search_songs(&songs, query);
        if let Some(order) = order {
            sort_songs(&mut results, order);
        }
        tracing::debug!(query = %query.text, results = results.len(), "Song search");
        Ok(results)
    }

    /// The session's favorite songs that it can still read.
    ///
    /// Global favorites resolve to the default collection. Favorites that
    /// point at missing songs or locked collections are skipped.
    pub async fn favorite_songs(&self, auth: &AuthState) -> Result<Vec<SongView>> {
        self.gate.ensure(AccessLevel::Registered, auth).await?;
        let Some(uid) = auth.uid() else {
            return Ok(Vec::new());
        };

        let favorites = self.favorites.load(uid).await?;
        let collections: BTreeMap<String, SongCollection> = self
            .repository
            .list_collections()
            .await?
            .into_iter()
            .map(|c| (c.id.clone(), c))
            .collect();

        let targets: BTreeSet<(&str, &str)> = favorites
            .iter()
            .map(|(collection, number)| {
                let collection = if collection == GLOBAL_CONTEXT {
                    self.default_collection.as_str()
                } else {
                    collection
                };
                (collection, number)
            })
            .collect();

        let mut views = Vec::new();
        for (collection_id, number) in targets {
            let Some(collection) = collections.get(collection_id) else {
                continue;
            };
            if !self.gate.check(collection.access_level, auth).await.is_granted() {
                continue;
            }
            match self.repository.song(collection_id, number).await? {
                Some(song) => views.push(SongView {
                    song,
                    is_favorite: true,
                }),
                None => {
                    tracing::debug!(collection = %collection_id, number = %number, "Favorite song no longer exists");
                }
            }
        }
        Ok(views)
    }

    /// Pairs songs with their favorite flag.
    pub fn annotate(&self, songs: Vec<Song>, favorites: &FavoriteSet) -> Vec<SongView> {
        songs
            .into_iter()
            .map(|song| {
                let collection = song
                    .collection_id
                    .as_deref()
                    .unwrap_or(&self.default_collection);
                let is_favorite =
                    favorites.contains_song(collection, &song.number, &self.default_collection);
                SongView { song, is_favorite }
            })
            .collect()
    }

    /// Fails with `NotFound` for unknown or inactive collections and with
    /// `AccessDenied` when the session cannot read it.
    async fn ensure_collection(&self, collection_id: &str, auth: &AuthState) -> Result<()> {
        let collection = self
            .repository
            .list_collections()
            .await?
            .into_iter()
            .find(|c| c.id == collection_id && c.is_active())
            .ok_or_else(|| RepositoryError::not_found("Collection", collection_id))?;

        self.gate.ensure(collection.access_level, auth).await
    }
}
