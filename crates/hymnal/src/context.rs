//! Explicitly constructed service bundle.
//!
//! Nothing in the data layer is a process-wide singleton. The context owns
//! the injected stores and clock and wires every service from them, so
//! tests can build one around fakes.

use std::sync::Arc;

use tokio::sync::broadcast;

use hymnal_core::access::{AuthState, AuthUser};
use hymnal_core::cache::{Result as CacheResult, CACHE_PATTERNS};
use hymnal_core::storage::{DocumentStore, KeyValueStore};

use crate::cache::clear_cache;
use crate::clock::Clock;
use crate::config::Config;
use crate::local::Preferences;
use crate::services::{
    AccessGate, BibleService, FavoritesRepository, PremiumStatusProvider, SongService,
};
use crate::storage::{
    CachedBibleRepository, CachedSongRepository, RemoteBibleRepository, RemoteSongRepository,
};
use crate::sync::ConnectivityMonitor;

/// Shared data layer state.
///
/// Cheap to clone; every service sits behind an `Arc`.
#[derive(Clone)]
pub struct HymnalContext {
    pub config: Config,
    pub remote: Arc<dyn DocumentStore>,
    pub local: Arc<dyn KeyValueStore>,
    pub clock: Arc<dyn Clock>,
    pub premium: Arc<PremiumStatusProvider>,
    pub gate: Arc<AccessGate>,
    pub favorites: Arc<FavoritesRepository>,
    pub songs: Arc<SongService>,
    pub bible: Arc<BibleService>,
    pub preferences: Preferences,
    shutdown_tx: broadcast::Sender<()>,
}

impl HymnalContext {
    pub fn build(
        config: Config,
        remote: Arc<dyn DocumentStore>,
        local: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let premium = Arc::new(PremiumStatusProvider::new(
            remote.clone(),
            local.clone(),
            clock.clone(),
            config.cache_max_entries,
            config.premium_ttl(),
        ));
        let gate = Arc::new(AccessGate::new(premium.clone(), clock.clone()));
        let favorites = Arc::new(FavoritesRepository::new(
            remote.clone(),
            config.default_collection.clone(),
        ));

        let song_repo = CachedSongRepository::new(
            Arc::new(RemoteSongRepository::new(remote.clone())),
            local.clone(),
            clock.clone(),
            config.cache_ttl(),
        );
        let songs = Arc::new(SongService::new(
            Arc::new(song_repo),
            favorites.clone(),
            gate.clone(),
            config.default_collection.clone(),
        ));

        let bible_repo = CachedBibleRepository::new(
            Arc::new(RemoteBibleRepository::new(remote.clone())),
            local.clone(),
            clock.clone(),
            config.cache_ttl(),
        );
        let bible = Arc::new(BibleService::new(
            Arc::new(bible_repo),
            remote.clone(),
            gate.clone(),
            clock.clone(),
            config.search_limit,
        ));

        let (shutdown_tx, _) = broadcast::channel(1);

        tracing::debug!(
            cache_ttl_seconds = config.cache_ttl_seconds,
            default_collection = %config.default_collection,
            "Hymnal context built"
        );

        Self {
            preferences: Preferences::new(local.clone()),
            config,
            remote,
            local,
            clock,
            premium,
            gate,
            favorites,
            songs,
            bible,
            shutdown_tx,
        }
    }

    /// Resolves a session for a signed-in user.
    pub async fn sign_in(&self, user: AuthUser) -> AuthState {
        self.premium.resolve_session(user).await
    }

    /// Removes every locally cached list and premium status, and drops the
    /// in-process premium memo. Preferences are kept.
    pub async fn clear_cache(&self) -> CacheResult<usize> {
        let removed = clear_cache(self.local.as_ref(), &CACHE_PATTERNS).await?;
        self.premium.clear().await;
        tracing::info!(removed, "Local cache cleared");
        Ok(removed)
    }

    pub fn connectivity_monitor(&self, auth: AuthState) -> Arc<ConnectivityMonitor> {
        Arc::new(ConnectivityMonitor::new(
            self.songs.clone(),
            auth,
            self.clock.clone(),
            self.config.poll_online(),
            self.config.poll_offline(),
        ))
    }

    pub fn subscribe_shutdown(&self) -> broadcast::Receiver<()> {
        self.shutdown_tx.subscribe()
    }

    /// Stops background tasks started from this context.
    pub fn signal_shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
