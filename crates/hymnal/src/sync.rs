//! Periodic catalog refresh driven by connectivity.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;

use hymnal_core::access::AuthState;

use crate::clock::Clock;
use crate::services::SongService;

/// Result of the latest refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub online: bool,
    pub collections: usize,
    pub songs: usize,
    pub last_refresh: Option<DateTime<Utc>>,
}

/// Re-runs the full catalog load on a timer.
///
/// Polls quickly while offline and slowly while online. Every refresh is
/// published on a watch channel.
pub struct ConnectivityMonitor {
    songs: Arc<SongService>,
    auth: AuthState,
    clock: Arc<dyn Clock>,
    poll_online: Duration,
    poll_offline: Duration,
    status_tx: watch::Sender<SyncStatus>,
}

impl ConnectivityMonitor {
    pub fn new(
        songs: Arc<SongService>,
        auth: AuthState,
        clock: Arc<dyn Clock>,
        poll_online: Duration,
        poll_offline: Duration,
    ) -> Self {
        let (status_tx, _) = watch::channel(SyncStatus::default());
        Self {
            songs,
            auth,
            clock,
            poll_online,
            poll_offline,
            status_tx,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<SyncStatus> {
        self.status_tx.subscribe()
    }

    pub fn status(&self) -> SyncStatus {
        self.status_tx.borrow().clone()
    }

    /// Runs one catalog load and publishes the result.
    pub async fn refresh(&self) -> SyncStatus {
        let snapshot = self.songs.load_all(&self.auth).await;
        let status = SyncStatus {
            online: !snapshot.offline,
            collections: snapshot.collections.len(),
            songs: snapshot.song_count(),
            last_refresh: Some(self.clock.now()),
        };

        let previous = self.status_tx.send_replace(status.clone());
        if previous.last_refresh.is_some() && previous.online != status.online {
            if status.online {
                tracing::info!("Remote store reachable again");
            } else {
                tracing::warn!("Remote store unreachable");
            }
        }
        tracing::debug!(
            online = status.online,
            collections = status.collections,
            songs = status.songs,
            "Catalog refreshed"
        );
        status
    }

    /// Delay before the next refresh after `status`.
    pub fn next_interval(&self, status: &SyncStatus) -> Duration {
        if status.online {
            self.poll_online
        } else {
            self.poll_offline
        }
    }

    /// Refreshes until `shutdown` fires.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        loop {
            let status = self.refresh().await;
            let wait = self.next_interval(&status);

            tokio::select! {
                _ = tokio::time::sleep(wait) => {}
                _ = shutdown.recv() => {
                    tracing::debug!("Connectivity monitor shutting down");
                    break;
                }
            }
        }
    }

    pub fn spawn(self: Arc<Self>, shutdown: broadcast::Receiver<()>) -> JoinHandle<()> {
        tokio::spawn(async move { self.run(shutdown).await })
    }
}
