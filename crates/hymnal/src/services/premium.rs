//! Premium status lookup with in-process memo and offline fallback.

use std::sync::Arc;
use std::time::Duration;

use hymnal_core::access::{
    premium_from_snapshot, role_from_snapshot, AuthState, AuthUser, PremiumStatus, UserRole,
};
use hymnal_core::cache::premium_status_key;
use hymnal_core::storage::{paths, DocumentStore, KeyValueStore, PrefValue, RepositoryError};

use crate::cache::TtlCache;
use crate::clock::Clock;

/// Resolves the premium status of a session.
///
/// Lookup order:
/// 1. Anonymous sessions are free
/// 2. Admins and super admins are auto-granted
/// 3. The in-process memo
/// 4. The remote user record, persisted locally on success
/// 5. The locally persisted status when the remote is unreachable
/// 6. Free
///
/// Whatever the source, expiry is re-evaluated against the clock.
pub struct PremiumStatusProvider {
    remote: Arc<dyn DocumentStore>,
    local: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    memo: TtlCache<String, PremiumStatus>,
}

impl PremiumStatusProvider {
    pub fn new(
        remote: Arc<dyn DocumentStore>,
        local: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        memo_capacity: usize,
        memo_ttl: Duration,
    ) -> Self {
        Self {
            remote,
            local,
            memo: TtlCache::new(memo_capacity, memo_ttl, clock.clone()),
            clock,
        }
    }

    pub async fn status(&self, auth: &AuthState) -> PremiumStatus {
        let now = self.clock.now();

        let (Some(uid), Some(role)) = (auth.uid(), auth.role()) else {
            return PremiumStatus::free();
        };
        if role.is_admin() {
            return PremiumStatus::auto_granted();
        }

        if let Some(status) = self.memo.get(&uid.to_string()).await {
            tracing::trace!(uid = %uid, "Premium status memo hit");
            return status.effective(now);
        }

        let status = match self.fetch_remote(uid).await {
            Ok(status) => {
                self.persist(uid, &status).await;
                status
            }
            Err(err) => {
                tracing::warn!(uid = %uid, error = %err, "Premium lookup failed, using local status");
                self.load_local(uid).await.unwrap_or_default()
            }
        };

        self.memo.insert(uid.to_string(), status.clone()).await;
        status.effective(now)
    }

    /// Drops the memoized status so the next lookup goes remote.
    pub async fn invalidate(&self, uid: &str) -> bool {
        self.memo.invalidate(&uid.to_string()).await
    }

    pub async fn clear(&self) {
        self.memo.clear().await;
    }

    /// Builds a session for `user`, reading its role from `users/<uid>`.
    ///
    /// Guests and unreadable records get the plain `User` role.
    pub async fn resolve_session(&self, user: AuthUser) -> AuthState {
        if user.is_anonymous {
            return AuthState::authenticated(user, UserRole::User);
        }

        let role = match self.remote.get(&paths::user_path(&user.uid)).await {
            Ok(Some(node)) => role_from_snapshot(&node),
            Ok(None) => UserRole::User,
            Err(err) => {
                tracing::warn!(uid = %user.uid, error = %err, "Role lookup failed");
                UserRole::User
            }
        };

        tracing::debug!(uid = %user.uid, role = %role, "Session resolved");
        AuthState::authenticated(user, role)
    }

    async fn fetch_remote(&self, uid: &str) -> Result<PremiumStatus, RepositoryError> {
        let node = self.remote.get(&paths::user_path(uid)).await?;
        Ok(node.as_ref().map(premium_from_snapshot).unwrap_or_default())
    }

    async fn persist(&self, uid: &str, status: &PremiumStatus) {
        let raw = match serde_json::to_string(status) {
            Ok(raw) => raw,
            Err(err) => {
                tracing::warn!(uid = %uid, error = %err, "Failed to encode premium status");
                return;
            }
        };
        if let Err(err) = self
            .local
            .set(&premium_status_key(uid), PrefValue::String(raw))
            .await
        {
            tracing::warn!(uid = %uid, error = %err, "Failed to persist premium status");
        }
    }

    async fn load_local(&self, uid: &str) -> Option<PremiumStatus> {
        let raw = match self.local.get(&premium_status_key(uid)).await {
            Ok(Some(PrefValue::String(raw))) => raw,
            Ok(_) => return None,
            Err(err) => {
                tracing::warn!(uid = %uid, error = %err, "Failed to read local premium status");
                return None;
            }
        };

        serde_json::from_str(&raw)
            .inspect_err(|err| {
                tracing::warn!(uid = %uid, error = %err, "Local premium status is corrupt");
            })
            .ok()
    }
}
