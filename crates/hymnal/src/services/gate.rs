//! Read gate for collections and features.

use std::sync::Arc;

use hymnal_core::access::{resolve_access, AccessLevel, AccessState, AuthState, PremiumStatus};
use hymnal_core::storage::{RepositoryError, Result};

use super::PremiumStatusProvider;
use crate::clock::Clock;

/// Decides whether a session may read something that requires a level.
///
/// Public content never triggers a premium lookup, and neither do
/// sessions without an identity.
pub struct AccessGate {
    premium: Arc<PremiumStatusProvider>,
    clock: Arc<dyn Clock>,
}

impl AccessGate {
    pub fn new(premium: Arc<PremiumStatusProvider>, clock: Arc<dyn Clock>) -> Self {
        Self { premium, clock }
    }

    pub async fn check(&self, required: AccessLevel, auth: &AuthState) -> AccessState {
        let now = self.clock.now();
        let premium = if required == AccessLevel::Public || !auth.is_signed_in() {
            PremiumStatus::free()
        } else {
            self.premium.status(auth).await
        };

        let state = resolve_access(required, auth, &premium, now);
        if !state.is_granted() {
            tracing::debug!(required = %required, state = ?state, "Access not granted");
        }
        state
    }

    /// Like [`check`](Self::check), but denial is an error.
    pub async fn ensure(&self, required: AccessLevel, auth: &AuthState) -> Result<()> {
        match self.check(required, auth).await.denial() {
            Some(reason) => Err(RepositoryError::AccessDenied(reason)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use chrono::{TimeZone, Utc};
    use serde_json::json;

    use hymnal_core::access::{AuthUser, DenialReason, UserRole};

    use crate::clock::ManualClock;
    use crate::local::MemoryKeyValueStore;
    use crate::remote::InMemoryDocumentStore;

    fn gate() -> (Arc<InMemoryDocumentStore>, AccessGate) {
        let remote = Arc::new(InMemoryDocumentStore::with_data(json!({
            "users": {
                "free": { "role": "user" },
                "paid": { "role": "user", "isPremium": true, "premiumTier": "lifetime" }
            }
        })));
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap(),
        ));
        let premium = Arc::new(PremiumStatusProvider::new(
            remote.clone(),
            Arc::new(MemoryKeyValueStore::new()),
            clock.clone(),
            16,
            Duration::from_secs(300),
        ));
        (remote, AccessGate::new(premium, clock))
    }

    fn user(uid: &str) -> AuthState {
        AuthState::authenticated(AuthUser::new(uid), UserRole::User)
    }

    #[tokio::test]
    async fn test_public_skips_premium_lookup() {
        let (remote, gate) = gate();

        let state = gate.check(AccessLevel::Public, &user("free")).await;

        assert_eq!(state, AccessState::Granted);
        assert_eq!(remote.read_count(), 0);
    }

    #[tokio::test]
    async fn test_premium_collection_reasons() {
        let (_, gate) = gate();

        let anonymous = gate
            .ensure(AccessLevel::Premium, &AuthState::Anonymous)
            .await
            .unwrap_err();
        assert_eq!(anonymous.reason_code(), "login_required");

        let free = gate
            .ensure(AccessLevel::Premium, &user("free"))
            .await
            .unwrap_err();
        assert_eq!(free, RepositoryError::AccessDenied(DenialReason::PremiumRequired));

        assert!(gate.ensure(AccessLevel::Premium, &user("paid")).await.is_ok());
    }

    #[tokio::test]
    async fn test_admin_level_denied_for_users() {
        let (_, gate) = gate();

        let state = gate.check(AccessLevel::Admin, &user("paid")).await;

        assert_eq!(state, AccessState::AccessDenied);
    }
}
