use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{AccessLevel, AuthState, PremiumStatus};

/// Outcome of resolving access to a collection or feature.
///
/// `Unresolved` is the state before the gate has run; every resolution ends
/// in one of the other four, which callers map to a banner or a prompt.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessState {
    #[default]
    Unresolved,
    Granted,
    LoginRequired,
    PremiumRequired,
    AccessDenied,
}

impl AccessState {
    pub fn is_granted(self) -> bool {
        matches!(self, Self::Granted)
    }

    /// The denial reason, if this state denies access.
    pub fn denial(self) -> Option<DenialReason> {
        match self {
            Self::LoginRequired => Some(DenialReason::LoginRequired),
            Self::PremiumRequired => Some(DenialReason::PremiumRequired),
            Self::AccessDenied => Some(DenialReason::InsufficientRole),
            Self::Unresolved | Self::Granted => None,
        }
    }
}

/// Why access was denied. Callers branch on this to pick the right prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    LoginRequired,
    PremiumRequired,
    InsufficientRole,
}

impl DenialReason {
    /// Stable reason code.
    pub fn code(self) -> &'static str {
        match self {
            Self::LoginRequired => "login_required",
            Self::PremiumRequired => "premium_required",
            Self::InsufficientRole => "access_denied",
        }
    }
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Resolves access to something that requires `required`.
///
/// This is a pure function of its inputs: the same level, session and
/// premium status always resolve to the same state.
pub fn resolve_access(
    required: AccessLevel,
    auth: &AuthState,
    premium: &PremiumStatus,
    now: DateTime<Utc>,
) -> AccessState {
    if required == AccessLevel::Public {
        return AccessState::Granted;
    }

    if !auth.is_signed_in() {
        return AccessState::LoginRequired;
    }

    if auth.access_level(premium, now).has_access_to(required) {
        return AccessState::Granted;
    }

    match required {
        AccessLevel::Premium => AccessState::PremiumRequired,
        _ => AccessState::AccessDenied,
    }
}
