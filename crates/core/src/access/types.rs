use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Features unlocked by a premium subscription.
pub const PREMIUM_FEATURES: [&str; 4] = [
    "audio_playback",
    "audio_download",
    "premium_collections",
    "offline_bible",
];

/// Access level required by a collection or held by a user.
///
/// Levels are totally ordered: `Public < Registered < Premium < Admin < SuperAdmin`.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    #[default]
    Public,
    Registered,
    Premium,
    Admin,
    SuperAdmin,
}

impl AccessLevel {
    /// Numeric rank used for comparisons.
    pub fn rank(self) -> u8 {
        match self {
            Self::Public => 0,
            Self::Registered => 1,
            Self::Premium => 2,
            Self::Admin => 3,
            Self::SuperAdmin => 4,
        }
    }

    /// Returns true if a holder of `self` may see something that requires `required`.
    pub fn has_access_to(self, required: AccessLevel) -> bool {
        self.rank() >= required.rank()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Registered => "registered",
            Self::Premium => "premium",
            Self::Admin => "admin",
            Self::SuperAdmin => "superadmin",
        }
    }

    /// Parses a level from remote data. Unknown values fall back to `Public`.
    pub fn parse_lenient(value: &str) -> Self {
        match normalize_token(value).as_str() {
            "registered" | "user" => Self::Registered,
            "premium" => Self::Premium,
            "admin" => Self::Admin,
            "superadmin" => Self::SuperAdmin,
            _ => Self::Public,
        }
    }
}

impl fmt::Display for AccessLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Role attached to a user record in the remote store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[default]
    User,
    Admin,
    SuperAdmin,
}

impl UserRole {
    /// Parses a role. Accepts `superadmin`, `super_admin` and `super-admin`.
    pub fn parse_lenient(value: &str) -> Self {
        match normalize_token(value).as_str() {
            "admin" => Self::Admin,
            "superadmin" => Self::SuperAdmin,
            _ => Self::User,
        }
    }

    /// Admins and super admins get premium features without a subscription.
    pub fn is_admin(self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Admin => write!(f, "admin"),
            Self::SuperAdmin => write!(f, "superadmin"),
        }
    }
}

fn normalize_token(value: &str) -> String {
    value
        .trim()
        .chars()
        .filter(|c| *c != '_' && *c != '-' && !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// The currently signed-in user as reported by the auth backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub uid: String,
    pub email: Option<String>,
    /// Guest sessions are authenticated but carry no identity.
    pub is_anonymous: bool,
}

impl AuthUser {
    pub fn new(uid: impl Into<String>) -> Self {
        Self {
            uid: uid.into(),
            email: None,
            is_anonymous: false,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    pub fn anonymous(mut self) -> Self {
        self.is_anonymous = true;
        self
    }
}

/// Authentication state used by the access gate.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum AuthState {
    #[default]
    Anonymous,
    Authenticated { user: AuthUser, role: UserRole },
}

impl AuthState {
    pub fn authenticated(user: AuthUser, role: UserRole) -> Self {
        Self::Authenticated { user, role }
    }

    /// Returns the user only when the session has a real identity.
    pub fn user(&self) -> Option<&AuthUser> {
        match self {
            Self::Authenticated { user, .. } if !user.is_anonymous => Some(user),
            _ => None,
        }
    }

    pub fn uid(&self) -> Option<&str> {
        self.user().map(|u| u.uid.as_str())
    }

    pub fn is_signed_in(&self) -> bool {
        self.user().is_some()
    }

    pub fn role(&self) -> Option<UserRole> {
        match self {
            Self::Authenticated { user, role } if !user.is_anonymous => Some(*role),
            _ => None,
        }
    }

    /// The level this session holds, given its premium status at `now`.
    pub fn access_level(&self, premium: &PremiumStatus, now: DateTime<Utc>) -> AccessLevel {
        match self.role() {
            None => AccessLevel::Public,
            Some(UserRole::SuperAdmin) => AccessLevel::SuperAdmin,
            Some(UserRole::Admin) => AccessLevel::Admin,
            Some(UserRole::User) if premium.effective(now).is_premium => AccessLevel::Premium,
            Some(UserRole::User) => AccessLevel::Registered,
        }
    }
}

/// Subscription tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PremiumTier {
    #[default]
    Free,
    Basic,
    Premium,
    Lifetime,
}

impl PremiumTier {
    pub fn parse_lenient(value: &str) -> Self {
        match normalize_token(value).as_str() {
            "basic" => Self::Basic,
            "premium" | "pro" => Self::Premium,
            "lifetime" => Self::Lifetime,
            _ => Self::Free,
        }
    }
}

/// Premium subscription state for a user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PremiumStatus {
    pub is_premium: bool,
    pub tier: PremiumTier,
    pub expiry: Option<DateTime<Utc>>,
    #[serde(default)]
    pub features: BTreeSet<String>,
}

impl PremiumStatus {
    pub fn free() -> Self {
        Self::default()
    }

    /// Status granted to admins regardless of subscription.
    pub fn auto_granted() -> Self {
        Self {
            is_premium: true,
            tier: PremiumTier::Lifetime,
            expiry: None,
            features: PREMIUM_FEATURES.iter().map(|f| f.to_string()).collect(),
        }
    }

    /// Lifetime grants carry no expiry; any past expiry counts, whatever the tier.
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expiry.is_some_and(|exp| exp <= now)
    }

    /// The status as it applies at `now`: an expired subscription is free,
    /// whatever the cached `is_premium` flag says.
    pub fn effective(&self, now: DateTime<Utc>) -> Self {
        if self.is_expired(now) {
            Self::free()
        } else {
            self.clone()
        }
    }

    pub fn has_feature(&self, feature: &str) -> bool {
        self.is_premium && self.features.contains(feature)
    }
}
