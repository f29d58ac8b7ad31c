mod premium;
mod resolution;
mod types;

pub use premium::{premium_from_snapshot, premium_to_value, role_from_snapshot};
pub use resolution::{resolve_access, AccessState, DenialReason};
pub use types::{
    AccessLevel, AuthState, AuthUser, PremiumStatus, PremiumTier, UserRole, PREMIUM_FEATURES,
};
