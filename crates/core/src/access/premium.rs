//! Conversions between the remote user record and premium/role types.
//!
//! The user record lives at `users/<uid>` and uses camelCase field names:
//! `role`, `isPremium`, `premiumTier`, `premiumExpiry`, `features`.

use serde_json::{json, Value};

use crate::snapshot::{bool_field, datetime_field, string_field, string_set_field};

use super::{PremiumStatus, PremiumTier, UserRole};

/// Reads the role of a user record. Absent or unknown roles are `User`.
pub fn role_from_snapshot(node: &Value) -> UserRole {
    string_field(node, "role")
        .map(|r| UserRole::parse_lenient(&r))
        .unwrap_or_default()
}

/// Reads the premium status of a user record.
///
/// A record that only says `isPremium: true` is treated as the `Premium`
/// tier; a tier without the flag is not premium.
pub fn premium_from_snapshot(node: &Value) -> PremiumStatus {
    let is_premium = bool_field(node, "isPremium").unwrap_or(false);
    let tier = match string_field(node, "premiumTier") {
        Some(tier) => PremiumTier::parse_lenient(&tier),
        None if is_premium => PremiumTier::Premium,
        None => PremiumTier::Free,
    };

    PremiumStatus {
        is_premium,
        tier,
        expiry: datetime_field(node, "premiumExpiry"),
        features: string_set_field(node, "features").into_iter().collect(),
    }
}

/// Writes the premium fields of a user record.
pub fn premium_to_value(status: &PremiumStatus) -> Value {
    let mut node = json!({
        "isPremium": status.is_premium,
        "premiumTier": status.tier,
        "features": status.features,
    });
    if let Some(expiry) = status.expiry {
        node["premiumExpiry"] = Value::String(expiry.to_rfc3339());
    }
    node
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn test_premium_from_full_record() {
        let node = json!({
            "role": "user",
            "isPremium": true,
            "premiumTier": "lifetime",
            "premiumExpiry": "2030-01-01T00:00:00Z",
            "features": ["audio_playback"]
        });
        let status = premium_from_snapshot(&node);
        assert!(status.is_premium);
        assert_eq!(status.tier, PremiumTier::Lifetime);
        assert_eq!(
            status.expiry,
            Some(Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap())
        );
        assert!(status.features.contains("audio_playback"));
    }

    #[test]
    fn test_premium_flag_without_tier() {
        let status = premium_from_snapshot(&json!({"isPremium": true}));
        assert_eq!(status.tier, PremiumTier::Premium);
    }

    #[test]
    fn test_malformed_record_is_free() {
        let status = premium_from_snapshot(&json!("garbage"));
        assert_eq!(status, PremiumStatus::free());
    }

    #[test]
    fn test_role_from_snapshot() {
        assert_eq!(role_from_snapshot(&json!({"role": "superadmin"})), UserRole::SuperAdmin);
        assert_eq!(role_from_snapshot(&json!({})), UserRole::User);
    }

    #[test]
    fn test_premium_roundtrip() {
        let status = PremiumStatus {
            is_premium: true,
            tier: PremiumTier::Basic,
            expiry: Some(Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap()),
            features: ["offline_bible".to_string()].into_iter().collect(),
        };
        assert_eq!(premium_from_snapshot(&premium_to_value(&status)), status);
    }
}
