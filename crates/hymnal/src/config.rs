use std::{env, str::FromStr, time::Duration};

/// Data layer configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// TTL of cached song and Bible lists in seconds (default: 86,400)
    pub cache_ttl_seconds: u64,
    /// TTL of the in-process premium status memo in seconds (default: 300)
    pub premium_ttl_seconds: u64,
    /// Maximum entries of in-process caches (default: 1,000)
    pub cache_max_entries: usize,
    /// Maximum search results (default: 50)
    pub search_limit: usize,
    /// Poll interval after an online refresh in seconds (default: 300)
    pub poll_online_seconds: u64,
    /// Poll interval after an offline refresh in seconds (default: 15)
    pub poll_offline_seconds: u64,
    /// Path of the local key-value store (default: "hymnal-prefs.json")
    pub local_store_path: String,
    /// Base URL of the remote database. Unset means an in-memory store.
    pub remote_url: Option<String>,
    /// Auth token appended to remote requests.
    pub remote_auth: Option<String>,
    /// Collection that favorites in the global context belong to (default: "LPMI")
    pub default_collection: String,
}

fn parsed<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key).filter(|v| !v.trim().is_empty())
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `HYMNAL_CACHE_TTL_SECONDS` - List cache TTL in seconds (default: 86,400)
    /// - `HYMNAL_PREMIUM_TTL_SECONDS` - Premium memo TTL in seconds (default: 300)
    /// - `HYMNAL_CACHE_MAX_ENTRIES` - In-process cache size (default: 1,000)
    /// - `HYMNAL_SEARCH_LIMIT` - Maximum search results (default: 50)
    /// - `HYMNAL_POLL_ONLINE_SECONDS` - Poll interval while online (default: 300)
    /// - `HYMNAL_POLL_OFFLINE_SECONDS` - Poll interval while offline (default: 15)
    /// - `HYMNAL_LOCAL_STORE` - Local store path (default: "hymnal-prefs.json")
    /// - `HYMNAL_REMOTE_URL` - Remote database URL (default: unset)
    /// - `HYMNAL_REMOTE_AUTH` - Remote auth token (default: unset)
    /// - `HYMNAL_DEFAULT_COLLECTION` - Collection for global favorites (default: "LPMI")
    ///
    /// Unparseable values fall back to the default.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        Self {
            cache_ttl_seconds: parsed(&lookup, "HYMNAL_CACHE_TTL_SECONDS", 86_400),
            premium_ttl_seconds: parsed(&lookup, "HYMNAL_PREMIUM_TTL_SECONDS", 300),
            cache_max_entries: parsed(&lookup, "HYMNAL_CACHE_MAX_ENTRIES", 1_000),
            search_limit: parsed(&lookup, "HYMNAL_SEARCH_LIMIT", 50),
            poll_online_seconds: parsed(&lookup, "HYMNAL_POLL_ONLINE_SECONDS", 300),
            poll_offline_seconds: parsed(&lookup, "HYMNAL_POLL_OFFLINE_SECONDS", 15),
            local_store_path: non_empty(&lookup, "HYMNAL_LOCAL_STORE")
                .unwrap_or_else(|| "hymnal-prefs.json".to_string()),
            remote_url: non_empty(&lookup, "HYMNAL_REMOTE_URL"),
            remote_auth: non_empty(&lookup, "HYMNAL_REMOTE_AUTH"),
            default_collection: non_empty(&lookup, "HYMNAL_DEFAULT_COLLECTION")
                .unwrap_or_else(|| "LPMI".to_string()),
        }
    }

    /// Get list cache TTL as a Duration.
    pub fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl_seconds)
    }

    pub fn premium_ttl(&self) -> Duration {
        Duration::from_secs(self.premium_ttl_seconds)
    }

    pub fn poll_online(&self) -> Duration {
        Duration::from_secs(self.poll_online_seconds)
    }

    pub fn poll_offline(&self) -> Duration {
        Duration::from_secs(self.poll_offline_seconds)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}
