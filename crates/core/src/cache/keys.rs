//! Local cache keys.
//!
//! Every key the data layer writes into the local store is built here so
//! the bulk clear in [`CACHE_PATTERNS`] stays in sync with the writers.

/// List key used inside the envelope of a collection's songs.
pub const SONGS_LIST_KEY: &str = "songs";
/// List key used inside the envelope of the collection list.
pub const COLLECTIONS_LIST_KEY: &str = "collections";
/// List key used inside the envelope of the book list.
pub const BOOKS_LIST_KEY: &str = "books";
/// List key used inside the envelope of a book's chapters.
pub const CHAPTERS_LIST_KEY: &str = "chapters";

/// Patterns matching every cache key. Preferences and other local data
/// stored next to the cache do not match.
pub const CACHE_PATTERNS: [&str; 5] = [
    "song_collection_cache_*",
    "song_collections_cache",
    "bible_books_cache",
    "bible_chapters_*",
    "premium_status_*",
];

/// Returns the cache key for the songs of a collection.
pub fn song_collection_key(collection_id: &str) -> String {
    format!("song_collection_cache_{collection_id}")
}

/// Returns the cache key for the collection list.
pub fn song_collections_key() -> String {
    "song_collections_cache".to_string()
}

/// Returns the cache key for the book list.
pub fn bible_books_key() -> String {
    "bible_books_cache".to_string()
}

/// Returns the cache key for the chapters of a book.
pub fn bible_chapters_key(book_id: &str) -> String {
    format!("bible_chapters_{book_id}")
}

/// Returns the cache key for a user's last known premium status.
pub fn premium_status_key(uid: &str) -> String {
    format!("premium_status_{uid}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::pattern_matches;

    fn is_cache_key(key: &str) -> bool {
        CACHE_PATTERNS.iter().any(|p| pattern_matches(p, key))
    }

    #[test]
    fn test_key_formats() {
        assert_eq!(song_collection_key("LPMI"), "song_collection_cache_LPMI");
        assert_eq!(bible_chapters_key("GEN"), "bible_chapters_GEN");
        assert_eq!(premium_status_key("u1"), "premium_status_u1");
    }

    #[test]
    fn test_every_key_is_covered_by_patterns() {
        assert!(is_cache_key(&song_collection_key("SRD")));
        assert!(is_cache_key(&song_collections_key()));
        assert!(is_cache_key(&bible_books_key()));
        assert!(is_cache_key(&bible_chapters_key("JHN")));
        assert!(is_cache_key(&premium_status_key("abc")));
    }

    #[test]
    fn test_preferences_are_not_cache_keys() {
        assert!(!is_cache_key("font_size"));
        assert!(!is_cache_key("theme_mode"));
        assert!(!is_cache_key("last_collection"));
        assert!(!is_cache_key("bible_font_size"));
    }
}
