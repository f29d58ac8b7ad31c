//! Pure pattern matching functions for cache keys.
//!
//! Used by the bulk cache clear to find every key the data layer owns.

/// Checks if a cache key matches a glob pattern.
///
/// The pattern supports `*` as a wildcard that matches any sequence
/// of characters (including empty strings).
///
/// # Examples
///
/// ```
/// use hymnal_core::cache::pattern_matches;
///
/// assert!(pattern_matches("song_collections_cache", "song_collections_cache"));
/// assert!(pattern_matches("song_collection_cache_*", "song_collection_cache_LPMI"));
/// assert!(pattern_matches("bible_*_JHN", "bible_chapters_JHN"));
/// assert!(!pattern_matches("premium_status_*", "theme_mode"));
/// ```
pub fn pattern_matches(pattern: &str, key: &str) -> bool {
    if pattern.is_empty() {
        return key.is_empty();
    }

    if pattern == "*" {
        return true;
    }

    let segments: Vec<&str> = pattern.split('*').collect();

    if segments.len() == 1 {
        return pattern == key;
    }

    let mut remaining = key;
    let starts_with_wildcard = pattern.starts_with('*');
    let ends_with_wildcard = pattern.ends_with('*');

    for (i, segment) in segments.iter().enumerate() {
        // Adjacent or leading/trailing wildcards
        if segment.is_empty() {
            continue;
        }

        let is_first = i == 0;
        let is_last = i == segments.len() - 1;

        if is_first && !starts_with_wildcard {
            if !remaining.starts_with(segment) {
                return false;
            }
            remaining = &remaining[segment.len()..];
        } else if is_last && !ends_with_wildcard {
            if !remaining.ends_with(segment) {
                return false;
            }
        } else {
            match remaining.find(segment) {
                Some(pos) => {
                    remaining = &remaining[pos + segment.len()..];
                }
                None => return false,
            }
        }
    }

    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        assert!(pattern_matches("bible_books_cache", "bible_books_cache"));
        assert!(!pattern_matches("bible_books_cache", "bible_books_cache_old"));
    }

    #[test]
    fn test_wildcard_at_end() {
        assert!(pattern_matches(
            "song_collection_cache_*",
            "song_collection_cache_LPMI"
        ));
        assert!(pattern_matches("premium_status_*", "premium_status_"));
        assert!(!pattern_matches(
            "song_collection_cache_*",
            "song_collections_cache"
        ));
    }

    #[test]
    fn test_wildcard_at_start() {
        assert!(pattern_matches("*_cache", "bible_books_cache"));
        assert!(!pattern_matches("*_cache", "bible_chapters_GEN"));
    }

    #[test]
    fn test_wildcard_in_middle() {
        assert!(pattern_matches("bible_*_GEN", "bible_chapters_GEN"));
        assert!(!pattern_matches("bible_*_GEN", "bible_chapters_EXO"));
    }

    #[test]
    fn test_multiple_wildcards() {
        assert!(pattern_matches("*_status_*", "premium_status_u1"));
        assert!(pattern_matches("*:*:*", "a:b:c"));
        assert!(!pattern_matches("*_status_*", "premium_state_u1"));
    }

    #[test]
    fn test_wildcard_only() {
        assert!(pattern_matches("*", "anything"));
        assert!(pattern_matches("*", ""));
    }

    #[test]
    fn test_empty_pattern_and_key() {
        assert!(pattern_matches("", ""));
        assert!(!pattern_matches("", "non-empty"));
        assert!(!pattern_matches("bible_*", ""));
    }

    #[test]
    fn test_adjacent_wildcards() {
        assert!(pattern_matches("bible_**_GEN", "bible_chapters_GEN"));
        assert!(pattern_matches("**", "anything"));
    }
}
