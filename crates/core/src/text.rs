//! Case-insensitive text matching shared by song and Bible search.
//!
//! Offsets are measured in `char`s so callers can highlight matches in
//! non-ASCII text without slicing through a code point.

/// Folds a single char for comparison.
///
/// Only the first char of the lowercase mapping is kept, which preserves a
/// one-to-one mapping between input chars and folded chars.
fn fold_char(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

fn fold(text: &str) -> Vec<char> {
    text.chars().map(fold_char).collect()
}

/// Returns true if `haystack` contains `needle`, ignoring case.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    let needle = fold(needle);
    if needle.is_empty() {
        return true;
    }
    let haystack = fold(haystack);
    haystack.windows(needle.len()).any(|w| w == needle.as_slice())
}

/// Returns every non-overlapping case-insensitive occurrence of `query` in
/// `text` as `[start, end)` char offsets, left to right.
pub fn match_offsets(text: &str, query: &str) -> Vec<(usize, usize)> {
    let needle = fold(query.trim());
    if needle.is_empty() {
        return Vec::new();
    }

    let haystack = fold(text);
    let mut offsets = Vec::new();
    let mut i = 0;
    while i + needle.len() <= haystack.len() {
        if haystack[i..i + needle.len()] == needle[..] {
            offsets.push((i, i + needle.len()));
            i += needle.len();
        } else {
            i += 1;
        }
    }
    offsets
}
