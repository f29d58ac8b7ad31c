mod error;
mod keys;
mod patterns;
mod serialization;

pub use error::{CacheError, Result};
pub use keys::{
    bible_books_key, bible_chapters_key, premium_status_key, song_collection_key,
    song_collections_key, BOOKS_LIST_KEY, CACHE_PATTERNS, CHAPTERS_LIST_KEY,
    COLLECTIONS_LIST_KEY, SONGS_LIST_KEY,
};
pub use patterns::pattern_matches;
pub use serialization::{CacheEnvelope, SerializationError};
