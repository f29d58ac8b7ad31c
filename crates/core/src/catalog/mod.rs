//! Songs, collections and the pure functions that sort and search them.

mod search;
mod snapshot;
mod sorting;
mod types;

pub use search::{filter_active_collections, search_songs};
pub use snapshot::{
    collection_from_snapshot, collection_to_value, song_from_snapshot, song_to_value,
    songs_from_snapshot,
};
pub use sorting::{find_song, song_number_value, sort_songs};
pub use types::{
    CollectionAccess, CollectionStatus, Song, SongCollection, SongField, SongQuery,
    SongSortOrder, SongView, Verse, DEFAULT_SEARCH_LIMIT,
};
