use super::types::{Song, SongSortOrder};

/// Numeric value of a song number. Unparseable numbers sort as 0.
pub fn song_number_value(number: &str) -> i64 {
    number.trim().parse().unwrap_or(0)
}

/// Finds a song by exact number, then by numeric value (`"1"` finds `"001"`).
pub fn find_song(songs: impl IntoIterator<Item = Song>, number: &str) -> Option<Song> {
    let wanted = song_number_value(number);
    let mut numeric_match = None;
    for song in songs {
        if song.number == number {
            return Some(song);
        }
        if wanted != 0 && numeric_match.is_none() && song_number_value(&song.number) == wanted {
            numeric_match = Some(song);
        }
    }
    numeric_match
}

/// Sorts songs in place. Both orders are stable, so songs with equal keys
/// keep their previous relative order.
pub fn sort_songs(songs: &mut [Song], order: SongSortOrder) {
    match order {
        SongSortOrder::Number => songs.sort_by_key(|s| song_number_value(&s.number)),
        SongSortOrder::Alphabetical => songs.sort_by_cached_key(|s| s.title.to_lowercase()),
    }
}
