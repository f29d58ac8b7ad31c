use crate::text::contains_ignore_case;

use super::types::{Song, SongCollection, SongField, SongQuery};

fn field_matches(song: &Song, field: SongField, needle: &str) -> bool {
    match field {
        SongField::Number => contains_ignore_case(&song.number, needle),
        SongField::Title => contains_ignore_case(&song.title, needle),
        SongField::Lyrics => song
            .verses
            .iter()
            .any(|v| contains_ignore_case(&v.lyrics, needle)),
    }
}

/// Case-insensitive substring search over songs.
///
/// Results keep the input order (no ranking) and are capped at
/// `query.limit`. A blank query matches every song.
pub fn search_songs(songs: &[Song], query: &SongQuery) -> Vec<Song> {
    let needle = query.text.trim();

    songs
        .iter()
        .filter(|song| {
            query
                .collection_id
                .as_deref()
                .is_none_or(|id| song.collection_id.as_deref() == Some(id))
        })
        .filter(|song| {
            needle.is_empty()
                || query
                    .fields
                    .iter()
                    .any(|field| field_matches(song, *field, needle))
        })
        .take(query.limit)
        .cloned()
        .collect()
}

/// Keeps only collections that are shown to users.
pub fn filter_active_collections(collections: Vec<SongCollection>) -> Vec<SongCollection> {
    collections.into_iter().filter(|c| c.is_active()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CollectionStatus;

    fn songs() -> Vec<Song> {
        vec![
            Song::new("001", "Amazing Grace")
                .with_verse("1", "How sweet the sound")
                .with_collection("LPMI"),
            Song::new("002", "Blessed Assurance")
                .with_verse("1", "Jesus is mine, oh what a foretaste")
                .with_collection("LPMI"),
            Song::new("010", "Great Is Thy Faithfulness")
                .with_verse("1", "Morning by morning new mercies I see")
                .with_collection("SRD"),
        ]
    }

    #[test]
    fn test_search_title_case_insensitive() {
        let results = search_songs(&songs(), &SongQuery::new("GRACE"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].number, "001");
    }

    #[test]
    fn test_search_lyrics() {
        let results = search_songs(&songs(), &SongQuery::new("mercies"));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].number, "010");
    }

    #[test]
    fn test_search_respects_fields() {
        let query = SongQuery::new("mercies").with_fields(vec![SongField::Title]);
        assert!(search_songs(&songs(), &query).is_empty());
    }

    #[test]
    fn test_search_number() {
        let results = search_songs(&songs(), &SongQuery::new("01"));
        let numbers: Vec<_> = results.iter().map(|s| s.number.as_str()).collect();
        assert_eq!(numbers, vec!["001", "010"]);
    }

    #[test]
    fn test_search_keeps_storage_order_and_limit() {
        let results = search_songs(&songs(), &SongQuery::new("").with_limit(2));
        let numbers: Vec<_> = results.iter().map(|s| s.number.as_str()).collect();
        assert_eq!(numbers, vec!["001", "002"]);
    }

    #[test]
    fn test_search_in_collection() {
        let query = SongQuery::new("").in_collection("SRD");
        let results = search_songs(&songs(), &query);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].number, "010");
    }

    #[test]
    fn test_filter_active_collections() {
        let collections = vec![
            SongCollection::new("LPMI", "Lagu Pujian Masa Ini"),
            SongCollection::new("OLD", "Retired").with_status(CollectionStatus::Inactive),
        ];
        let active = filter_active_collections(collections);
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].id, "LPMI");
    }
}
