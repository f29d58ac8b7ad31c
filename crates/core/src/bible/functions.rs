use crate::text::match_offsets;

use super::types::{BibleBook, BibleChapter, VerseMatch};

/// Sorts books into canonical order. Books sharing an order are sorted by name.
pub fn sort_books(books: &mut [BibleBook]) {
    books.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.name.cmp(&b.name)));
}

/// Searches verse text across chapters.
///
/// Matches are returned in chapter and verse order as stored, at most
/// `limit` of them, each with the char offsets of every occurrence. A blank
/// query matches nothing.
pub fn search_chapters(chapters: &[BibleChapter], query: &str, limit: usize) -> Vec<VerseMatch> {
    chapters
        .iter()
        .flat_map(|chapter| {
            chapter.verses.iter().filter_map(move |verse| {
                let offsets = match_offsets(&verse.text, query);
                (!offsets.is_empty()).then(|| VerseMatch {
                    book_id: chapter.book_id.clone(),
                    chapter: chapter.chapter,
                    verse: verse.number,
                    text: verse.text.clone(),
                    offsets,
                })
            })
        })
        .take(limit)
        .collect()
}
