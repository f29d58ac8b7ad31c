//! Bible books, chapters, search and bookmarks.

mod functions;
mod snapshot;
mod types;

pub use functions::{search_chapters, sort_books};
pub use snapshot::{
    book_from_snapshot, book_to_value, bookmark_from_snapshot, bookmark_to_value,
    chapter_from_snapshot, chapter_key, chapter_to_value,
};
pub use types::{BibleBook, BibleChapter, BibleVerse, Bookmark, Testament, VerseMatch};
