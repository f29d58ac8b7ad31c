use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Testament {
    #[default]
    Old,
    New,
}

/// A book of the Bible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibleBook {
    pub id: String,
    pub name: String,
    pub abbreviation: String,
    pub testament: Testament,
    pub chapter_count: u32,
    /// Canonical position (Genesis is 1).
    pub order: u32,
}

impl BibleBook {
    pub fn new(id: impl Into<String>, name: impl Into<String>, order: u32) -> Self {
        let id = id.into();
        Self {
            abbreviation: id.clone(),
            id,
            name: name.into(),
            testament: Testament::Old,
            chapter_count: 0,
            order,
        }
    }

    pub fn with_testament(mut self, testament: Testament) -> Self {
        self.testament = testament;
        self
    }

    pub fn with_chapter_count(mut self, chapter_count: u32) -> Self {
        self.chapter_count = chapter_count;
        self
    }

    pub fn with_abbreviation(mut self, abbreviation: impl Into<String>) -> Self {
        self.abbreviation = abbreviation.into();
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibleVerse {
    pub number: u32,
    pub text: String,
}

impl BibleVerse {
    pub fn new(number: u32, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
        }
    }
}

/// One chapter of a book with its verses in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BibleChapter {
    pub book_id: String,
    pub chapter: u32,
    pub verses: Vec<BibleVerse>,
}

impl BibleChapter {
    pub fn new(book_id: impl Into<String>, chapter: u32) -> Self {
        Self {
            book_id: book_id.into(),
            chapter,
            verses: Vec::new(),
        }
    }

    pub fn with_verse(mut self, number: u32, text: impl Into<String>) -> Self {
        self.verses.push(BibleVerse::new(number, text));
        self
    }
}

/// A verse that matched a Bible search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerseMatch {
    pub book_id: String,
    pub chapter: u32,
    pub verse: u32,
    pub text: String,
    /// Char offsets `[start, end)` of every occurrence of the query.
    pub offsets: Vec<(usize, usize)>,
}

/// A user's saved position in the Bible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bookmark {
    pub id: Uuid,
    pub book_id: String,
    pub chapter: u32,
    pub verse: u32,
    pub note: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Bookmark {
    pub fn new(
        book_id: impl Into<String>,
        chapter: u32,
        verse: u32,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            book_id: book_id.into(),
            chapter,
            verse,
            note: None,
            created_at,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }
}
