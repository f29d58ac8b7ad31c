//! Conversions between remote Bible nodes and Bible types.
//!
//! Books live at `bible/books/<id>`, chapters at `bible/chapters/<key>`
//! (each carrying its `book_id` so the store can filter by book), and
//! bookmarks at `users/<uid>/bible_bookmarks/<uuid>`.

use chrono::{DateTime, Utc};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::snapshot::{children, datetime_field, string_field, u32_field};

use super::types::{BibleBook, BibleChapter, BibleVerse, Bookmark, Testament};

pub fn book_from_snapshot(id: &str, node: &Value) -> BibleBook {
    let testament = match string_field(node, "testament").map(|t| t.trim().to_lowercase()) {
        Some(t) if t == "new" || t == "nt" => Testament::New,
        _ => Testament::Old,
    };

    BibleBook {
        id: id.to_string(),
        name: string_field(node, "name").unwrap_or_else(|| id.to_string()),
        abbreviation: string_field(node, "abbreviation").unwrap_or_else(|| id.to_string()),
        testament,
        chapter_count: u32_field(node, "chapter_count").unwrap_or(0),
        order: u32_field(node, "order").unwrap_or(0),
    }
}

pub fn book_to_value(book: &BibleBook) -> Value {
    json!({
        "name": book.name,
        "abbreviation": book.abbreviation,
        "testament": book.testament,
        "chapter_count": book.chapter_count,
        "order": book.order,
    })
}

fn verse_from_snapshot(index: usize, node: &Value) -> BibleVerse {
    let fallback = u32::try_from(index + 1).unwrap_or(u32::MAX);
    match node {
        Value::String(text) => BibleVerse::new(fallback, text.clone()),
        _ => BibleVerse {
            number: u32_field(node, "verse").unwrap_or(fallback),
            text: string_field(node, "text").unwrap_or_default(),
        },
    }
}

/// Builds a chapter from its remote node. Verses may be objects
/// (`{verse, text}`) or bare strings numbered by position.
pub fn chapter_from_snapshot(node: &Value) -> BibleChapter {
    let verses = node
        .get("verses")
        .map(children)
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, (_, v))| verse_from_snapshot(i, v))
        .collect();

    BibleChapter {
        book_id: string_field(node, "book_id").unwrap_or_default(),
        chapter: u32_field(node, "chapter").unwrap_or(1),
        verses,
    }
}

pub fn chapter_to_value(chapter: &BibleChapter) -> Value {
    let verses: Vec<Value> = chapter
        .verses
        .iter()
        .map(|v| json!({ "verse": v.number, "text": v.text }))
        .collect();
    json!({
        "book_id": chapter.book_id,
        "chapter": chapter.chapter,
        "verses": verses,
    })
}

/// Key a chapter is stored under, e.g. `JHN_3`.
pub fn chapter_key(book_id: &str, chapter: u32) -> String {
    format!("{book_id}_{chapter}")
}

/// Builds a bookmark from its remote node.
///
/// Returns `None` when `key` is not a UUID; such entries cannot be
/// addressed for removal and are skipped.
pub fn bookmark_from_snapshot(key: &str, node: &Value) -> Option<Bookmark> {
    let id = Uuid::parse_str(key.trim()).ok()?;
    Some(Bookmark {
        id,
        book_id: string_field(node, "book_id").unwrap_or_default(),
        chapter: u32_field(node, "chapter").unwrap_or(1),
        verse: u32_field(node, "verse").unwrap_or(1),
        note: string_field(node, "note"),
        created_at: datetime_field(node, "created_at").unwrap_or(DateTime::<Utc>::UNIX_EPOCH),
    })
}

pub fn bookmark_to_value(bookmark: &Bookmark) -> Value {
    let mut node = json!({
        "book_id": bookmark.book_id,
        "chapter": bookmark.chapter,
        "verse": bookmark.verse,
        "created_at": bookmark.created_at.to_rfc3339(),
    });
    if let Some(note) = &bookmark.note {
        node["note"] = Value::String(note.clone());
    }
    node
}
