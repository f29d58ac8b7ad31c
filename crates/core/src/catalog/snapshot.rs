//! Conversions between remote song/collection nodes and catalog types.
//!
//! Songs live at `song_collection/<id>/songs/<number>` with the fields
//! `song_number`, `song_title`, `verses` (`[{verse_number, lyrics}]`) and an
//! optional `url`. Collection metadata lives at
//! `song_collection/<id>/metadata`.

use serde_json::{json, Map, Value};

use crate::access::AccessLevel;
use crate::snapshot::{children, string_field, u32_field};

use super::types::{CollectionStatus, Song, SongCollection, Verse};

fn verse_from_snapshot(index: usize, node: &Value) -> Verse {
    match node {
        Value::String(lyrics) => Verse::new((index + 1).to_string(), lyrics.clone()),
        _ => Verse {
            number: string_field(node, "verse_number")
                .unwrap_or_else(|| (index + 1).to_string()),
            lyrics: string_field(node, "lyrics").unwrap_or_default(),
        },
    }
}

/// Builds a song from its remote node. Never fails.
///
/// `key` is the node's key and stands in for a missing `song_number`.
pub fn song_from_snapshot(key: &str, node: &Value, collection_id: Option<&str>) -> Song {
    let verses = node
        .get("verses")
        .map(children)
        .unwrap_or_default()
        .into_iter()
        .enumerate()
        .map(|(i, (_, v))| verse_from_snapshot(i, v))
        .collect();

    Song {
        number: string_field(node, "song_number").unwrap_or_else(|| key.to_string()),
        title: string_field(node, "song_title").unwrap_or_default(),
        verses,
        collection_id: collection_id.map(str::to_string),
        audio_url: string_field(node, "url").filter(|u| !u.trim().is_empty()),
    }
}

/// Writes a song node. The collection is implied by the node's path.
pub fn song_to_value(song: &Song) -> Value {
    let verses: Vec<Value> = song
        .verses
        .iter()
        .map(|v| json!({ "verse_number": v.number, "lyrics": v.lyrics }))
        .collect();

    let mut node = json!({
        "song_number": song.number,
        "song_title": song.title,
        "verses": verses,
    });
    if let Some(url) = &song.audio_url {
        node["url"] = Value::String(url.clone());
    }
    node
}

/// Reads every song under a collection's `songs` node.
pub fn songs_from_snapshot(node: &Value, collection_id: &str) -> Vec<Song> {
    children(node)
        .into_iter()
        .map(|(key, song)| song_from_snapshot(&key, song, Some(collection_id)))
        .collect()
}

/// Builds a collection from its metadata node. Never fails.
///
/// `song_count` falls back to `songs_seen` when the metadata has none.
pub fn collection_from_snapshot(id: &str, node: &Value, songs_seen: u32) -> SongCollection {
    let status = match string_field(node, "status").map(|s| s.trim().to_lowercase()) {
        Some(s) if s == "inactive" => CollectionStatus::Inactive,
        _ => CollectionStatus::Active,
    };

    SongCollection {
        id: id.to_string(),
        name: string_field(node, "name").unwrap_or_else(|| id.to_string()),
        description: string_field(node, "description"),
        access_level: string_field(node, "access_level")
            .map(|l| AccessLevel::parse_lenient(&l))
            .unwrap_or_default(),
        song_count: u32_field(node, "song_count").unwrap_or(songs_seen),
        color: string_field(node, "color"),
        status,
    }
}

/// Writes a collection metadata node.
pub fn collection_to_value(collection: &SongCollection) -> Value {
    let mut node = Map::new();
    node.insert("name".into(), Value::String(collection.name.clone()));
    node.insert(
        "access_level".into(),
        Value::String(collection.access_level.as_str().to_string()),
    );
    node.insert("song_count".into(), json!(collection.song_count));
    node.insert("status".into(), json!(collection.status));
    if let Some(description) = &collection.description {
        node.insert("description".into(), Value::String(description.clone()));
    }
    if let Some(color) = &collection.color {
        node.insert("color".into(), Value::String(color.clone()));
    }
    Value::Object(node)
}
