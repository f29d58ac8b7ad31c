//! The favorites set and its remote shape.
//!
//! Favorites are stored under `user_favorites/<uid>` as
//! `{ "<collection>": { "<song number>": true } }`. Older clients wrote a
//! flat `{ "<song number>": true }` map; those entries belong to the
//! [`GLOBAL_CONTEXT`] and are migrated on first load.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Collection key used for favorites that predate per-collection storage.
pub const GLOBAL_CONTEXT: &str = "global";

/// Every favorited song, keyed by collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FavoriteSet {
    entries: BTreeMap<String, BTreeSet<String>>,
}

impl FavoriteSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_favorite(&self, collection: &str, number: &str) -> bool {
        self.entries
            .get(collection)
            .is_some_and(|songs| songs.contains(number))
    }

    /// True if the song is favorited in any collection.
    pub fn contains_anywhere(&self, number: &str) -> bool {
        self.entries.values().any(|songs| songs.contains(number))
    }

    /// Membership check for a song in `collection`, treating global
    /// favorites as belonging to `default_collection`.
    pub fn contains_song(&self, collection: &str, number: &str, default_collection: &str) -> bool {
        self.is_favorite(collection, number)
            || (collection == default_collection && self.is_favorite(GLOBAL_CONTEXT, number))
    }

    pub fn insert(&mut self, collection: impl Into<String>, number: impl Into<String>) -> bool {
        self.entries
            .entry(collection.into())
            .or_default()
            .insert(number.into())
    }

    pub fn remove(&mut self, collection: &str, number: &str) -> bool {
        let Some(songs) = self.entries.get_mut(collection) else {
            return false;
        };
        let removed = songs.remove(number);
        if songs.is_empty() {
            self.entries.remove(collection);
        }
        removed
    }

    /// Total number of favorites across collections.
    pub fn len(&self) -> usize {
        self.entries.values().map(BTreeSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn songs_in(&self, collection: &str) -> impl Iterator<Item = &str> {
        self.entries
            .get(collection)
            .into_iter()
            .flat_map(|songs| songs.iter().map(String::as_str))
    }

    /// Iterates `(collection, number)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().flat_map(|(collection, songs)| {
            songs
                .iter()
                .map(move |number| (collection.as_str(), number.as_str()))
        })
    }
}

/// True if the node still has flat `{ "001": true }` entries.
pub fn is_legacy_shape(node: &Value) -> bool {
    node.as_object()
        .is_some_and(|map| map.values().any(Value::is_boolean))
}

/// Rewrites a legacy favorites node into the per-collection shape.
///
/// Top-level `true` entries move under [`GLOBAL_CONTEXT`] (merged with any
/// global entries already there), nested collections are kept and `false`
/// leftovers are dropped. Returns `None` when there is nothing to migrate,
/// so running it on its own output is a no-op.
pub fn migrate_legacy(node: &Value) -> Option<Value> {
    if !is_legacy_shape(node) {
        return None;
    }
    let map = node.as_object()?;

    let mut migrated = Map::new();
    let mut global = map
        .get(GLOBAL_CONTEXT)
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default();

    for (key, value) in map {
        match value {
            Value::Bool(true) => {
                global.insert(key.clone(), Value::Bool(true));
            }
            Value::Object(_) if key != GLOBAL_CONTEXT => {
                migrated.insert(key.clone(), value.clone());
            }
            _ => {}
        }
    }

    if !global.is_empty() {
        migrated.insert(GLOBAL_CONTEXT.to_string(), Value::Object(global));
    }
    Some(Value::Object(migrated))
}

/// Reads the per-collection shape. Only `true` leaves count.
pub fn favorites_from_snapshot(node: &Value) -> FavoriteSet {
    let mut set = FavoriteSet::new();
    let Some(map) = node.as_object() else {
        return set;
    };

    for (collection, songs) in map {
        let Some(songs) = songs.as_object() else {
            continue;
        };
        for (number, flag) in songs {
            if flag.as_bool() == Some(true) {
                set.insert(collection.clone(), number.clone());
            }
        }
    }
    set
}

fn remove_leaf(map: &mut Map<String, Value>, collection: &str, number: &str) {
    let emptied = match map.get_mut(collection) {
        Some(Value::Object(songs)) => {
            songs.remove(number);
            songs.is_empty()
        }
        _ => false,
    };
    if emptied {
        map.remove(collection);
    }
}

/// Transaction body for toggling one favorite on a user's whole node.
///
/// Membership follows [`FavoriteSet::contains_song`], so a global favorite
/// toggled from `default_collection` is unfavorited: both its collection
/// leaf and its global leaf go. Leaves are removed, never set to `false`.
/// A legacy node is migrated first. Returns `None` once nothing is left.
pub fn toggled_in(
    node: Option<&Value>,
    collection: &str,
    number: &str,
    default_collection: &str,
) -> Option<Value> {
    let node = node.map(|n| migrate_legacy(n).unwrap_or_else(|| n.clone()));
    let mut map = match node {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    };

    let favorites = favorites_from_snapshot(&Value::Object(map.clone()));
    if favorites.contains_song(collection, number, default_collection) {
        remove_leaf(&mut map, collection, number);
        if collection == default_collection {
            remove_leaf(&mut map, GLOBAL_CONTEXT, number);
        }
    } else {
        let songs = map
            .entry(collection.to_string())
            .or_insert_with(|| Value::Object(Map::new()));
        if !songs.is_object() {
            *songs = Value::Object(Map::new());
        }
        if let Value::Object(songs) = songs {
            songs.insert(number.to_string(), Value::Bool(true));
        }
    }

    (!map.is_empty()).then_some(Value::Object(map))
}
