//! Path operations on a JSON document tree.
//!
//! These follow the remote database's semantics: `null` means absent,
//! writing `null` removes a node, and objects left empty by a removal are
//! pruned up to the root. Arrays are addressed by index; writing a key an
//! array cannot hold turns it into an object keyed by index.

use serde_json::{Map, Value};

use hymnal_core::storage::RemotePath;

fn is_empty_container(node: &Value) -> bool {
    match node {
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.iter().all(Value::is_null),
        _ => false,
    }
}

fn to_object(node: &Value) -> Value {
    let map = match node {
        Value::Array(items) => items
            .iter()
            .enumerate()
            .filter(|(_, v)| !v.is_null())
            .map(|(i, v)| (i.to_string(), v.clone()))
            .collect(),
        _ => Map::new(),
    };
    Value::Object(map)
}

/// Returns the node at `path`, or `None` when absent.
pub fn get_at<'a>(root: &'a Value, path: &RemotePath) -> Option<&'a Value> {
    let mut node = root;
    for segment in path.segments() {
        node = match node {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    (!node.is_null()).then_some(node)
}

fn set_in(node: &mut Value, segments: &[&str], value: Value) {
    let Some((first, rest)) = segments.split_first() else {
        *node = value;
        return;
    };

    if let Value::Array(items) = node {
        if let Some(item) = first.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
            set_in(item, rest, value);
            return;
        }
    }

    if !node.is_object() {
        *node = to_object(node);
    }
    if let Value::Object(map) = node {
        let child = map.entry(first.to_string()).or_insert(Value::Null);
        set_in(child, rest, value);
    }
}

fn remove_in(node: &mut Value, segments: &[&str]) -> bool {
    let Some((first, rest)) = segments.split_first() else {
        let existed = !node.is_null();
        *node = Value::Null;
        return existed;
    };

    let removed = match node {
        Value::Object(map) => {
            let (removed, prune) = match map.get_mut(*first) {
                Some(child) => {
                    let removed = remove_in(child, rest);
                    (removed, child.is_null() || is_empty_container(child))
                }
                None => (false, false),
            };
            if prune {
                map.remove(*first);
            }
            removed
        }
        Value::Array(items) => match first.parse::<usize>().ok().and_then(|i| items.get_mut(i)) {
            Some(child) => {
                let removed = remove_in(child, rest);
                if is_empty_container(child) {
                    *child = Value::Null;
                }
                removed
            }
            None => false,
        },
        _ => false,
    };

    if is_empty_container(node) {
        *node = Value::Null;
    }
    removed
}

/// Writes `value` at `path`. Writing `null` removes the node.
pub fn set_at(root: &mut Value, path: &RemotePath, value: Value) {
    let segments: Vec<&str> = path.segments().collect();
    if value.is_null() {
        remove_in(root, &segments);
    } else {
        set_in(root, &segments, value);
    }
}

/// Removes the node at `path`, pruning parents left empty. Returns true if
/// something was removed.
pub fn remove_at(root: &mut Value, path: &RemotePath) -> bool {
    let segments: Vec<&str> = path.segments().collect();
    remove_in(root, &segments)
}

/// Writes each field relative to `path`. Field names may be nested paths.
pub fn update_at(root: &mut Value, path: &RemotePath, fields: Map<String, Value>) {
    for (key, value) in fields {
        set_at(root, &path.clone().child(&key), value);
    }
}
