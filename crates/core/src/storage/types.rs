use std::fmt;

use serde::{Deserialize, Serialize};

/// A value in the local key-value store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PrefValue {
    Bool(bool),
    Int(i64),
    Double(f64),
    String(String),
    StringList(Vec<String>),
}

impl PrefValue {
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(i) => Some(*i),
            _ => None,
        }
    }

    /// Integers widen to doubles.
    pub fn as_double(&self) -> Option<f64> {
        match self {
            Self::Double(d) => Some(*d),
            Self::Int(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_string_list(&self) -> Option<&[String]> {
        match self {
            Self::StringList(items) => Some(items),
            _ => None,
        }
    }
}

/// A `/`-separated path into the remote document tree.
///
/// Segments are trimmed and stray slashes are dropped, so
/// `RemotePath::new("song_collection/").child("/LPMI")` is
/// `song_collection/LPMI`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct RemotePath {
    segments: Vec<String>,
}

impl RemotePath {
    pub fn new(path: &str) -> Self {
        Self::default().child(path)
    }

    /// Appends one or more segments.
    pub fn child(mut self, segment: &str) -> Self {
        self.segments.extend(
            segment
                .split('/')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
        );
        self
    }

    pub fn segments(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().map(String::as_str)
    }

    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    pub fn as_string(&self) -> String {
        self.segments.join("/")
    }
}

impl fmt::Display for RemotePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pref_value_untagged_json() {
        let values: Vec<PrefValue> =
            serde_json::from_str(r#"[true, 3, 1.5, "dark", ["a", "b"]]"#).unwrap();

        assert_eq!(values[0], PrefValue::Bool(true));
        assert_eq!(values[1], PrefValue::Int(3));
        assert_eq!(values[2], PrefValue::Double(1.5));
        assert_eq!(values[3], PrefValue::String("dark".into()));
        assert_eq!(
            values[4],
            PrefValue::StringList(vec!["a".into(), "b".into()])
        );
    }

    #[test]
    fn test_pref_value_accessors() {
        assert_eq!(PrefValue::Int(2).as_double(), Some(2.0));
        assert_eq!(PrefValue::Bool(true).as_int(), None);
        assert_eq!(PrefValue::String("x".into()).as_str(), Some("x"));
    }

    #[test]
    fn test_remote_path_sanitizes_segments() {
        let path = RemotePath::new("song_collection/").child("/LPMI").child("songs/001");
        assert_eq!(path.as_string(), "song_collection/LPMI/songs/001");
        assert_eq!(path.segments().count(), 4);
    }

    #[test]
    fn test_root_path() {
        assert!(RemotePath::new("/").is_root());
        assert_eq!(RemotePath::new("").to_string(), "");
    }
}
