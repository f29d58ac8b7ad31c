use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::access::{AccessLevel, AccessState};

/// Default maximum number of search results.
pub const DEFAULT_SEARCH_LIMIT: usize = 50;

/// One verse (or chorus) of a song.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verse {
    pub number: String,
    pub lyrics: String,
}

impl Verse {
    pub fn new(number: impl Into<String>, lyrics: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            lyrics: lyrics.into(),
        }
    }
}

/// A hymn. Songs are identified by their number within a collection.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Song {
    /// Display number, usually zero padded (`"001"`).
    pub number: String,
    pub title: String,
    pub verses: Vec<Verse>,
    pub collection_id: Option<String>,
    pub audio_url: Option<String>,
}

impl Song {
    pub fn new(number: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            number: number.into(),
            title: title.into(),
            verses: Vec::new(),
            collection_id: None,
            audio_url: None,
        }
    }

    pub fn with_verse(mut self, number: impl Into<String>, lyrics: impl Into<String>) -> Self {
        self.verses.push(Verse::new(number, lyrics));
        self
    }

    pub fn with_collection(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }

    pub fn with_audio_url(mut self, url: impl Into<String>) -> Self {
        self.audio_url = Some(url.into());
        self
    }

    /// All lyrics joined with newlines.
    pub fn lyrics(&self) -> String {
        self.verses
            .iter()
            .map(|v| v.lyrics.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// A song with its favorite flag, derived from the favorites set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongView {
    #[serde(flatten)]
    pub song: Song,
    pub is_favorite: bool,
}

/// Whether a collection is shown at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollectionStatus {
    #[default]
    Active,
    Inactive,
}

/// A named songbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SongCollection {
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub access_level: AccessLevel,
    pub song_count: u32,
    pub color: Option<String>,
    pub status: CollectionStatus,
}

impl SongCollection {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: None,
            access_level: AccessLevel::Public,
            song_count: 0,
            color: None,
            status: CollectionStatus::Active,
        }
    }

    pub fn with_access_level(mut self, access_level: AccessLevel) -> Self {
        self.access_level = access_level;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_song_count(mut self, song_count: u32) -> Self {
        self.song_count = song_count;
        self
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_status(mut self, status: CollectionStatus) -> Self {
        self.status = status;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == CollectionStatus::Active
    }
}

/// A collection together with the caller's access to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollectionAccess {
    #[serde(flatten)]
    pub collection: SongCollection,
    pub access: AccessState,
}

/// Text fields a song search can look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SongField {
    Number,
    Title,
    Lyrics,
}

/// Sort order for song lists.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SongSortOrder {
    #[default]
    Number,
    Alphabetical,
}

impl FromStr for SongSortOrder {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "number" | "numeric" => Ok(Self::Number),
            "alpha" | "alphabetical" | "title" => Ok(Self::Alphabetical),
            other => Err(format!("unknown sort order: {other}")),
        }
    }
}

impl fmt::Display for SongSortOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number => write!(f, "number"),
            Self::Alphabetical => write!(f, "alphabetical"),
        }
    }
}

/// A song search request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SongQuery {
    pub text: String,
    pub fields: Vec<SongField>,
    pub limit: usize,
    /// Restrict the search to one collection.
    pub collection_id: Option<String>,
}

impl SongQuery {
    /// Searches number, title and lyrics with the default limit.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            fields: vec![SongField::Number, SongField::Title, SongField::Lyrics],
            limit: DEFAULT_SEARCH_LIMIT,
            collection_id: None,
        }
    }

    pub fn with_fields(mut self, fields: Vec<SongField>) -> Self {
        self.fields = fields;
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn in_collection(mut self, collection_id: impl Into<String>) -> Self {
        self.collection_id = Some(collection_id.into());
        self
    }
}
