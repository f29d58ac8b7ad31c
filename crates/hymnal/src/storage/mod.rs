//! Repository implementations.

pub mod cached;
pub mod document;

pub use cached::{CachedBibleRepository, CachedSongRepository};
pub use document::{RemoteBibleRepository, RemoteSongRepository};
