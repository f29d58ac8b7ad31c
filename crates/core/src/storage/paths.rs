//! Layout of the remote document tree.

use uuid::Uuid;

use super::RemotePath;

pub fn collections_root() -> RemotePath {
    RemotePath::new("song_collection")
}

pub fn collection_metadata_path(collection_id: &str) -> RemotePath {
    collections_root().child(collection_id).child("metadata")
}

pub fn collection_songs_path(collection_id: &str) -> RemotePath {
    collections_root().child(collection_id).child("songs")
}

pub fn song_path(collection_id: &str, number: &str) -> RemotePath {
    collection_songs_path(collection_id).child(number)
}

pub fn bible_books_path() -> RemotePath {
    RemotePath::new("bible/books")
}

pub fn bible_chapters_path() -> RemotePath {
    RemotePath::new("bible/chapters")
}

pub fn user_path(uid: &str) -> RemotePath {
    RemotePath::new("users").child(uid)
}

pub fn user_favorites_path(uid: &str) -> RemotePath {
    RemotePath::new("user_favorites").child(uid)
}

pub fn favorite_song_path(uid: &str, collection: &str, number: &str) -> RemotePath {
    user_favorites_path(uid).child(collection).child(number)
}

pub fn bookmarks_path(uid: &str) -> RemotePath {
    user_path(uid).child("bible_bookmarks")
}

pub fn bookmark_path(uid: &str, id: Uuid) -> RemotePath {
    bookmarks_path(uid).child(&id.to_string())
}
