//! Bible reading facade and per-user bookmarks.

use std::sync::Arc;

use uuid::Uuid;

use hymnal_core::access::{AccessLevel, AuthState, DenialReason};
use hymnal_core::bible::{
    bookmark_from_snapshot, bookmark_to_value, chapter_key, search_chapters, BibleBook,
    BibleChapter, Bookmark, VerseMatch,
};
use hymnal_core::snapshot::children;
use hymnal_core::storage::{paths, BibleRepository, DocumentStore, RepositoryError, Result};

use super::AccessGate;
use crate::clock::Clock;

/// The Bible text is public. Bookmarks need a signed-in user.
pub struct BibleService {
    repository: Arc<dyn BibleRepository>,
    remote: Arc<dyn DocumentStore>,
    gate: Arc<AccessGate>,
    clock: Arc<dyn Clock>,
    search_limit: usize,
}

impl BibleService {
    pub fn new(
        repository: Arc<dyn BibleRepository>,
        remote: Arc<dyn DocumentStore>,
        gate: Arc<AccessGate>,
        clock: Arc<dyn Clock>,
        search_limit: usize,
    ) -> Self {
        Self {
            repository,
            remote,
            gate,
            clock,
            search_limit,
        }
    }

    pub async fn books(&self, auth: &AuthState) -> Result<Vec<BibleBook>> {
        self.gate.ensure(AccessLevel::Public, auth).await?;
        self.repository.books().await
    }

    pub async fn chapter(
        &self,
        book_id: &str,
        chapter: u32,
        auth: &AuthState,
    ) -> Result<BibleChapter> {
        self.gate.ensure(AccessLevel::Public, auth).await?;
        self.repository
            .chapter(book_id, chapter)
            .await?
            .ok_or_else(|| RepositoryError::not_found("Chapter", chapter_key(book_id, chapter)))
    }

    /// Searches verse text in one book, or in every book in canonical
    /// order. Stops once `limit` matches (default from config) are found.
    pub async fn search(
        &self,
        query: &str,
        book_id: Option<&str>,
        limit: Option<usize>,
        auth: &AuthState,
    ) -> Result<Vec<VerseMatch>> {
        self.gate.ensure(AccessLevel::Public, auth).await?;
        let limit = limit.unwrap_or(self.search_limit);

        let book_ids: Vec<String> = match book_id {
            Some(id) => vec![id.to_string()],
            None => self
                .repository
                .books()
                .await?
                .into_iter()
                .map(|b| b.id)
                .collect(),
        };

        let mut matches = Vec::new();
        for id in book_ids {
            if matches.len() >= limit {
                break;
            }
            let chapters = self.repository.chapters(&id).await?;
            matches.extend(search_chapters(&chapters, query, limit - matches.len()));
        }

        tracing::debug!(query = %query, results = matches.len(), "Bible search");
        Ok(matches)
    }

    /// The session's bookmarks, oldest first.
    pub async fn bookmarks(&self, auth: &AuthState) -> Result<Vec<Bookmark>> {
        let uid = self.signed_in(auth).await?;

        let mut bookmarks: Vec<Bookmark> = self
            .remote
            .get(&paths::bookmarks_path(uid))
            .await?
            .map(|node| {
                children(&node)
                    .into_iter()
                    .filter_map(|(key, value)| bookmark_from_snapshot(&key, value))
                    .collect()
            })
            .unwrap_or_default();
        bookmarks.sort_by_key(|b| b.created_at);
        Ok(bookmarks)
    }

    pub async fn add_bookmark(
        &self,
        auth: &AuthState,
        book_id: &str,
        chapter: u32,
        verse: u32,
        note: Option<String>,
    ) -> Result<Bookmark> {
        let uid = self.signed_in(auth).await?;

        let mut bookmark = Bookmark::new(book_id, chapter, verse, self.clock.now());
        if let Some(note) = note {
            bookmark = bookmark.with_note(note);
        }

        self.remote
            .set(
                &paths::bookmark_path(uid, bookmark.id),
                bookmark_to_value(&bookmark),
            )
            .await?;
        tracing::debug!(uid = %uid, bookmark_id = %bookmark.id, "Bookmark added");
        Ok(bookmark)
    }

    /// Removes a bookmark. Returns false if it did not exist.
    pub async fn remove_bookmark(&self, auth: &AuthState, id: Uuid) -> Result<bool> {
        let uid = self.signed_in(auth).await?;
        let path = paths::bookmark_path(uid, id);

        if self.remote.get(&path).await?.is_none() {
            return Ok(false);
        }
        self.remote.remove(&path).await?;
        tracing::debug!(uid = %uid, bookmark_id = %id, "Bookmark removed");
        Ok(true)
    }

    async fn signed_in<'a>(&self, auth: &'a AuthState) -> Result<&'a str> {
        self.gate.ensure(AccessLevel::Registered, auth).await?;
        auth.uid()
            .ok_or(RepositoryError::AccessDenied(DenialReason::LoginRequired))
    }
}
