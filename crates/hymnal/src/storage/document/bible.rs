//! Bible repository reading the remote document tree.

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use hymnal_core::bible::{
    book_from_snapshot, chapter_from_snapshot, chapter_key, sort_books, BibleBook, BibleChapter,
};
use hymnal_core::snapshot::children;
use hymnal_core::storage::paths::{bible_books_path, bible_chapters_path};
use hymnal_core::storage::{BibleRepository, DocumentStore, Result};

/// Reads `bible/books` and `bible/chapters`.
#[derive(Clone)]
pub struct RemoteBibleRepository {
    store: Arc<dyn DocumentStore>,
}

impl RemoteBibleRepository {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }
}

#[async_trait]
impl BibleRepository for RemoteBibleRepository {
    async fn books(&self) -> Result<Vec<BibleBook>> {
        let mut books: Vec<BibleBook> = self
            .store
            .get(&bible_books_path())
            .await?
            .map(|node| {
                children(&node)
                    .into_iter()
                    .map(|(id, book)| book_from_snapshot(&id, book))
                    .collect()
            })
            .unwrap_or_default();
        sort_books(&mut books);
        Ok(books)
    }

    async fn chapters(&self, book_id: &str) -> Result<Vec<BibleChapter>> {
        let node = self
            .store
            .query_equal(
                &bible_chapters_path(),
                "book_id",
                &Value::String(book_id.to_string()),
            )
            .await?;

        let mut chapters: Vec<BibleChapter> = children(&node)
            .into_iter()
            .map(|(_, chapter)| chapter_from_snapshot(chapter))
            .collect();
        chapters.sort_by_key(|c| c.chapter);
        Ok(chapters)
    }

    async fn chapter(&self, book_id: &str, chapter: u32) -> Result<Option<BibleChapter>> {
        let path = bible_chapters_path().child(&chapter_key(book_id, chapter));
        Ok(self
            .store
            .get(&path)
            .await?
            .map(|node| chapter_from_snapshot(&node)))
    }
}
