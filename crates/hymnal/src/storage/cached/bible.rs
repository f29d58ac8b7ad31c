//! Cached Bible repository decorator.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use hymnal_core::bible::{BibleBook, BibleChapter};
use hymnal_core::cache::{bible_books_key, bible_chapters_key, BOOKS_LIST_KEY, CHAPTERS_LIST_KEY};
use hymnal_core::storage::{BibleRepository, KeyValueStore, Result};

use crate::cache::fetch_with_cache;
use crate::clock::Clock;

/// Cached Bible repository decorator.
///
/// Books and each book's chapter list are cached separately. A single
/// chapter is picked from its book's cached list.
pub struct CachedBibleRepository<R>
where
    R: BibleRepository,
{
    repository: Arc<R>,
    store: Arc<dyn KeyValueStore>,
    clock: Arc<dyn Clock>,
    ttl: Duration,
}

impl<R> CachedBibleRepository<R>
where
    R: BibleRepository,
{
    pub fn new(
        repository: Arc<R>,
        store: Arc<dyn KeyValueStore>,
        clock: Arc<dyn Clock>,
        ttl: Duration,
    ) -> Self {
        Self {
            repository,
            store,
            clock,
            ttl,
        }
    }
}

#[async_trait]
impl<R> BibleRepository for CachedBibleRepository<R>
where
    R: BibleRepository + 'static,
{
    async fn books(&self) -> Result<Vec<BibleBook>> {
        fetch_with_cache(
            self.store.as_ref(),
            self.clock.as_ref(),
            &bible_books_key(),
            BOOKS_LIST_KEY,
            self.ttl,
            || self.repository.books(),
        )
        .await
    }

    async fn chapters(&self, book_id: &str) -> Result<Vec<BibleChapter>> {
        fetch_with_cache(
            self.store.as_ref(),
            self.clock.as_ref(),
            &bible_chapters_key(book_id),
            CHAPTERS_LIST_KEY,
            self.ttl,
            || self.repository.chapters(book_id),
        )
        .await
    }

    async fn chapter(&self, book_id: &str, chapter: u32) -> Result<Option<BibleChapter>> {
        let chapters = self.chapters(book_id).await?;
        Ok(chapters.into_iter().find(|c| c.chapter == chapter))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::{TimeZone, Utc};

    use crate::clock::ManualClock;
    use crate::local::MemoryKeyValueStore;

    const TTL: Duration = Duration::from_secs(24 * 60 * 60);

    struct MockBibleRepository {
        books_calls: AtomicUsize,
        chapters_calls: AtomicUsize,
    }

    #[async_trait]
    impl BibleRepository for MockBibleRepository {
        async fn books(&self) -> Result<Vec<BibleBook>> {
            self.books_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![BibleBook::new("GEN", "Genesis", 1)])
        }

        async fn chapters(&self, book_id: &str) -> Result<Vec<BibleChapter>> {
            self.chapters_calls.fetch_add(1, Ordering::SeqCst);
            Ok(vec![
                BibleChapter::new(book_id, 1).with_verse(1, "In the beginning"),
                BibleChapter::new(book_id, 2).with_verse(1, "Thus the heavens"),
            ])
        }

        async fn chapter(&self, _book_id: &str, _chapter: u32) -> Result<Option<BibleChapter>> {
            unreachable!("cached repository picks chapters from the list")
        }
    }

    fn setup() -> (
        Arc<MockBibleRepository>,
        Arc<ManualClock>,
        CachedBibleRepository<MockBibleRepository>,
    ) {
        let repo = Arc::new(MockBibleRepository {
            books_calls: AtomicUsize::new(0),
            chapters_calls: AtomicUsize::new(0),
        });
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 6, 15, 10, 30, 0).unwrap(),
        ));
        let cached = CachedBibleRepository::new(
            repo.clone(),
            Arc::new(MemoryKeyValueStore::new()),
            clock.clone(),
            TTL,
        );
        (repo, clock, cached)
    }

    #[tokio::test]
    async fn test_books_cached_for_ttl() {
        let (repo, clock, cached) = setup();

        cached.books().await.unwrap();
        clock.advance(chrono::Duration::hours(12));
        cached.books().await.unwrap();
        assert_eq!(repo.books_calls.load(Ordering::SeqCst), 1);

        clock.advance(chrono::Duration::hours(13));
        cached.books().await.unwrap();
        assert_eq!(repo.books_calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_chapter_served_from_book_list() {
        let (repo, _, cached) = setup();

        let second = cached.chapter("GEN", 2).await.unwrap().unwrap();
        let first = cached.chapter("GEN", 1).await.unwrap().unwrap();
        let missing = cached.chapter("GEN", 50).await.unwrap();

        assert_eq!(second.verses[0].text, "Thus the heavens");
        assert_eq!(first.chapter, 1);
        assert!(missing.is_none());
        assert_eq!(repo.chapters_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_books_are_cached_per_book_key() {
        let (repo, _, cached) = setup();

        cached.chapters("GEN").await.unwrap();
        cached.chapters("EXO").await.unwrap();

        assert_eq!(repo.chapters_calls.load(Ordering::SeqCst), 2);
    }
}
