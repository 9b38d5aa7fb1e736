//! Test utilities for the scriptorium crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for `cfg(test)` and behind the `test-support` feature.

pub mod clock {
    //! Deterministic clocks.

    use std::sync::{Mutex, MutexGuard};

    use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
    use mockable::Clock;

    /// Clock frozen at a chosen instant until advanced.
    pub struct FixedClock(Mutex<DateTime<Utc>>);

    impl FixedClock {
        /// Clock frozen at `now`.
        pub fn new(now: DateTime<Utc>) -> Self {
            Self(Mutex::new(now))
        }

        /// Clock frozen at 2026-01-02T03:04:05Z.
        pub fn at_fixture_time() -> Self {
            match Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).single() {
                Some(now) => Self::new(now),
                None => panic!("fixture timestamp must be unambiguous"),
            }
        }

        /// Move the clock forward.
        pub fn advance_seconds(&self, seconds: i64) {
            *self.lock_clock() += TimeDelta::seconds(seconds);
        }

        fn lock_clock(&self) -> MutexGuard<'_, DateTime<Utc>> {
            match self.0.lock() {
                Ok(guard) => guard,
                Err(_) => panic!("clock mutex"),
            }
        }
    }

    impl Clock for FixedClock {
        fn local(&self) -> DateTime<Local> {
            self.utc().with_timezone(&Local)
        }

        fn utc(&self) -> DateTime<Utc> {
            *self.lock_clock()
        }
    }
}

pub mod faults {
    //! Fault-injecting wrappers around real adapters.

    use std::sync::atomic::{AtomicUsize, Ordering};

    use async_trait::async_trait;

    use crate::domain::ports::{
        ArticleIndex, ArticleIndexError, RelationalTransactions, TransactionError,
    };
    use crate::domain::{Article, ArticleFieldUpdate, ArticleId, AuthorId};

    /// Index wrapper that fails writes after a budget and optionally fails
    /// every read.
    ///
    /// Writes that fit in the budget reach the inner index, so earlier
    /// documents of a batch stay indexed when a later one fails.
    pub struct FlakyArticleIndex<I> {
        inner: I,
        write_budget: Option<usize>,
        fail_reads: bool,
        write_attempts: AtomicUsize,
    }

    impl<I> FlakyArticleIndex<I> {
        /// Wrap `inner` without injecting any fault.
        pub fn new(inner: I) -> Self {
            Self {
                inner,
                write_budget: None,
                fail_reads: false,
                write_attempts: AtomicUsize::new(0),
            }
        }

        /// Let `successful_writes` writes through, then fail every write.
        pub fn failing_after(mut self, successful_writes: usize) -> Self {
            self.write_budget = Some(successful_writes);
            self
        }

        /// Fail every query with a transport error.
        pub fn failing_reads(mut self) -> Self {
            self.fail_reads = true;
            self
        }

        /// Writes attempted so far, including rejected ones.
        pub fn write_attempts(&self) -> usize {
            self.write_attempts.load(Ordering::SeqCst)
        }

        fn admit_write(&self) -> Result<(), ArticleIndexError> {
            let attempt = self.write_attempts.fetch_add(1, Ordering::SeqCst);
            match self.write_budget {
                Some(budget) if attempt >= budget => Err(ArticleIndexError::transport(format!(
                    "injected index write failure on write {}",
                    attempt + 1
                ))),
                _ => Ok(()),
            }
        }

        fn admit_read(&self) -> Result<(), ArticleIndexError> {
            if self.fail_reads {
                return Err(ArticleIndexError::transport("injected index read failure"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl<I: ArticleIndex> ArticleIndex for FlakyArticleIndex<I> {
        async fn index(&self, article: &Article) -> Result<(), ArticleIndexError> {
            self.admit_write()?;
            self.inner.index(article).await
        }

        async fn update_fields(
            &self,
            id: &ArticleId,
            fields: &ArticleFieldUpdate,
        ) -> Result<(), ArticleIndexError> {
            self.admit_write()?;
            self.inner.update_fields(id, fields).await
        }

        async fn search(&self, keyword: &str) -> Result<Vec<Article>, ArticleIndexError> {
            self.admit_read()?;
            self.inner.search(keyword).await
        }

        async fn find_by_author_id(
            &self,
            author_id: &AuthorId,
        ) -> Result<Vec<Article>, ArticleIndexError> {
            self.admit_read()?;
            self.inner.find_by_author_id(author_id).await
        }

        async fn find_by_author_ids(
            &self,
            author_ids: &[AuthorId],
        ) -> Result<Vec<Article>, ArticleIndexError> {
            self.admit_read()?;
            self.inner.find_by_author_ids(author_ids).await
        }

        async fn find_all(&self) -> Result<Vec<Article>, ArticleIndexError> {
            self.admit_read()?;
            self.inner.find_all().await
        }
    }

    /// Transaction wrapper whose commit discards the writes and reports a
    /// commit failure, as when the connection drops during `COMMIT`.
    pub struct CommitFailingTransactions<T> {
        inner: T,
        commits: AtomicUsize,
    }

    impl<T> CommitFailingTransactions<T> {
        /// Wrap `inner`; every commit rolls back and reports failure.
        pub fn new(inner: T) -> Self {
            Self {
                inner,
                commits: AtomicUsize::new(0),
            }
        }

        /// Commit attempts observed so far.
        pub fn commit_attempts(&self) -> usize {
            self.commits.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl<T: RelationalTransactions> RelationalTransactions for CommitFailingTransactions<T> {
        type Tx = T::Tx;

        async fn begin(&self) -> Result<Self::Tx, TransactionError> {
            self.inner.begin().await
        }

        async fn commit(&self, tx: Self::Tx) -> Result<(), TransactionError> {
            self.commits.fetch_add(1, Ordering::SeqCst);
            self.inner.rollback(tx).await?;
            Err(TransactionError::commit("injected commit failure"))
        }

        async fn rollback(&self, tx: Self::Tx) -> Result<(), TransactionError> {
            self.inner.rollback(tx).await
        }
    }
}
