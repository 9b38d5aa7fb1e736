//! Port for the article search index.
//!
//! The index holds one document per article keyed by the article id. It is a
//! derived copy of the relational store and is not transactional with it.

use async_trait::async_trait;

use crate::domain::{Article, ArticleFieldUpdate, ArticleId, AuthorId};

use super::define_port_error;

define_port_error! {
    /// Errors raised by search index adapters.
    pub enum ArticleIndexError {
        /// The index could not be reached.
        Transport { message: String } =>
            "search index request failed: {message}",
        /// The index answered with a non-success status.
        Status { status: u16, message: String } =>
            "search index returned status {status}: {message}",
        /// The index response could not be decoded.
        Decode { message: String } =>
            "search index response could not be decoded: {message}",
    }
}

/// Port for writing and querying article documents.
///
/// Every query returns hits ordered by `created_at` descending. An empty
/// result is not an error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ArticleIndex: Send + Sync {
    /// Upsert the full document for `article`. Idempotent by id.
    async fn index(&self, article: &Article) -> Result<(), ArticleIndexError>;

    /// Apply a partial update, creating the document when it is absent.
    async fn update_fields(
        &self,
        id: &ArticleId,
        fields: &ArticleFieldUpdate,
    ) -> Result<(), ArticleIndexError>;

    /// Case-insensitive substring match over title and body.
    async fn search(&self, keyword: &str) -> Result<Vec<Article>, ArticleIndexError>;

    /// Documents owned by `author_id`.
    async fn find_by_author_id(
        &self,
        author_id: &AuthorId,
    ) -> Result<Vec<Article>, ArticleIndexError>;

    /// Documents owned by any author in `author_ids`.
    async fn find_by_author_ids(
        &self,
        author_ids: &[AuthorId],
    ) -> Result<Vec<Article>, ArticleIndexError>;

    /// Every document in the index.
    async fn find_all(&self) -> Result<Vec<Article>, ArticleIndexError>;
}

/// Fixture index that accepts every write and never returns hits.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureArticleIndex;

#[async_trait]
impl ArticleIndex for FixtureArticleIndex {
    async fn index(&self, _article: &Article) -> Result<(), ArticleIndexError> {
        Ok(())
    }

    async fn update_fields(
        &self,
        _id: &ArticleId,
        _fields: &ArticleFieldUpdate,
    ) -> Result<(), ArticleIndexError> {
        Ok(())
    }

    async fn search(&self, _keyword: &str) -> Result<Vec<Article>, ArticleIndexError> {
        Ok(Vec::new())
    }

    async fn find_by_author_id(
        &self,
        _author_id: &AuthorId,
    ) -> Result<Vec<Article>, ArticleIndexError> {
        Ok(Vec::new())
    }

    async fn find_by_author_ids(
        &self,
        _author_ids: &[AuthorId],
    ) -> Result<Vec<Article>, ArticleIndexError> {
        Ok(Vec::new())
    }

    async fn find_all(&self) -> Result<Vec<Article>, ArticleIndexError> {
        Ok(Vec::new())
    }
}
