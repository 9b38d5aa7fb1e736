//! Driving port for article mutations.
//!
//! Every call spans one relational transaction plus one or more search index
//! writes. The relational transaction is committed only after every index
//! write has succeeded.

use async_trait::async_trait;

use crate::domain::{Article, ArticleId, ArticleInput, AuthorId, Error};

/// Driving port for article write operations.
#[async_trait]
pub trait ArticleCommand: Send + Sync {
    /// Create one article owned by `author_id` and return the stored row.
    async fn create_article(
        &self,
        input: ArticleInput,
        author_id: AuthorId,
    ) -> Result<Article, Error>;

    /// Overwrite the title and body of an article owned by `author_id`.
    ///
    /// Fails with `invalid_input` before touching either store when `input`
    /// is absent or either id is nil.
    async fn update_article(
        &self,
        input: Option<ArticleInput>,
        id: ArticleId,
        author_id: AuthorId,
    ) -> Result<ArticleId, Error>;

    /// Create several articles owned by `author_id` as one logical operation.
    ///
    /// An index failure on any item rolls back every row of the batch.
    async fn create_many_articles(
        &self,
        inputs: Vec<ArticleInput>,
        author_id: AuthorId,
    ) -> Result<Vec<Article>, Error>;
}
