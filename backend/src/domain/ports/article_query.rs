//! Driving port for article reads composed across both stores.

use async_trait::async_trait;

use crate::domain::{Article, ArticleId, ArticleWithAuthor, AuthorId, Error};

/// Driving port for article read operations.
///
/// Reads take no lock and may briefly observe a write that has reached one
/// store but not the other.
#[async_trait]
pub trait ArticleQuery: Send + Sync {
    /// Fetch one article with its author attached.
    async fn get_article_by_id(&self, id: ArticleId) -> Result<Article, Error>;

    /// Keyword search with authors attached. Hits whose author no longer
    /// resolves carry a zero-value author.
    async fn get_articles_by_keyword(&self, keyword: String) -> Result<Vec<Article>, Error>;

    /// One author together with every article they own.
    async fn get_article_with_author_by_id(
        &self,
        author_id: AuthorId,
    ) -> Result<ArticleWithAuthor, Error>;

    /// One group per author called `name`, each holding only that author's
    /// articles. Callers must not depend on group order.
    async fn get_articles_by_author_name(
        &self,
        name: String,
    ) -> Result<Vec<ArticleWithAuthor>, Error>;

    /// Every indexed article with its author attached.
    async fn get_all_articles(&self) -> Result<Vec<Article>, Error>;
}
