//! Port for article persistence.

use async_trait::async_trait;

use crate::domain::{Article, ArticleId, ArticleUpdate};

use super::define_port_error;

define_port_error! {
    /// Errors raised by article repository adapters.
    pub enum ArticleRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "article repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "article repository query failed: {message}",
        /// An update matched no row owned by the given author.
        NotFound { id: ArticleId } =>
            "article {id} not found",
    }
}

/// Port for reading and writing article rows.
#[async_trait]
pub trait ArticleRepository: Send + Sync {
    /// Transaction handle accepted by write operations.
    type Tx: Send;

    /// Insert one article row.
    async fn save(&self, tx: &mut Self::Tx, article: &Article)
    -> Result<(), ArticleRepositoryError>;

    /// Insert several article rows in one statement.
    async fn save_many(
        &self,
        tx: &mut Self::Tx,
        articles: &[Article],
    ) -> Result<(), ArticleRepositoryError>;

    /// Overwrite title, body and `updated_at` of the row matching both the
    /// article id and the owning author id.
    ///
    /// Returns [`ArticleRepositoryError::NotFound`] when no row matched.
    async fn update(
        &self,
        tx: &mut Self::Tx,
        update: &ArticleUpdate,
    ) -> Result<(), ArticleRepositoryError>;

    /// Find a committed article by identifier.
    async fn find_by_id(&self, id: &ArticleId) -> Result<Option<Article>, ArticleRepositoryError>;
}
