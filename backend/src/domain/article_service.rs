//! Article mutation coordinator.
//!
//! Keeps the relational store and the search index aligned without a
//! distributed transaction. Every mutation runs the same sequence:
//!
//! 1. begin a relational transaction;
//! 2. write the row(s), rolling back on failure;
//! 3. write the matching index document(s), rolling back on failure;
//! 4. commit.
//!
//! Because the commit follows the index writes, a commit failure (or a crash
//! between steps 3 and 4) leaves index documents with no committed row. The
//! same holds for bulk creation: documents indexed before a failing item stay
//! in the index after the batch is rolled back. Both cases are logged at
//! `warn` and are otherwise silent.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{info, warn};

use crate::domain::ports::{
    ArticleCommand, ArticleIndex, ArticleIndexError, ArticleRepository, ArticleRepositoryError,
    RelationalTransactions,
};
use crate::domain::unit_of_work::{map_transaction_error, rollback_or_log, stored_now};
use crate::domain::{Article, ArticleId, ArticleInput, AuthorId, Error};

pub(crate) fn map_repository_error(error: ArticleRepositoryError) -> Error {
    match error {
        ArticleRepositoryError::Connection { message } => {
            Error::internal(format!("article repository unavailable: {message}"))
        }
        ArticleRepositoryError::Query { message } => {
            Error::internal(format!("article repository error: {message}"))
        }
        ArticleRepositoryError::NotFound { id } => {
            Error::not_found(format!("article {id} not found")).with_details(json!({ "id": id }))
        }
    }
}

pub(crate) fn map_index_error(error: ArticleIndexError) -> Error {
    Error::internal(format!("search index error: {error}"))
}

fn require_author(author_id: AuthorId) -> Result<(), Error> {
    if author_id.is_nil() {
        return Err(Error::invalid_input("author id must not be nil"));
    }
    Ok(())
}

/// Article service implementing [`ArticleCommand`].
pub struct ArticleCommandService<T, R, I> {
    transactions: Arc<T>,
    articles: Arc<R>,
    index: Arc<I>,
    clock: Arc<dyn Clock>,
}

impl<T, R, I> Clone for ArticleCommandService<T, R, I> {
    fn clone(&self) -> Self {
        Self {
            transactions: Arc::clone(&self.transactions),
            articles: Arc::clone(&self.articles),
            index: Arc::clone(&self.index),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<T, R, I> ArticleCommandService<T, R, I> {
    /// Create a new coordinator over both stores.
    pub fn new(
        transactions: Arc<T>,
        articles: Arc<R>,
        index: Arc<I>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            transactions,
            articles,
            index,
            clock,
        }
    }
}

impl<T, R, I> ArticleCommandService<T, R, I>
where
    T: RelationalTransactions,
    R: ArticleRepository<Tx = T::Tx>,
    I: ArticleIndex,
{
    /// Roll back after a failed index write. Relational rows revert; any
    /// document the index already accepted does not.
    async fn abandon_after_index(
        &self,
        tx: T::Tx,
        operation: &'static str,
        article_id: ArticleId,
        error: ArticleIndexError,
    ) -> Error {
        warn!(
            operation,
            %article_id,
            %error,
            "search index write failed; rolling back relational transaction"
        );
        rollback_or_log(self.transactions.as_ref(), tx, operation).await;
        map_index_error(error).with_details(json!({ "id": article_id }))
    }

    async fn commit_after_index(
        &self,
        tx: T::Tx,
        operation: &'static str,
        article_ids: &[ArticleId],
    ) -> Result<(), Error> {
        if let Err(error) = self.transactions.commit(tx).await {
            warn!(
                operation,
                count = article_ids.len(),
                ?article_ids,
                %error,
                "relational commit failed after index writes; search documents may be orphaned"
            );
            return Err(map_transaction_error(error).with_details(json!({ "ids": article_ids })));
        }
        Ok(())
    }
}

#[async_trait]
impl<T, R, I> ArticleCommand for ArticleCommandService<T, R, I>
where
    T: RelationalTransactions,
    R: ArticleRepository<Tx = T::Tx>,
    I: ArticleIndex,
{
    async fn create_article(
        &self,
        input: ArticleInput,
        author_id: AuthorId,
    ) -> Result<Article, Error> {
        require_author(author_id)?;
        let article = Article::create(
            input,
            ArticleId::random(),
            author_id,
            stored_now(self.clock.as_ref()),
        );

        let mut tx = self
            .transactions
            .begin()
            .await
            .map_err(map_transaction_error)?;
        if let Err(error) = self.articles.save(&mut tx, &article).await {
            rollback_or_log(self.transactions.as_ref(), tx, "create_article").await;
            return Err(map_repository_error(error));
        }
        if let Err(error) = self.index.index(&article).await {
            return Err(self
                .abandon_after_index(tx, "create_article", article.id, error)
                .await);
        }
        self.commit_after_index(tx, "create_article", &[article.id])
            .await?;

        info!(article_id = %article.id, %author_id, "article created");
        Ok(article)
    }

    async fn update_article(
        &self,
        input: Option<ArticleInput>,
        id: ArticleId,
        author_id: AuthorId,
    ) -> Result<ArticleId, Error> {
        let Some(input) = input else {
            return Err(Error::invalid_input("article input is required"));
        };
        if id.is_nil() {
            return Err(Error::invalid_input("article id must not be nil"));
        }
        require_author(author_id)?;
        let update = input.into_update(id, author_id, stored_now(self.clock.as_ref()));

        let mut tx = self
            .transactions
            .begin()
            .await
            .map_err(map_transaction_error)?;
        if let Err(error) = self.articles.update(&mut tx, &update).await {
            rollback_or_log(self.transactions.as_ref(), tx, "update_article").await;
            return Err(map_repository_error(error));
        }
        if let Err(error) = self.index.update_fields(&id, &update.index_fields()).await {
            return Err(self
                .abandon_after_index(tx, "update_article", id, error)
                .await);
        }
        self.commit_after_index(tx, "update_article", &[id]).await?;

        info!(article_id = %id, %author_id, "article updated");
        Ok(id)
    }

    async fn create_many_articles(
        &self,
        inputs: Vec<ArticleInput>,
        author_id: AuthorId,
    ) -> Result<Vec<Article>, Error> {
        require_author(author_id)?;
        if inputs.is_empty() {
            return Ok(Vec::new());
        }
        let now = stored_now(self.clock.as_ref());
        let batch: Vec<Article> = inputs
            .into_iter()
            .map(|input| Article::create(input, ArticleId::random(), author_id, now))
            .collect();

        let mut tx = self
            .transactions
            .begin()
            .await
            .map_err(map_transaction_error)?;
        if let Err(error) = self.articles.save_many(&mut tx, &batch).await {
            rollback_or_log(self.transactions.as_ref(), tx, "create_many_articles").await;
            return Err(map_repository_error(error));
        }
        // One document per request; a failure on item k leaves items before k indexed.
        for (position, article) in batch.iter().enumerate() {
            if let Err(error) = self.index.index(article).await {
                warn!(
                    %author_id,
                    indexed = position,
                    total = batch.len(),
                    "bulk create stopped part way through indexing"
                );
                let failure = self
                    .abandon_after_index(tx, "create_many_articles", article.id, error)
                    .await;
                return Err(failure.with_details(json!({
                    "id": article.id,
                    "position": position,
                    "total": batch.len(),
                })));
            }
        }
        let ids: Vec<ArticleId> = batch.iter().map(|article| article.id).collect();
        self.commit_after_index(tx, "create_many_articles", &ids)
            .await?;

        info!(%author_id, count = batch.len(), "articles created");
        Ok(batch)
    }
}

#[cfg(test)]
#[path = "article_service_tests.rs"]
mod tests;
