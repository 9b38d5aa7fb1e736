//! PostgreSQL-backed `ArticleRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;

use crate::domain::ports::{ArticleRepository, ArticleRepositoryError};
use crate::domain::{Article, ArticleId, ArticleUpdate};

use super::diesel_error_mapping;
use super::diesel_transactions::DieselTx;
use super::models::{ArticleChangeset, ArticleRow, NewArticleRow};
use super::pool::{DbPool, PoolError};
use super::schema::articles;

/// Diesel-backed implementation of the article repository port.
#[derive(Clone)]
pub struct DieselArticleRepository {
    pool: DbPool,
}

impl DieselArticleRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> ArticleRepositoryError {
    diesel_error_mapping::map_pool_error(error, ArticleRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> ArticleRepositoryError {
    diesel_error_mapping::map_diesel_error(
        error,
        ArticleRepositoryError::query,
        ArticleRepositoryError::connection,
    )
}

#[async_trait]
impl ArticleRepository for DieselArticleRepository {
    type Tx = DieselTx;

    async fn save(
        &self,
        tx: &mut Self::Tx,
        article: &Article,
    ) -> Result<(), ArticleRepositoryError> {
        diesel::insert_into(articles::table)
            .values(NewArticleRow::from(article))
            .execute(tx.connection())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn save_many(
        &self,
        tx: &mut Self::Tx,
        batch: &[Article],
    ) -> Result<(), ArticleRepositoryError> {
        if batch.is_empty() {
            return Ok(());
        }
        let rows: Vec<NewArticleRow<'_>> = batch.iter().map(NewArticleRow::from).collect();
        diesel::insert_into(articles::table)
            .values(&rows)
            .execute(tx.connection())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(
        &self,
        tx: &mut Self::Tx,
        update: &ArticleUpdate,
    ) -> Result<(), ArticleRepositoryError> {
        let target = articles::table
            .filter(articles::id.eq(*update.id.as_uuid()))
            .filter(articles::author_id.eq(*update.author_id.as_uuid()));
        let affected = diesel::update(target)
            .set(ArticleChangeset::from(update))
            .execute(tx.connection())
            .await
            .map_err(map_diesel_error)?;
        if affected == 0 {
            return Err(ArticleRepositoryError::not_found(update.id));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &ArticleId) -> Result<Option<Article>, ArticleRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<ArticleRow> = articles::table
            .find(*id.as_uuid())
            .select(ArticleRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(Article::from))
    }
}
