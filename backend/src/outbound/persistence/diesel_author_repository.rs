//! PostgreSQL-backed `AuthorRepository` implementation using Diesel ORM.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::RunQueryDsl;
use uuid::Uuid;

use crate::domain::ports::{AuthorRepository, AuthorRepositoryError};
use crate::domain::{Author, AuthorId, AuthorIdName, AuthorUpdate};

use super::diesel_error_mapping;
use super::diesel_transactions::DieselTx;
use super::models::{AuthorChangeset, AuthorRow, NewAuthorRow};
use super::pool::{DbPool, PoolError};
use super::schema::authors;

/// Diesel-backed implementation of the author repository port.
#[derive(Clone)]
pub struct DieselAuthorRepository {
    pool: DbPool,
}

impl DieselAuthorRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> AuthorRepositoryError {
    diesel_error_mapping::map_pool_error(error, AuthorRepositoryError::connection)
}

fn map_diesel_error(error: diesel::result::Error) -> AuthorRepositoryError {
    diesel_error_mapping::map_diesel_error(
        error,
        AuthorRepositoryError::query,
        AuthorRepositoryError::connection,
    )
}

#[async_trait]
impl AuthorRepository for DieselAuthorRepository {
    type Tx = DieselTx;

    async fn save(&self, tx: &mut Self::Tx, author: &Author) -> Result<(), AuthorRepositoryError> {
        diesel::insert_into(authors::table)
            .values(NewAuthorRow::from(author))
            .execute(tx.connection())
            .await
            .map_err(map_diesel_error)?;
        Ok(())
    }

    async fn update(
        &self,
        tx: &mut Self::Tx,
        update: &AuthorUpdate,
    ) -> Result<(), AuthorRepositoryError> {
        let affected = diesel::update(authors::table.find(*update.id.as_uuid()))
            .set(AuthorChangeset::from(update))
            .execute(tx.connection())
            .await
            .map_err(map_diesel_error)?;
        if affected == 0 {
            return Err(AuthorRepositoryError::not_found(update.id));
        }
        Ok(())
    }

    async fn find_by_id(&self, id: &AuthorId) -> Result<Option<Author>, AuthorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AuthorRow> = authors::table
            .find(*id.as_uuid())
            .select(AuthorRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(Author::from))
    }

    async fn find_by_ids(&self, ids: &[AuthorId]) -> Result<Vec<Author>, AuthorRepositoryError> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let uuids: Vec<Uuid> = ids.iter().map(|id| *id.as_uuid()).collect();

        let rows: Vec<AuthorRow> = authors::table
            .filter(authors::id.eq_any(uuids))
            .order((authors::created_at.asc(), authors::id.asc()))
            .select(AuthorRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows.into_iter().map(Author::from).collect())
    }

    async fn find_id_names_by_name(
        &self,
        name: &str,
    ) -> Result<Vec<AuthorIdName>, AuthorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let rows: Vec<(Uuid, String)> = authors::table
            .filter(authors::name.eq(name))
            .order((authors::created_at.asc(), authors::id.asc()))
            .select((authors::id, authors::name))
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| AuthorIdName {
                id: AuthorId::from_uuid(id),
                name,
            })
            .collect())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, AuthorRepositoryError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        let row: Option<AuthorRow> = authors::table
            .filter(authors::email.eq(email))
            .order((authors::created_at.asc(), authors::id.asc()))
            .select(AuthorRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;

        Ok(row.map(Author::from))
    }
}
