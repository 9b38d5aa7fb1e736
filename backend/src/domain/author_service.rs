//! Author domain service.
//!
//! Implements the author driving ports. Every mutation is a single
//! relational transaction; the search index is never involved.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use crate::domain::ports::{
    AuthorCommand, AuthorQuery, AuthorRepository, AuthorRepositoryError, RelationalTransactions,
};
use crate::domain::unit_of_work::{map_transaction_error, rollback_or_log, stored_now};
use crate::domain::{Author, AuthorId, AuthorIdName, AuthorInput, Error};

fn map_repository_error(error: AuthorRepositoryError) -> Error {
    match error {
        AuthorRepositoryError::Connection { message } => {
            Error::internal(format!("author repository unavailable: {message}"))
        }
        AuthorRepositoryError::Query { message } => {
            Error::internal(format!("author repository error: {message}"))
        }
        AuthorRepositoryError::NotFound { id } => {
            Error::not_found(format!("author {id} not found")).with_details(json!({ "id": id }))
        }
    }
}

fn validate_input(input: &AuthorInput) -> Result<(), Error> {
    input
        .validate()
        .map_err(|err| Error::invalid_input(err.to_string()))
}

/// Author service implementing [`AuthorCommand`] and [`AuthorQuery`].
pub struct AuthorService<T, A> {
    transactions: Arc<T>,
    authors: Arc<A>,
    clock: Arc<dyn Clock>,
}

impl<T, A> Clone for AuthorService<T, A> {
    fn clone(&self) -> Self {
        Self {
            transactions: Arc::clone(&self.transactions),
            authors: Arc::clone(&self.authors),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<T, A> AuthorService<T, A> {
    /// Create a new service over the relational store handles.
    pub fn new(transactions: Arc<T>, authors: Arc<A>, clock: Arc<dyn Clock>) -> Self {
        Self {
            transactions,
            authors,
            clock,
        }
    }
}

#[async_trait]
impl<T, A> AuthorCommand for AuthorService<T, A>
where
    T: RelationalTransactions,
    A: AuthorRepository<Tx = T::Tx>,
{
    async fn create_author(&self, input: AuthorInput) -> Result<AuthorId, Error> {
        validate_input(&input)?;
        let author = Author::create(input, AuthorId::random(), stored_now(self.clock.as_ref()));

        let mut tx = self
            .transactions
            .begin()
            .await
            .map_err(map_transaction_error)?;
        if let Err(error) = self.authors.save(&mut tx, &author).await {
            rollback_or_log(self.transactions.as_ref(), tx, "create_author").await;
            return Err(map_repository_error(error));
        }
        self.transactions
            .commit(tx)
            .await
            .map_err(map_transaction_error)?;

        info!(author_id = %author.id, "author created");
        Ok(author.id)
    }

    async fn update_author(
        &self,
        input: Option<AuthorInput>,
        id: AuthorId,
    ) -> Result<AuthorId, Error> {
        let Some(input) = input else {
            return Err(Error::invalid_input("author input is required"));
        };
        if id.is_nil() {
            return Err(Error::invalid_input("author id must not be nil"));
        }
        let update = input.into_update(id, stored_now(self.clock.as_ref()));

        let mut tx = self
            .transactions
            .begin()
            .await
            .map_err(map_transaction_error)?;
        if let Err(error) = self.authors.update(&mut tx, &update).await {
            rollback_or_log(self.transactions.as_ref(), tx, "update_author").await;
            return Err(map_repository_error(error));
        }
        self.transactions
            .commit(tx)
            .await
            .map_err(map_transaction_error)?;

        info!(author_id = %id, "author updated");
        Ok(id)
    }
}

#[async_trait]
impl<T, A> AuthorQuery for AuthorService<T, A>
where
    T: RelationalTransactions,
    A: AuthorRepository,
{
    async fn get_author_by_id(&self, id: AuthorId) -> Result<Author, Error> {
        self.authors
            .find_by_id(&id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| {
                Error::not_found(format!("author {id} not found")).with_details(json!({ "id": id }))
            })
    }

    async fn get_authors_by_ids(&self, ids: Vec<AuthorId>) -> Result<Vec<Author>, Error> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let authors = self
            .authors
            .find_by_ids(&ids)
            .await
            .map_err(|error| map_repository_error(error).with_details(json!({ "ids": ids })))?;
        debug!(requested = ids.len(), found = authors.len(), "authors loaded by id");
        Ok(authors)
    }

    async fn find_id_name_by_name(&self, name: String) -> Result<Vec<AuthorIdName>, Error> {
        let matches = self
            .authors
            .find_id_names_by_name(&name)
            .await
            .map_err(|error| map_repository_error(error).with_details(json!({ "name": name })))?;
        if matches.is_empty() {
            return Err(Error::not_found(format!("no author named {name}"))
                .with_details(json!({ "name": name })));
        }
        Ok(matches)
    }

    async fn find_author_by_email(&self, email: String) -> Result<Author, Error> {
        self.authors
            .find_by_email(&email)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| {
                Error::not_found("no author registered under this email")
                    .with_details(json!({ "email": email }))
            })
    }
}

#[cfg(test)]
#[path = "author_service_tests.rs"]
mod tests;
