//! Driving port for author reads.

use async_trait::async_trait;

use crate::domain::{Author, AuthorId, AuthorIdName, Error};

/// Driving port for author read operations. Reads take no transaction.
#[async_trait]
pub trait AuthorQuery: Send + Sync {
    /// Fetch one author; `not_found` with the id attached on a miss.
    async fn get_author_by_id(&self, id: AuthorId) -> Result<Author, Error>;

    /// Fetch every author in `ids`. Unknown ids are omitted from the result.
    async fn get_authors_by_ids(&self, ids: Vec<AuthorId>) -> Result<Vec<Author>, Error>;

    /// Fetch the id and name of every author called `name`.
    ///
    /// Fails with `not_found` when nobody has that name.
    async fn find_id_name_by_name(&self, name: String) -> Result<Vec<AuthorIdName>, Error>;

    /// Fetch the author registered under `email`, including the stored
    /// credential hash for an external credential check.
    async fn find_author_by_email(&self, email: String) -> Result<Author, Error>;
}
