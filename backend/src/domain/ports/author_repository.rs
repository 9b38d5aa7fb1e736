//! Port for author persistence.

use async_trait::async_trait;

use crate::domain::{Author, AuthorId, AuthorIdName, AuthorUpdate};

use super::define_port_error;

define_port_error! {
    /// Errors raised by author repository adapters.
    pub enum AuthorRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "author repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query { message: String } =>
            "author repository query failed: {message}",
        /// A mutation targeted a row that does not exist.
        NotFound { id: AuthorId } =>
            "author {id} not found",
    }
}

/// Port for reading and writing author rows.
///
/// Writes run inside a caller-owned transaction handle of type `Tx`; reads
/// use their own connection and only observe committed rows.
#[async_trait]
pub trait AuthorRepository: Send + Sync {
    /// Transaction handle accepted by write operations.
    type Tx: Send;

    /// Insert a new author row.
    async fn save(&self, tx: &mut Self::Tx, author: &Author) -> Result<(), AuthorRepositoryError>;

    /// Overwrite name, email and `updated_at` of an existing row.
    ///
    /// Returns [`AuthorRepositoryError::NotFound`] when no row matched.
    async fn update(
        &self,
        tx: &mut Self::Tx,
        update: &AuthorUpdate,
    ) -> Result<(), AuthorRepositoryError>;

    /// Find an author by identifier.
    async fn find_by_id(&self, id: &AuthorId) -> Result<Option<Author>, AuthorRepositoryError>;

    /// Find every author whose id is in `ids`. Missing ids are skipped.
    async fn find_by_ids(&self, ids: &[AuthorId]) -> Result<Vec<Author>, AuthorRepositoryError>;

    /// Find the id and name of every author with exactly this name.
    async fn find_id_names_by_name(
        &self,
        name: &str,
    ) -> Result<Vec<AuthorIdName>, AuthorRepositoryError>;

    /// Find an author by email, including the stored credential hash.
    async fn find_by_email(&self, email: &str) -> Result<Option<Author>, AuthorRepositoryError>;
}
