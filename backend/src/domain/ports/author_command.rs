//! Driving port for author mutations.

use async_trait::async_trait;

use crate::domain::{AuthorId, AuthorInput, Error};

/// Driving port for author write operations.
///
/// Each call runs inside exactly one relational transaction. No search
/// index write is involved.
#[async_trait]
pub trait AuthorCommand: Send + Sync {
    /// Create an author and return the freshly minted identifier.
    ///
    /// Fails with `invalid_input` when the name or email is blank.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// # use scriptorium::domain::AuthorInput;
    /// # use scriptorium::domain::ports::AuthorCommand;
    /// # async fn example(command: &dyn AuthorCommand) -> Result<(), scriptorium::domain::Error> {
    /// let id = command
    ///     .create_author(AuthorInput::new("Ada Lovelace", "ada@example.com"))
    ///     .await?;
    /// assert!(!id.is_nil());
    /// # Ok(())
    /// # }
    /// ```
    async fn create_author(&self, input: AuthorInput) -> Result<AuthorId, Error>;

    /// Overwrite the name and email of an existing author.
    ///
    /// Fails with `invalid_input` when `input` is absent or `id` is nil, and
    /// with `not_found` when no author has this id.
    async fn update_author(&self, input: Option<AuthorInput>, id: AuthorId)
    -> Result<AuthorId, Error>;
}
