//! Domain ports for the hexagonal boundary.
//!
//! Driven ports (`*Repository`, [`ArticleIndex`], [`RelationalTransactions`])
//! are implemented by outbound adapters. Driving ports (`*Command`, `*Query`)
//! are implemented by the domain services.

mod macros;
pub(crate) use macros::define_port_error;

mod article_command;
mod article_index;
mod article_query;
mod article_repository;
mod author_command;
mod author_query;
mod author_repository;
mod transactions;

pub use article_command::ArticleCommand;
#[cfg(test)]
pub use article_index::MockArticleIndex;
pub use article_index::{ArticleIndex, ArticleIndexError, FixtureArticleIndex};
pub use article_query::ArticleQuery;
pub use article_repository::{ArticleRepository, ArticleRepositoryError};
pub use author_command::AuthorCommand;
pub use author_query::AuthorQuery;
pub use author_repository::{AuthorRepository, AuthorRepositoryError};
pub use transactions::{RelationalTransactions, TransactionError};
