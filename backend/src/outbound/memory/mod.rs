//! Process-local adapters for the relational store and the search index.
//!
//! Used for local runs and tests. They honour the same contracts as the
//! PostgreSQL and Elasticsearch adapters, including staged transactions and
//! upserting partial index updates.

mod article_index;
mod relational_store;

pub use article_index::InMemoryArticleIndex;
pub use relational_store::{InMemoryRelationalStore, InMemoryTx};
