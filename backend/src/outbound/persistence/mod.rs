//! PostgreSQL persistence adapters using Diesel ORM.
//!
//! Concrete implementations of the relational ports backed by PostgreSQL via
//! `diesel-async` and `bb8` connection pooling.
//!
//! - **Thin adapters**: repositories only translate between Diesel rows and
//!   domain types.
//! - **Internal models**: row structs (`models.rs`) and table definitions
//!   (`schema.rs`) never leave this module.
//! - **Caller-owned transactions**: writes run on the connection held by a
//!   [`DieselTx`]; reads borrow a pooled connection and see committed rows.
//!
//! # Example
//!
//! ```ignore
//! use scriptorium::outbound::persistence::{DbPool, DieselAuthorRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/scriptorium")).await?;
//! let authors = DieselAuthorRepository::new(pool.clone());
//! ```

mod diesel_article_repository;
mod diesel_author_repository;
mod diesel_error_mapping;
mod diesel_transactions;
mod migrations;
mod models;
mod pool;
mod schema;

pub use diesel_article_repository::DieselArticleRepository;
pub use diesel_author_repository::DieselAuthorRepository;
pub use diesel_transactions::{DieselTransactions, DieselTx};
pub use migrations::{MigrationError, run_migrations};
pub use pool::{DbPool, PoolConfig, PoolError};
