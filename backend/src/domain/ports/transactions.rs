//! Port for relational transaction boundaries.
//!
//! Services open a transaction, pass the handle to every repository write
//! that belongs to the logical operation, then decide whether to commit or
//! roll back. Repositories never end a transaction themselves.

use async_trait::async_trait;

use super::define_port_error;

define_port_error! {
    /// Errors raised while opening or closing a relational transaction.
    pub enum TransactionError {
        /// A connection could not be checked out or `BEGIN` failed.
        Connection { message: String } =>
            "relational transaction could not start: {message}",
        /// `COMMIT` failed; the transaction outcome is unknown to the caller.
        Commit { message: String } =>
            "relational transaction commit failed: {message}",
        /// `ROLLBACK` failed.
        Rollback { message: String } =>
            "relational transaction rollback failed: {message}",
    }
}

/// Opaque begin/commit/rollback capability over the relational store.
#[async_trait]
pub trait RelationalTransactions: Send + Sync {
    /// Handle threaded through repository writes. Dropping it without
    /// committing must not persist anything.
    type Tx: Send;

    /// Start a new transaction.
    async fn begin(&self) -> Result<Self::Tx, TransactionError>;

    /// Make every write issued through `tx` durable.
    async fn commit(&self, tx: Self::Tx) -> Result<(), TransactionError>;

    /// Discard every write issued through `tx`.
    async fn rollback(&self, tx: Self::Tx) -> Result<(), TransactionError>;
}
