//! PostgreSQL transaction handles for the coordinator.
//!
//! A [`DieselTx`] owns one pooled connection with an open transaction. If the
//! handle is dropped without commit or rollback, the pool sees an unfinished
//! transaction on return and discards the connection, so the server rolls
//! the work back.

use async_trait::async_trait;
use diesel_async::pooled_connection::bb8::PooledConnection;
use diesel_async::{AnsiTransactionManager, AsyncPgConnection, TransactionManager};
use tracing::debug;

use crate::domain::ports::{RelationalTransactions, TransactionError};

use super::pool::DbPool;

type PgTransactionManager = AnsiTransactionManager;

/// Open relational transaction.
pub struct DieselTx {
    conn: PooledConnection<'static, AsyncPgConnection>,
}

impl DieselTx {
    pub(crate) fn connection(&mut self) -> &mut AsyncPgConnection {
        &mut self.conn
    }
}

/// Diesel-backed implementation of [`RelationalTransactions`].
#[derive(Clone)]
pub struct DieselTransactions {
    pool: DbPool,
}

impl DieselTransactions {
    /// Open transactions on connections from `pool`.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl RelationalTransactions for DieselTransactions {
    type Tx = DieselTx;

    async fn begin(&self) -> Result<Self::Tx, TransactionError> {
        let mut conn = self
            .pool
            .get_owned()
            .await
            .map_err(|err| TransactionError::connection(err.message()))?;
        <PgTransactionManager as TransactionManager<AsyncPgConnection>>::begin_transaction(
            &mut *conn,
        )
        .await
        .map_err(|err| TransactionError::connection(err.to_string()))?;
        debug!("relational transaction opened");
        Ok(DieselTx { conn })
    }

    async fn commit(&self, mut tx: Self::Tx) -> Result<(), TransactionError> {
        <PgTransactionManager as TransactionManager<AsyncPgConnection>>::commit_transaction(
            tx.connection(),
        )
        .await
        .map_err(|err| TransactionError::commit(err.to_string()))
    }

    async fn rollback(&self, mut tx: Self::Tx) -> Result<(), TransactionError> {
        <PgTransactionManager as TransactionManager<AsyncPgConnection>>::rollback_transaction(
            tx.connection(),
        )
        .await
        .map_err(|err| TransactionError::rollback(err.to_string()))
    }
}
