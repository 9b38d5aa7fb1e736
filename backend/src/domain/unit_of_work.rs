//! Transaction helpers shared by the mutating services.

use chrono::{DateTime, SubsecRound, Utc};
use mockable::Clock;
use tracing::warn;

use super::Error;
use super::ports::{RelationalTransactions, TransactionError};

/// Current instant truncated to the microsecond precision the relational
/// store keeps, so rows read back compare equal to what was written.
pub(crate) fn stored_now(clock: &dyn Clock) -> DateTime<Utc> {
    clock.utc().trunc_subsecs(6)
}

pub(crate) fn map_transaction_error(error: TransactionError) -> Error {
    match error {
        TransactionError::Connection { message } => {
            Error::internal(format!("relational store unavailable: {message}"))
        }
        TransactionError::Commit { message } => {
            Error::internal(format!("relational commit failed: {message}"))
        }
        TransactionError::Rollback { message } => {
            Error::internal(format!("relational rollback failed: {message}"))
        }
    }
}

/// Roll back `tx`. A rollback failure is logged, not returned, so the caller
/// still reports the error that triggered the rollback.
pub(crate) async fn rollback_or_log<T>(transactions: &T, tx: T::Tx, operation: &'static str)
where
    T: RelationalTransactions + ?Sized,
{
    if let Err(error) = transactions.rollback(tx).await {
        warn!(operation, %error, "relational rollback failed");
    }
}
