//! Diesel and pool error mapping shared by the repositories.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use super::pool::PoolError;

/// Map a pool failure onto a repository's connection error constructor.
pub(crate) fn map_pool_error<E, C>(error: PoolError, connection: C) -> E
where
    C: FnOnce(String) -> E,
{
    connection(error.message().to_owned())
}

/// Map Diesel failures onto query/connection error constructors.
///
/// Driver details are logged at `debug` and kept out of the returned message,
/// except for constraint names, which callers need to tell failures apart.
pub(crate) fn map_diesel_error<E, Q, C>(error: DieselError, query: Q, connection: C) -> E
where
    Q: FnOnce(String) -> E,
    C: FnOnce(String) -> E,
{
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(%error, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            connection("database connection error".to_owned())
        }
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => query(format!(
            "unique constraint violated: {}",
            info.constraint_name().unwrap_or("unknown")
        )),
        DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) => {
            query(format!(
                "foreign key constraint violated: {}",
                info.constraint_name().unwrap_or("unknown")
            ))
        }
        DieselError::NotFound => query("record not found".to_owned()),
        DieselError::QueryBuilderError(_) => query("database query error".to_owned()),
        _ => query("database error".to_owned()),
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use rstest::rstest;

    use super::*;
    use crate::domain::ports::AuthorRepositoryError;

    fn map(error: DieselError) -> AuthorRepositoryError {
        map_diesel_error(
            error,
            AuthorRepositoryError::query,
            AuthorRepositoryError::connection,
        )
    }

    #[rstest]
    fn closed_connection_is_a_connection_error() {
        let error = map(DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection,
            Box::new("server closed the connection".to_owned()),
        ));
        assert!(matches!(error, AuthorRepositoryError::Connection { .. }));
    }

    #[rstest]
    fn other_failures_are_query_errors() {
        assert!(matches!(
            map(DieselError::NotFound),
            AuthorRepositoryError::Query { .. }
        ));
        assert!(matches!(
            map(DieselError::RollbackTransaction),
            AuthorRepositoryError::Query { .. }
        ));
    }

    #[rstest]
    fn pool_errors_keep_the_driver_message() {
        let error: AuthorRepositoryError = map_pool_error(
            PoolError::checkout("timed out"),
            AuthorRepositoryError::connection,
        );
        assert_eq!(
            error,
            AuthorRepositoryError::Connection {
                message: "timed out".to_owned()
            }
        );
    }
}
