//! Error mapping from Diesel and the pool into [`StoreError`].
//!
//! Structured kinds are mapped to structured variants so the domain never
//! needs to inspect driver text. Everything else becomes
//! [`StoreError::Query`] carrying the server message.

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use tracing::debug;

use crate::domain::ports::StoreError;

use super::pool::PoolError;

/// Map pool errors to store connection errors.
pub fn map_pool_error(error: PoolError) -> StoreError {
    match error {
        PoolError::Checkout { message } | PoolError::Build { message } => {
            StoreError::connection(message)
        }
    }
}

/// Map Diesel errors to store errors, logging the raw failure at debug.
pub fn map_diesel_error(error: DieselError) -> StoreError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(
                ?kind,
                message = info.message(),
                constraint = ?info.constraint_name(),
                "diesel operation failed"
            );
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::NotFound => StoreError::not_found("record not found"),
        DieselError::DatabaseError(kind, info) => {
            let detail = info
                .constraint_name()
                .map_or_else(|| info.message().to_owned(), str::to_owned);
            match kind {
                DatabaseErrorKind::UniqueViolation => StoreError::unique_violation(detail),
                DatabaseErrorKind::ForeignKeyViolation => StoreError::missing_reference(detail),
                DatabaseErrorKind::ClosedConnection => {
                    StoreError::connection("database connection error")
                }
                _ => StoreError::query(info.message()),
            }
        }
        other => StoreError::query(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn database_error(kind: DatabaseErrorKind, message: &str) -> DieselError {
        DieselError::DatabaseError(kind, Box::new(message.to_owned()))
    }

    #[rstest]
    fn pool_error_maps_to_connection_error() {
        let store_err = map_pool_error(PoolError::checkout("connection refused"));

        assert!(matches!(store_err, StoreError::Connection { .. }));
        assert!(store_err.to_string().contains("connection refused"));
    }

    #[rstest]
    fn missing_row_maps_to_not_found() {
        assert!(matches!(
            map_diesel_error(DieselError::NotFound),
            StoreError::NotFound { .. }
        ));
    }

    #[rstest]
    #[case(DatabaseErrorKind::UniqueViolation, "duplicate key value")]
    #[case(DatabaseErrorKind::ForeignKeyViolation, "violates foreign key constraint")]
    #[case(DatabaseErrorKind::ClosedConnection, "server closed the connection")]
    #[case(DatabaseErrorKind::SerializationFailure, "could not serialize access")]
    fn database_kinds_map_to_variants(#[case] kind: DatabaseErrorKind, #[case] message: &str) {
        let store_err = map_diesel_error(database_error(kind, message));

        match kind {
            DatabaseErrorKind::UniqueViolation => {
                assert!(matches!(store_err, StoreError::UniqueViolation { .. }));
            }
            DatabaseErrorKind::ForeignKeyViolation => {
                assert!(matches!(store_err, StoreError::MissingReference { .. }));
            }
            DatabaseErrorKind::ClosedConnection => {
                assert!(matches!(store_err, StoreError::Connection { .. }));
            }
            _ => {
                assert_eq!(store_err, StoreError::query(message));
            }
        }
    }
}
