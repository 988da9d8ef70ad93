//! Service-layer error types.
//!
//! ```text
//! CoreError ──┐
//!             ├──► IntakeError ──► ApiError
//! DbError  ───┘
//!                  QueryError  ──► ApiError
//! ```

use thiserror::Error;

use tienda_core::{CoreError, ValidationError};
use tienda_db::DbError;

/// Failure while taking in an order.
#[derive(Debug, Error)]
pub enum IntakeError {
    /// The request broke an intake rule. Caller-fixable.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// Storage failed. Not caller-fixable, never retried.
    #[error("Order storage failed: {0}")]
    Storage(#[source] DbError),
}

/// Storage errors that are really rule violations are surfaced as such.
///
/// A stock conflict means a concurrent checkout took the stock between
/// resolution and commit; the caller sees the same error as if the stock had
/// been short from the start.
impl From<DbError> for IntakeError {
    fn from(err: DbError) -> Self {
        match err {
            DbError::StockConflict {
                name,
                available,
                requested,
                ..
            } => IntakeError::Core(CoreError::InsufficientStock {
                name,
                available,
                requested,
            }),
            other => IntakeError::Storage(other),
        }
    }
}

impl From<ValidationError> for IntakeError {
    fn from(err: ValidationError) -> Self {
        IntakeError::Core(CoreError::Validation(err))
    }
}

pub type IntakeResult<T> = Result<T, IntakeError>;

/// Failure while listing orders.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A filter value is not one of the known values.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Order lookup failed: {0}")]
    Storage(#[from] DbError),
}

pub type QueryResult<T> = Result<T, QueryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stock_conflict_becomes_insufficient_stock() {
        let err: IntakeError = DbError::StockConflict {
            product_id: "p-1".to_string(),
            name: "Mole".to_string(),
            available: 1,
            requested: 2,
        }
        .into();

        assert!(matches!(
            err,
            IntakeError::Core(CoreError::InsufficientStock { ref name, available: 1, requested: 2 })
                if name == "Mole"
        ));
    }

    #[test]
    fn test_other_storage_errors_stay_storage() {
        let err: IntakeError = DbError::PoolExhausted.into();
        assert!(matches!(err, IntakeError::Storage(DbError::PoolExhausted)));
        assert_eq!(err.to_string(), "Order storage failed: Connection pool exhausted");
    }
}
