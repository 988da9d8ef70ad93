//! # API Error Type
//!
//! What an HTTP client sees when a request fails.
//!
//! ## Error Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Handler                                                                │
//! │    │                                                                    │
//! │    ├── JsonRejection ─────────────────────► 400 MALFORMED_REQUEST      │
//! │    ├── IntakeError::Core(MissingFields) ──► 400 MISSING_FIELDS         │
//! │    ├── IntakeError::Core(...) ────────────► 400 VALIDATION_ERROR /     │
//! │    │                                         PRODUCT_NOT_FOUND /       │
//! │    │                                         INSUFFICIENT_STOCK        │
//! │    ├── IntakeError::Storage ──────────────► 500 DATABASE_ERROR         │
//! │    └── QueryError ────────────────────────► 400 / 500                  │
//! │                                                                         │
//! │  ApiError::for_environment strips `details` in production              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Body
//! ```json
//! {
//!   "success": false,
//!   "error": "Insufficient stock",
//!   "code": "INSUFFICIENT_STOCK",
//!   "message": "Insufficient stock for Mole Poblano: available 3, requested 5"
//! }
//! ```

use std::error::Error as StdError;

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use tienda_core::CoreError;

use crate::config::Environment;
use crate::services::{IntakeError, QueryError};

/// Machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Required request fields absent (400)
    MissingFields,

    /// Input validation failed (400)
    ValidationError,

    /// Line item did not resolve (400)
    ProductNotFound,

    /// Not enough stock (400)
    InsufficientStock,

    /// Body or query string could not be parsed (400)
    MalformedRequest,

    /// Storage failed (500)
    DatabaseError,

    /// Anything else (500)
    Internal,
}

/// API error returned from handlers.
#[derive(Debug, Clone)]
pub struct ApiError {
    pub status: StatusCode,
    pub code: ErrorCode,

    /// Short summary
    pub error: String,

    /// Full human-readable message
    pub message: String,

    /// Debug detail and error source chain, development only
    pub details: Option<String>,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    success: bool,
    error: &'a str,
    code: ErrorCode,
    message: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

pub type ApiResult<T> = Result<T, ApiError>;

impl ApiError {
    pub fn new(
        status: StatusCode,
        code: ErrorCode,
        error: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        ApiError {
            status,
            code,
            error: error.into(),
            message: message.into(),
            details: None,
        }
    }

    /// Creates a 400 validation error.
    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            ErrorCode::ValidationError,
            "Validation failed",
            message,
        )
    }

    /// Creates a 500 storage error carrying the debug detail of `err`.
    pub fn storage(error: &str, err: &(dyn StdError + 'static)) -> Self {
        tracing::error!(error = %err, context = error, "Storage failure");
        let mut api = ApiError::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            ErrorCode::DatabaseError,
            error,
            err.to_string(),
        );
        api.details = Some(describe_chain(err));
        api
    }

    /// Drops `details` unless the environment exposes them.
    pub fn for_environment(mut self, environment: Environment) -> Self {
        if !environment.exposes_error_details() {
            self.details = None;
        }
        self
    }
}

/// `Debug` output followed by every `source()` in the chain.
fn describe_chain(err: &(dyn StdError + 'static)) -> String {
    let mut out = format!("{err:?}");
    let mut source = err.source();
    while let Some(cause) = source {
        out.push_str("\ncaused by: ");
        out.push_str(&cause.to_string());
        source = cause.source();
    }
    out
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            success: false,
            error: &self.error,
            code: self.code,
            message: &self.message,
            details: self.details.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Converts core errors to API errors. All of them are 400s.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        let (code, error) = match &err {
            CoreError::MissingFields { .. } => (ErrorCode::MissingFields, "Missing required fields"),
            CoreError::ProductNotFound { .. } => (ErrorCode::ProductNotFound, "Product not found"),
            CoreError::InsufficientStock { .. } => {
                (ErrorCode::InsufficientStock, "Insufficient stock")
            }
            CoreError::MissingProductId { .. }
            | CoreError::InvalidQuantity { .. }
            | CoreError::TooManyItems { .. }
            | CoreError::AmountOverflow
            | CoreError::Validation(_) => (ErrorCode::ValidationError, "Validation failed"),
        };
        ApiError::new(StatusCode::BAD_REQUEST, code, error, err.to_string())
    }
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::Core(core) => core.into(),
            storage @ IntakeError::Storage(_) => {
                ApiError::storage("Failed to create order", &storage)
            }
        }
    }
}

impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::Validation(validation) => ApiError::validation(validation.to_string()),
            storage @ QueryError::Storage(_) => ApiError::storage("Failed to fetch orders", &storage),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            ErrorCode::MalformedRequest,
            "Malformed request",
            rejection.body_text(),
        )
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::new(
            StatusCode::BAD_REQUEST,
            ErrorCode::MalformedRequest,
            "Malformed request",
            rejection.body_text(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tienda_core::ValidationError;
    use tienda_db::DbError;

    #[test]
    fn test_core_errors_are_bad_requests() {
        let err: ApiError = CoreError::InsufficientStock {
            name: "Mole Poblano".to_string(),
            available: 3,
            requested: 5,
        }
        .into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, ErrorCode::InsufficientStock);
        assert_eq!(
            err.message,
            "Insufficient stock for Mole Poblano: available 3, requested 5"
        );

        let err: ApiError = CoreError::from(ValidationError::InvalidEmail {
            value: "nope".to_string(),
        })
        .into();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert!(err.details.is_none());

        let err: ApiError = CoreError::AmountOverflow.into();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_storage_error_details_follow_environment() {
        let err: ApiError =
            IntakeError::from(DbError::QueryFailed("disk I/O error".to_string())).into();

        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.code, ErrorCode::DatabaseError);
        assert_eq!(err.error, "Failed to create order");
        assert!(err.message.contains("disk I/O error"));

        let dev = err.clone().for_environment(Environment::Development);
        let details = dev.details.unwrap();
        assert!(details.contains("Storage(QueryFailed"));
        assert!(details.contains("caused by: Query failed: disk I/O error"));

        let prod = err.for_environment(Environment::Production);
        assert!(prod.details.is_none());
    }

    #[test]
    fn test_unknown_filter_is_validation_error() {
        let err: ApiError = QueryError::Validation(ValidationError::NotAllowed {
            field: "status".to_string(),
            allowed: vec!["pending".to_string()],
        })
        .into();

        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.message, "status must be one of: pending");
    }
}
