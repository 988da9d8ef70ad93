//! # Error Types
//!
//! Domain-specific error types for tienda-core.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  tienda-core errors (this file)                                        │
//! │  ├── CoreError        - Order intake rule violations                   │
//! │  └── ValidationError  - Field-level input failures                     │
//! │                                                                         │
//! │  tienda-db errors (separate crate)                                     │
//! │  └── DbError          - Storage failures                               │
//! │                                                                         │
//! │  tienda-api errors (app)                                               │
//! │  ├── IntakeError      - Core or storage failure during intake          │
//! │  └── ApiError         - What the HTTP client sees                      │
//! │                                                                         │
//! │  Flow: ValidationError → CoreError → IntakeError → ApiError → client   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Name the offending field or line item in every message
//! 3. Errors are enum variants, never String

use thiserror::Error;

// =============================================================================
// Core Error
// =============================================================================

/// Order intake rule violations.
///
/// Every variant is a caller-facing (400-class) failure: the request can be
/// fixed and resubmitted. Nothing here is retried automatically.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    /// Top-level request fields are absent.
    ///
    /// ## When This Occurs
    /// - No customer, or customer without name/email
    /// - No shipping address
    /// - Empty or absent item list
    /// - No payment method
    #[error("Missing required fields: {}", fields.join(", "))]
    MissingFields { fields: Vec<String> },

    /// A line item carries no product identifier.
    #[error("Product identifier is required for item {item}")]
    MissingProductId { item: String },

    /// A line item quantity is absent, zero, negative or above the cap.
    #[error("Quantity for {item} must be between 1 and {max}")]
    InvalidQuantity { item: String, max: i64 },

    /// The order carries more line items than allowed.
    #[error("An order cannot have more than {max} items")]
    TooManyItems { max: usize },

    /// The line item resolves to no active catalog product.
    ///
    /// ## When This Occurs
    /// - Identifier unknown and no name fallback supplied
    /// - Neither identifier nor name matches an active product
    #[error("Product not found: {name}")]
    ProductNotFound { name: String },

    /// Requested quantity exceeds the available stock.
    ///
    /// ## User Workflow
    /// ```text
    /// Checkout (qty: 5)
    ///      │
    ///      ▼
    /// Resolve: stock = 3
    ///      │
    ///      ▼
    /// InsufficientStock { name: "Mole Poblano", available: 3, requested: 5 }
    ///      │
    ///      ▼
    /// UI shows: "Only 3 Mole Poblano available"
    /// ```
    #[error("Insufficient stock for {name}: available {available}, requested {requested}")]
    InsufficientStock {
        name: String,
        available: i64,
        requested: i64,
    },

    /// A line total or order total does not fit in the money range.
    #[error("Order amount exceeds the supported range")]
    AmountOverflow,

    /// Validation error (wraps ValidationError).
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Field-level input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is empty once sanitized.
    #[error("{field} is required")]
    Required { field: String },

    /// Customer name length is outside the accepted range.
    #[error("Customer name must be between {min} and {max} characters")]
    InvalidCustomerName { min: usize, max: usize },

    /// Email does not look like `local@domain.tld`.
    #[error("Invalid email address: {value}")]
    InvalidEmail { value: String },

    /// Phone number does not look like a phone number.
    #[error("Invalid phone number: {value}")]
    InvalidPhone { value: String },

    /// Payment method is empty or unreasonably long once sanitized.
    #[error("Payment method must be between 1 and {max} characters")]
    InvalidPaymentMethod { max: usize },

    /// An address field is empty.
    #[error("{address} address is incomplete: {field} is required")]
    IncompleteAddress { address: String, field: String },

    /// Value is not in allowed set.
    #[error("{field} must be one of: {}", allowed.join(", "))]
    NotAllowed { field: String, allowed: Vec<String> },
}

// =============================================================================
// Result Type Aliases
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = CoreError::InsufficientStock {
            name: "Mole Poblano".to_string(),
            available: 3,
            requested: 5,
        };
        assert_eq!(
            err.to_string(),
            "Insufficient stock for Mole Poblano: available 3, requested 5"
        );

        let err = CoreError::MissingFields {
            fields: vec!["customer.email".to_string(), "items".to_string()],
        };
        assert_eq!(err.to_string(), "Missing required fields: customer.email, items");
    }

    #[test]
    fn test_validation_error_messages() {
        let err = ValidationError::IncompleteAddress {
            address: "Shipping".to_string(),
            field: "zipCode".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Shipping address is incomplete: zipCode is required"
        );
    }

    #[test]
    fn test_validation_converts_to_core_error() {
        let validation_err = ValidationError::InvalidEmail {
            value: "nope".to_string(),
        };
        let core_err: CoreError = validation_err.clone().into();
        assert_eq!(core_err, CoreError::Validation(validation_err));
        assert_eq!(core_err.to_string(), "Invalid email address: nope");
    }
}
