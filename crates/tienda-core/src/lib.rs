//! # tienda-core: Pure Business Logic for Order Intake
//!
//! This crate holds every rule of order creation that can be expressed
//! without touching a database or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Order Intake Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 Storefront checkout (frontend)                  │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ POST /api/orders                       │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 tienda-api (intake / query services)            │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ tienda-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌──────────┐ ┌──────────┐ ┌──────────┐ ┌────────────────┐   │   │
//! │  │   │  types   │ │  money   │ │ pricing  │ │  validation    │   │   │
//! │  │   │  Order   │ │  Money   │ │ Totals   │ │  sanitize      │   │   │
//! │  │   │ Product  │ │ TaxRate  │ │ Jurisd.  │ │  customer/addr │   │   │
//! │  │   └──────────┘ └──────────┘ └──────────┘ └────────────────┘   │   │
//! │  │                 ┌──────────────┐                                │   │
//! │  │                 │ order_number │                                │   │
//! │  │                 └──────────────┘                                │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    tienda-db (Database Layer)                   │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Product, Order, Customer, Address, ...)
//! - [`money`] - Money and TaxRate with integer arithmetic
//! - [`pricing`] - Order totals under a jurisdiction's tax/shipping policy
//! - [`validation`] - Sanitization and field validation
//! - [`order_number`] - Order number formats (sequential and fallback)
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use tienda_core::money::{Money, TaxRate};
//!
//! let subtotal = Money::from_cents(3000);
//! let tax = subtotal.calculate_tax(TaxRate::from_bps(1600));
//! assert_eq!(tax.cents(), 480);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod money;
pub mod order_number;
pub mod pricing;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, TaxRate};
pub use pricing::{compute_totals, Jurisdiction, OrderTotals};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum distinct line items accepted in one order.
///
/// ## Business Reason
/// Prevents runaway carts and keeps a single intake transaction small.
pub const MAX_ORDER_ITEMS: usize = 100;

/// Maximum quantity of a single line item.
///
/// ## Business Reason
/// Catches accidental over-ordering (typing 1000 instead of 10).
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Image URL used when a product has no usable image.
pub const PLACEHOLDER_IMAGE_URL: &str = "/images/placeholder.png";
