//! # Validation Module
//!
//! Sanitization and validation of untrusted order intake input.
//!
//! ## Validation Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Storefront checkout form                                     │
//! │  └── Basic format checks, immediate user feedback                      │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: HTTP handler (Rust)                                          │
//! │  ├── Type validation (JSON deserialization)                            │
//! │  └── THIS MODULE: required fields, sanitizing, field shapes            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Database (SQLite)                                            │
//! │  ├── NOT NULL / CHECK constraints                                      │
//! │  └── UNIQUE order numbers                                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use tienda_core::validation::{sanitize, validate_email};
//!
//! assert_eq!(sanitize("<b>Ring</b> the bell"), "Ring the bell");
//! assert_eq!(validate_email(" Ana@Example.COM ").unwrap(), "ana@example.com");
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::error::{CoreError, CoreResult, ValidationError, ValidationResult};
use crate::types::{
    Address, AddressInput, CreateOrderRequest, Customer, CustomerInput, LineItemRequest,
};
use crate::{MAX_ITEM_QUANTITY, MAX_ORDER_ITEMS};

/// Customer name length bounds, in characters.
pub const CUSTOMER_NAME_MIN: usize = 2;
pub const CUSTOMER_NAME_MAX: usize = 100;

/// Longest accepted payment method label.
pub const PAYMENT_METHOD_MAX: usize = 50;

/// Digit count bounds for phone numbers (E.164 allows 15).
const PHONE_MIN_DIGITS: usize = 7;
const PHONE_MAX_DIGITS: usize = 15;

static MARKUP_TAG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<[^>]*>").expect("Invalid regex"));

static SCRIPT_SCHEME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(javascript|vbscript|data)\s*:").expect("Invalid regex"));

// Only attribute-shaped handlers with a quoted value; bare "once = 5pm" is text.
static EVENT_HANDLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bon[a-z]+\s*=\s*("[^"]*"|'[^']*')"#).expect("Invalid regex")
});

static WHITESPACE_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("Invalid regex"));

static EMAIL_SHAPE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9._%+-]+@[a-z0-9.-]+\.[a-z]{2,}$").expect("Invalid regex")
});

static PHONE_SHAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\+?[0-9 ().-]+$").expect("Invalid regex"));

// =============================================================================
// Sanitization
// =============================================================================

/// Reduces free text to plain text.
///
/// ## What Gets Removed
/// ```text
/// "<script>alert(1)</script>Hi"   → "alert(1)Hi"
/// "a < b"                         → "a b"
/// "javascript:steal()"            → "steal()"
/// "x onerror='boom()' y"         → "x y"
/// "line\nbreak\t\ttab"            → "line break tab"
/// ```
///
/// Ordinary words are left alone: "Metadata: blue sofa" and "once = 5pm"
/// survive unchanged.
///
/// One pass can expose a new match (a control character inside
/// `javascript\u{1}:` becomes a space the scheme pattern accepts), so passes
/// repeat until the text stops changing. That makes the function
/// idempotent: `sanitize(&sanitize(x)) == sanitize(x)`.
pub fn sanitize(input: &str) -> String {
    let mut current = sanitize_pass(input);
    loop {
        let next = sanitize_pass(&current);
        if next == current {
            return current;
        }
        current = next;
    }
}

fn sanitize_pass(input: &str) -> String {
    let text = MARKUP_TAG.replace_all(input, "");
    let text = text.replace(['<', '>'], "");
    let text = SCRIPT_SCHEME.replace_all(&text, "");
    let text = EVENT_HANDLER.replace_all(&text, "");
    let text: String = text
        .chars()
        .map(|c| if c.is_control() { ' ' } else { c })
        .collect();
    WHITESPACE_RUN.replace_all(text.trim(), " ").into_owned()
}

// =============================================================================
// Request Shape
// =============================================================================

fn is_blank(value: Option<&String>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Lists the top-level fields an intake request is missing.
///
/// Empty strings count as missing, as does an empty item list.
pub fn missing_fields(request: &CreateOrderRequest) -> Vec<String> {
    let mut missing = Vec::new();

    match &request.customer {
        None => missing.push("customer".to_string()),
        Some(customer) => {
            if is_blank(customer.name.as_ref()) {
                missing.push("customer.name".to_string());
            }
            if is_blank(customer.email.as_ref()) {
                missing.push("customer.email".to_string());
            }
        }
    }

    if request.shipping_address.is_none() {
        missing.push("shippingAddress".to_string());
    }

    if request.items.as_ref().map_or(true, Vec::is_empty) {
        missing.push("items".to_string());
    }

    if is_blank(request.payment_method.as_ref()) {
        missing.push("paymentMethod".to_string());
    }

    missing
}

/// The parts of an intake request that must be present.
#[derive(Debug, Clone, Copy)]
pub struct RequiredParts<'a> {
    pub customer: &'a CustomerInput,
    pub shipping_address: &'a AddressInput,
    pub items: &'a [LineItemRequest],
    pub payment_method: &'a str,
}

/// Checks that every top-level field is present and hands them out.
///
/// Fails with `MissingFields` listing all absent fields at once.
pub fn require_fields(request: &CreateOrderRequest) -> CoreResult<RequiredParts<'_>> {
    let fields = missing_fields(request);

    match (
        &request.customer,
        &request.shipping_address,
        &request.items,
        &request.payment_method,
    ) {
        (Some(customer), Some(shipping_address), Some(items), Some(payment_method))
            if fields.is_empty() =>
        {
            Ok(RequiredParts {
                customer,
                shipping_address,
                items,
                payment_method,
            })
        }
        _ => Err(CoreError::MissingFields { fields }),
    }
}

/// Validates the number of line items in one order.
pub fn validate_item_count(count: usize) -> CoreResult<()> {
    if count > MAX_ORDER_ITEMS {
        return Err(CoreError::TooManyItems {
            max: MAX_ORDER_ITEMS,
        });
    }
    Ok(())
}

/// Validates a line item quantity.
///
/// ## Rules
/// - Must be present
/// - Must be positive (> 0)
/// - Must not exceed MAX_ITEM_QUANTITY (999)
///
/// ## Example
/// ```rust
/// use tienda_core::validation::validate_quantity;
///
/// assert_eq!(validate_quantity(Some(3), "Mole").unwrap(), 3);
/// assert!(validate_quantity(Some(0), "Mole").is_err());
/// assert!(validate_quantity(None, "Mole").is_err());
/// ```
pub fn validate_quantity(quantity: Option<i64>, item: &str) -> CoreResult<i64> {
    match quantity {
        Some(qty) if (1..=MAX_ITEM_QUANTITY).contains(&qty) => Ok(qty),
        _ => Err(CoreError::InvalidQuantity {
            item: item.to_string(),
            max: MAX_ITEM_QUANTITY,
        }),
    }
}

// =============================================================================
// Customer Validators
// =============================================================================

/// Validates and normalizes a customer name.
///
/// ## Rules
/// - Sanitized and trimmed
/// - Between 2 and 100 characters (counted as chars, not bytes)
pub fn validate_customer_name(name: &str) -> ValidationResult<String> {
    let name = sanitize(name);
    let len = name.chars().count();

    if !(CUSTOMER_NAME_MIN..=CUSTOMER_NAME_MAX).contains(&len) {
        return Err(ValidationError::InvalidCustomerName {
            min: CUSTOMER_NAME_MIN,
            max: CUSTOMER_NAME_MAX,
        });
    }

    Ok(name)
}

/// Validates an email address and returns it trimmed and lowercased.
///
/// ## Example
/// ```rust
/// use tienda_core::validation::validate_email;
///
/// assert!(validate_email("ana@example.com").is_ok());
/// assert!(validate_email("ana@example").is_err());
/// assert!(validate_email("not an email").is_err());
/// ```
pub fn validate_email(email: &str) -> ValidationResult<String> {
    let email = email.trim().to_lowercase();

    if !EMAIL_SHAPE.is_match(&email) {
        return Err(ValidationError::InvalidEmail { value: email });
    }

    Ok(email)
}

/// Validates an optional phone number.
///
/// Blank input means "no phone" and yields `None`.
///
/// ## Accepted Shapes
/// ```text
/// +52 55 1234 5678   ✓
/// (555) 123-4567     ✓
/// 555.123.4567       ✓
/// 12345              ✗ too few digits
/// call me            ✗
/// ```
pub fn validate_phone(phone: Option<&str>) -> ValidationResult<Option<String>> {
    let phone = match phone.map(str::trim) {
        None | Some("") => return Ok(None),
        Some(p) => p,
    };

    let digits = phone.chars().filter(char::is_ascii_digit).count();
    if !PHONE_SHAPE.is_match(phone) || !(PHONE_MIN_DIGITS..=PHONE_MAX_DIGITS).contains(&digits) {
        return Err(ValidationError::InvalidPhone {
            value: phone.to_string(),
        });
    }

    Ok(Some(phone.to_string()))
}

/// Validates the customer block of an intake request.
pub fn validate_customer(input: &CustomerInput) -> ValidationResult<Customer> {
    let name = validate_customer_name(input.name.as_deref().unwrap_or_default())?;
    let email = validate_email(input.email.as_deref().unwrap_or_default())?;
    let phone = validate_phone(input.phone.as_deref())?;

    Ok(Customer { name, email, phone })
}

// =============================================================================
// Address Validators
// =============================================================================

/// Which address of an order is being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressKind {
    Shipping,
    Billing,
}

impl AddressKind {
    pub const fn label(&self) -> &'static str {
        match self {
            AddressKind::Shipping => "Shipping",
            AddressKind::Billing => "Billing",
        }
    }
}

/// Validates an address: every field is required once sanitized.
///
/// Fields are checked in order street, city, state, zipCode, country; the
/// first empty one is reported.
pub fn validate_address(input: &AddressInput, kind: AddressKind) -> ValidationResult<Address> {
    let field = |value: &Option<String>, name: &str| -> ValidationResult<String> {
        let value = sanitize(value.as_deref().unwrap_or_default());
        if value.is_empty() {
            return Err(ValidationError::IncompleteAddress {
                address: kind.label().to_string(),
                field: name.to_string(),
            });
        }
        Ok(value)
    };

    Ok(Address {
        street: field(&input.street, "street")?,
        city: field(&input.city, "city")?,
        state: field(&input.state, "state")?,
        zip_code: field(&input.zip_code, "zipCode")?,
        country: field(&input.country, "country")?,
    })
}

// =============================================================================
// Free Text
// =============================================================================

/// Sanitizes order notes. Notes that sanitize to nothing are dropped.
pub fn validate_notes(notes: Option<&str>) -> Option<String> {
    notes.map(sanitize).filter(|n| !n.is_empty())
}

/// Sanitizes and validates the payment method label.
pub fn validate_payment_method(method: &str) -> ValidationResult<String> {
    let method = sanitize(method);
    let len = method.chars().count();

    if len == 0 || len > PAYMENT_METHOD_MAX {
        return Err(ValidationError::InvalidPaymentMethod {
            max: PAYMENT_METHOD_MAX,
        });
    }

    Ok(method)
}

// =============================================================================
// Unit Tests
// =============================================================================
