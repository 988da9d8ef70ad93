//! # Domain Types
//!
//! Core domain types of order intake.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  INPUT (untrusted)           DERIVED                  PERSISTED         │
//! │  ┌──────────────────┐   ┌──────────────────┐   ┌──────────────────┐    │
//! │  │CreateOrderRequest│   │ Customer         │   │ Order            │    │
//! │  │  CustomerInput   │──►│ Address          │──►│  id (UUID)       │    │
//! │  │  AddressInput    │   │ ResolvedLineItem │   │  order_number    │    │
//! │  │  LineItemRequest │   │ NewOrder         │   │  status          │    │
//! │  └──────────────────┘   └──────────────────┘   └──────────────────┘    │
//! │                                                                         │
//! │  CATALOG                     QUERY                                      │
//! │  ┌──────────────────┐   ┌──────────────────┐                           │
//! │  │ Product          │   │ OrderFilter      │                           │
//! │  │ ProductImage     │   │ OrderSort        │                           │
//! │  └──────────────────┘   │ Pagination       │                           │
//! │                         └──────────────────┘                           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Orders carry both:
//! - `id`: UUID v4 - immutable, used for relations
//! - `order_number`: human-readable (`ORD-000042`), shown to customers

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult, ValidationError};
use crate::money::Money;
use crate::PLACEHOLDER_IMAGE_URL;

// =============================================================================
// Product (catalog)
// =============================================================================

/// A product image as stored by the catalog.
///
/// Older catalog entries store a bare URL, newer ones a record with alt
/// text. Both shapes appear in the same `images` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum ProductImage {
    /// Bare URL string.
    Url(String),
    /// Structured image record.
    Structured {
        url: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        alt: Option<String>,
    },
}

impl ProductImage {
    /// Returns the image URL, if it is not blank.
    pub fn url(&self) -> Option<&str> {
        let url = match self {
            ProductImage::Url(url) => url,
            ProductImage::Structured { url, .. } => url,
        };
        let url = url.trim();
        if url.is_empty() {
            None
        } else {
            Some(url)
        }
    }
}

/// A product available in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Product {
    /// Unique identifier (UUID v4).
    pub id: String,

    /// Display name. Also the legacy lookup key for old cart payloads.
    pub name: String,

    /// Current price in cents.
    pub price: Money,

    /// Product images, first one is the primary image.
    pub images: Vec<ProductImage>,

    /// Units available to sell.
    pub stock_quantity: i64,

    /// Whether product is listed (soft delete).
    pub is_active: bool,

    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,

    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Product {
    /// Returns the URL of the primary image, or the placeholder.
    ///
    /// ```text
    /// images[0] = "https://cdn/x.jpg"              → "https://cdn/x.jpg"
    /// images[0] = { url: "https://cdn/y.jpg", .. } → "https://cdn/y.jpg"
    /// images = [] / blank url                      → placeholder
    /// ```
    pub fn primary_image_url(&self) -> &str {
        self.images
            .first()
            .and_then(ProductImage::url)
            .unwrap_or(PLACEHOLDER_IMAGE_URL)
    }

    /// Checks whether `quantity` units can be sold from current stock.
    #[inline]
    pub fn has_stock_for(&self, quantity: i64) -> bool {
        quantity <= self.stock_quantity
    }
}

// =============================================================================
// Intake Request (untrusted input)
// =============================================================================
// Every field is optional so that absence surfaces as a named
// MissingFields failure instead of a generic deserialization error.

/// Body of an order intake request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub customer: Option<CustomerInput>,
    #[serde(default)]
    pub shipping_address: Option<AddressInput>,
    #[serde(default)]
    pub billing_address: Option<AddressInput>,
    #[serde(default)]
    pub items: Option<Vec<LineItemRequest>>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

/// Customer contact fields as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct CustomerInput {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
}

/// Address fields as submitted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AddressInput {
    #[serde(default)]
    pub street: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub zip_code: Option<String>,
    #[serde(default)]
    pub country: Option<String>,
}

/// One cart line as submitted.
///
/// Clients may also send a `price`; it is never read.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct LineItemRequest {
    /// Product identifier.
    #[serde(default)]
    pub product: Option<String>,
    #[serde(default)]
    pub quantity: Option<i64>,
    /// Display name, used as lookup fallback for legacy payloads.
    #[serde(default)]
    pub name: Option<String>,
}

impl LineItemRequest {
    /// How this item is named in error messages: its name, else its position.
    pub fn label(&self, index: usize) -> String {
        match self.name.as_deref().map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("#{}", index + 1),
        }
    }
}

// =============================================================================
// Validated Order Parts
// =============================================================================

/// A validated customer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Customer {
    pub name: String,
    pub email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// A validated postal address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
}

/// A line item resolved against the catalog.
/// Uses snapshot pattern to freeze product data at time of order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ResolvedLineItem {
    pub product_id: String,
    pub quantity: i64,
    /// Catalog price at resolution time (frozen).
    pub unit_price: Money,
    /// Product name at resolution time (frozen).
    pub name: String,
    /// Primary image at resolution time (frozen).
    pub image_url: String,
    /// unit_price × quantity.
    pub line_total: Money,
}

impl ResolvedLineItem {
    /// Fails with `AmountOverflow` when `unit_price × quantity` overflows.
    pub fn new(
        product_id: impl Into<String>,
        quantity: i64,
        unit_price: Money,
        name: impl Into<String>,
        image_url: impl Into<String>,
    ) -> CoreResult<Self> {
        let line_total = unit_price
            .checked_multiply_quantity(quantity)
            .ok_or(CoreError::AmountOverflow)?;

        Ok(ResolvedLineItem {
            product_id: product_id.into(),
            quantity,
            unit_price,
            name: name.into(),
            image_url: image_url.into(),
            line_total,
        })
    }

    /// Snapshots a catalog product for `quantity` units.
    pub fn snapshot(product: &Product, quantity: i64) -> CoreResult<Self> {
        ResolvedLineItem::new(
            product.id.as_str(),
            quantity,
            product.price,
            product.name.as_str(),
            product.primary_image_url(),
        )
    }
}

// =============================================================================
// Order Status
// =============================================================================

/// Fulfilment lifecycle of an order. Intake always creates `Pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
    Refunded,
}

impl OrderStatus {
    pub const ALL: [OrderStatus; 7] = [
        OrderStatus::Pending,
        OrderStatus::Confirmed,
        OrderStatus::Processing,
        OrderStatus::Shipped,
        OrderStatus::Delivered,
        OrderStatus::Cancelled,
        OrderStatus::Refunded,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            OrderStatus::Pending => "pending",
            OrderStatus::Confirmed => "confirmed",
            OrderStatus::Processing => "processing",
            OrderStatus::Shipped => "shipped",
            OrderStatus::Delivered => "delivered",
            OrderStatus::Cancelled => "cancelled",
            OrderStatus::Refunded => "refunded",
        }
    }
}

/// Payment lifecycle of an order. Intake always creates `Pending`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PaymentStatus {
    #[default]
    Pending,
    Paid,
    Failed,
    Refunded,
}

impl PaymentStatus {
    pub const ALL: [PaymentStatus; 4] = [
        PaymentStatus::Pending,
        PaymentStatus::Paid,
        PaymentStatus::Failed,
        PaymentStatus::Refunded,
    ];

    pub const fn as_str(&self) -> &'static str {
        match self {
            PaymentStatus::Pending => "pending",
            PaymentStatus::Paid => "paid",
            PaymentStatus::Failed => "failed",
            PaymentStatus::Refunded => "refunded",
        }
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        OrderStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: OrderStatus::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            })
    }
}

impl FromStr for PaymentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        PaymentStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == wanted)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "paymentStatus".to_string(),
                allowed: PaymentStatus::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Order
// =============================================================================

/// A fully validated order that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewOrder {
    pub order_number: String,
    pub customer: Customer,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub items: Vec<ResolvedLineItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub discount: Money,
    pub total: Money,
    pub payment_method: String,
    pub notes: Option<String>,
}

impl NewOrder {
    /// Turns the draft into a stored order with the identity and timestamps
    /// assigned by persistence. Status fields always start as pending.
    pub fn into_order(self, id: String, created_at: DateTime<Utc>) -> Order {
        Order {
            id,
            order_number: self.order_number,
            customer: self.customer,
            shipping_address: self.shipping_address,
            billing_address: self.billing_address,
            items: self.items,
            subtotal: self.subtotal,
            tax: self.tax,
            shipping: self.shipping,
            discount: self.discount,
            total: self.total,
            payment_method: self.payment_method,
            status: OrderStatus::Pending,
            payment_status: PaymentStatus::Pending,
            notes: self.notes,
            created_at,
            updated_at: created_at,
        }
    }
}

/// A persisted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Order {
    pub id: String,
    pub order_number: String,
    pub customer: Customer,
    pub shipping_address: Address,
    pub billing_address: Address,
    pub items: Vec<ResolvedLineItem>,
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub discount: Money,
    pub total: Money,
    pub payment_method: String,
    pub status: OrderStatus,
    pub payment_status: PaymentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

// =============================================================================
// Order Query
// =============================================================================

/// Filters for listing orders. `None` means "don't filter".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderFilter {
    pub status: Option<OrderStatus>,
    pub payment_status: Option<PaymentStatus>,
    /// Exact match, compared lowercased.
    pub customer_email: Option<String>,
    /// Case-insensitive substring of the order number.
    pub order_number: Option<String>,
}

/// Order fields a listing can be sorted by.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderSortField {
    #[default]
    CreatedAt,
    UpdatedAt,
    OrderNumber,
    Total,
    Subtotal,
    Status,
    PaymentStatus,
    CustomerEmail,
    CustomerName,
}

impl OrderSortField {
    /// Parses the public (camelCase) field name. Unknown names yield `None`.
    pub fn parse(name: &str) -> Option<Self> {
        let field = match name.trim() {
            "createdAt" => OrderSortField::CreatedAt,
            "updatedAt" => OrderSortField::UpdatedAt,
            "orderNumber" => OrderSortField::OrderNumber,
            "total" => OrderSortField::Total,
            "subtotal" => OrderSortField::Subtotal,
            "status" => OrderSortField::Status,
            "paymentStatus" => OrderSortField::PaymentStatus,
            "customerEmail" | "customer.email" => OrderSortField::CustomerEmail,
            "customerName" | "customer.name" => OrderSortField::CustomerName,
            _ => return None,
        };
        Some(field)
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    #[default]
    Desc,
}

impl SortDirection {
    /// `asc`/`1` sort ascending, everything else descending.
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "asc" | "ascending" | "1" => SortDirection::Asc,
            _ => SortDirection::Desc,
        }
    }
}

/// Sort order for listing orders. Defaults to newest first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OrderSort {
    pub field: OrderSortField,
    pub direction: SortDirection,
}

/// Pagination metadata returned with a page of orders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Pagination {
    pub current_page: u32,
    pub total_pages: u32,
    pub total_orders: u64,
    pub limit: u32,
    pub has_next_page: bool,
    pub has_prev_page: bool,
}

impl Pagination {
    /// Computes metadata for `page` (1-based) of `limit` orders out of `total`.
    ///
    /// ## Example
    /// ```rust
    /// use tienda_core::Pagination;
    ///
    /// let p = Pagination::new(2, 10, 25);
    /// assert_eq!(p.total_pages, 3);
    /// assert!(p.has_next_page && p.has_prev_page);
    /// ```
    pub fn new(page: u32, limit: u32, total: u64) -> Self {
        let limit = limit.max(1);
        let total_pages = total.div_ceil(u64::from(limit)) as u32;
        Pagination {
            current_page: page,
            total_pages,
            total_orders: total,
            limit,
            has_next_page: page < total_pages,
            has_prev_page: page > 1,
        }
    }

    /// Number of orders to skip to reach this page.
    pub fn offset(&self) -> u64 {
        u64::from(self.current_page.saturating_sub(1)) * u64::from(self.limit)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
