//! # Order Intake
//!
//! Turns an untrusted checkout request into a persisted order.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  1. required fields        MissingFields                               │
//! │  2. item shape             MissingProductId / InvalidQuantity /        │
//! │                            TooManyItems                                │
//! │  3. resolve items          ProductNotFound / InsufficientStock         │
//! │  4. sanitize + validate    customer, addresses, notes, payment         │
//! │  5. totals                 compute_totals(items, jurisdiction)         │
//! │  6. order number           OrderNumberAllocator (never fails)          │
//! │  7. save + take stock      one transaction                             │
//! │  8. return stored order                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Each step runs only if every earlier step succeeded. Nothing is written
//! before step 7, and step 7 writes all or nothing.

use tracing::{debug, info};

use tienda_core::validation::{
    self, validate_address, validate_customer, validate_item_count, validate_notes,
    validate_payment_method, validate_quantity, AddressKind,
};
use tienda_core::{
    compute_totals, CoreError, CreateOrderRequest, Jurisdiction, LineItemRequest, NewOrder,
    Order, ResolvedLineItem,
};

use crate::ports::{Catalog, OrderStore};
use crate::services::allocator::OrderNumberAllocator;
use crate::services::error::IntakeResult;
use crate::services::resolver::CatalogResolver;

/// A cart line whose shape has been checked but not yet resolved.
struct CheckedLine<'a> {
    identifier: &'a str,
    quantity: i64,
    name: Option<&'a str>,
}

/// Order intake service.
///
/// ## Usage
/// ```rust,ignore
/// let intake = OrderIntake::new(db.products(), db.orders(), Jurisdiction::mexico());
/// let order = intake.create(request).await?;
/// ```
pub struct OrderIntake<C, S> {
    catalog: C,
    store: S,
    jurisdiction: Jurisdiction,
}

impl<C: Catalog, S: OrderStore> OrderIntake<C, S> {
    pub fn new(catalog: C, store: S, jurisdiction: Jurisdiction) -> Self {
        OrderIntake {
            catalog,
            store,
            jurisdiction,
        }
    }

    /// Creates an order from a checkout request.
    ///
    /// The order is created `pending` / `pending`. Client-supplied prices are
    /// ignored; every amount comes from the catalog and the jurisdiction.
    pub async fn create(&self, request: CreateOrderRequest) -> IntakeResult<Order> {
        let parts = validation::require_fields(&request)?;

        validate_item_count(parts.items.len())?;
        let lines = check_lines(parts.items)?;

        let resolver = CatalogResolver::new(&self.catalog);
        let mut items: Vec<ResolvedLineItem> = Vec::with_capacity(lines.len());
        for line in &lines {
            items.push(resolver.resolve(line.identifier, line.quantity, line.name).await?);
        }

        let customer = validate_customer(parts.customer)?;
        let shipping_address = validate_address(parts.shipping_address, AddressKind::Shipping)?;
        let billing_address = match &request.billing_address {
            Some(billing) => validate_address(billing, AddressKind::Billing)?,
            None => shipping_address.clone(),
        };
        let notes = validate_notes(request.notes.as_deref());
        let payment_method = validate_payment_method(parts.payment_method)?;

        let totals = compute_totals(&items, &self.jurisdiction)?;
        debug!(
            jurisdiction = %self.jurisdiction.code,
            subtotal = %totals.subtotal,
            tax = %totals.tax,
            shipping = %totals.shipping,
            total = %totals.total,
            "Computed order totals"
        );

        let order_number = OrderNumberAllocator::new(&self.store).allocate().await;

        let order = self
            .store
            .save(NewOrder {
                order_number,
                customer,
                shipping_address,
                billing_address,
                items,
                subtotal: totals.subtotal,
                tax: totals.tax,
                shipping: totals.shipping,
                discount: totals.discount,
                total: totals.total,
                payment_method,
                notes,
            })
            .await?;

        info!(
            order_number = %order.order_number,
            customer = %order.customer.email,
            items = order.items.len(),
            total = %order.total,
            "Order created"
        );

        Ok(order)
    }
}

/// Checks every line has a product identifier and a sane quantity.
fn check_lines(items: &[LineItemRequest]) -> IntakeResult<Vec<CheckedLine<'_>>> {
    let mut lines = Vec::with_capacity(items.len());

    for (index, item) in items.iter().enumerate() {
        let label = item.label(index);

        let identifier = match item.product.as_deref().map(str::trim) {
            Some(id) if !id.is_empty() => id,
            _ => return Err(CoreError::MissingProductId { item: label }.into()),
        };

        let quantity = validate_quantity(item.quantity, &label)?;

        lines.push(CheckedLine {
            identifier,
            quantity,
            name: item.name.as_deref(),
        });
    }

    Ok(lines)
}

// =============================================================================
// Unit Tests
// =============================================================================
