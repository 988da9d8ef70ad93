//! # Pricing
//!
//! Order totals under a jurisdiction's tax and shipping policy.
//!
//! ## Calculation
//! ```text
//! subtotal = Σ unit_price × quantity
//! tax      = round_half_up(subtotal × tax_rate)
//! shipping = 0                 if subtotal ≥ free_shipping_threshold
//!          = flat_shipping     otherwise
//! discount = 0                 (no coupon mechanism)
//! total    = subtotal + tax + shipping − discount
//! ```

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, TaxRate};
use crate::types::ResolvedLineItem;

/// Tax and shipping policy of the jurisdiction orders ship to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Jurisdiction {
    /// ISO country code, for logs.
    pub code: String,
    pub tax_rate: TaxRate,
    /// Subtotals at or above this ship free.
    pub free_shipping_threshold: Money,
    pub flat_shipping: Money,
}

impl Jurisdiction {
    /// Mexico: 16% IVA, free shipping from $1,000.00, otherwise $150.00.
    pub fn mexico() -> Self {
        Jurisdiction {
            code: "MX".to_string(),
            tax_rate: TaxRate::from_bps(1600),
            free_shipping_threshold: Money::from_cents(100_000),
            flat_shipping: Money::from_cents(15_000),
        }
    }

    /// Shipping charged for a given subtotal.
    pub fn shipping_for(&self, subtotal: Money) -> Money {
        if subtotal >= self.free_shipping_threshold {
            Money::zero()
        } else {
            self.flat_shipping
        }
    }
}

impl Default for Jurisdiction {
    fn default() -> Self {
        Jurisdiction::mexico()
    }
}

/// Computed monetary totals of one order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub discount: Money,
    pub total: Money,
}

/// Computes order totals from resolved line items.
///
/// Fails with `AmountOverflow` when any sum leaves the i64 range.
///
/// ## Example
/// ```rust
/// use tienda_core::{compute_totals, Jurisdiction, Money, ResolvedLineItem};
///
/// let items = vec![ResolvedLineItem::new(
///     "p-1",
///     3,
///     Money::from_cents(1000),
///     "Mole Poblano",
///     "/images/placeholder.png",
/// )
/// .unwrap()];
///
/// let totals = compute_totals(&items, &Jurisdiction::mexico()).unwrap();
/// assert_eq!(totals.subtotal.cents(), 3000);
/// assert_eq!(totals.tax.cents(), 480);
/// assert_eq!(totals.shipping.cents(), 15_000);
/// assert_eq!(totals.total.cents(), 18_480);
/// ```
pub fn compute_totals(
    items: &[ResolvedLineItem],
    jurisdiction: &Jurisdiction,
) -> CoreResult<OrderTotals> {
    let subtotal = items
        .iter()
        .try_fold(Money::zero(), |acc, item| acc.checked_add(item.line_total))
        .ok_or(CoreError::AmountOverflow)?;
    let tax = subtotal
        .checked_tax(jurisdiction.tax_rate)
        .ok_or(CoreError::AmountOverflow)?;
    let shipping = jurisdiction.shipping_for(subtotal);
    let discount = Money::zero();

    let total = subtotal
        .checked_add(tax)
        .and_then(|t| t.checked_add(shipping))
        .and_then(|t| t.checked_sub(discount))
        .ok_or(CoreError::AmountOverflow)?;

    Ok(OrderTotals {
        subtotal,
        tax,
        shipping,
        discount,
        total,
    })
}

// =============================================================================
// Unit Tests
// =============================================================================
