//! # Order Number Allocator
//!
//! ```text
//! next_order_sequence() ──ok──►  ORD-000042
//!          │
//!          └──err──► warn! ──►   ORD-67890123-042   (epoch millis + random)
//! ```
//!
//! Allocation never fails. The fallback number is unique enough for one
//! storefront; the order number column is UNIQUE, so a collision surfaces as
//! a storage error instead of a duplicate.

use chrono::Utc;
use rand::Rng;
use tracing::{debug, warn};

use tienda_core::order_number;

use crate::ports::OrderStore;

/// Hands out order numbers from the store's sequence.
pub struct OrderNumberAllocator<'a, S> {
    store: &'a S,
}

impl<'a, S: OrderStore> OrderNumberAllocator<'a, S> {
    pub fn new(store: &'a S) -> Self {
        OrderNumberAllocator { store }
    }

    /// Allocates the next order number.
    pub async fn allocate(&self) -> String {
        match self.store.next_order_sequence().await {
            Ok(sequence) => {
                let number = order_number::format_sequential(sequence);
                debug!(order_number = %number, "Allocated order number");
                number
            }
            Err(err) => {
                let number = fallback_number();
                warn!(
                    error = %err,
                    order_number = %number,
                    "Order sequence unavailable, using fallback order number"
                );
                number
            }
        }
    }
}

fn fallback_number() -> String {
    let millis = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    let random: u16 = rand::rng().random_range(0..1000);
    order_number::format_fallback(millis, random)
}
