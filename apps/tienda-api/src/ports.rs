//! # Collaborator Traits
//!
//! The services talk to the catalog and the order store through these traits
//! rather than the repositories directly, so intake can be exercised against
//! stores that fail on demand.
//!
//! ```text
//! ┌──────────────┐  Catalog     ┌────────────────────┐
//! │ OrderIntake  │ ───────────► │ ProductRepository  │
//! │ OrderQuery   │  OrderStore  ├────────────────────┤
//! │              │ ───────────► │ OrderRepository    │
//! └──────────────┘              └────────────────────┘
//! ```
//!
//! Stock decrements are not part of `Catalog`: they happen inside
//! [`OrderStore::save`] so they share the order's transaction.

use async_trait::async_trait;

use tienda_core::{NewOrder, Order, OrderFilter, OrderSort, Product};
use tienda_db::{DbResult, OrderRepository, ProductRepository};

/// Read access to the active catalog.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Active product with this id.
    async fn find_by_id(&self, id: &str) -> DbResult<Option<Product>>;

    /// Active product with exactly this name.
    async fn find_by_name(&self, name: &str) -> DbResult<Option<Product>>;
}

/// Order persistence.
///
/// Implementations:
/// - `OrderRepository`: SQLite storage
/// - test doubles whose sequence or writes fail on purpose
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Next value of the order number sequence.
    async fn next_order_sequence(&self) -> DbResult<u64>;

    /// Stores the order and takes its stock in one transaction.
    async fn save(&self, order: NewOrder) -> DbResult<Order>;

    async fn find(
        &self,
        filter: &OrderFilter,
        sort: OrderSort,
        offset: u64,
        limit: u32,
    ) -> DbResult<Vec<Order>>;

    async fn count(&self, filter: &OrderFilter) -> DbResult<u64>;
}

// =============================================================================
// SQLite implementations
// =============================================================================

#[async_trait]
impl Catalog for ProductRepository {
    async fn find_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        self.get_by_id(id).await
    }

    async fn find_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        ProductRepository::find_by_name(self, name).await
    }
}

#[async_trait]
impl OrderStore for OrderRepository {
    async fn next_order_sequence(&self) -> DbResult<u64> {
        OrderRepository::next_order_sequence(self).await
    }

    async fn save(&self, order: NewOrder) -> DbResult<Order> {
        self.place(order).await
    }

    async fn find(
        &self,
        filter: &OrderFilter,
        sort: OrderSort,
        offset: u64,
        limit: u32,
    ) -> DbResult<Vec<Order>> {
        OrderRepository::find(self, filter, sort, offset, limit).await
    }

    async fn count(&self, filter: &OrderFilter) -> DbResult<u64> {
        OrderRepository::count(self, filter).await
    }
}
