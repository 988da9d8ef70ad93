//! Shared fixtures for service tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tienda_core::{Money, NewOrder, Order, OrderFilter, OrderSort, Product, ProductImage};
use tienda_db::{
    generate_product_id, Database, DbConfig, DbError, DbResult, OrderRepository,
    ProductRepository,
};

use crate::ports::{Catalog, OrderStore};

pub async fn setup() -> Database {
    Database::new(DbConfig::in_memory()).await.unwrap()
}

pub async fn seed_product(db: &Database, name: &str, price: i64, stock: i64) -> Product {
    let now = Utc::now();
    let product = Product {
        id: generate_product_id(),
        name: name.to_string(),
        price: Money::from_cents(price),
        images: vec![ProductImage::Url(format!("https://cdn.example/{name}.jpg"))],
        stock_quantity: stock,
        is_active: true,
        created_at: now,
        updated_at: now,
    };
    db.products().insert(&product).await.unwrap();
    product
}

/// Catalog that counts lookups.
pub struct CountingCatalog {
    pub inner: ProductRepository,
    pub lookups: AtomicUsize,
}

impl CountingCatalog {
    pub fn new(inner: ProductRepository) -> Self {
        CountingCatalog {
            inner,
            lookups: AtomicUsize::new(0),
        }
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Catalog for CountingCatalog {
    async fn find_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.get_by_id(id).await
    }

    async fn find_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.inner.find_by_name(name).await
    }
}

/// Order store whose sequence is always unavailable.
pub struct BrokenSequence(pub OrderRepository);

#[async_trait]
impl OrderStore for BrokenSequence {
    async fn next_order_sequence(&self) -> DbResult<u64> {
        Err(DbError::ConnectionFailed("sequence offline".to_string()))
    }

    async fn save(&self, order: NewOrder) -> DbResult<Order> {
        self.0.place(order).await
    }

    async fn find(
        &self,
        filter: &OrderFilter,
        sort: OrderSort,
        offset: u64,
        limit: u32,
    ) -> DbResult<Vec<Order>> {
        self.0.find(filter, sort, offset, limit).await
    }

    async fn count(&self, filter: &OrderFilter) -> DbResult<u64> {
        self.0.count(filter).await
    }
}

/// Order store that cannot save.
pub struct ReadOnlyStore(pub OrderRepository);

#[async_trait]
impl OrderStore for ReadOnlyStore {
    async fn next_order_sequence(&self) -> DbResult<u64> {
        self.0.next_order_sequence().await
    }

    async fn save(&self, _order: NewOrder) -> DbResult<Order> {
        Err(DbError::QueryFailed("attempt to write a readonly database".to_string()))
    }

    async fn find(
        &self,
        filter: &OrderFilter,
        sort: OrderSort,
        offset: u64,
        limit: u32,
    ) -> DbResult<Vec<Order>> {
        self.0.find(filter, sort, offset, limit).await
    }

    async fn count(&self, filter: &OrderFilter) -> DbResult<u64> {
        self.0.count(filter).await
    }
}
