//! # Order Repository
//!
//! Storage of accepted orders, the order number sequence, and the listing
//! queries behind the order admin screen.
//!
//! ## Placing an Order
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                 │
//! │    INSERT INTO orders ...                                              │
//! │    for each item:                                                      │
//! │      INSERT INTO order_items ...                                       │
//! │      UPDATE products SET stock -= qty WHERE stock >= qty               │
//! │        └── 0 rows? ──► ROLLBACK, StockConflict                         │
//! │  COMMIT                                                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//! Either the order, all of its items and all stock decrements land, or none
//! of them do.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use crate::repository::product::ProductRepository;
use tienda_core::{
    Address, Customer, Money, NewOrder, Order, OrderFilter, OrderSort, OrderSortField,
    OrderStatus, PaymentStatus, ResolvedLineItem, SortDirection,
};

const ORDER_COLUMNS: &str = r#"
    id, order_number,
    customer_name, customer_email, customer_phone,
    shipping_street, shipping_city, shipping_state, shipping_zip_code, shipping_country,
    billing_street, billing_city, billing_state, billing_zip_code, billing_country,
    subtotal_cents, tax_cents, shipping_cents, discount_cents, total_cents,
    payment_method, status, payment_status, notes,
    created_at, updated_at
"#;

// =============================================================================
// Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    order_number: String,
    customer_name: String,
    customer_email: String,
    customer_phone: Option<String>,
    shipping_street: String,
    shipping_city: String,
    shipping_state: String,
    shipping_zip_code: String,
    shipping_country: String,
    billing_street: String,
    billing_city: String,
    billing_state: String,
    billing_zip_code: String,
    billing_country: String,
    subtotal_cents: i64,
    tax_cents: i64,
    shipping_cents: i64,
    discount_cents: i64,
    total_cents: i64,
    payment_method: String,
    status: OrderStatus,
    payment_status: PaymentStatus,
    notes: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self, items: Vec<ResolvedLineItem>) -> Order {
        Order {
            id: self.id,
            order_number: self.order_number,
            customer: Customer {
                name: self.customer_name,
                email: self.customer_email,
                phone: self.customer_phone,
            },
            shipping_address: Address {
                street: self.shipping_street,
                city: self.shipping_city,
                state: self.shipping_state,
                zip_code: self.shipping_zip_code,
                country: self.shipping_country,
            },
            billing_address: Address {
                street: self.billing_street,
                city: self.billing_city,
                state: self.billing_state,
                zip_code: self.billing_zip_code,
                country: self.billing_country,
            },
            items,
            subtotal: Money::from_cents(self.subtotal_cents),
            tax: Money::from_cents(self.tax_cents),
            shipping: Money::from_cents(self.shipping_cents),
            discount: Money::from_cents(self.discount_cents),
            total: Money::from_cents(self.total_cents),
            payment_method: self.payment_method,
            status: self.status,
            payment_status: self.payment_status,
            notes: self.notes,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
struct OrderItemRow {
    order_id: String,
    product_id: String,
    name: String,
    quantity: i64,
    unit_price_cents: i64,
    line_total_cents: i64,
    image_url: String,
}

impl From<OrderItemRow> for ResolvedLineItem {
    fn from(row: OrderItemRow) -> Self {
        ResolvedLineItem {
            product_id: row.product_id,
            quantity: row.quantity,
            unit_price: Money::from_cents(row.unit_price_cents),
            name: row.name,
            image_url: row.image_url,
            line_total: Money::from_cents(row.line_total_cents),
        }
    }
}

// =============================================================================
// Query Helpers
// =============================================================================

fn sort_column(field: OrderSortField) -> &'static str {
    match field {
        OrderSortField::CreatedAt => "created_at",
        OrderSortField::UpdatedAt => "updated_at",
        OrderSortField::OrderNumber => "order_number",
        OrderSortField::Total => "total_cents",
        OrderSortField::Subtotal => "subtotal_cents",
        OrderSortField::Status => "status",
        OrderSortField::PaymentStatus => "payment_status",
        OrderSortField::CustomerEmail => "customer_email",
        OrderSortField::CustomerName => "customer_name",
    }
}

/// Escapes LIKE wildcards so user input matches literally.
fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn push_filter(qb: &mut QueryBuilder<'_, Sqlite>, filter: &OrderFilter) {
    qb.push(" WHERE 1 = 1");

    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status.as_str());
    }
    if let Some(payment_status) = filter.payment_status {
        qb.push(" AND payment_status = ")
            .push_bind(payment_status.as_str());
    }
    if let Some(email) = &filter.customer_email {
        qb.push(" AND customer_email = ")
            .push_bind(email.trim().to_lowercase());
    }
    if let Some(number) = &filter.order_number {
        // SQLite LIKE is case-insensitive for ASCII
        qb.push(" AND order_number LIKE ")
            .push_bind(format!("%{}%", escape_like(number.trim())))
            .push(" ESCAPE '\\'");
    }
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for order database operations.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Advances the order number sequence and returns the new value.
    ///
    /// A single `UPDATE ... RETURNING` statement, so two concurrent callers
    /// can never observe the same value. Values consumed by orders that then
    /// fail to save are not reused.
    pub async fn next_order_sequence(&self) -> DbResult<u64> {
        let value: Option<i64> = sqlx::query_scalar(
            "UPDATE order_sequence SET value = value + 1 WHERE name = 'orders' RETURNING value",
        )
        .fetch_optional(&self.pool)
        .await?;

        let value = value.ok_or_else(|| DbError::not_found("Sequence", "orders"))?;
        debug!(value = value, "Allocated order sequence value");

        u64::try_from(value).map_err(|_| DbError::Internal(format!("negative sequence {value}")))
    }

    /// Stores a new order and takes its stock, atomically.
    ///
    /// ## Returns
    /// * `Ok(Order)` - committed order with id and timestamps assigned
    /// * `Err(DbError::StockConflict)` - an item lost its stock to a
    ///   concurrent order; nothing was written
    /// * `Err(DbError::UniqueViolation)` - order number already taken
    pub async fn place(&self, order: NewOrder) -> DbResult<Order> {
        let id = Uuid::new_v4().to_string();
        let now = Utc::now();

        debug!(order_number = %order.order_number, items = order.items.len(), "Placing order");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, order_number,
                customer_name, customer_email, customer_phone,
                shipping_street, shipping_city, shipping_state, shipping_zip_code, shipping_country,
                billing_street, billing_city, billing_state, billing_zip_code, billing_country,
                subtotal_cents, tax_cents, shipping_cents, discount_cents, total_cents,
                payment_method, status, payment_status, notes,
                created_at, updated_at
            ) VALUES (
                ?1, ?2,
                ?3, ?4, ?5,
                ?6, ?7, ?8, ?9, ?10,
                ?11, ?12, ?13, ?14, ?15,
                ?16, ?17, ?18, ?19, ?20,
                ?21, ?22, ?23, ?24,
                ?25, ?25
            )
            "#,
        )
        .bind(&id)
        .bind(&order.order_number)
        .bind(&order.customer.name)
        .bind(&order.customer.email)
        .bind(&order.customer.phone)
        .bind(&order.shipping_address.street)
        .bind(&order.shipping_address.city)
        .bind(&order.shipping_address.state)
        .bind(&order.shipping_address.zip_code)
        .bind(&order.shipping_address.country)
        .bind(&order.billing_address.street)
        .bind(&order.billing_address.city)
        .bind(&order.billing_address.state)
        .bind(&order.billing_address.zip_code)
        .bind(&order.billing_address.country)
        .bind(order.subtotal.cents())
        .bind(order.tax.cents())
        .bind(order.shipping.cents())
        .bind(order.discount.cents())
        .bind(order.total.cents())
        .bind(&order.payment_method)
        .bind(OrderStatus::Pending)
        .bind(PaymentStatus::Pending)
        .bind(&order.notes)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for (position, item) in order.items.iter().enumerate() {
            sqlx::query(
                r#"
                INSERT INTO order_items (
                    order_id, position, product_id, name, quantity,
                    unit_price_cents, line_total_cents, image_url
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )
            .bind(&id)
            .bind(position as i64)
            .bind(&item.product_id)
            .bind(&item.name)
            .bind(item.quantity)
            .bind(item.unit_price.cents())
            .bind(item.line_total.cents())
            .bind(&item.image_url)
            .execute(&mut *tx)
            .await?;

            let taken =
                ProductRepository::decrement_stock(&mut tx, &item.product_id, item.quantity)
                    .await?;

            if !taken {
                let available = ProductRepository::stock_quantity(&mut tx, &item.product_id).await?;
                tx.rollback().await?;

                warn!(
                    order_number = %order.order_number,
                    product_id = %item.product_id,
                    available = available,
                    requested = item.quantity,
                    "Stock changed during checkout, order rolled back"
                );

                return Err(DbError::StockConflict {
                    product_id: item.product_id.clone(),
                    name: item.name.clone(),
                    available,
                    requested: item.quantity,
                });
            }
        }

        tx.commit().await?;

        info!(order_number = %order.order_number, id = %id, total = %order.total, "Order placed");

        Ok(order.into_order(id, now))
    }

    /// Gets an order with its items by ID.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Order>> {
        self.get_where("id", id).await
    }

    /// Gets an order with its items by order number.
    pub async fn get_by_number(&self, order_number: &str) -> DbResult<Option<Order>> {
        self.get_where("order_number", order_number).await
    }

    async fn get_where(&self, column: &'static str, value: &str) -> DbResult<Option<Order>> {
        let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE {column} = ?1");

        let row: Option<OrderRow> = sqlx::query_as(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut items = self.load_items(&[row.id.clone()]).await?;
        let order_items = items.remove(&row.id).unwrap_or_default();
        Ok(Some(row.into_order(order_items)))
    }

    /// Lists orders matching `filter`, sorted, skipping `offset` and
    /// returning at most `limit`.
    ///
    /// Ties in the sort column are broken by insertion order so pages stay
    /// stable.
    pub async fn find(
        &self,
        filter: &OrderFilter,
        sort: OrderSort,
        offset: u64,
        limit: u32,
    ) -> DbResult<Vec<Order>> {
        let direction = match sort.direction {
            SortDirection::Asc => "ASC",
            SortDirection::Desc => "DESC",
        };

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders"));
        push_filter(&mut qb, filter);
        qb.push(format!(
            " ORDER BY {} {direction}, rowid {direction}",
            sort_column(sort.field)
        ));
        qb.push(" LIMIT ")
            .push_bind(i64::from(limit))
            .push(" OFFSET ")
            .push_bind(i64::try_from(offset).unwrap_or(i64::MAX));

        let rows: Vec<OrderRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        debug!(count = rows.len(), "Order query returned rows");

        let ids: Vec<String> = rows.iter().map(|row| row.id.clone()).collect();
        let mut items = self.load_items(&ids).await?;

        Ok(rows
            .into_iter()
            .map(|row| {
                let order_items = items.remove(&row.id).unwrap_or_default();
                row.into_order(order_items)
            })
            .collect())
    }

    /// Counts orders matching `filter`.
    pub async fn count(&self, filter: &OrderFilter) -> DbResult<u64> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new("SELECT COUNT(*) FROM orders");
        push_filter(&mut qb, filter);

        let count: i64 = qb.build_query_scalar().fetch_one(&self.pool).await?;
        Ok(count.max(0) as u64)
    }

    /// Loads the items of the given orders, grouped by order id, each group in
    /// its original cart order.
    async fn load_items(&self, order_ids: &[String]) -> DbResult<HashMap<String, Vec<ResolvedLineItem>>> {
        let mut grouped: HashMap<String, Vec<ResolvedLineItem>> = HashMap::new();
        if order_ids.is_empty() {
            return Ok(grouped);
        }

        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(
            "SELECT order_id, product_id, name, quantity, unit_price_cents, \
             line_total_cents, image_url FROM order_items WHERE order_id IN (",
        );
        let mut separated = qb.separated(", ");
        for id in order_ids {
            separated.push_bind(id.clone());
        }
        separated.push_unseparated(") ORDER BY order_id, position");

        let rows: Vec<OrderItemRow> = qb.build_query_as().fetch_all(&self.pool).await?;

        for row in rows {
            grouped
                .entry(row.order_id.clone())
                .or_default()
                .push(ResolvedLineItem::from(row));
        }

        Ok(grouped)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::product::generate_product_id;
    use crate::{Database, DbConfig};
    use tienda_core::{Product, ProductImage};

    async fn setup() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_product(db: &Database, name: &str, price: i64, stock: i64) -> Product {
        let now = Utc::now();
        let product = Product {
            id: generate_product_id(),
            name: name.to_string(),
            price: Money::from_cents(price),
            images: vec![ProductImage::Url(format!("https://cdn/{name}.jpg"))],
            stock_quantity: stock,
            is_active: true,
            created_at: now,
            updated_at: now,
        };
        db.products().insert(&product).await.unwrap();
        product
    }

    fn address() -> Address {
        Address {
            street: "Av. Reforma 222".to_string(),
            city: "CDMX".to_string(),
            state: "CDMX".to_string(),
            zip_code: "06600".to_string(),
            country: "MX".to_string(),
        }
    }

    fn new_order(number: &str, email: &str, lines: &[(&Product, i64)]) -> NewOrder {
        let items: Vec<ResolvedLineItem> = lines
            .iter()
            .map(|(product, qty)| ResolvedLineItem::snapshot(product, *qty).unwrap())
            .collect();
        let subtotal: Money = items.iter().map(|i| i.line_total).sum();
        NewOrder {
            order_number: number.to_string(),
            customer: Customer {
                name: "Ana López".to_string(),
                email: email.to_string(),
                phone: None,
            },
            shipping_address: address(),
            billing_address: address(),
            items,
            subtotal,
            tax: Money::zero(),
            shipping: Money::zero(),
            discount: Money::zero(),
            total: subtotal,
            payment_method: "card".to_string(),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_sequence_is_monotonic() {
        let db = setup().await;
        let orders = db.orders();

        assert_eq!(orders.next_order_sequence().await.unwrap(), 1);
        assert_eq!(orders.next_order_sequence().await.unwrap(), 2);
        assert_eq!(orders.next_order_sequence().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn test_sequence_missing_is_error() {
        let db = setup().await;
        sqlx::query("DELETE FROM order_sequence").execute(db.pool()).await.unwrap();

        assert!(matches!(
            db.orders().next_order_sequence().await,
            Err(DbError::NotFound { .. })
        ));
    }

    #[tokio::test]
    async fn test_place_order_decrements_stock() {
        let db = setup().await;
        let mole = seed_product(&db, "Mole", 1000, 5).await;
        let salsa = seed_product(&db, "Salsa", 250, 10).await;

        let order = db
            .orders()
            .place(new_order("ORD-000001", "ana@example.com", &[(&mole, 2), (&salsa, 4)]))
            .await
            .unwrap();

        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.payment_status, PaymentStatus::Pending);
        assert_eq!(order.items.len(), 2);

        let products = db.products();
        assert_eq!(products.get_by_id(&mole.id).await.unwrap().unwrap().stock_quantity, 3);
        assert_eq!(products.get_by_id(&salsa.id).await.unwrap().unwrap().stock_quantity, 6);

        let stored = db.orders().get_by_id(&order.id).await.unwrap().unwrap();
        assert_eq!(stored.order_number, "ORD-000001");
        assert_eq!(stored.items[0].name, "Mole");
        assert_eq!(stored.items[1].quantity, 4);
        assert_eq!(stored.subtotal.cents(), 3000);
        assert_eq!(stored.items, order.items);
    }

    #[tokio::test]
    async fn test_stock_conflict_rolls_back_everything() {
        let db = setup().await;
        let mole = seed_product(&db, "Mole", 1000, 5).await;
        let salsa = seed_product(&db, "Salsa", 250, 1).await;

        // Snapshot says stock is fine, but another checkout took it meanwhile
        let order = new_order("ORD-000001", "ana@example.com", &[(&mole, 2), (&salsa, 1)]);
        sqlx::query("UPDATE products SET stock_quantity = 0 WHERE id = ?1")
            .bind(&salsa.id)
            .execute(db.pool())
            .await
            .unwrap();

        let err = db.orders().place(order).await.unwrap_err();
        match err {
            DbError::StockConflict {
                product_id,
                available,
                requested,
                ..
            } => {
                assert_eq!(product_id, salsa.id);
                assert_eq!(available, 0);
                assert_eq!(requested, 1);
            }
            other => panic!("expected StockConflict, got {other:?}"),
        }

        assert_eq!(db.orders().count(&OrderFilter::default()).await.unwrap(), 0);
        let items: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM order_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(items, 0);
        assert_eq!(
            db.products().get_by_id(&mole.id).await.unwrap().unwrap().stock_quantity,
            5
        );
    }

    #[tokio::test]
    async fn test_duplicate_order_number() {
        let db = setup().await;
        let mole = seed_product(&db, "Mole", 1000, 5).await;

        db.orders()
            .place(new_order("ORD-000001", "a@example.com", &[(&mole, 1)]))
            .await
            .unwrap();
        let err = db
            .orders()
            .place(new_order("ORD-000001", "b@example.com", &[(&mole, 1)]))
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::UniqueViolation { .. }));
        assert_eq!(
            db.products().get_by_id(&mole.id).await.unwrap().unwrap().stock_quantity,
            4
        );
    }

    #[tokio::test]
    async fn test_snapshot_survives_price_change() {
        let db = setup().await;
        let mole = seed_product(&db, "Mole", 1000, 5).await;

        let order = db
            .orders()
            .place(new_order("ORD-000001", "ana@example.com", &[(&mole, 1)]))
            .await
            .unwrap();
        db.products().update_price(&mole.id, Money::from_cents(5000)).await.unwrap();

        let stored = db.orders().get_by_number("ORD-000001").await.unwrap().unwrap();
        assert_eq!(stored.id, order.id);
        assert_eq!(stored.items[0].unit_price.cents(), 1000);
        assert_eq!(stored.subtotal.cents(), 1000);
    }

    #[tokio::test]
    async fn test_find_filters_and_pages() {
        let db = setup().await;
        let mole = seed_product(&db, "Mole", 1000, 100).await;
        let orders = db.orders();

        for n in 1..=5 {
            let email = if n % 2 == 0 { "even@example.com" } else { "odd@example.com" };
            orders
                .place(new_order(&format!("ORD-00000{n}"), email, &[(&mole, n)]))
                .await
                .unwrap();
        }
        sqlx::query("UPDATE orders SET status = 'shipped' WHERE order_number = 'ORD-000002'")
            .execute(db.pool())
            .await
            .unwrap();

        let all = OrderFilter::default();
        assert_eq!(orders.count(&all).await.unwrap(), 5);

        // newest first by default, rowid breaks identical timestamps
        let page = orders.find(&all, OrderSort::default(), 0, 2).await.unwrap();
        let numbers: Vec<_> = page.iter().map(|o| o.order_number.as_str()).collect();
        assert_eq!(numbers, vec!["ORD-000005", "ORD-000004"]);
        assert_eq!(page[0].items.len(), 1);

        let last = orders.find(&all, OrderSort::default(), 4, 2).await.unwrap();
        assert_eq!(last.len(), 1);
        assert_eq!(last[0].order_number, "ORD-000001");

        let by_email = OrderFilter {
            customer_email: Some("EVEN@example.com".to_string()),
            ..Default::default()
        };
        assert_eq!(orders.count(&by_email).await.unwrap(), 2);

        let shipped = OrderFilter {
            status: Some(OrderStatus::Shipped),
            ..Default::default()
        };
        let found = orders.find(&shipped, OrderSort::default(), 0, 10).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].order_number, "ORD-000002");

        let by_number = OrderFilter {
            order_number: Some("ord-00000".to_string()),
            payment_status: Some(PaymentStatus::Pending),
            ..Default::default()
        };
        assert_eq!(orders.count(&by_number).await.unwrap(), 5);

        let by_total = orders
            .find(
                &all,
                OrderSort {
                    field: OrderSortField::Total,
                    direction: SortDirection::Asc,
                },
                0,
                10,
            )
            .await
            .unwrap();
        assert_eq!(by_total[0].total.cents(), 1000);
        assert_eq!(by_total[4].total.cents(), 5000);
    }

    #[tokio::test]
    async fn test_order_number_filter_escapes_wildcards() {
        let db = setup().await;
        let mole = seed_product(&db, "Mole", 1000, 10).await;
        db.orders()
            .place(new_order("ORD-000001", "a@example.com", &[(&mole, 1)]))
            .await
            .unwrap();

        let wildcard = OrderFilter {
            order_number: Some("%".to_string()),
            ..Default::default()
        };
        assert_eq!(db.orders().count(&wildcard).await.unwrap(), 0);
    }

    #[test]
    fn test_escape_like() {
        assert_eq!(escape_like("ORD-1"), "ORD-1");
        assert_eq!(escape_like("50%_\\"), "50\\%\\_\\\\");
    }
}
