//! # Product Repository
//!
//! The catalog as seen by order intake.
//!
//! ## Key Operations
//! - Lookup of active products by id, or by exact name for legacy carts
//! - Conditional stock decrement, run inside the order transaction
//! - Inserts and price updates (seeding, back office)
//!
//! ## Conditional Decrement
//! ```text
//! UPDATE products
//!    SET stock_quantity = stock_quantity - :qty
//!  WHERE id = :id AND stock_quantity >= :qty
//!
//!   rows_affected = 1  → stock taken
//!   rows_affected = 0  → someone else got there first, roll back
//! ```
//! Stock can never go negative, even when two checkouts race for the last unit.

use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use tienda_core::{Money, Product, ProductImage};

const PRODUCT_COLUMNS: &str = r#"
    id,
    name,
    price_cents,
    images,
    stock_quantity,
    is_active,
    created_at,
    updated_at
"#;

/// Row shape of the `products` table.
#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: String,
    name: String,
    price_cents: i64,
    images: Json<Vec<ProductImage>>,
    stock_quantity: i64,
    is_active: bool,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(row: ProductRow) -> Self {
        Product {
            id: row.id,
            name: row.name,
            price: Money::from_cents(row.price_cents),
            images: row.images.0,
            stock_quantity: row.stock_quantity,
            is_active: row.is_active,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = ProductRepository::new(pool);
///
/// let product = repo.get_by_id("uuid-here").await?;
/// let legacy = repo.find_by_name("Mole Poblano").await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    /// Creates a new ProductRepository.
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    /// Gets an active product by ID.
    ///
    /// Inactive (soft-deleted) products are treated as missing.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?1 AND is_active = 1");

        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// Gets an active product by exact name.
    ///
    /// Older cart payloads carried names instead of ids. When several active
    /// products share a name the oldest one wins.
    pub async fn find_by_name(&self, name: &str) -> DbResult<Option<Product>> {
        debug!(name = %name, "Looking up product by name");

        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE name = ?1 AND is_active = 1 \
             ORDER BY created_at ASC, rowid ASC LIMIT 1"
        );

        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(name)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(Product::from))
    }

    /// Inserts a new product.
    pub async fn insert(&self, product: &Product) -> DbResult<()> {
        debug!(id = %product.id, name = %product.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, name, price_cents, images, stock_quantity,
                is_active, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
            "#,
        )
        .bind(&product.id)
        .bind(&product.name)
        .bind(product.price.cents())
        .bind(Json(&product.images))
        .bind(product.stock_quantity)
        .bind(product.is_active)
        .bind(product.created_at)
        .bind(product.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Changes the catalog price of a product.
    ///
    /// Orders already placed keep the price they were placed at.
    pub async fn update_price(&self, id: &str, price: Money) -> DbResult<()> {
        debug!(id = %id, price = %price, "Updating price");

        let result = sqlx::query(
            "UPDATE products SET price_cents = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(price.cents())
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Soft-deletes a product. It stops resolving for new orders.
    pub async fn deactivate(&self, id: &str) -> DbResult<()> {
        let result =
            sqlx::query("UPDATE products SET is_active = 0, updated_at = ?2 WHERE id = ?1")
                .bind(id)
                .bind(Utc::now())
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Takes `quantity` units of stock if at least that many are left.
    ///
    /// Runs on the caller's connection so it joins the caller's transaction.
    /// Returns `false` (and changes nothing) when stock is short.
    pub async fn decrement_stock(
        conn: &mut SqliteConnection,
        id: &str,
        quantity: i64,
    ) -> DbResult<bool> {
        debug!(id = %id, quantity = %quantity, "Decrementing stock");

        let result = sqlx::query(
            r#"
            UPDATE products
            SET
                stock_quantity = stock_quantity - ?2,
                updated_at = ?3
            WHERE id = ?1 AND stock_quantity >= ?2
            "#,
        )
        .bind(id)
        .bind(quantity)
        .bind(Utc::now())
        .execute(&mut *conn)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    /// Reads the current stock of a product on the caller's connection.
    pub async fn stock_quantity(conn: &mut SqliteConnection, id: &str) -> DbResult<i64> {
        let stock: Option<i64> =
            sqlx::query_scalar("SELECT stock_quantity FROM products WHERE id = ?1")
                .bind(id)
                .fetch_optional(&mut *conn)
                .await?;

        Ok(stock.unwrap_or(0))
    }

    /// Counts active products.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products WHERE is_active = 1")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Helper to generate a new product ID.
pub fn generate_product_id() -> String {
    Uuid::new_v4().to_string()
}

// =============================================================================
// Unit Tests
// =============================================================================
