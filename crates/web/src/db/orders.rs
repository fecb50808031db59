//! Order repository.
//!
//! Orders are write-once checkout snapshots: created inside a single
//! transaction that also clears the cart, then never mutated or deleted.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use bazaar_core::{CartItemId, OrderId, Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::{CartLine, Order, OrderLine};

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: i64,
    user_id: i64,
    details: String,
    total_price: i64,
    customer_name: String,
    address: String,
    created_at: DateTime<Utc>,
}

impl OrderRow {
    fn into_order(self) -> Result<Order, RepositoryError> {
        let details: Vec<OrderLine> = serde_json::from_str(&self.details).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid order details JSON: {e}"))
        })?;

        Ok(Order {
            id: OrderId::new(self.id),
            user_id: UserId::new(self.user_id),
            details,
            total_price: Price::from_minor_units(self.total_price),
            customer_name: self.customer_name,
            address: self.address,
            created_at: self.created_at,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Convert a user's cart into an order snapshot and clear the cart.
    ///
    /// Runs as one IMMEDIATE transaction: the write lock is taken before
    /// the cart is read, so two concurrent checkouts of the same cart
    /// serialize and the second one sees an empty cart. An empty cart
    /// produces `Ok(None)` and writes nothing - the caller decides how to
    /// surface that.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if any statement fails (the
    /// whole transaction rolls back).
    pub async fn checkout(
        &self,
        user_id: UserId,
        customer_name: &str,
        address: &str,
    ) -> Result<Option<Order>, RepositoryError> {
        let mut tx = self.pool.begin_with("BEGIN IMMEDIATE").await?;

        let rows = sqlx::query_as::<_, (i64, i64, String, i64, i64)>(
            "SELECT ci.id, ci.product_id, p.name, p.price, ci.quantity
             FROM cart_items ci
             JOIN products p ON p.id = ci.product_id
             WHERE ci.user_id = ?
             ORDER BY ci.id",
        )
        .bind(user_id.as_i64())
        .fetch_all(&mut *tx)
        .await?;

        if rows.is_empty() {
            tx.rollback().await?;
            return Ok(None);
        }

        let lines: Vec<CartLine> = rows
            .into_iter()
            .map(|(item_id, product_id, name, price, quantity)| CartLine {
                item_id: CartItemId::new(item_id),
                product_id: ProductId::new(product_id),
                product_name: name,
                unit_price: Price::from_minor_units(price),
                quantity,
                first_image_url: None,
            })
            .collect();

        let details: Vec<OrderLine> = lines
            .iter()
            .map(|line| OrderLine {
                product_name: line.product_name.clone(),
                price: line.unit_price,
                quantity: line.quantity,
            })
            .collect();

        let mut total = Price::ZERO;
        for line in &details {
            total += line.line_total();
        }

        let details_json = serde_json::to_string(&details).map_err(|e| {
            RepositoryError::DataCorruption(format!("failed to serialize order details: {e}"))
        })?;

        let row = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (user_id, details, total_price, customer_name, address, created_at)
             VALUES (?, ?, ?, ?, ?, ?)
             RETURNING id, user_id, details, total_price, customer_name, address, created_at",
        )
        .bind(user_id.as_i64())
        .bind(&details_json)
        .bind(total.minor_units())
        .bind(customer_name)
        .bind(address)
        .bind(Utc::now())
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("DELETE FROM cart_items WHERE user_id = ?")
            .bind(user_id.as_i64())
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        row.into_order().map(Some)
    }

    /// Get an order by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the stored snapshot is
    /// not valid JSON.
    pub async fn get(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, details, total_price, customer_name, address, created_at
             FROM orders WHERE id = ?",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        row.map(OrderRow::into_order).transpose()
    }

    /// List every recorded order, newest first. Admin view; unfiltered and
    /// unpaginated.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_all(&self) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, details, total_price, customer_name, address, created_at
             FROM orders ORDER BY id DESC",
        )
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(OrderRow::into_order).collect()
    }
}
