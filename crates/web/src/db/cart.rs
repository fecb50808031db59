//! Cart repository.

use sqlx::SqlitePool;

use bazaar_core::{CartItemId, Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::{CartItem, CartLine};

/// Outcome of an add-to-cart request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AddToCartOutcome {
    /// A new cart row was created.
    Added(CartItemId),
    /// A row for this (user, product) already existed; the requested
    /// quantity was ignored.
    AlreadyInCart,
}

#[derive(sqlx::FromRow)]
struct ItemRow {
    id: i64,
    user_id: i64,
    product_id: i64,
    quantity: i64,
}

impl From<ItemRow> for CartItem {
    fn from(r: ItemRow) -> Self {
        Self {
            id: CartItemId::new(r.id),
            user_id: UserId::new(r.user_id),
            product_id: ProductId::new(r.product_id),
            quantity: r.quantity,
        }
    }
}

#[derive(sqlx::FromRow)]
struct LineRow {
    item_id: i64,
    product_id: i64,
    product_name: String,
    unit_price: i64,
    quantity: i64,
    first_image_url: Option<String>,
}

impl From<LineRow> for CartLine {
    fn from(r: LineRow) -> Self {
        Self {
            item_id: CartItemId::new(r.item_id),
            product_id: ProductId::new(r.product_id),
            product_name: r.product_name,
            unit_price: Price::from_minor_units(r.unit_price),
            quantity: r.quantity,
            first_image_url: r.first_image_url,
        }
    }
}

/// Repository for cart database operations.
pub struct CartRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CartRepository<'a> {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    /// Add a product to a user's cart.
    ///
    /// If a row for this (user, product) already exists, no new row is
    /// created and the quantity is left unchanged. The UNIQUE constraint
    /// backs this up against a concurrent double-add: a racing insert maps
    /// to `AlreadyInCart` rather than surfacing a conflict.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: i64,
    ) -> Result<AddToCartOutcome, RepositoryError> {
        let result = sqlx::query_scalar::<_, i64>(
            "INSERT INTO cart_items (user_id, product_id, quantity)
             VALUES (?, ?, ?)
             ON CONFLICT (user_id, product_id) DO NOTHING
             RETURNING id",
        )
        .bind(user_id.as_i64())
        .bind(product_id.as_i64())
        .bind(quantity)
        .fetch_optional(self.pool)
        .await?;

        Ok(match result {
            Some(id) => AddToCartOutcome::Added(CartItemId::new(id)),
            None => AddToCartOutcome::AlreadyInCart,
        })
    }

    /// Get a cart row by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_item(&self, id: CartItemId) -> Result<Option<CartItem>, RepositoryError> {
        let row = sqlx::query_as::<_, ItemRow>(
            "SELECT id, user_id, product_id, quantity FROM cart_items WHERE id = ?",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// List a user's cart joined with product name, price and first image.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_lines(&self, user_id: UserId) -> Result<Vec<CartLine>, RepositoryError> {
        let rows = sqlx::query_as::<_, LineRow>(
            "SELECT ci.id AS item_id, ci.product_id, p.name AS product_name,
                    p.price AS unit_price, ci.quantity,
                    (SELECT url FROM product_images i
                     WHERE i.product_id = p.id ORDER BY i.id LIMIT 1) AS first_image_url
             FROM cart_items ci
             JOIN products p ON p.id = ci.product_id
             WHERE ci.user_id = ?
             ORDER BY ci.id",
        )
        .bind(user_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Update a cart row's quantity in place.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if `quantity < 1`.
    /// Returns `RepositoryError::NotFound` if the row doesn't exist.
    pub async fn update_quantity(
        &self,
        id: CartItemId,
        quantity: i64,
    ) -> Result<(), RepositoryError> {
        if quantity < 1 {
            return Err(RepositoryError::Conflict(
                "quantity must be at least 1".to_owned(),
            ));
        }

        let result = sqlx::query("UPDATE cart_items SET quantity = ? WHERE id = ?")
            .bind(quantity)
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Remove one cart row.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the row doesn't exist.
    pub async fn remove_item(&self, id: CartItemId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM cart_items WHERE id = ?")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    /// Running total of a user's cart: Σ quantity × current product price.
    /// Pure read, no side effects.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn total(&self, user_id: UserId) -> Result<Price, RepositoryError> {
        let cents = sqlx::query_scalar::<_, i64>(
            "SELECT COALESCE(SUM(ci.quantity * p.price), 0)
             FROM cart_items ci
             JOIN products p ON p.id = ci.product_id
             WHERE ci.user_id = ?",
        )
        .bind(user_id.as_i64())
        .fetch_one(self.pool)
        .await?;

        Ok(Price::from_minor_units(cents))
    }
}
