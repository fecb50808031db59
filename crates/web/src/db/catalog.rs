//! Catalog repository: categories, products, product images.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use bazaar_core::{CategoryId, ImageId, Price, ProductId, UserId};

use super::RepositoryError;
use crate::models::{Category, Product, ProductImage, ProductSummary};

/// Fields for creating a product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub price: Price,
    pub description: String,
    pub brand: String,
    pub user_id: UserId,
    pub category_id: CategoryId,
}

/// Mutable fields for editing a product.
#[derive(Debug, Clone)]
pub struct ProductFields {
    pub name: String,
    pub price: Price,
    pub description: String,
    pub brand: String,
    pub category_id: CategoryId,
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: i64,
    name: String,
    price: i64,
    description: String,
    brand: String,
    user_id: i64,
    category_id: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            id: ProductId::new(r.id),
            name: r.name,
            price: Price::from_minor_units(r.price),
            description: r.description,
            brand: r.brand,
            user_id: UserId::new(r.user_id),
            category_id: CategoryId::new(r.category_id),
            created_at: r.created_at,
            updated_at: r.updated_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct SummaryRow {
    id: i64,
    name: String,
    price: i64,
    brand: String,
    category_id: i64,
    user_id: i64,
    first_image_url: Option<String>,
}

impl From<SummaryRow> for ProductSummary {
    fn from(r: SummaryRow) -> Self {
        Self {
            id: ProductId::new(r.id),
            name: r.name,
            price: Price::from_minor_units(r.price),
            brand: r.brand,
            category_id: CategoryId::new(r.category_id),
            user_id: UserId::new(r.user_id),
            first_image_url: r.first_image_url,
        }
    }
}

/// Projection shared by all the listing queries: product fields plus the
/// first attached image.
const SUMMARY_SELECT: &str = "SELECT p.id, p.name, p.price, p.brand, p.category_id, p.user_id,
       (SELECT url FROM product_images i
        WHERE i.product_id = p.id ORDER BY i.id LIMIT 1) AS first_image_url
 FROM products p";

/// Repository for catalog database operations.
pub struct CatalogRepository<'a> {
    pool: &'a SqlitePool,
}

impl<'a> CatalogRepository<'a> {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: &'a SqlitePool) -> Self {
        Self { pool }
    }

    // =========================================================================
    // Categories
    // =========================================================================

    /// List all categories.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_categories(&self) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, (i64, String)>(
            "SELECT id, name FROM categories ORDER BY name, id",
        )
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, name)| Category {
                id: CategoryId::new(id),
                name,
            })
            .collect())
    }

    /// Get a category by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_category(
        &self,
        id: CategoryId,
    ) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, (i64, String)>("SELECT id, name FROM categories WHERE id = ?")
            .bind(id.as_i64())
            .fetch_optional(self.pool)
            .await?;

        Ok(row.map(|(id, name)| Category {
            id: CategoryId::new(id),
            name,
        }))
    }

    /// Create a new category.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the insert fails.
    pub async fn create_category(&self, name: &str) -> Result<Category, RepositoryError> {
        let row = sqlx::query_as::<_, (i64, String)>(
            "INSERT INTO categories (name) VALUES (?) RETURNING id, name",
        )
        .bind(name)
        .fetch_one(self.pool)
        .await?;

        Ok(Category {
            id: CategoryId::new(row.0),
            name: row.1,
        })
    }

    // =========================================================================
    // Products
    // =========================================================================

    /// Create a product together with its image rows in one transaction.
    ///
    /// Callers must have already uploaded the images and collected their
    /// URLs; nothing is persisted when `image_urls` is empty.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if `image_urls` is empty.
    /// Returns `RepositoryError::Database` for database errors (the whole
    /// transaction rolls back).
    pub async fn create_product_with_images(
        &self,
        new: &NewProduct,
        image_urls: &[String],
    ) -> Result<Product, RepositoryError> {
        if image_urls.is_empty() {
            return Err(RepositoryError::Conflict(
                "at least one image is required".to_owned(),
            ));
        }

        let mut tx = self.pool.begin().await?;
        let now = Utc::now();

        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO products
                 (name, price, description, brand, user_id, category_id, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING id, name, price, description, brand, user_id, category_id,
                       created_at, updated_at",
        )
        .bind(&new.name)
        .bind(new.price.minor_units())
        .bind(&new.description)
        .bind(&new.brand)
        .bind(new.user_id.as_i64())
        .bind(new.category_id.as_i64())
        .bind(now)
        .bind(now)
        .fetch_one(&mut *tx)
        .await?;

        for url in image_urls {
            sqlx::query("INSERT INTO product_images (url, product_id) VALUES (?, ?)")
                .bind(url)
                .bind(row.id)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(row.into())
    }

    /// Get a product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, price, description, brand, user_id, category_id,
                    created_at, updated_at
             FROM products WHERE id = ?",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(Into::into))
    }

    /// Update a product's mutable fields and append any new images, in one
    /// transaction. Existing images are never replaced.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    /// Returns `RepositoryError::Database` for database errors (the whole
    /// transaction rolls back).
    pub async fn update_product(
        &self,
        id: ProductId,
        fields: &ProductFields,
        new_image_urls: &[String],
    ) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            "UPDATE products
             SET name = ?, price = ?, description = ?, brand = ?, category_id = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&fields.name)
        .bind(fields.price.minor_units())
        .bind(&fields.description)
        .bind(&fields.brand)
        .bind(fields.category_id.as_i64())
        .bind(Utc::now())
        .bind(id.as_i64())
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        for url in new_image_urls {
            sqlx::query("INSERT INTO product_images (url, product_id) VALUES (?, ?)")
                .bind(url)
                .bind(id.as_i64())
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    /// Delete a product.
    ///
    /// Cart rows referencing the product are removed first; image rows go
    /// with the product via the FK cascade.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the product doesn't exist.
    pub async fn delete_product(&self, id: ProductId) -> Result<(), RepositoryError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM cart_items WHERE product_id = ?")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        let result = sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id.as_i64())
            .execute(&mut *tx)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        tx.commit().await?;

        Ok(())
    }

    // =========================================================================
    // Images
    // =========================================================================

    /// Get all images for a product, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_product_images(
        &self,
        product_id: ProductId,
    ) -> Result<Vec<ProductImage>, RepositoryError> {
        let rows = sqlx::query_as::<_, (i64, String, i64)>(
            "SELECT id, url, product_id FROM product_images WHERE product_id = ? ORDER BY id",
        )
        .bind(product_id.as_i64())
        .fetch_all(self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(id, url, product_id)| ProductImage {
                id: ImageId::new(id),
                url,
                product_id: ProductId::new(product_id),
            })
            .collect())
    }

    /// Get a single image by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get_image(&self, id: ImageId) -> Result<Option<ProductImage>, RepositoryError> {
        let row = sqlx::query_as::<_, (i64, String, i64)>(
            "SELECT id, url, product_id FROM product_images WHERE id = ?",
        )
        .bind(id.as_i64())
        .fetch_optional(self.pool)
        .await?;

        Ok(row.map(|(id, url, product_id)| ProductImage {
            id: ImageId::new(id),
            url,
            product_id: ProductId::new(product_id),
        }))
    }

    /// Delete a single image.
    ///
    /// A product is allowed to end up with zero images this way; the
    /// at-least-one rule applies only at creation.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the image doesn't exist.
    pub async fn delete_image(&self, id: ImageId) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM product_images WHERE id = ?")
            .bind(id.as_i64())
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }

        Ok(())
    }

    // =========================================================================
    // Listings
    // =========================================================================

    /// List the full catalog, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products(&self) -> Result<Vec<ProductSummary>, RepositoryError> {
        let sql = format!("{SUMMARY_SELECT} ORDER BY p.id DESC");
        let rows = sqlx::query_as::<_, SummaryRow>(&sql)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List products in one category, optionally limited (the dashboard
    /// shows at most a handful per category).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products_by_category(
        &self,
        category_id: CategoryId,
        limit: Option<i64>,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let sql = match limit {
            Some(_) => format!("{SUMMARY_SELECT} WHERE p.category_id = ? ORDER BY p.id LIMIT ?"),
            None => format!("{SUMMARY_SELECT} WHERE p.category_id = ? ORDER BY p.id"),
        };

        let mut query = sqlx::query_as::<_, SummaryRow>(&sql).bind(category_id.as_i64());
        if let Some(n) = limit {
            query = query.bind(n);
        }

        let rows = query.fetch_all(self.pool).await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// List products owned by one user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_products_by_owner(
        &self,
        user_id: UserId,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        let sql = format!("{SUMMARY_SELECT} WHERE p.user_id = ? ORDER BY p.id DESC");
        let rows = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(user_id.as_i64())
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }

    /// Case-insensitive substring search on product name. An empty query
    /// returns the full catalog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn search_products(
        &self,
        query: &str,
    ) -> Result<Vec<ProductSummary>, RepositoryError> {
        if query.is_empty() {
            return self.list_products().await;
        }

        let sql = format!("{SUMMARY_SELECT} WHERE p.name LIKE '%' || ? || '%' ORDER BY p.id DESC");
        let rows = sqlx::query_as::<_, SummaryRow>(&sql)
            .bind(query)
            .fetch_all(self.pool)
            .await?;

        Ok(rows.into_iter().map(Into::into).collect())
    }
}
