//! Catalog domain types: categories, products, product images.

use chrono::{DateTime, Utc};

use bazaar_core::{CategoryId, ImageId, Price, ProductId, UserId};

/// A product category.
#[derive(Debug, Clone)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
}

/// A catalog product (domain type).
#[derive(Debug, Clone)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    /// Price in minor currency units.
    pub price: Price,
    pub description: String,
    pub brand: String,
    /// User who listed the product (authorization subject for edits).
    pub user_id: UserId,
    pub category_id: CategoryId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// An image attached to a product.
#[derive(Debug, Clone)]
pub struct ProductImage {
    pub id: ImageId,
    pub url: String,
    pub product_id: ProductId,
}

/// Listing-page projection of a product: the product fields plus the first
/// attached image, fetched in one query for grid views.
#[derive(Debug, Clone)]
pub struct ProductSummary {
    pub id: ProductId,
    pub name: String,
    pub price: Price,
    pub brand: String,
    pub category_id: CategoryId,
    pub user_id: UserId,
    /// URL of the first image, if the product has any.
    pub first_image_url: Option<String>,
}
