//! Database operations for the shop's `SQLite` store.
//!
//! ## Tables
//!
//! - `users` - Accounts (username, unique email, Argon2 password hash, admin flag)
//! - `categories` - Product categories
//! - `products` / `product_images` - Catalog (images cascade with their product)
//! - `cart_items` - Pending purchases, one row per (user, product)
//! - `orders` - Write-once checkout snapshots
//! - `tower_sessions` - Session storage (created by the session store)
//!
//! # Migrations
//!
//! Migrations live in `crates/web/migrations/` and are embedded via
//! [`MIGRATOR`]; `main` runs them at startup.

pub mod cart;
pub mod catalog;
pub mod orders;
pub mod users;

use std::str::FromStr;
use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use thiserror::Error;

pub use cart::{AddToCartOutcome, CartRepository};
pub use catalog::{CatalogRepository, NewProduct, ProductFields};
pub use orders::OrderRepository;
pub use users::UserRepository;

/// Embedded migrations from `crates/web/migrations/`.
pub static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Create a `SQLite` connection pool with sensible defaults.
///
/// Foreign key enforcement is switched on for every connection so the
/// cascade rules in the schema actually fire.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(
    database_url: &secrecy::SecretString,
) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url.expose_secret())?
        .create_if_missing(true)
        .foreign_keys(true);

    SqlitePoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(10))
        .connect_with(options)
        .await
}
