//! Shared fixtures for integration tests.

#![allow(dead_code)]
#![allow(clippy::unwrap_used)]

use std::str::FromStr;

use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};

use bazaar_core::{CategoryId, Price, UserId};
use bazaar_web::db::{CatalogRepository, MIGRATOR, NewProduct};
use bazaar_web::models::{Category, Product, User};
use bazaar_web::services::AuthService;

/// In-memory database with the schema applied.
///
/// One connection only: every pooled connection to `sqlite::memory:` would
/// otherwise get its own empty database.
pub async fn test_pool() -> SqlitePool {
    let options = SqliteConnectOptions::from_str("sqlite::memory:")
        .unwrap()
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .unwrap();

    MIGRATOR.run(&pool).await.unwrap();

    pool
}

pub async fn register_user(pool: &SqlitePool, username: &str, email: &str, password: &str) -> User {
    AuthService::new(pool)
        .register(username, email, password)
        .await
        .unwrap()
}

pub async fn make_admin(pool: &SqlitePool, id: UserId) {
    bazaar_web::db::UserRepository::new(pool)
        .set_admin(id, true)
        .await
        .unwrap();
}

pub async fn seed_category(pool: &SqlitePool, name: &str) -> Category {
    CatalogRepository::new(pool).create_category(name).await.unwrap()
}

pub async fn seed_product(
    pool: &SqlitePool,
    owner: UserId,
    category: CategoryId,
    name: &str,
    price_minor: i64,
) -> Product {
    let new = NewProduct {
        name: name.to_owned(),
        price: Price::from_minor_units(price_minor),
        description: format!("{name} description"),
        brand: "Acme".to_owned(),
        user_id: owner,
        category_id: category,
    };

    CatalogRepository::new(pool)
        .create_product_with_images(&new, &[format!("https://img.test/{name}.png")])
        .await
        .unwrap()
}
