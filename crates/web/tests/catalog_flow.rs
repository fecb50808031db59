//! Catalog repository behavior: products, images, listings.

#![allow(clippy::unwrap_used)]

mod common;

use bazaar_core::{CategoryId, Price, ProductId};
use bazaar_web::db::{CartRepository, CatalogRepository, NewProduct, ProductFields, RepositoryError};

use common::{register_user, seed_category, seed_product, test_pool};

#[tokio::test]
async fn product_creation_requires_an_image() {
    let pool = test_pool().await;
    let user = register_user(&pool, "alice", "alice@example.com", "hunter22").await;
    let category = seed_category(&pool, "Shoes").await;

    let new = NewProduct {
        name: "Boots".to_owned(),
        price: Price::from_minor_units(5000),
        description: String::new(),
        brand: String::new(),
        user_id: user.id,
        category_id: category.id,
    };

    let result = CatalogRepository::new(&pool)
        .create_product_with_images(&new, &[])
        .await;
    assert!(matches!(result, Err(RepositoryError::Conflict(_))));

    // Nothing was written
    let products = CatalogRepository::new(&pool).list_products().await.unwrap();
    assert!(products.is_empty());
}

#[tokio::test]
async fn created_product_carries_its_images() {
    let pool = test_pool().await;
    let user = register_user(&pool, "alice", "alice@example.com", "hunter22").await;
    let category = seed_category(&pool, "Shoes").await;
    let catalog = CatalogRepository::new(&pool);

    let new = NewProduct {
        name: "Boots".to_owned(),
        price: Price::from_minor_units(5000),
        description: "Sturdy".to_owned(),
        brand: "Acme".to_owned(),
        user_id: user.id,
        category_id: category.id,
    };
    let urls = vec![
        "https://img.test/boots-1.png".to_owned(),
        "https://img.test/boots-2.png".to_owned(),
    ];

    let product = catalog.create_product_with_images(&new, &urls).await.unwrap();

    let images = catalog.get_product_images(product.id).await.unwrap();
    assert_eq!(images.len(), 2);
    assert_eq!(images[0].url, urls[0]);

    let summaries = catalog.list_products().await.unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0].first_image_url.as_deref(), Some(urls[0].as_str()));
}

#[tokio::test]
async fn editing_appends_images_without_replacing() {
    let pool = test_pool().await;
    let user = register_user(&pool, "alice", "alice@example.com", "hunter22").await;
    let category = seed_category(&pool, "Shoes").await;
    let catalog = CatalogRepository::new(&pool);

    let product = seed_product(&pool, user.id, category.id, "Boots", 5000).await;

    let fields = ProductFields {
        name: "Winter Boots".to_owned(),
        price: Price::from_minor_units(5500),
        description: product.description.clone(),
        brand: product.brand.clone(),
        category_id: category.id,
    };
    catalog
        .update_product(product.id, &fields, &["https://img.test/extra.png".to_owned()])
        .await
        .unwrap();

    let updated = catalog.get_product(product.id).await.unwrap().unwrap();
    assert_eq!(updated.name, "Winter Boots");
    assert_eq!(updated.price.minor_units(), 5500);

    let images = catalog.get_product_images(product.id).await.unwrap();
    assert_eq!(images.len(), 2);
}

#[tokio::test]
async fn editing_a_missing_product_is_not_found() {
    let pool = test_pool().await;
    let category = seed_category(&pool, "Shoes").await;

    let fields = ProductFields {
        name: "Ghost".to_owned(),
        price: Price::from_minor_units(100),
        description: String::new(),
        brand: String::new(),
        category_id: category.id,
    };

    let result = CatalogRepository::new(&pool)
        .update_product(ProductId::new(999), &fields, &[])
        .await;
    assert!(matches!(result, Err(RepositoryError::NotFound)));
}

#[tokio::test]
async fn deleting_a_product_cascades_images_and_cart_rows() {
    let pool = test_pool().await;
    let alice = register_user(&pool, "alice", "alice@example.com", "hunter22").await;
    let bob = register_user(&pool, "bob", "bob@example.com", "hunter22").await;
    let category = seed_category(&pool, "Shoes").await;
    let catalog = CatalogRepository::new(&pool);
    let cart = CartRepository::new(&pool);

    let product = seed_product(&pool, alice.id, category.id, "Boots", 5000).await;
    cart.add_item(bob.id, product.id, 2).await.unwrap();

    catalog.delete_product(product.id).await.unwrap();

    assert!(catalog.get_product(product.id).await.unwrap().is_none());
    assert!(catalog.get_product_images(product.id).await.unwrap().is_empty());
    assert!(cart.list_lines(bob.id).await.unwrap().is_empty());
}

#[tokio::test]
async fn image_deletion_can_leave_a_product_bare() {
    let pool = test_pool().await;
    let user = register_user(&pool, "alice", "alice@example.com", "hunter22").await;
    let category = seed_category(&pool, "Shoes").await;
    let catalog = CatalogRepository::new(&pool);

    let product = seed_product(&pool, user.id, category.id, "Boots", 5000).await;
    let images = catalog.get_product_images(product.id).await.unwrap();

    catalog.delete_image(images[0].id).await.unwrap();

    assert!(catalog.get_product_images(product.id).await.unwrap().is_empty());
    assert!(catalog.get_product(product.id).await.unwrap().is_some());
}

#[tokio::test]
async fn search_matches_substring_and_empty_query_returns_all() {
    let pool = test_pool().await;
    let user = register_user(&pool, "alice", "alice@example.com", "hunter22").await;
    let category = seed_category(&pool, "Shoes").await;
    let catalog = CatalogRepository::new(&pool);

    seed_product(&pool, user.id, category.id, "Winter Boots", 5000).await;
    seed_product(&pool, user.id, category.id, "Sandals", 2000).await;

    let hits = catalog.search_products("boot").await.unwrap();
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].name, "Winter Boots");

    let all = catalog.search_products("").await.unwrap();
    assert_eq!(all.len(), 2);

    let none = catalog.search_products("kayak").await.unwrap();
    assert!(none.is_empty());
}

#[tokio::test]
async fn category_listing_honors_the_limit() {
    let pool = test_pool().await;
    let user = register_user(&pool, "alice", "alice@example.com", "hunter22").await;
    let shoes = seed_category(&pool, "Shoes").await;
    let hats = seed_category(&pool, "Hats").await;
    let catalog = CatalogRepository::new(&pool);

    for i in 0..6 {
        seed_product(&pool, user.id, shoes.id, &format!("Shoe {i}"), 1000).await;
    }
    seed_product(&pool, user.id, hats.id, "Beanie", 1500).await;

    let limited = catalog
        .list_products_by_category(shoes.id, Some(4))
        .await
        .unwrap();
    assert_eq!(limited.len(), 4);

    let full = catalog.list_products_by_category(shoes.id, None).await.unwrap();
    assert_eq!(full.len(), 6);

    let missing = catalog
        .list_products_by_category(CategoryId::new(999), None)
        .await
        .unwrap();
    assert!(missing.is_empty());
}

#[tokio::test]
async fn owner_listing_is_scoped_to_the_owner() {
    let pool = test_pool().await;
    let alice = register_user(&pool, "alice", "alice@example.com", "hunter22").await;
    let bob = register_user(&pool, "bob", "bob@example.com", "hunter22").await;
    let category = seed_category(&pool, "Shoes").await;
    let catalog = CatalogRepository::new(&pool);

    seed_product(&pool, alice.id, category.id, "Boots", 5000).await;
    seed_product(&pool, bob.id, category.id, "Sandals", 2000).await;

    let mine = catalog.list_products_by_owner(alice.id).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].name, "Boots");
}
