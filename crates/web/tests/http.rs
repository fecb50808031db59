//! Router-level smoke tests.

#![allow(clippy::unwrap_used)]

mod common;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use secrecy::SecretString;
use sqlx::SqlitePool;
use tower::ServiceExt;

use bazaar_web::config::{AppConfig, ImageHostConfig};
use bazaar_web::db::{AddToCartOutcome, CartRepository, CatalogRepository};
use bazaar_web::middleware::create_session_layer;
use bazaar_web::routes;
use bazaar_web::state::AppState;

use common::{register_user, seed_category, seed_product, test_pool};

async fn test_app() -> (Router, SqlitePool) {
    let pool = test_pool().await;
    bazaar_web::middleware::migrate_session_store(&pool)
        .await
        .unwrap();

    let config = AppConfig {
        database_url: SecretString::from("sqlite::memory:"),
        host: "127.0.0.1".parse().unwrap(),
        port: 0,
        base_url: "http://localhost:3000".to_owned(),
        image_host: ImageHostConfig {
            endpoint: "https://images.test/upload".to_owned(),
            api_key: SecretString::from("test-key"),
        },
    };

    let state = AppState::new(config, pool.clone());
    let session_layer = create_session_layer(state.pool(), state.config());

    (
        routes::routes().layer(session_layer).with_state(state),
        pool,
    )
}

/// Log in through the router and hand back the session cookie.
async fn login(app: &Router, email: &str, password: &str) -> String {
    let response = app
        .clone()
        .oneshot(
            Request::post("/login")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(format!("email={email}&password={password}")))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_redirection(), "login failed");

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_owned()
}

#[tokio::test]
async fn login_page_renders() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(Request::get("/login").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn shop_is_public() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(Request::get("/shop").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn dashboard_requires_login() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(Request::get("/dashboard").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(response.headers()[header::LOCATION], "/login");
}

#[tokio::test]
async fn add_category_without_session_is_unauthorized_json_style() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(
            Request::post("/add-category")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"category_name":"Shoes"}"#))
                .unwrap(),
        )
        .await
        .unwrap();

    // JSON endpoint gets a status code, not a login redirect
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn missing_category_page_is_not_found() {
    let (app, _pool) = test_app().await;

    let response = app
        .oneshot(Request::get("/category/999").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn add_to_cart_honors_the_posted_quantity() {
    let (app, pool) = test_app().await;
    let alice = register_user(&pool, "alice", "alice@example.com", "hunter22").await;
    let category = seed_category(&pool, "Gadgets").await;
    let product = seed_product(&pool, alice.id, category.id, "Widget", 1000).await;

    let cookie = login(&app, "alice@example.com", "hunter22").await;

    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/cart/{}", product.id))
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("quantity=3"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_redirection());

    let lines = CartRepository::new(&pool).list_lines(alice.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 3);
}

#[tokio::test]
async fn add_to_cart_without_a_quantity_defaults_to_one() {
    let (app, pool) = test_app().await;
    let alice = register_user(&pool, "alice", "alice@example.com", "hunter22").await;
    let category = seed_category(&pool, "Gadgets").await;
    let product = seed_product(&pool, alice.id, category.id, "Widget", 1000).await;

    let cookie = login(&app, "alice@example.com", "hunter22").await;

    // GET route, no quantity anywhere
    let response = app
        .clone()
        .oneshot(
            Request::get(format!("/cart/{}", product.id))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_redirection());

    let lines = CartRepository::new(&pool).list_lines(alice.id).await.unwrap();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].quantity, 1);
}

#[tokio::test]
async fn add_to_cart_rejects_a_nonpositive_quantity() {
    let (app, pool) = test_app().await;
    let alice = register_user(&pool, "alice", "alice@example.com", "hunter22").await;
    let category = seed_category(&pool, "Gadgets").await;
    let product = seed_product(&pool, alice.id, category.id, "Widget", 1000).await;

    let cookie = login(&app, "alice@example.com", "hunter22").await;

    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/cart/{}", product.id))
                .header(header::COOKIE, &cookie)
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("quantity=0"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers()[header::LOCATION],
        format!("/cart-items/{}?notice=invalid_quantity", alice.id)
    );
    assert!(
        CartRepository::new(&pool)
            .list_lines(alice.id)
            .await
            .unwrap()
            .is_empty()
    );
}

#[tokio::test]
async fn non_owner_product_deletion_is_forbidden() {
    let (app, pool) = test_app().await;
    let alice = register_user(&pool, "alice", "alice@example.com", "hunter22").await;
    register_user(&pool, "mallory", "mallory@example.com", "hunter22").await;
    let category = seed_category(&pool, "Shoes").await;
    let product = seed_product(&pool, alice.id, category.id, "Boots", 5000).await;

    let cookie = login(&app, "mallory@example.com", "hunter22").await;

    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/delete-product/{}", product.id))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers()[header::LOCATION],
        "/dashboard?notice=forbidden"
    );

    // Product untouched
    let catalog = CatalogRepository::new(&pool);
    assert!(catalog.get_product(product.id).await.unwrap().is_some());
}

#[tokio::test]
async fn non_owner_cart_removal_is_forbidden() {
    let (app, pool) = test_app().await;
    let alice = register_user(&pool, "alice", "alice@example.com", "hunter22").await;
    register_user(&pool, "mallory", "mallory@example.com", "hunter22").await;
    let category = seed_category(&pool, "Shoes").await;
    let product = seed_product(&pool, alice.id, category.id, "Boots", 5000).await;

    let cart = CartRepository::new(&pool);
    let AddToCartOutcome::Added(item) = cart.add_item(alice.id, product.id, 1).await.unwrap()
    else {
        panic!("expected a new cart row");
    };

    let cookie = login(&app, "mallory@example.com", "hunter22").await;

    let response = app
        .clone()
        .oneshot(
            Request::post(format!("/remove-from-cart/{item}"))
                .header(header::COOKIE, &cookie)
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert!(response.status().is_redirection());
    assert_eq!(
        response.headers()[header::LOCATION],
        "/dashboard?notice=forbidden"
    );

    // Alice's cart still holds the row
    assert_eq!(cart.list_lines(alice.id).await.unwrap().len(), 1);
}
