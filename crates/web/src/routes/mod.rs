//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                        - Redirect to /shop
//! GET  /health                  - Health check
//!
//! # Auth
//! GET  /login                   - Login page
//! POST /login                   - Login action
//! GET  /register                - Register page
//! POST /register                - Register action
//! GET  /logout                  - Logout action
//! GET  /user-account            - Account page
//! POST /user-account            - Update account
//!
//! # Catalog
//! GET  /dashboard               - Categories with sample products
//! GET  /shop                    - Full catalog
//! GET  /search?q=               - Search by name
//! GET  /category/{id}           - Products in one category
//! POST /add-category            - Create category (JSON)
//! GET  /add-product             - Add product form
//! POST /add-product             - Create product + images (multipart)
//! GET  /edit-product/{id}       - Edit form (owner/admin)
//! POST /edit-product/{id}       - Update product (owner/admin, multipart)
//! POST /delete-product/{id}     - Delete product (owner/admin)
//! GET  /display-product/{id}    - Product detail
//! POST /products/delete-image/{id} - Delete one image (owner/admin)
//! GET  /user-products/{id}      - A user's products (admin sees all)
//!
//! # Cart
//! GET  /cart/{product_id}       - Add to cart
//! POST /cart/{product_id}       - Add to cart
//! GET  /cart-items/{user_id}    - View cart (owner/admin)
//! POST /cart-items/{user_id}    - Update line quantity (owner/admin)
//! POST /remove-from-cart/{id}   - Remove cart line (owner/admin)
//!
//! # Checkout
//! GET  /checkout                - Checkout form
//! POST /checkout                - Finalize order
//! GET  /order-confirmation/{id} - Receipt (buyer/admin)
//! GET  /admin-checkout          - All orders (admin)
//! ```

pub mod account;
pub mod auth;
pub mod cart;
pub mod catalog;
pub mod checkout;
pub mod products;

use axum::{
    Router,
    response::Redirect,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/login", get(auth::login_page).post(auth::login))
        .route("/register", get(auth::register_page).post(auth::register))
        .route("/logout", get(auth::logout))
        .route(
            "/user-account",
            get(account::account_page).post(account::update_account),
        )
}

/// Create the catalog routes router.
pub fn catalog_routes() -> Router<AppState> {
    Router::new()
        .route("/dashboard", get(catalog::dashboard))
        .route("/shop", get(catalog::shop))
        .route("/search", get(catalog::search))
        .route("/category/{id}", get(catalog::category))
        .route("/add-category", post(catalog::add_category))
        .route(
            "/add-product",
            get(products::add_product_page).post(products::add_product),
        )
        .route(
            "/edit-product/{id}",
            get(products::edit_product_page).post(products::edit_product),
        )
        .route("/delete-product/{id}", post(products::delete_product))
        .route("/display-product/{id}", get(products::display_product))
        .route("/products/delete-image/{id}", post(products::delete_image))
        .route("/user-products/{id}", get(products::user_products))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/cart/{product_id}",
            get(cart::add_to_cart).post(cart::add_to_cart),
        )
        .route(
            "/cart-items/{user_id}",
            get(cart::cart_page).post(cart::update_quantity),
        )
        .route("/remove-from-cart/{id}", post(cart::remove_from_cart))
}

/// Create the checkout routes router.
pub fn checkout_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/checkout",
            get(checkout::checkout_page).post(checkout::checkout),
        )
        .route("/order-confirmation/{id}", get(checkout::order_confirmation))
        .route("/admin-checkout", get(checkout::admin_checkout))
}

/// Create all routes for the application.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(|| async { Redirect::to("/shop") }))
        .merge(auth_routes())
        .merge(catalog_routes())
        .merge(cart_routes())
        .merge(checkout_routes())
}
