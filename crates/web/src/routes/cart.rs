//! Cart route handlers.
//!
//! Every cart row is owned by a user; viewing or touching someone else's
//! rows takes admin rights.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use bazaar_core::{CartItemId, Price, ProductId, UserId};

use crate::db::{AddToCartOutcome, CartRepository, CatalogRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{CartLine, CurrentUser};
use crate::policy;
use crate::routes::catalog::NoticeQuery;
use crate::state::AppState;

/// Quantity update form data.
#[derive(Debug, Deserialize)]
pub struct QuantityForm {
    pub item_id: i64,
    pub quantity: i64,
}

/// Add-to-cart form data; the quantity defaults to one.
///
/// `Form` reads the query string on GET and the body on POST, so both
/// routes share this.
#[derive(Debug, Default, Deserialize)]
pub struct AddToCartForm {
    pub quantity: Option<i64>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartTemplate {
    pub user: Option<CurrentUser>,
    pub owner_id: UserId,
    pub lines: Vec<CartLine>,
    pub total: Price,
    pub notice: Option<String>,
}

/// Add a product to the current user's cart at the requested quantity.
///
/// If the product is already in the cart nothing changes (not even the
/// quantity) and the cart page says so; existing lines are adjusted from
/// the cart page instead.
pub async fn add_to_cart(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(product_id): Path<i64>,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let product_id = ProductId::new(product_id);

    let quantity = form.quantity.unwrap_or(1);
    if quantity < 1 {
        return Ok(
            Redirect::to(&format!("/cart-items/{}?notice=invalid_quantity", current.id))
                .into_response(),
        );
    }

    // Adding a phantom product 404s instead of planting a broken cart row
    CatalogRepository::new(state.pool())
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {product_id}")))?;

    let outcome = CartRepository::new(state.pool())
        .add_item(current.id, product_id, quantity)
        .await?;

    let notice = match outcome {
        AddToCartOutcome::Added(_) => "added",
        AddToCartOutcome::AlreadyInCart => "already_in_cart",
    };

    Ok(Redirect::to(&format!("/cart-items/{}?notice={notice}", current.id)).into_response())
}

/// Display a user's cart (owner or admin).
pub async fn cart_page(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(user_id): Path<i64>,
    Query(query): Query<NoticeQuery>,
) -> Result<impl IntoResponse> {
    let owner_id = UserId::new(user_id);
    policy::authorize_owner_or_admin(&current, owner_id)?;

    let cart = CartRepository::new(state.pool());
    let lines = cart.list_lines(owner_id).await?;
    let total = cart.total(owner_id).await?;

    Ok(CartTemplate {
        user: Some(current),
        owner_id,
        lines,
        total,
        notice: query.notice,
    })
}

/// Update one cart line's quantity (owner or admin).
pub async fn update_quantity(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(user_id): Path<i64>,
    Form(form): Form<QuantityForm>,
) -> Result<Response> {
    let owner_id = UserId::new(user_id);
    policy::authorize_owner_or_admin(&current, owner_id)?;

    let cart = CartRepository::new(state.pool());
    let item = cart
        .get_item(CartItemId::new(form.item_id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("cart item {}", form.item_id)))?;
    policy::authorize_owner_or_admin(&current, item.user_id)?;

    if form.quantity < 1 {
        return Ok(
            Redirect::to(&format!("/cart-items/{user_id}?notice=invalid_quantity")).into_response(),
        );
    }

    cart.update_quantity(item.id, form.quantity).await?;

    Ok(Redirect::to(&format!("/cart-items/{user_id}")).into_response())
}

/// Remove one cart line (owner or admin).
pub async fn remove_from_cart(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Response> {
    let cart = CartRepository::new(state.pool());

    let item = cart
        .get_item(CartItemId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("cart item {id}")))?;
    policy::authorize_owner_or_admin(&current, item.user_id)?;

    cart.remove_item(item.id).await?;

    Ok(Redirect::to(&format!("/cart-items/{}", item.user_id)).into_response())
}
