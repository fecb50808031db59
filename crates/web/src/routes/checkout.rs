//! Checkout route handlers.
//!
//! Checkout converts the current user's cart into a write-once order
//! snapshot inside one transaction (see `db::orders`).

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

use bazaar_core::{OrderId, Price};

use crate::db::{CartRepository, OrderRepository};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{RequireAdmin, RequireAuth};
use crate::models::{CartLine, CurrentUser, Order};
use crate::policy;
use crate::state::AppState;

/// Checkout form data.
#[derive(Debug, Deserialize)]
pub struct CheckoutForm {
    pub customer_name: String,
    pub address: String,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub user: Option<CurrentUser>,
    pub lines: Vec<CartLine>,
    pub total: Price,
    pub error: Option<String>,
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "order_confirmation.html")]
pub struct OrderConfirmationTemplate {
    pub user: Option<CurrentUser>,
    pub order: Order,
}

/// Admin order list template.
#[derive(Template, WebTemplate)]
#[template(path = "admin_orders.html")]
pub struct AdminOrdersTemplate {
    pub user: Option<CurrentUser>,
    pub orders: Vec<Order>,
}

/// Display the checkout page with the cart summary.
pub async fn checkout_page(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
) -> Result<Response> {
    let cart = CartRepository::new(state.pool());
    let lines = cart.list_lines(current.id).await?;

    if lines.is_empty() {
        return Ok(
            Redirect::to(&format!("/cart-items/{}?notice=empty_cart", current.id)).into_response(),
        );
    }

    let total = cart.total(current.id).await?;

    Ok(CheckoutTemplate {
        user: Some(current),
        lines,
        total,
        error: None,
    }
    .into_response())
}

/// Finalize the order.
///
/// An empty cart (including a double submit racing this one) is bounced
/// back to the cart page; no zero-total order is ever written.
#[tracing::instrument(skip_all, fields(user_id = %current.id))]
pub async fn checkout(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let customer_name = form.customer_name.trim();
    let address = form.address.trim();
    if customer_name.is_empty() || address.is_empty() {
        return Err(AppError::Validation(
            "name and address are required".to_owned(),
        ));
    }

    let order = OrderRepository::new(state.pool())
        .checkout(current.id, customer_name, address)
        .await?;

    match order {
        Some(order) => {
            tracing::info!(order_id = %order.id, user_id = %current.id, total = %order.total_price, "Order placed");
            Ok(Redirect::to(&format!("/order-confirmation/{}", order.id)).into_response())
        }
        None => Ok(
            Redirect::to(&format!("/cart-items/{}?notice=empty_cart", current.id)).into_response(),
        ),
    }
}

/// Display one order receipt (buyer or admin).
pub async fn order_confirmation(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let order = OrderRepository::new(state.pool())
        .get(OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("order {id}")))?;
    policy::authorize_owner_or_admin(&current, order.user_id)?;

    Ok(OrderConfirmationTemplate {
        user: Some(current),
        order,
    })
}

/// Display every order (admin only).
pub async fn admin_checkout(
    State(state): State<AppState>,
    RequireAdmin(current): RequireAdmin,
) -> Result<impl IntoResponse> {
    let orders = OrderRepository::new(state.pool()).list_all().await?;

    Ok(AdminOrdersTemplate {
        user: Some(current),
        orders,
    })
}
