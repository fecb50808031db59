//! Catalog browsing route handlers.
//!
//! Dashboard, shop, search and category pages, plus the one JSON endpoint
//! for creating categories.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Json,
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::{Deserialize, Serialize};

use bazaar_core::CategoryId;

use crate::db::CatalogRepository;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::{OptionalAuth, RequireAuth};
use crate::models::{Category, CurrentUser, ProductSummary};
use crate::state::AppState;

/// How many products the dashboard shows per category.
const DASHBOARD_PRODUCTS_PER_CATEGORY: i64 = 4;

// =============================================================================
// Query / Body Types
// =============================================================================

/// Query parameters for the dashboard notice banner.
#[derive(Debug, Deserialize)]
pub struct NoticeQuery {
    pub notice: Option<String>,
}

/// Query parameters for search.
#[derive(Debug, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

/// JSON body for category creation.
#[derive(Debug, Deserialize)]
pub struct AddCategoryBody {
    pub category_name: String,
}

/// JSON response for category creation.
#[derive(Debug, Serialize)]
pub struct CategoryResponse {
    pub id: i64,
    pub name: String,
}

// =============================================================================
// Templates
// =============================================================================

/// One dashboard section: a category and a few of its products.
pub struct CategorySection {
    pub category: Category,
    pub products: Vec<ProductSummary>,
}

/// Dashboard template.
#[derive(Template, WebTemplate)]
#[template(path = "dashboard.html")]
pub struct DashboardTemplate {
    pub user: Option<CurrentUser>,
    pub sections: Vec<CategorySection>,
    pub notice: Option<String>,
}

/// Shop page template (full catalog).
#[derive(Template, WebTemplate)]
#[template(path = "shop.html")]
pub struct ShopTemplate {
    pub user: Option<CurrentUser>,
    pub products: Vec<ProductSummary>,
}

/// Search results template.
#[derive(Template, WebTemplate)]
#[template(path = "search.html")]
pub struct SearchTemplate {
    pub user: Option<CurrentUser>,
    pub query: String,
    pub products: Vec<ProductSummary>,
}

/// Category page template.
#[derive(Template, WebTemplate)]
#[template(path = "category.html")]
pub struct CategoryTemplate {
    pub user: Option<CurrentUser>,
    pub category: Category,
    pub products: Vec<ProductSummary>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the dashboard: each category with a handful of its products.
pub async fn dashboard(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Query(query): Query<NoticeQuery>,
) -> Result<impl IntoResponse> {
    let catalog = CatalogRepository::new(state.pool());

    let categories = catalog.list_categories().await?;
    let mut sections = Vec::with_capacity(categories.len());
    for category in categories {
        let products = catalog
            .list_products_by_category(category.id, Some(DASHBOARD_PRODUCTS_PER_CATEGORY))
            .await?;
        sections.push(CategorySection { category, products });
    }

    Ok(DashboardTemplate {
        user: Some(current),
        sections,
        notice: query.notice,
    })
}

/// Display the full catalog.
pub async fn shop(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
) -> Result<impl IntoResponse> {
    let products = CatalogRepository::new(state.pool()).list_products().await?;

    Ok(ShopTemplate { user, products })
}

/// Search products by name. An empty query shows the whole catalog.
pub async fn search(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Query(query): Query<SearchQuery>,
) -> Result<impl IntoResponse> {
    let q = query.q.unwrap_or_default();
    let products = CatalogRepository::new(state.pool())
        .search_products(&q)
        .await?;

    Ok(SearchTemplate {
        user,
        query: q,
        products,
    })
}

/// Display the products in one category.
pub async fn category(
    State(state): State<AppState>,
    OptionalAuth(user): OptionalAuth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let catalog = CatalogRepository::new(state.pool());
    let category_id = CategoryId::new(id);

    let category = catalog
        .get_category(category_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("category {id}")))?;
    let products = catalog.list_products_by_category(category_id, None).await?;

    Ok(CategoryTemplate {
        user,
        category,
        products,
    })
}

/// Create a category. The one JSON endpoint in the application.
pub async fn add_category(
    State(state): State<AppState>,
    RequireAuth(_current): RequireAuth,
    Json(body): Json<AddCategoryBody>,
) -> Result<Json<CategoryResponse>> {
    let name = body.category_name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("category name is required".to_owned()));
    }

    let category = CatalogRepository::new(state.pool())
        .create_category(name)
        .await?;

    Ok(Json(CategoryResponse {
        id: category.id.as_i64(),
        name: category.name,
    }))
}
