//! Product management route handlers.
//!
//! Creation and editing take multipart forms (fields plus image files).
//! Images are uploaded to the remote host first; only the returned URLs
//! are persisted, together with the product row, in one transaction.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, Path, Query, State},
    response::{IntoResponse, Redirect, Response},
};

use bazaar_core::{CategoryId, ImageId, Price, ProductId, UserId};

use crate::db::{CatalogRepository, NewProduct, ProductFields};
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::RequireAuth;
use crate::models::{Category, CurrentUser, Product, ProductImage, ProductSummary};
use crate::policy;
use crate::routes::auth::MessageQuery;
use crate::services::ImageHost;
use crate::state::AppState;

/// Form value of the "Add New Category" placeholder option.
const NEW_CATEGORY_SENTINEL: i64 = -1;

/// Maximum image files accepted per submission.
const MAX_IMAGES_PER_SUBMISSION: usize = 5;

// =============================================================================
// Templates
// =============================================================================

/// Add product form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/add.html")]
pub struct AddProductTemplate {
    pub user: Option<CurrentUser>,
    pub categories: Vec<Category>,
    pub error: Option<String>,
}

/// Edit product form template.
#[derive(Template, WebTemplate)]
#[template(path = "products/edit.html")]
pub struct EditProductTemplate {
    pub user: Option<CurrentUser>,
    pub product: Product,
    pub categories: Vec<Category>,
    pub images: Vec<ProductImage>,
    pub error: Option<String>,
}

/// Product detail template.
#[derive(Template, WebTemplate)]
#[template(path = "products/show.html")]
pub struct ProductTemplate {
    pub user: Option<CurrentUser>,
    pub product: Product,
    pub images: Vec<ProductImage>,
    pub can_edit: bool,
}

/// User's products template.
#[derive(Template, WebTemplate)]
#[template(path = "products/mine.html")]
pub struct UserProductsTemplate {
    pub user: Option<CurrentUser>,
    pub products: Vec<ProductSummary>,
}

// =============================================================================
// Multipart Parsing
// =============================================================================

/// Product fields and image payloads pulled out of a multipart form.
#[derive(Default)]
struct ProductSubmission {
    name: String,
    price: Option<Price>,
    description: String,
    brand: String,
    category_id: Option<i64>,
    images: Vec<(String, Vec<u8>)>,
}

impl ProductSubmission {
    async fn from_multipart(mut multipart: Multipart) -> Result<Self> {
        let mut submission = Self::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::Validation(format!("malformed form: {e}")))?
        {
            let Some(name) = field.name().map(ToOwned::to_owned) else {
                continue;
            };

            match name.as_str() {
                "name" => submission.name = read_text(field).await?.trim().to_owned(),
                "price" => {
                    submission.price = parse_price(read_text(field).await?.trim());
                }
                "description" => submission.description = read_text(field).await?,
                "brand" => submission.brand = read_text(field).await?.trim().to_owned(),
                "category_id" => {
                    submission.category_id = read_text(field).await?.trim().parse().ok();
                }
                "images" => {
                    let file_name = field.file_name().unwrap_or_default().to_owned();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::Validation(format!("malformed upload: {e}")))?;
                    // Browsers submit an empty file part when none was chosen
                    if !file_name.is_empty() && !bytes.is_empty() {
                        submission.images.push((file_name, bytes.to_vec()));
                    }
                }
                _ => {}
            }
        }

        Ok(submission)
    }

    /// Validate the non-image fields, returning an error code for the
    /// redirect query string.
    fn validate_fields(&self) -> std::result::Result<(Price, CategoryId), &'static str> {
        if self.name.is_empty() {
            return Err("name_required");
        }
        let Some(price) = self.price else {
            return Err("invalid_price");
        };
        match self.category_id {
            None => Err("invalid_category"),
            Some(NEW_CATEGORY_SENTINEL) => Err("create_category_first"),
            Some(id) => Ok((price, CategoryId::new(id))),
        }
    }
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> Result<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("malformed form: {e}")))
}

/// Parse a decimal dollar amount ("12", "12.3", "$12.34") into minor units.
fn parse_price(input: &str) -> Option<Price> {
    let input = input.strip_prefix('$').unwrap_or(input);
    let (dollars_str, cents_str) = match input.split_once('.') {
        Some((d, c)) => (d, c),
        None => (input, ""),
    };

    let dollars: i64 = dollars_str.parse().ok()?;
    if dollars < 0 {
        return None;
    }

    let cents: i64 = match cents_str.len() {
        0 => 0,
        1 => cents_str.parse::<i64>().ok()? * 10,
        2 => cents_str.parse().ok()?,
        _ => return None,
    };
    if cents < 0 {
        return None;
    }

    Some(Price::from_minor_units(dollars * 100 + cents))
}

/// Upload each image, skipping (and logging) per-file failures.
async fn upload_images(host: &ImageHost, images: Vec<(String, Vec<u8>)>) -> Vec<String> {
    let mut urls = Vec::with_capacity(images.len());
    for (file_name, bytes) in images {
        match host.upload(&file_name, bytes).await {
            Ok(url) => urls.push(url),
            Err(e) => {
                tracing::warn!(file_name, "Image upload failed: {}", e);
            }
        }
    }
    urls
}

// =============================================================================
// Handlers
// =============================================================================

/// Display the add product form.
pub async fn add_product_page(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let categories = CatalogRepository::new(state.pool()).list_categories().await?;

    Ok(AddProductTemplate {
        user: Some(current),
        categories,
        error: query.error,
    })
}

/// Handle product creation.
///
/// Images are uploaded first; if none succeed the product is rejected and
/// nothing is written. The product row and image rows then commit together.
#[tracing::instrument(skip_all, fields(user_id = %current.id))]
pub async fn add_product(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    multipart: Multipart,
) -> Result<Response> {
    let submission = ProductSubmission::from_multipart(multipart).await?;

    let (price, category_id) = match submission.validate_fields() {
        Ok(ok) => ok,
        Err(code) => return Ok(Redirect::to(&format!("/add-product?error={code}")).into_response()),
    };

    if submission.images.is_empty() {
        return Ok(Redirect::to("/add-product?error=image_required").into_response());
    }
    if submission.images.len() > MAX_IMAGES_PER_SUBMISSION {
        return Ok(Redirect::to("/add-product?error=too_many_images").into_response());
    }

    let image_urls = upload_images(state.image_host(), submission.images).await;
    if image_urls.is_empty() {
        return Ok(Redirect::to("/add-product?error=upload_failed").into_response());
    }

    let new = NewProduct {
        name: submission.name,
        price,
        description: submission.description,
        brand: submission.brand,
        user_id: current.id,
        category_id,
    };

    let product = CatalogRepository::new(state.pool())
        .create_product_with_images(&new, &image_urls)
        .await?;

    tracing::info!(product_id = %product.id, user_id = %current.id, "Product created");

    Ok(Redirect::to(&format!("/display-product/{}", product.id)).into_response())
}

/// Display the edit product form (owner or admin).
pub async fn edit_product_page(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i64>,
    Query(query): Query<MessageQuery>,
) -> Result<impl IntoResponse> {
    let catalog = CatalogRepository::new(state.pool());

    let product = catalog
        .get_product(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    policy::authorize_owner_or_admin(&current, product.user_id)?;

    let categories = catalog.list_categories().await?;
    let images = catalog.get_product_images(product.id).await?;

    Ok(EditProductTemplate {
        user: Some(current),
        product,
        categories,
        images,
        error: query.error,
    })
}

/// Handle product update (owner or admin).
///
/// New images append to the existing set; nothing is replaced.
pub async fn edit_product(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i64>,
    multipart: Multipart,
) -> Result<Response> {
    let catalog = CatalogRepository::new(state.pool());
    let product_id = ProductId::new(id);

    let product = catalog
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    policy::authorize_owner_or_admin(&current, product.user_id)?;

    let submission = ProductSubmission::from_multipart(multipart).await?;
    let (price, category_id) = match submission.validate_fields() {
        Ok(ok) => ok,
        Err(code) => {
            return Ok(Redirect::to(&format!("/edit-product/{id}?error={code}")).into_response());
        }
    };

    if submission.images.len() > MAX_IMAGES_PER_SUBMISSION {
        return Ok(Redirect::to(&format!("/edit-product/{id}?error=too_many_images")).into_response());
    }

    let image_urls = upload_images(state.image_host(), submission.images).await;

    let fields = ProductFields {
        name: submission.name,
        price,
        description: submission.description,
        brand: submission.brand,
        category_id,
    };

    catalog.update_product(product_id, &fields, &image_urls).await?;

    Ok(Redirect::to(&format!("/display-product/{id}")).into_response())
}

/// Handle product deletion (owner or admin).
pub async fn delete_product(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Response> {
    let catalog = CatalogRepository::new(state.pool());
    let product_id = ProductId::new(id);

    let product = catalog
        .get_product(product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    policy::authorize_owner_or_admin(&current, product.user_id)?;

    catalog.delete_product(product_id).await?;

    tracing::info!(product_id = %product_id, user_id = %current.id, "Product deleted");

    Ok(Redirect::to("/dashboard").into_response())
}

/// Display one product.
pub async fn display_product(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let catalog = CatalogRepository::new(state.pool());

    let product = catalog
        .get_product(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;
    let images = catalog.get_product_images(product.id).await?;
    let can_edit = policy::authorize_owner_or_admin(&current, product.user_id).is_ok();

    Ok(ProductTemplate {
        user: Some(current),
        product,
        images,
        can_edit,
    })
}

/// Delete one image from a product (owner or admin).
pub async fn delete_image(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i64>,
) -> Result<Response> {
    let catalog = CatalogRepository::new(state.pool());

    let image = catalog
        .get_image(ImageId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("image {id}")))?;
    let product = catalog
        .get_product(image.product_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", image.product_id)))?;
    policy::authorize_owner_or_admin(&current, product.user_id)?;

    catalog.delete_image(image.id).await?;

    Ok(Redirect::to(&format!("/edit-product/{}", product.id)).into_response())
}

/// List a user's products. Admins see the whole catalog.
pub async fn user_products(
    State(state): State<AppState>,
    RequireAuth(current): RequireAuth,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse> {
    let catalog = CatalogRepository::new(state.pool());

    let products = if current.is_admin {
        catalog.list_products().await?
    } else {
        policy::authorize_owner_or_admin(&current, UserId::new(id))?;
        catalog.list_products_by_owner(UserId::new(id)).await?
    };

    Ok(UserProductsTemplate {
        user: Some(current),
        products,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_price_accepts_plain_and_decimal() {
        assert_eq!(parse_price("12").unwrap().minor_units(), 1200);
        assert_eq!(parse_price("12.3").unwrap().minor_units(), 1230);
        assert_eq!(parse_price("12.34").unwrap().minor_units(), 1234);
        assert_eq!(parse_price("0.05").unwrap().minor_units(), 5);
        assert_eq!(parse_price("$12.34").unwrap().minor_units(), 1234);
    }

    #[test]
    fn test_parse_price_rejects_garbage() {
        assert!(parse_price("").is_none());
        assert!(parse_price("abc").is_none());
        assert!(parse_price("-5").is_none());
        assert!(parse_price("1.234").is_none());
        assert!(parse_price("1.-2").is_none());
    }
}
