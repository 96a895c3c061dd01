//! Product catalog routes
//!
//! Reads are public. Every write needs a bearer token, and changes to an
//! existing product are limited to the user who created it.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    error::{ApiError, ApiResult},
    extractors::{AuthUser, ValidatedJson, parse_product_id},
    models::{Product, ProductInput},
    routes::currency::price_in_currency,
    state::AppState,
    validation::{
        Validate, collect, validate_id_list, validate_price, validate_quantity, validate_required,
    },
};

/// Routes mounted under `/api/products`
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_products).post(create_product))
        .route(
            "/delete-multiple",
            delete(delete_multiple).fallback(not_a_product_id),
        )
        .route("/delete-all", delete(delete_all).fallback(not_a_product_id))
        .route(
            "/:id",
            get(get_product).put(update_product).delete(delete_product),
        )
        .route("/:id/price-in/:currency", get(price_in_currency))
}

/// Product body for create and full update
///
/// Numeric fields arrive as raw JSON so that a wrong type is reported as a
/// validation message rather than a parse failure.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRequest {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub price: Option<Value>,
    #[serde(default)]
    pub quantity: Option<Value>,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl Validate for ProductRequest {
    fn validate(&self) -> Result<(), Vec<String>> {
        collect([
            validate_required(
                self.name.as_deref().unwrap_or_default(),
                "Product name is required",
            ),
            validate_price(self.price.as_ref()),
            validate_quantity(self.quantity.as_ref()),
            validate_required(
                self.category.as_deref().unwrap_or_default(),
                "Category is required",
            ),
        ])
    }
}

impl ProductRequest {
    /// Typed fields of a body that already passed validation
    pub fn into_input(self) -> ProductInput {
        ProductInput {
            name: self.name.unwrap_or_default().trim().to_string(),
            price: self.price.as_ref().and_then(Value::as_f64).unwrap_or_default(),
            quantity: self
                .quantity
                .as_ref()
                .and_then(Value::as_f64)
                .map(|quantity| quantity as i32)
                .unwrap_or_default(),
            category: self.category.unwrap_or_default().trim().to_string(),
            description: self.description,
            image_url: self.image_url.filter(|url| !url.trim().is_empty()),
        }
    }
}

/// Bulk delete request
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteMultipleRequest {
    #[serde(default)]
    pub product_ids: Option<Value>,
}

impl Validate for DeleteMultipleRequest {
    fn validate(&self) -> Result<(), Vec<String>> {
        collect([validate_id_list(self.product_ids.as_ref())])
    }
}

impl DeleteMultipleRequest {
    fn ids(&self) -> Vec<&str> {
        self.product_ids
            .as_ref()
            .and_then(Value::as_array)
            .map(|ids| ids.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default()
    }
}

/// Every product, newest first
pub async fn list_products(State(state): State<AppState>) -> ApiResult<Json<Vec<Product>>> {
    let products = state.products.list().await?;
    Ok(Json(products))
}

/// Other methods on the bulk paths would otherwise address `/:id`
async fn not_a_product_id() -> ApiError {
    ApiError::BadRequest("Invalid product ID".to_string())
}

/// A single product
pub async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Product>> {
    let id = parse_product_id(&id)?;
    Ok(Json(find_product(&state, id).await?))
}

/// Create a product owned by the caller
pub async fn create_product(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<ProductRequest>,
) -> ApiResult<(StatusCode, Json<Product>)> {
    let product = state
        .products
        .create(auth.user_id, payload.into_input())
        .await?;

    info!("Product {} created by user {}", product.id, auth.user_id);
    Ok((StatusCode::CREATED, Json(product)))
}

/// Replace every editable field of one of the caller's products
pub async fn update_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(payload): ValidatedJson<ProductRequest>,
) -> ApiResult<Json<Product>> {
    let id = parse_product_id(&id)?;
    owned_product(&state, id, auth).await?;

    let product = state
        .products
        .update(id, payload.into_input())
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    info!("Product {} updated by user {}", product.id, auth.user_id);
    Ok(Json(product))
}

/// Delete one of the caller's products
pub async fn delete_product(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let id = parse_product_id(&id)?;
    owned_product(&state, id, auth).await?;

    if !state.products.delete(id).await? {
        return Err(ApiError::NotFound("Product not found".to_string()));
    }

    info!("Product {} deleted by user {}", id, auth.user_id);
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

/// Delete several of the caller's products at once
///
/// Nothing is deleted unless every requested product belongs to the caller.
pub async fn delete_multiple(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(payload): ValidatedJson<DeleteMultipleRequest>,
) -> ApiResult<Json<Value>> {
    let mut ids: Vec<Uuid> = Vec::new();
    let mut invalid: Vec<String> = Vec::new();

    for raw in payload.ids() {
        match Uuid::parse_str(raw.trim()) {
            Ok(id) if !ids.contains(&id) => ids.push(id),
            Ok(_) => {}
            Err(_) => invalid.push(raw.to_string()),
        }
    }

    if !invalid.is_empty() {
        return Err(ApiError::InvalidIds(invalid));
    }

    let owned = state.products.find_owned(auth.user_id, &ids).await?;

    if owned.is_empty() {
        return Err(ApiError::NotFound(
            "No products found that belong to you with the provided IDs".to_string(),
        ));
    }

    if owned.len() < ids.len() {
        let unauthorized: Vec<String> = ids
            .iter()
            .filter(|id| !owned.iter().any(|product| product.id == **id))
            .map(Uuid::to_string)
            .collect();

        warn!(
            "User {} tried to delete {} products they do not own",
            auth.user_id,
            unauthorized.len()
        );
        return Err(ApiError::NotOwned(unauthorized));
    }

    let deleted_ids: Vec<Uuid> = owned.iter().map(|product| product.id).collect();
    let deleted = state.products.delete_owned(auth.user_id, &deleted_ids).await?;

    info!("User {} deleted {} products", auth.user_id, deleted);

    Ok(Json(json!({
        "message": "Products deleted successfully",
        "deletedCount": deleted,
        "deletedIds": deleted_ids,
    })))
}

/// Delete every product the caller owns
pub async fn delete_all(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Value>> {
    let deleted = state.products.delete_all_owned(auth.user_id).await?;

    let message = if deleted > 0 {
        "All products deleted successfully"
    } else {
        "No products found to delete"
    };

    Ok(Json(json!({ "message": message, "deletedCount": deleted })))
}

pub(crate) async fn find_product(state: &AppState, id: Uuid) -> ApiResult<Product> {
    state
        .products
        .find_by_id(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))
}

/// Ownership check: the product must exist and belong to the caller
async fn owned_product(state: &AppState, id: Uuid, auth: AuthUser) -> ApiResult<Product> {
    let product = find_product(state, id).await?;

    if !product.is_owned_by(auth.user_id) {
        warn!("User {} may not modify product {}", auth.user_id, id);
        return Err(ApiError::Forbidden("Unauthorized".to_string()));
    }

    Ok(product)
}
