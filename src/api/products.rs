//! Product catalog routes.
//!
//! Listing is visible to any authenticated caller, but employees get the
//! reduced view (no cost price). Mutations are admin-only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{AdminUser, CurrentUser};
use crate::db::AppState;
use crate::domain::ApiError;
use crate::models::product::{self, CATEGORIES};
use crate::models::ProductPublic;
use crate::services::catalog::{self, NewProduct};
use crate::utils::time::now_rfc3339;

#[derive(Debug, Deserialize)]
pub struct ListProductsQuery {
    pub category: Option<String>,
    pub is_active: Option<bool>,
    #[serde(default)]
    pub low_stock: Option<bool>,
}

/// GET /api/products
pub async fn list_products(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListProductsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut query = product::Entity::find().order_by_asc(product::Column::Name);
    if let Some(category) = &params.category {
        query = query.filter(product::Column::Category.eq(category.clone()));
    }
    if let Some(is_active) = params.is_active {
        query = query.filter(product::Column::IsActive.eq(is_active));
    }

    let mut products = query.all(&state.db).await?;
    if params.low_stock.unwrap_or(false) {
        products.retain(|p| p.is_low_stock());
    }

    // Employees never see cost prices.
    let body = if user.is_admin() {
        let count = products.len();
        json!({ "products": products, "count": count })
    } else {
        let public: Vec<ProductPublic> = products.into_iter().map(Into::into).collect();
        let count = public.len();
        json!({ "products": public, "count": count })
    };
    Ok(Json(body))
}

/// GET /api/products/:id
pub async fn get_product(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let found = product::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    if user.is_admin() {
        Ok(Json(json!({ "product": found })))
    } else {
        Ok(Json(json!({ "product": ProductPublic::from(found) })))
    }
}

/// POST /api/products
pub async fn create_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<NewProduct>,
) -> Result<impl IntoResponse, ApiError> {
    let row = catalog::new_product(payload)?;
    let saved = row.insert(&state.db).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Product created successfully", "product": saved })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateProductRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub cost_price: Option<f64>,
    pub selling_price: Option<f64>,
    pub stock: Option<i32>,
    pub min_stock: Option<i32>,
    pub image_url: Option<String>,
    pub is_active: Option<bool>,
}

/// PUT /api/products/:id
pub async fn update_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateProductRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = product::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    if let Some(category) = &payload.category {
        if !catalog::is_valid_category(category) {
            return Err(ApiError::Validation("Invalid category".to_string()));
        }
    }
    if let Some(p) = payload.cost_price {
        if !p.is_finite() || p < 0.0 {
            return Err(ApiError::Validation("Invalid cost price".to_string()));
        }
    }
    if let Some(p) = payload.selling_price {
        if !p.is_finite() || p < 0.0 {
            return Err(ApiError::Validation("Invalid selling price".to_string()));
        }
    }

    let mut active: product::ActiveModel = existing.into();
    if let Some(v) = payload.name.filter(|v| !v.trim().is_empty()) {
        active.name = Set(v.trim().to_string());
    }
    if let Some(v) = payload.description {
        active.description = Set(v);
    }
    if let Some(v) = payload.category {
        active.category = Set(v);
    }
    if let Some(v) = payload.cost_price {
        active.cost_price = Set(v);
    }
    if let Some(v) = payload.selling_price {
        active.selling_price = Set(v);
    }
    if let Some(v) = payload.stock {
        active.stock = Set(v.max(0));
    }
    if let Some(v) = payload.min_stock {
        active.min_stock = Set(v.max(0));
    }
    if let Some(v) = payload.image_url {
        active.image_url = Set(v.trim().to_string());
    }
    if let Some(v) = payload.is_active {
        active.is_active = Set(v);
    }
    active.updated_at = Set(now_rfc3339());

    let saved = active.update(&state.db).await?;
    Ok(Json(json!({
        "message": "Product updated successfully",
        "product": saved,
    })))
}

/// DELETE /api/products/:id
pub async fn delete_product(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = product::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    product::Entity::delete_by_id(existing.id)
        .exec(&state.db)
        .await?;
    Ok(Json(json!({ "message": "Product deleted successfully" })))
}

#[derive(Debug, Deserialize)]
pub struct StockUpdateRequest {
    pub quantity: i32,
    /// "add", "subtract" or anything else for an absolute set.
    pub operation: Option<String>,
}

/// PATCH /api/products/:id/stock
pub async fn update_stock(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<StockUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if payload.quantity < 0 {
        return Err(ApiError::Validation(
            "Quantity must be non-negative".to_string(),
        ));
    }

    let existing = product::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    let stock = match payload.operation.as_deref() {
        Some("add") => existing.stock + payload.quantity,
        // Never goes negative.
        Some("subtract") => (existing.stock - payload.quantity).max(0),
        _ => payload.quantity,
    };

    let mut active: product::ActiveModel = existing.into();
    active.stock = Set(stock);
    active.updated_at = Set(now_rfc3339());
    let saved = active.update(&state.db).await?;

    Ok(Json(json!({
        "message": "Stock updated successfully",
        "product": saved,
    })))
}

/// GET /api/products/meta/categories — open, used by the entry form.
pub async fn list_categories() -> impl IntoResponse {
    Json(json!({ "categories": CATEGORIES }))
}
