//! Order routes.
//!
//! Employees only see and touch orders they authored (`created_by`);
//! admins see everything. Status changes and cancellation are admin-only.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::{
    ColumnTrait, EntityTrait, QueryFilter, QueryOrder, QuerySelect, Set,
    ActiveModelTrait,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{AdminUser, CurrentUser};
use crate::db::AppState;
use crate::domain::ApiError;
use crate::models::order::{self, PAYMENT_STATUSES, STATUSES};
use crate::services::analytics::margin;
use crate::services::orders::{self, OrderInput};
use crate::utils::time::{format_rfc3339, now_rfc3339, parse_date_param};

const DEFAULT_LIST_LIMIT: u64 = 50;

fn date_bound(value: Option<&str>, label: &str) -> Result<Option<String>, ApiError> {
    match value {
        None => Ok(None),
        Some(s) => parse_date_param(s)
            .map(|dt| Some(format_rfc3339(dt)))
            .ok_or_else(|| ApiError::Validation(format!("Invalid {label} date: {s}"))),
    }
}

async fn order_with_items(
    state: &AppState,
    o: order::Model,
) -> Result<Value, ApiError> {
    let items = orders::load_items(&state.db, o.id).await?;
    let profit = o.profit();
    let mut body = serde_json::to_value(&o).map_err(|e| ApiError::Internal(e.to_string()))?;
    if let Value::Object(map) = &mut body {
        map.insert("items".to_string(), json!(items));
        map.insert("profit".to_string(), json!(profit));
    }
    Ok(body)
}

#[derive(Debug, Deserialize)]
pub struct ListOrdersQuery {
    pub status: Option<String>,
    pub payment_status: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u64>,
}

/// GET /api/orders
pub async fn list_orders(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<ListOrdersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut query = order::Entity::find().order_by_desc(order::Column::CreatedAt);

    if !user.is_admin() {
        query = query.filter(order::Column::CreatedBy.eq(user.id()));
    }
    if let Some(status) = &params.status {
        query = query.filter(order::Column::Status.eq(status.clone()));
    }
    if let Some(payment_status) = &params.payment_status {
        query = query.filter(order::Column::PaymentStatus.eq(payment_status.clone()));
    }
    if let Some(start) = date_bound(params.start_date.as_deref(), "start")? {
        query = query.filter(order::Column::CreatedAt.gte(start));
    }
    if let Some(end) = date_bound(params.end_date.as_deref(), "end")? {
        query = query.filter(order::Column::CreatedAt.lte(end));
    }
    query = query.limit(params.limit.unwrap_or(DEFAULT_LIST_LIMIT));

    let rows = query.all(&state.db).await?;
    let mut out = Vec::with_capacity(rows.len());
    for o in rows {
        out.push(order_with_items(&state, o).await?);
    }
    let count = out.len();
    Ok(Json(json!({ "orders": out, "count": count })))
}

/// GET /api/orders/:id
pub async fn get_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let found = order::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    if !user.is_admin() && found.created_by != Some(user.id()) {
        return Err(ApiError::Forbidden(
            "You can only view orders you created".to_string(),
        ));
    }

    Ok(Json(json!({ "order": order_with_items(&state, found).await? })))
}

/// POST /api/orders
pub async fn create_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(mut payload): Json<OrderInput>,
) -> Result<impl IntoResponse, ApiError> {
    // Employees attribute their own orders unless told otherwise.
    if payload.employee_id.is_none() {
        payload.employee_id = user.employee().map(|e| e.id);
    }
    let created_by = user.employee().map(|e| e.id);

    let saved = orders::create_order(&state.db, payload, created_by).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Order created successfully",
            "order": order_with_items(&state, saved).await?,
        })),
    ))
}

/// PUT /api/orders/:id
pub async fn update_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
    Json(payload): Json<OrderInput>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = order::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    if !user.is_admin() && existing.created_by != Some(user.id()) {
        return Err(ApiError::Forbidden(
            "You can only edit orders you created".to_string(),
        ));
    }

    let saved = orders::update_order(&state.db, existing, payload).await?;
    Ok(Json(json!({
        "message": "Order updated successfully",
        "order": order_with_items(&state, saved).await?,
    })))
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdateRequest {
    pub status: Option<String>,
    pub payment_status: Option<String>,
}

/// PATCH /api/orders/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<StatusUpdateRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if let Some(s) = &payload.status {
        if !STATUSES.contains(&s.as_str()) {
            return Err(ApiError::Validation(format!("Invalid status: {s}")));
        }
    }
    if let Some(s) = &payload.payment_status {
        if !PAYMENT_STATUSES.contains(&s.as_str()) {
            return Err(ApiError::Validation(format!("Invalid payment status: {s}")));
        }
    }

    let existing = order::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    let mut active: order::ActiveModel = existing.into();
    if let Some(s) = payload.status {
        active.status = Set(s);
    }
    if let Some(s) = payload.payment_status {
        active.payment_status = Set(s);
    }
    active.updated_at = Set(now_rfc3339());
    let saved = active.update(&state.db).await?;

    Ok(Json(json!({
        "message": "Order status updated",
        "order": saved,
    })))
}

/// PATCH /api/orders/:id/cancel
pub async fn cancel_order(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let cancelled = orders::cancel_order(&state.db, id).await?;
    Ok(Json(json!({
        "message": "Order cancelled and stock restored",
        "order": cancelled,
    })))
}

/// DELETE /api/orders/:id — admins delete anything, employees their own.
/// Stock is not restored here; cancellation is the path that returns stock.
pub async fn delete_order(
    State(state): State<AppState>,
    user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = order::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    if !user.is_admin() && existing.created_by != Some(user.id()) {
        return Err(ApiError::Forbidden(
            "You can only delete orders you created".to_string(),
        ));
    }

    order::Entity::delete_by_id(existing.id)
        .exec(&state.db)
        .await?;
    Ok(Json(json!({ "message": "Order deleted successfully" })))
}

#[derive(Debug, Deserialize)]
pub struct StatsQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /api/orders/stats/summary
pub async fn stats_summary(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<StatsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut query = order::Entity::find();
    if let Some(start) = date_bound(params.start_date.as_deref(), "start")? {
        query = query.filter(order::Column::CreatedAt.gte(start));
    }
    if let Some(end) = date_bound(params.end_date.as_deref(), "end")? {
        query = query.filter(order::Column::CreatedAt.lte(end));
    }
    let rows = query.all(&state.db).await?;

    let total_orders = rows.len();
    let completed = rows.iter().filter(|o| o.status == "delivered").count();
    let pending = rows.iter().filter(|o| o.status == "pending").count();
    let total_revenue: f64 = rows.iter().map(|o| o.total).sum();
    let total_cost: f64 = rows.iter().map(|o| o.total_cost).sum();
    let total_profit = total_revenue - total_cost;

    Ok(Json(json!({
        "total_orders": total_orders,
        "completed_orders": completed,
        "pending_orders": pending,
        "total_revenue": total_revenue,
        "total_cost": total_cost,
        "total_profit": total_profit,
        "profit_margin": margin(total_profit, total_revenue),
    })))
}

/// GET /api/orders/employee/my-orders — the employee's own orders plus
/// their flat-rate commission stats over them.
pub async fn my_orders(
    State(state): State<AppState>,
    user: CurrentUser,
    Query(params): Query<StatsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(employee) = user.employee() else {
        return Err(ApiError::Forbidden("Employee access required".to_string()));
    };

    let mut query = order::Entity::find()
        .filter(order::Column::CreatedBy.eq(employee.id))
        .order_by_desc(order::Column::CreatedAt);
    if let Some(start) = date_bound(params.start_date.as_deref(), "start")? {
        query = query.filter(order::Column::CreatedAt.gte(start));
    }
    if let Some(end) = date_bound(params.end_date.as_deref(), "end")? {
        query = query.filter(order::Column::CreatedAt.lte(end));
    }
    let rows = query.all(&state.db).await?;

    let order_count = rows.len();
    let total_revenue: f64 = rows.iter().map(|o| o.total).sum();
    let total_commission = if employee.salary_toggle {
        order_count as f64 * employee.commission_per_order
    } else {
        0.0
    };

    Ok(Json(json!({
        "orders": rows,
        "stats": {
            "order_count": order_count,
            "total_revenue": total_revenue,
            "commission_per_order": employee.commission_per_order,
            "total_commission": total_commission,
            "salary_toggle_enabled": employee.salary_toggle,
        },
    })))
}
