//! Reporting endpoints, admin-only. Thin wrappers over
//! `services::analytics`.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use serde::Deserialize;

use crate::auth::AdminUser;
use crate::db::AppState;
use crate::domain::ApiError;
use crate::services::analytics::{self, PerformanceSort, SalesPeriod};

const DEFAULT_PERFORMANCE_LIMIT: usize = 10;

/// GET /api/analytics/dashboard
pub async fn dashboard(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(analytics::dashboard(&state.db).await?))
}

#[derive(Debug, Deserialize)]
pub struct SalesQuery {
    pub period: Option<String>,
    pub year: Option<i32>,
    pub month: Option<u32>,
}

/// GET /api/analytics/sales
pub async fn sales(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<SalesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let period = SalesPeriod::parse(params.period.as_deref());
    let buckets =
        analytics::sales_by_period(&state.db, period, params.year, params.month).await?;
    Ok(Json(buckets))
}

#[derive(Debug, Deserialize)]
pub struct PerformanceQuery {
    pub sort_by: Option<String>,
    pub limit: Option<usize>,
}

/// GET /api/analytics/products/performance
pub async fn product_performance(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<PerformanceQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let sort_by = PerformanceSort::parse(params.sort_by.as_deref());
    let limit = params.limit.unwrap_or(DEFAULT_PERFORMANCE_LIMIT);
    let ranked = analytics::product_performance(&state.db, sort_by, limit).await?;
    Ok(Json(ranked))
}

#[derive(Debug, Deserialize)]
pub struct ProfitLossQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

/// GET /api/analytics/profit-loss
pub async fn profit_loss(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<ProfitLossQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let report = analytics::profit_loss(
        &state.db,
        params.start_date.as_deref(),
        params.end_date.as_deref(),
    )
    .await?;
    Ok(Json(report))
}

/// GET /api/analytics/inventory
pub async fn inventory(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<impl IntoResponse, ApiError> {
    Ok(Json(analytics::inventory(&state.db).await?))
}
