//! Employee management, salary and commission routes.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, QueryOrder, QuerySelect,
    Set,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{self, AdminUser, CurrentUser};
use crate::db::AppState;
use crate::domain::ApiError;
use crate::models::employee::{self, DEPARTMENTS, POSITIONS};
use crate::models::order;
use crate::services::commission;
use crate::utils::time::{format_rfc3339, now_rfc3339, parse_date_param};

const DEFAULT_LIST_LIMIT: u64 = 50;
const MIN_PASSWORD_LEN: usize = 6;

fn date_bound(value: Option<&str>, label: &str) -> Result<Option<String>, ApiError> {
    match value {
        None => Ok(None),
        Some(s) => parse_date_param(s)
            .map(|dt| Some(format_rfc3339(dt)))
            .ok_or_else(|| ApiError::Validation(format!("Invalid {label} date: {s}"))),
    }
}

async fn find_employee(state: &AppState, id: i32) -> Result<employee::Model, ApiError> {
    employee::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))
}

fn employee_header(e: &employee::Model) -> serde_json::Value {
    json!({
        "id": e.id,
        "name": e.full_name(),
        "position": e.position,
        "department": e.department,
    })
}

#[derive(Debug, Deserialize)]
pub struct ListEmployeesQuery {
    pub department: Option<String>,
    pub position: Option<String>,
    pub is_active: Option<bool>,
}

/// GET /api/employees — visible to any authenticated caller.
pub async fn list_employees(
    State(state): State<AppState>,
    _user: CurrentUser,
    Query(params): Query<ListEmployeesQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let mut query = employee::Entity::find().order_by_desc(employee::Column::CreatedAt);
    if let Some(department) = &params.department {
        query = query.filter(employee::Column::Department.eq(department.clone()));
    }
    if let Some(position) = &params.position {
        query = query.filter(employee::Column::Position.eq(position.clone()));
    }
    if let Some(is_active) = params.is_active {
        query = query.filter(employee::Column::IsActive.eq(is_active));
    }
    let rows = query.all(&state.db).await?;
    let count = rows.len();
    Ok(Json(json!({ "employees": rows, "count": count })))
}

/// GET /api/employees/:id
pub async fn get_employee(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let found = find_employee(&state, id).await?;
    Ok(Json(json!({ "employee": found })))
}

#[derive(Debug, Deserialize)]
pub struct CreateEmployeeRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    pub password: String,
    pub phone: String,
    pub position: String,
    pub department: String,
    pub hire_date: String,
    #[serde(default)]
    pub base_salary: Option<f64>,
    #[serde(default)]
    pub commission_per_order: Option<f64>,
    #[serde(default)]
    pub salary_toggle: Option<bool>,
}

/// POST /api/employees
pub async fn create_employee(
    State(state): State<AppState>,
    _admin: AdminUser,
    Json(payload): Json<CreateEmployeeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.email.trim().to_lowercase();
    let username = payload.username.trim().to_string();
    if payload.first_name.trim().is_empty()
        || payload.last_name.trim().is_empty()
        || email.is_empty()
        || username.is_empty()
        || payload.phone.trim().is_empty()
    {
        return Err(ApiError::Validation(
            "All required fields must be provided".to_string(),
        ));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::Validation(
            "Password must be at least 6 characters long".to_string(),
        ));
    }
    if !POSITIONS.contains(&payload.position.as_str()) {
        return Err(ApiError::Validation("Invalid position".to_string()));
    }
    if !DEPARTMENTS.contains(&payload.department.as_str()) {
        return Err(ApiError::Validation("Invalid department".to_string()));
    }
    let hire_date = parse_date_param(&payload.hire_date)
        .map(format_rfc3339)
        .ok_or_else(|| ApiError::Validation("Invalid hire date".to_string()))?;

    let taken = employee::Entity::find()
        .filter(
            Condition::any()
                .add(employee::Column::Email.eq(email.clone()))
                .add(employee::Column::Username.eq(username.clone())),
        )
        .one(&state.db)
        .await?;
    if taken.is_some() {
        return Err(ApiError::Validation(
            "Email or username already exists".to_string(),
        ));
    }

    let base_salary = payload.base_salary.unwrap_or(0.0);
    let commission_per_order = payload.commission_per_order.unwrap_or(0.0);
    if base_salary < 0.0 || commission_per_order < 0.0 {
        return Err(ApiError::Validation(
            "Salary fields must be non-negative".to_string(),
        ));
    }

    let now = now_rfc3339();
    let row = employee::ActiveModel {
        first_name: Set(payload.first_name.trim().to_string()),
        last_name: Set(payload.last_name.trim().to_string()),
        email: Set(email),
        username: Set(username),
        password_hash: Set(auth::hash_password(&payload.password).map_err(ApiError::Internal)?),
        phone: Set(payload.phone.trim().to_string()),
        position: Set(payload.position),
        department: Set(payload.department),
        base_salary: Set(base_salary),
        commission_per_order: Set(commission_per_order),
        hire_date: Set(hire_date),
        is_active: Set(true),
        termination_date: Set(None),
        salary_toggle: Set(payload.salary_toggle.unwrap_or(true)),
        last_login: Set(None),
        commission_paid_date: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let saved = row.insert(&state.db).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "Employee created successfully", "employee": saved })),
    ))
}

#[derive(Debug, Deserialize)]
pub struct UpdateEmployeeRequest {
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub department: Option<String>,
    pub base_salary: Option<f64>,
    pub commission_per_order: Option<f64>,
    pub salary_toggle: Option<bool>,
    pub is_active: Option<bool>,
}

/// PUT /api/employees/:id
pub async fn update_employee(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = find_employee(&state, id).await?;

    if let Some(p) = &payload.password {
        if p.len() < MIN_PASSWORD_LEN {
            return Err(ApiError::Validation(
                "Password must be at least 6 characters long".to_string(),
            ));
        }
    }
    if let Some(p) = &payload.position {
        if !POSITIONS.contains(&p.as_str()) {
            return Err(ApiError::Validation("Invalid position".to_string()));
        }
    }
    if let Some(d) = &payload.department {
        if !DEPARTMENTS.contains(&d.as_str()) {
            return Err(ApiError::Validation("Invalid department".to_string()));
        }
    }
    if payload.base_salary.is_some_and(|v| v < 0.0)
        || payload.commission_per_order.is_some_and(|v| v < 0.0)
    {
        return Err(ApiError::Validation(
            "Salary fields must be non-negative".to_string(),
        ));
    }

    let mut active: employee::ActiveModel = existing.into();
    if let Some(v) = payload.first_name.filter(|v| !v.trim().is_empty()) {
        active.first_name = Set(v.trim().to_string());
    }
    if let Some(v) = payload.last_name.filter(|v| !v.trim().is_empty()) {
        active.last_name = Set(v.trim().to_string());
    }
    if let Some(v) = payload.email.filter(|v| !v.trim().is_empty()) {
        active.email = Set(v.trim().to_lowercase());
    }
    if let Some(v) = payload.password {
        active.password_hash = Set(auth::hash_password(&v).map_err(ApiError::Internal)?);
    }
    if let Some(v) = payload.phone {
        active.phone = Set(v);
    }
    if let Some(v) = payload.position {
        active.position = Set(v);
    }
    if let Some(v) = payload.department {
        active.department = Set(v);
    }
    if let Some(v) = payload.base_salary {
        active.base_salary = Set(v);
    }
    if let Some(v) = payload.commission_per_order {
        active.commission_per_order = Set(v);
    }
    if let Some(v) = payload.salary_toggle {
        active.salary_toggle = Set(v);
    }
    if let Some(v) = payload.is_active {
        active.is_active = Set(v);
    }
    active.updated_at = Set(now_rfc3339());
    let saved = active.update(&state.db).await?;

    Ok(Json(json!({
        "message": "Employee updated successfully",
        "employee": saved,
    })))
}

#[derive(Debug, Deserialize, Default)]
pub struct TerminateRequest {
    #[serde(default)]
    pub termination_date: Option<String>,
}

/// PATCH /api/employees/:id/terminate
pub async fn terminate_employee(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    payload: Option<Json<TerminateRequest>>,
) -> Result<impl IntoResponse, ApiError> {
    let existing = find_employee(&state, id).await?;

    let termination_date = match payload.and_then(|Json(p)| p.termination_date) {
        Some(s) => parse_date_param(&s)
            .map(format_rfc3339)
            .ok_or_else(|| ApiError::Validation("Invalid termination date".to_string()))?,
        None => now_rfc3339(),
    };

    let mut active: employee::ActiveModel = existing.into();
    active.is_active = Set(false);
    active.termination_date = Set(Some(termination_date));
    active.updated_at = Set(now_rfc3339());
    let saved = active.update(&state.db).await?;

    Ok(Json(json!({
        "message": "Employee terminated",
        "employee": saved,
    })))
}

/// GET /api/employees/:id/salary/:year/:month
pub async fn monthly_salary(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((id, year, month)): Path<(i32, i32, u32)>,
) -> Result<impl IntoResponse, ApiError> {
    let found = find_employee(&state, id).await?;
    let breakdown = commission::monthly_salary(&state.db, &found, year, month).await?;

    Ok(Json(json!({
        "employee": employee_header(&found),
        "period": { "year": year, "month": month },
        "base_salary": breakdown.base_salary,
        "commission_per_order": breakdown.commission_per_order,
        "order_count": breakdown.order_count,
        "commission_amount": breakdown.commission_amount,
        "total_salary": breakdown.total_salary,
    })))
}

#[derive(Debug, Deserialize)]
pub struct EmployeeOrdersQuery {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub limit: Option<u64>,
}

/// GET /api/employees/:id/orders — attributed orders plus unpaid
/// commission relative to the reset cutoff.
pub async fn employee_orders(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path(id): Path<i32>,
    Query(params): Query<EmployeeOrdersQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let found = find_employee(&state, id).await?;

    let mut query = order::Entity::find()
        .filter(order::Column::EmployeeId.eq(found.id))
        .order_by_desc(order::Column::CreatedAt);
    if let Some(start) = date_bound(params.start_date.as_deref(), "start")? {
        query = query.filter(order::Column::CreatedAt.gte(start));
    }
    if let Some(end) = date_bound(params.end_date.as_deref(), "end")? {
        query = query.filter(order::Column::CreatedAt.lte(end));
    }
    query = query.limit(params.limit.unwrap_or(DEFAULT_LIST_LIMIT));
    let rows = query.all(&state.db).await?;

    let summary = commission::overview(&found, &rows);

    Ok(Json(json!({
        "employee": {
            "id": found.id,
            "name": found.full_name(),
            "commission_per_order": found.commission_per_order,
            "commission_paid_date": found.commission_paid_date,
        },
        "order_count": summary.order_count,
        "commission_eligible_order_count": summary.eligible_order_count,
        "total_commission": summary.total_commission,
        "commission_paid_date": summary.commission_paid_date,
        "orders": rows,
    })))
}

/// GET /api/employees/salary-summary/:year/:month — per-employee monthly
/// pay using the same flat per-order formula as the individual route.
pub async fn salary_summary(
    State(state): State<AppState>,
    _user: CurrentUser,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<impl IntoResponse, ApiError> {
    let employees = employee::Entity::find()
        .filter(employee::Column::IsActive.eq(true))
        .all(&state.db)
        .await?;

    let mut details = Vec::with_capacity(employees.len());
    let mut total_expense = 0.0;
    for e in &employees {
        let breakdown = commission::monthly_salary(&state.db, e, year, month).await?;
        total_expense += breakdown.total_salary;
        details.push(json!({
            "employee": employee_header(e),
            "base_salary": breakdown.base_salary,
            "order_count": breakdown.order_count,
            "commission_amount": breakdown.commission_amount,
            "total_salary": breakdown.total_salary,
        }));
    }

    Ok(Json(json!({
        "period": { "year": year, "month": month },
        "total_employees": employees.len(),
        "total_salary_expense": total_expense,
        "salary_details": details,
    })))
}

/// POST /api/employees/:id/reset-commission
pub async fn reset_commission(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, ApiError> {
    let found = find_employee(&state, id).await?;
    let outcome = commission::reset(&state.db, found.id).await?;

    Ok(Json(json!({
        "message": format!("Commission reset successfully for {}", found.full_name()),
        "reset_date": outcome.reset_date,
        "total_orders_kept": outcome.total_orders_kept,
        "employee": { "id": found.id, "name": found.full_name() },
    })))
}

/// GET /api/employees/meta/positions
pub async fn list_positions() -> impl IntoResponse {
    Json(json!({ "positions": POSITIONS }))
}

/// GET /api/employees/meta/departments
pub async fn list_departments() -> impl IntoResponse {
    Json(json!({ "departments": DEPARTMENTS }))
}
