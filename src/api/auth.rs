//! Login, signup and profile routes.
//!
//! Login is unified: the email is checked against admins first, then
//! employees. Signup always creates an employee; admins are created
//! through the separate admin signup route.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, EntityTrait, QueryFilter, Set,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::{self, CurrentUser, Identity, ROLE_EMPLOYEE};
use crate::db::AppState;
use crate::domain::ApiError;
use crate::models::{admin, employee, EmployeeProfile};
use crate::utils::time::now_rfc3339;

const DEFAULT_BASE_SALARY: f64 = 25000.0;
const DEFAULT_COMMISSION_PER_ORDER: f64 = 50.0;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub position: Option<String>,
    #[serde(default)]
    pub department: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdminSignupRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub first_name: String,
    pub last_name: String,
    #[serde(default)]
    pub role: Option<String>,
}

fn admin_user_body(a: &admin::Model) -> serde_json::Value {
    json!({
        "id": a.id,
        "username": a.username,
        "email": a.email,
        "first_name": a.first_name,
        "last_name": a.last_name,
        "role": a.role,
    })
}

fn employee_user_body(e: &employee::Model) -> serde_json::Value {
    json!({
        "id": e.id,
        "username": e.username,
        "email": e.email,
        "first_name": e.first_name,
        "last_name": e.last_name,
        "position": e.position,
        "department": e.department,
        "role": ROLE_EMPLOYEE,
    })
}

fn issue_token(state: &AppState, id: i32, role: &str) -> Result<String, ApiError> {
    auth::create_jwt(id, role, &state.config.jwt_secret).map_err(ApiError::Internal)
}

/// POST /api/auth/login
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.email.trim().to_lowercase();
    let invalid = || ApiError::Unauthorized("Invalid credentials".to_string());

    if let Some(found) = admin::Entity::find()
        .filter(admin::Column::Email.eq(email.clone()))
        .one(&state.db)
        .await?
    {
        if !auth::verify_password(&payload.password, &found.password_hash)
            .map_err(ApiError::Internal)?
        {
            return Err(invalid());
        }

        let role = found.role.clone();
        let mut active: admin::ActiveModel = found.into();
        active.last_login = Set(Some(now_rfc3339()));
        active.updated_at = Set(now_rfc3339());
        let saved = active.update(&state.db).await?;

        let token = issue_token(&state, saved.id, &role)?;
        return Ok(Json(json!({
            "message": "Admin login successful",
            "token": token,
            "user": admin_user_body(&saved),
        })));
    }

    let found = employee::Entity::find()
        .filter(employee::Column::Email.eq(email))
        .one(&state.db)
        .await?
        .ok_or_else(invalid)?;

    if !found.is_active {
        return Err(ApiError::Unauthorized("Account is deactivated".to_string()));
    }
    if !auth::verify_password(&payload.password, &found.password_hash)
        .map_err(ApiError::Internal)?
    {
        return Err(invalid());
    }

    let mut active: employee::ActiveModel = found.into();
    active.last_login = Set(Some(now_rfc3339()));
    active.updated_at = Set(now_rfc3339());
    let saved = active.update(&state.db).await?;

    let token = issue_token(&state, saved.id, ROLE_EMPLOYEE)?;
    Ok(Json(json!({
        "message": "Employee login successful",
        "token": token,
        "user": employee_user_body(&saved),
    })))
}

/// POST /api/auth/signup — always creates an employee account.
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.email.trim().to_lowercase();
    if email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "Email and password are required".to_string(),
        ));
    }

    let admin_taken = admin::Entity::find()
        .filter(admin::Column::Email.eq(email.clone()))
        .one(&state.db)
        .await?
        .is_some();
    let employee_taken = employee::Entity::find()
        .filter(employee::Column::Email.eq(email.clone()))
        .one(&state.db)
        .await?
        .is_some();
    if admin_taken || employee_taken {
        return Err(ApiError::Validation(
            "An account with this email already exists".to_string(),
        ));
    }

    let position = payload
        .position
        .unwrap_or_else(|| "sales_associate".to_string());
    let department = payload.department.unwrap_or_else(|| "sales".to_string());
    if !employee::POSITIONS.contains(&position.as_str()) {
        return Err(ApiError::Validation("Invalid position".to_string()));
    }
    if !employee::DEPARTMENTS.contains(&department.as_str()) {
        return Err(ApiError::Validation("Invalid department".to_string()));
    }

    // Local-part plus a timestamp keeps generated usernames unique enough
    // without a retry loop.
    let local_part = email.split('@').next().unwrap_or("user");
    let username = format!("{}_{}", local_part, Utc::now().timestamp_millis());

    let now = now_rfc3339();
    let row = employee::ActiveModel {
        first_name: Set(payload.first_name),
        last_name: Set(payload.last_name),
        email: Set(email),
        username: Set(username),
        password_hash: Set(auth::hash_password(&payload.password).map_err(ApiError::Internal)?),
        phone: Set(payload.phone.unwrap_or_default()),
        position: Set(position),
        department: Set(department),
        base_salary: Set(DEFAULT_BASE_SALARY),
        commission_per_order: Set(DEFAULT_COMMISSION_PER_ORDER),
        hire_date: Set(now.clone()),
        is_active: Set(true),
        termination_date: Set(None),
        salary_toggle: Set(true),
        last_login: Set(None),
        commission_paid_date: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let saved = row.insert(&state.db).await?;

    let token = issue_token(&state, saved.id, ROLE_EMPLOYEE)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Employee account created successfully",
            "token": token,
            "user": employee_user_body(&saved),
        })),
    ))
}

/// POST /api/auth/admin/signup — initial setup path, intentionally open.
pub async fn admin_signup(
    State(state): State<AppState>,
    Json(payload): Json<AdminSignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let email = payload.email.trim().to_lowercase();
    let username = payload.username.trim().to_string();
    if email.is_empty() || username.is_empty() || payload.password.is_empty() {
        return Err(ApiError::Validation(
            "Username, email and password are required".to_string(),
        ));
    }

    let existing = admin::Entity::find()
        .filter(
            Condition::any()
                .add(admin::Column::Email.eq(email.clone()))
                .add(admin::Column::Username.eq(username.clone())),
        )
        .one(&state.db)
        .await?;
    if existing.is_some() {
        return Err(ApiError::Validation(
            "Admin with this email or username already exists".to_string(),
        ));
    }

    let role = match payload.role.as_deref() {
        None | Some(auth::ROLE_ADMIN) => auth::ROLE_ADMIN,
        Some(auth::ROLE_SUPER_ADMIN) => auth::ROLE_SUPER_ADMIN,
        Some(_) => return Err(ApiError::Validation("Invalid role".to_string())),
    };

    let now = now_rfc3339();
    let row = admin::ActiveModel {
        username: Set(username),
        email: Set(email),
        password_hash: Set(auth::hash_password(&payload.password).map_err(ApiError::Internal)?),
        first_name: Set(payload.first_name),
        last_name: Set(payload.last_name),
        role: Set(role.to_string()),
        is_active: Set(true),
        last_login: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    let saved = row.insert(&state.db).await?;

    let token = issue_token(&state, saved.id, &saved.role)?;
    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Admin created successfully",
            "token": token,
            "user": admin_user_body(&saved),
        })),
    ))
}

/// GET /api/auth/profile
pub async fn profile(user: CurrentUser) -> impl IntoResponse {
    let body = match &user.identity {
        Identity::Admin(a) => admin_user_body(a),
        Identity::Employee(e) => employee_user_body(e),
    };
    Json(json!({ "user": body, "role": user.role }))
}

#[derive(Debug, Deserialize)]
pub struct EmployeeProfileUpdate {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub salary_toggle: Option<bool>,
}

/// PUT /api/auth/employee/profile — an employee edits their own record.
pub async fn update_employee_profile(
    State(state): State<AppState>,
    user: CurrentUser,
    Json(payload): Json<EmployeeProfileUpdate>,
) -> Result<impl IntoResponse, ApiError> {
    let Some(current) = user.employee() else {
        return Err(ApiError::Forbidden("Employee access required".to_string()));
    };

    let mut active: employee::ActiveModel = current.clone().into();
    if let Some(v) = payload.first_name.filter(|v| !v.trim().is_empty()) {
        active.first_name = Set(v);
    }
    if let Some(v) = payload.last_name.filter(|v| !v.trim().is_empty()) {
        active.last_name = Set(v);
    }
    if let Some(v) = payload.phone {
        active.phone = Set(v);
    }
    if let Some(v) = payload.salary_toggle {
        active.salary_toggle = Set(v);
    }
    active.updated_at = Set(now_rfc3339());
    let saved = active.update(&state.db).await?;

    Ok(Json(json!({
        "message": "Profile updated successfully",
        "employee": EmployeeProfile::from(saved),
    })))
}

/// POST /api/auth/logout — stateless tokens, nothing to revoke server-side.
pub async fn logout(_user: CurrentUser) -> impl IntoResponse {
    Json(json!({ "message": "Logged out successfully" }))
}
