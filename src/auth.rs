use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use axum::{
    async_trait,
    extract::{FromRequestParts, Json},
    http::{request::Parts, StatusCode},
};
use sea_orm::EntityTrait;
use serde_json::json;

use crate::db::AppState;
use crate::models::{admin, employee};

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_SUPER_ADMIN: &str = "super_admin";
pub const ROLE_EMPLOYEE: &str = "employee";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Admin or employee id, depending on `role`.
    pub sub: i32,
    pub role: String,
    pub exp: usize,
}

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| e.to_string())?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, String> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| e.to_string())?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

pub fn create_jwt(id: i32, role: &str, secret: &str) -> Result<String, String> {
    let expiration = Utc::now()
        .checked_add_signed(Duration::days(7))
        .expect("valid timestamp")
        .timestamp();

    let claims = Claims {
        sub: id,
        role: role.to_owned(),
        exp: expiration as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| e.to_string())
}

pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, String> {
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

fn is_admin_role(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_SUPER_ADMIN
}

type Rejection = (StatusCode, Json<serde_json::Value>);

fn unauthorized(msg: &str) -> Rejection {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": msg })))
}

fn bearer_token(parts: &Parts) -> Result<&str, Rejection> {
    let header = parts
        .headers
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| unauthorized("No token provided, authorization denied"))?;

    header
        .strip_prefix("Bearer ")
        .ok_or_else(|| unauthorized("No token provided, authorization denied"))
}

/// The loaded record behind a verified token.
#[derive(Debug, Clone)]
pub enum Identity {
    Admin(admin::Model),
    Employee(employee::Model),
}

/// Any authenticated caller: admin, super admin or employee.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub identity: Identity,
    pub role: String,
}

impl CurrentUser {
    pub fn id(&self) -> i32 {
        match &self.identity {
            Identity::Admin(a) => a.id,
            Identity::Employee(e) => e.id,
        }
    }

    pub fn is_admin(&self) -> bool {
        is_admin_role(&self.role)
    }

    pub fn employee(&self) -> Option<&employee::Model> {
        match &self.identity {
            Identity::Employee(e) => Some(e),
            Identity::Admin(_) => None,
        }
    }
}

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = Rejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = decode_jwt(token, &state.config.jwt_secret)
            .map_err(|_| unauthorized("Token is not valid"))?;

        let identity = if is_admin_role(&claims.role) {
            admin::Entity::find_by_id(claims.sub)
                .one(&state.db)
                .await
                .ok()
                .flatten()
                .map(Identity::Admin)
        } else {
            employee::Entity::find_by_id(claims.sub)
                .one(&state.db)
                .await
                .ok()
                .flatten()
                .map(Identity::Employee)
        };

        match identity {
            Some(identity) => Ok(CurrentUser {
                identity,
                role: claims.role,
            }),
            None => Err(unauthorized("Token is not valid")),
        }
    }
}

/// Admin-gated routes. Distinct failure modes: a bad token is 401, a valid
/// employee token is 403.
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub admin: admin::Model,
    pub role: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AdminUser {
    type Rejection = Rejection;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = decode_jwt(token, &state.config.jwt_secret)
            .map_err(|_| unauthorized("Token is not valid"))?;

        if !is_admin_role(&claims.role) {
            return Err((
                StatusCode::FORBIDDEN,
                Json(json!({ "message": "Admin access required" })),
            ));
        }

        let admin = admin::Entity::find_by_id(claims.sub)
            .one(&state.db)
            .await
            .ok()
            .flatten()
            .ok_or_else(|| unauthorized("Token is not valid"))?;

        Ok(AdminUser {
            admin,
            role: claims.role,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn password_hash_roundtrip() {
        let hash = hash_password("hunter2").unwrap();
        assert_ne!(hash, "hunter2");
        assert!(verify_password("hunter2", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn jwt_roundtrip_and_secret_mismatch() {
        let token = create_jwt(42, ROLE_EMPLOYEE, "secret-a").unwrap();
        let claims = decode_jwt(&token, "secret-a").unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.role, ROLE_EMPLOYEE);

        assert!(decode_jwt(&token, "secret-b").is_err());
    }
}
