use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, Set};
use tower::util::ServiceExt; // for `oneshot`

use vendora::db::{self, AppState};
use vendora::{api, auth, config::Config, models};

const TEST_SECRET: &str = "test-secret";

fn test_config() -> Config {
    Config {
        database_url: "sqlite::memory:".to_string(),
        port: 0,
        jwt_secret: TEST_SECRET.to_string(),
        cors_allowed_origins: Vec::new(),
        upload_dir: std::env::temp_dir()
            .join("vendora-test-uploads")
            .to_string_lossy()
            .to_string(),
    }
}

async fn setup_app() -> (Router, AppState) {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let state = AppState::new(db, test_config());
    (api::api_router(state.clone()), state)
}

async fn create_test_admin(db: &DatabaseConnection) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let admin = models::admin::ActiveModel {
        username: Set("test_admin".to_string()),
        email: Set("admin@test.local".to_string()),
        password_hash: Set(auth::hash_password("admin123").unwrap()),
        first_name: Set("Test".to_string()),
        last_name: Set("Admin".to_string()),
        role: Set("admin".to_string()),
        is_active: Set(true),
        last_login: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    admin.insert(db).await.expect("Failed to create admin").id
}

async fn create_test_employee(db: &DatabaseConnection) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let employee = models::employee::ActiveModel {
        first_name: Set("Test".to_string()),
        last_name: Set("Employee".to_string()),
        email: Set("staff@test.local".to_string()),
        username: Set("staff".to_string()),
        password_hash: Set(auth::hash_password("staff123").unwrap()),
        phone: Set("555-0100".to_string()),
        position: Set("sales_associate".to_string()),
        department: Set("sales".to_string()),
        base_salary: Set(24000.0),
        commission_per_order: Set(50.0),
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
    employee
        .insert(db)
        .await
        .expect("Failed to create employee")
        .id
}

fn bearer(id: i32, role: &str) -> String {
    format!("Bearer {}", auth::create_jwt(id, role, TEST_SECRET).unwrap())
}

async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_missing_token_is_unauthorized() {
    let (app, _state) = setup_app().await;

    let req = Request::builder()
        .method("GET")
        .uri("/orders")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["message"], "No token provided, authorization denied");
}

#[tokio::test]
async fn test_garbage_token_is_unauthorized() {
    let (app, _state) = setup_app().await;

    let req = Request::builder()
        .method("GET")
        .uri("/products")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Token is not valid");
}

#[tokio::test]
async fn test_token_signed_with_other_secret_is_rejected() {
    let (app, state) = setup_app().await;
    let admin_id = create_test_admin(&state.db).await;

    let forged = auth::create_jwt(admin_id, "admin", "other-secret").unwrap();
    let req = Request::builder()
        .method("GET")
        .uri("/analytics/dashboard")
        .header(header::AUTHORIZATION, format!("Bearer {forged}"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_employee_is_forbidden_from_admin_routes() {
    let (app, state) = setup_app().await;
    let employee_id = create_test_employee(&state.db).await;
    let token = bearer(employee_id, "employee");

    for uri in ["/analytics/dashboard", "/analytics/inventory"] {
        let req = Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::AUTHORIZATION, &token)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::FORBIDDEN, "uri {uri}");
    }

    // Product creation is also admin-only.
    let req = Request::builder()
        .method("POST")
        .uri("/products")
        .header(header::AUTHORIZATION, &token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "name": "Serum", "cost_price": 10.0 }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Admin access required");
}

#[tokio::test]
async fn test_missing_entities_are_not_found() {
    let (app, state) = setup_app().await;
    let admin_id = create_test_admin(&state.db).await;
    let token = bearer(admin_id, "admin");

    for uri in ["/products/999", "/orders/999", "/employees/999"] {
        let req = Request::builder()
            .method("GET")
            .uri(uri)
            .header(header::AUTHORIZATION, &token)
            .body(Body::empty())
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "uri {uri}");
    }
}

#[tokio::test]
async fn test_order_referencing_missing_product_is_not_found() {
    let (app, state) = setup_app().await;
    let employee_id = create_test_employee(&state.db).await;

    let req = Request::builder()
        .method("POST")
        .uri("/orders")
        .header(header::AUTHORIZATION, bearer(employee_id, "employee"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({
                "customer_name": "Walk-in",
                "customer_phone": "555-1234",
                "items": [{ "product_id": 424242, "quantity": 1 }]
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Product not found: 424242");
}

#[tokio::test]
async fn test_invalid_product_payloads_are_bad_requests() {
    let (app, state) = setup_app().await;
    let admin_id = create_test_admin(&state.db).await;
    let token = bearer(admin_id, "admin");

    let cases = [
        serde_json::json!({ "name": "  ", "cost_price": 10.0 }),
        serde_json::json!({ "name": "Serum", "cost_price": -1.0 }),
        serde_json::json!({ "name": "Serum", "cost_price": 10.0, "category": "weapons" }),
    ];
    for payload in cases {
        let req = Request::builder()
            .method("POST")
            .uri("/products")
            .header(header::AUTHORIZATION, &token)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(payload.to_string()))
            .unwrap();
        let response = app.clone().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}

#[tokio::test]
async fn test_empty_order_is_a_bad_request() {
    let (app, state) = setup_app().await;
    let employee_id = create_test_employee(&state.db).await;

    let req = Request::builder()
        .method("POST")
        .uri("/orders")
        .header(header::AUTHORIZATION, bearer(employee_id, "employee"))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({
                "customer_name": "Walk-in",
                "customer_phone": "555-1234",
                "items": []
            })
            .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Order must contain at least one item");
}

#[tokio::test]
async fn test_deactivated_employee_cannot_log_in() {
    let (app, state) = setup_app().await;
    let employee_id = create_test_employee(&state.db).await;

    let found = models::employee::Entity::find_by_id(employee_id)
        .one(&state.db)
        .await
        .unwrap()
        .unwrap();
    let mut active: models::employee::ActiveModel = found.into();
    active.is_active = Set(false);
    active.update(&state.db).await.unwrap();

    let req = Request::builder()
        .method("POST")
        .uri("/auth/login")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(
            serde_json::json!({ "email": "staff@test.local", "password": "staff123" })
                .to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let body = read_json(response).await;
    assert_eq!(body["message"], "Account is deactivated");
}
