use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use sea_orm::{ActiveModelTrait, DatabaseConnection, Set};
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

async fn create_test_employee(
    db: &DatabaseConnection,
    email: &str,
    username: &str,
    commission_per_order: f64,
    salary_toggle: bool,
) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let employee = models::employee::ActiveModel {
        first_name: Set("Test".to_string()),
        last_name: Set("Employee".to_string()),
        email: Set(email.to_string()),
        username: Set(username.to_string()),
        password_hash: Set(auth::hash_password("staff123").unwrap()),
        phone: Set("555-0100".to_string()),
        position: Set("sales_associate".to_string()),
        department: Set("sales".to_string()),
        base_salary: Set(24000.0),
        commission_per_order: Set(commission_per_order),
        hire_date: Set(now.clone()),
        is_active: Set(true),
        termination_date: Set(None),
        salary_toggle: Set(salary_toggle),
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

async fn create_test_product(db: &DatabaseConnection, sku: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    let product = models::product::ActiveModel {
        name: Set("Hydra Serum".to_string()),
        description: Set("No description provided".to_string()),
        category: Set("serum".to_string()),
        cost_price: Set(40.0),
        selling_price: Set(90.0),
        stock: Set(100),
        min_stock: Set(10),
        sku: Set(sku.to_string()),
        image_url: Set(String::new()),
        is_active: Set(true),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };
    product
        .insert(db)
        .await
        .expect("Failed to create product")
        .id
}

fn bearer(id: i32, role: &str) -> String {
    format!("Bearer {}", auth::create_jwt(id, role, TEST_SECRET).unwrap())
}

fn json_request(method: &str, uri: &str, token: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::AUTHORIZATION, token)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn read_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn place_order(app: &Router, employee_token: &str, product_id: i32) {
    let req = json_request(
        "POST",
        "/orders",
        employee_token,
        serde_json::json!({
            "customer_name": "Walk-in",
            "customer_phone": "555-1234",
            "items": [{ "product_id": product_id, "quantity": 1 }]
        }),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
}

async fn commission_total(app: &Router, admin_token: &str, employee_id: i32) -> f64 {
    let req = Request::builder()
        .method("GET")
        .uri(format!("/employees/{employee_id}/orders"))
        .header(header::AUTHORIZATION, admin_token)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    read_json(response).await["total_commission"].as_f64().unwrap()
}

#[tokio::test]
async fn test_commission_accrues_resets_and_resumes() {
    let (app, state) = setup_app().await;
    let admin_id = create_test_admin(&state.db).await;
    let employee_id =
        create_test_employee(&state.db, "nadia@test.local", "nadia", 50.0, true).await;
    let product_id = create_test_product(&state.db, "SKU-COMM-1").await;

    let admin_token = bearer(admin_id, "admin");
    let employee_token = bearer(employee_id, "employee");

    for _ in 0..3 {
        place_order(&app, &employee_token, product_id).await;
    }
    assert_eq!(commission_total(&app, &admin_token, employee_id).await, 150.0);

    // Reset moves the cutoff; history is preserved.
    let req = json_request(
        "POST",
        &format!("/employees/{employee_id}/reset-commission"),
        &admin_token,
        serde_json::json!({}),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;
    assert_eq!(body["total_orders_kept"].as_u64().unwrap(), 3);

    assert_eq!(commission_total(&app, &admin_token, employee_id).await, 0.0);

    // A second reset with no new orders still reads back as zero.
    let req = json_request(
        "POST",
        &format!("/employees/{employee_id}/reset-commission"),
        &admin_token,
        serde_json::json!({}),
    );
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(commission_total(&app, &admin_token, employee_id).await, 0.0);

    // New accrual starts from the order after the cutoff.
    tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    place_order(&app, &employee_token, product_id).await;
    assert_eq!(commission_total(&app, &admin_token, employee_id).await, 50.0);
}

#[tokio::test]
async fn test_salary_toggle_off_forces_zero_commission() {
    let (app, state) = setup_app().await;
    let admin_id = create_test_admin(&state.db).await;
    let employee_id =
        create_test_employee(&state.db, "omar@test.local", "omar", 50.0, false).await;
    let product_id = create_test_product(&state.db, "SKU-COMM-2").await;

    let admin_token = bearer(admin_id, "admin");
    let employee_token = bearer(employee_id, "employee");

    for _ in 0..4 {
        place_order(&app, &employee_token, product_id).await;
    }

    let req = Request::builder()
        .method("GET")
        .uri(format!("/employees/{employee_id}/orders"))
        .header(header::AUTHORIZATION, &admin_token)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;

    assert_eq!(body["commission_eligible_order_count"].as_u64().unwrap(), 4);
    assert_eq!(body["total_commission"].as_f64().unwrap(), 0.0);
}

#[tokio::test]
async fn test_monthly_salary_is_base_over_twelve_plus_commission() {
    let (app, state) = setup_app().await;
    let admin_id = create_test_admin(&state.db).await;
    let employee_id =
        create_test_employee(&state.db, "amira@test.local", "amira", 50.0, true).await;
    let product_id = create_test_product(&state.db, "SKU-COMM-3").await;

    let admin_token = bearer(admin_id, "admin");
    let employee_token = bearer(employee_id, "employee");

    place_order(&app, &employee_token, product_id).await;
    place_order(&app, &employee_token, product_id).await;

    let now = chrono::Utc::now();
    use chrono::Datelike;
    let req = Request::builder()
        .method("GET")
        .uri(format!(
            "/employees/{employee_id}/salary/{}/{}",
            now.year(),
            now.month()
        ))
        .header(header::AUTHORIZATION, &admin_token)
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(req).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = read_json(response).await;

    assert_eq!(body["base_salary"].as_f64().unwrap(), 2000.0);
    assert_eq!(body["order_count"].as_u64().unwrap(), 2);
    assert_eq!(body["commission_amount"].as_f64().unwrap(), 100.0);
    assert_eq!(body["total_salary"].as_f64().unwrap(), 2100.0);
}
