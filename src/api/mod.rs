pub mod analytics;
pub mod auth;
pub mod employees;
pub mod health;
pub mod orders;
pub mod products;
pub mod upload;

use axum::{
    routing::{get, patch, post, put},
    Router,
};

use crate::db::AppState;

pub fn api_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health::health_check))
        // Auth
        .route("/auth/login", post(auth::login))
        .route("/auth/signup", post(auth::signup))
        .route("/auth/admin/signup", post(auth::admin_signup))
        .route("/auth/profile", get(auth::profile))
        .route("/auth/employee/profile", put(auth::update_employee_profile))
        .route("/auth/logout", post(auth::logout))
        // Products
        .route(
            "/products",
            get(products::list_products).post(products::create_product),
        )
        .route("/products/meta/categories", get(products::list_categories))
        .route(
            "/products/:id",
            get(products::get_product)
                .put(products::update_product)
                .delete(products::delete_product),
        )
        .route("/products/:id/stock", patch(products::update_stock))
        // Orders
        .route("/orders", get(orders::list_orders).post(orders::create_order))
        .route("/orders/stats/summary", get(orders::stats_summary))
        .route("/orders/employee/my-orders", get(orders::my_orders))
        .route(
            "/orders/:id",
            get(orders::get_order)
                .put(orders::update_order)
                .delete(orders::delete_order),
        )
        .route("/orders/:id/status", patch(orders::update_status))
        .route("/orders/:id/cancel", patch(orders::cancel_order))
        // Employees
        .route(
            "/employees",
            get(employees::list_employees).post(employees::create_employee),
        )
        .route("/employees/meta/positions", get(employees::list_positions))
        .route(
            "/employees/meta/departments",
            get(employees::list_departments),
        )
        .route(
            "/employees/salary-summary/:year/:month",
            get(employees::salary_summary),
        )
        .route(
            "/employees/:id",
            get(employees::get_employee).put(employees::update_employee),
        )
        .route(
            "/employees/:id/terminate",
            patch(employees::terminate_employee),
        )
        .route(
            "/employees/:id/salary/:year/:month",
            get(employees::monthly_salary),
        )
        .route("/employees/:id/orders", get(employees::employee_orders))
        .route(
            "/employees/:id/reset-commission",
            post(employees::reset_commission),
        )
        // Analytics
        .route("/analytics/dashboard", get(analytics::dashboard))
        .route("/analytics/sales", get(analytics::sales))
        .route(
            "/analytics/products/performance",
            get(analytics::product_performance),
        )
        .route("/analytics/profit-loss", get(analytics::profit_loss))
        .route("/analytics/inventory", get(analytics::inventory))
        // Uploads
        .route("/uploads/image", post(upload::upload_image))
        .route("/uploads/:filename", get(upload::serve_image))
        .with_state(state)
}
