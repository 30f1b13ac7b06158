//! Demo data for local development, applied when SEED_DEMO is set.

use sea_orm::sea_query::OnConflict;
use sea_orm::*;

use crate::auth::hash_password;
use crate::models::{admin, employee, product};
use crate::utils::time::now_rfc3339;

pub async fn seed_demo_data(db: &DatabaseConnection) -> Result<(), DbErr> {
    let now = now_rfc3339();

    let admin_password =
        hash_password("admin123").map_err(|e| DbErr::Custom(format!("hash: {e}")))?;
    let staff_password =
        hash_password("staff123").map_err(|e| DbErr::Custom(format!("hash: {e}")))?;

    let owner = admin::ActiveModel {
        username: Set("admin".to_owned()),
        email: Set("admin@vendora.local".to_owned()),
        password_hash: Set(admin_password),
        first_name: Set("Store".to_owned()),
        last_name: Set("Owner".to_owned()),
        role: Set("super_admin".to_owned()),
        is_active: Set(true),
        last_login: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now.clone()),
        ..Default::default()
    };
    admin::Entity::insert(owner)
        .on_conflict(
            OnConflict::column(admin::Column::Username)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(db)
        .await?;

    let staff = [
        ("Nadia", "Rahman", "nadia@vendora.local", "nadia", "sales_associate", "sales", 24000.0, 50.0),
        ("Omar", "Siddique", "omar@vendora.local", "omar", "inventory_clerk", "inventory", 21600.0, 25.0),
    ];
    for (first, last, email, username, position, department, salary, rate) in staff {
        let row = employee::ActiveModel {
            first_name: Set(first.to_owned()),
            last_name: Set(last.to_owned()),
            email: Set(email.to_owned()),
            username: Set(username.to_owned()),
            password_hash: Set(staff_password.clone()),
            phone: Set("555-0100".to_owned()),
            position: Set(position.to_owned()),
            department: Set(department.to_owned()),
            base_salary: Set(salary),
            commission_per_order: Set(rate),
            hire_date: Set(now.clone()),
            is_active: Set(true),
            termination_date: Set(None),
            salary_toggle: Set(true),
            last_login: Set(None),
            commission_paid_date: Set(None),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        employee::Entity::insert(row)
            .on_conflict(
                OnConflict::column(employee::Column::Email)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    let catalog = [
        ("Hydra Boost Serum", "serum", 420.0, 650.0, 40, "VND-SRM-001"),
        ("Gentle Foam Facewash", "facewash", 180.0, 280.0, 60, "VND-FW-001"),
        ("Daily Shield Sunscreen SPF50", "sunscreen", 350.0, 525.0, 35, "VND-SUN-001"),
        ("Night Repair Cream", "night_cream", 510.0, 799.0, 20, "VND-NC-001"),
        ("Rose Micellar Water", "micellar_water", 220.0, 330.0, 8, "VND-MW-001"),
    ];
    for (name, category, cost, selling, stock, sku) in catalog {
        let row = product::ActiveModel {
            name: Set(name.to_owned()),
            description: Set("No description provided".to_owned()),
            category: Set(category.to_owned()),
            cost_price: Set(cost),
            selling_price: Set(selling),
            stock: Set(stock),
            min_stock: Set(10),
            sku: Set(sku.to_owned()),
            image_url: Set(String::new()),
            is_active: Set(true),
            created_at: Set(now.clone()),
            updated_at: Set(now.clone()),
            ..Default::default()
        };
        product::Entity::insert(row)
            .on_conflict(
                OnConflict::column(product::Column::Sku)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(db)
            .await?;
    }

    Ok(())
}
