use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const POSITIONS: &[&str] = &[
    "manager",
    "sales_associate",
    "inventory_clerk",
    "customer_service",
    "admin",
    "other",
];

pub const DEPARTMENTS: &[&str] = &[
    "sales",
    "inventory",
    "customer_service",
    "administration",
    "marketing",
    "other",
];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "employees")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub username: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub phone: String,
    pub position: String,
    pub department: String,
    /// Annual base salary; monthly pay is base_salary / 12.
    pub base_salary: f64,
    /// Flat amount earned per attributed order.
    pub commission_per_order: f64,
    pub hire_date: String,
    pub is_active: bool,
    pub termination_date: Option<String>,
    /// When false, commission is reported as 0 regardless of order count.
    pub salary_toggle: bool,
    pub last_login: Option<String>,
    /// Commission reset cutoff. Orders created at or before this timestamp
    /// are excluded from unpaid-commission totals.
    pub commission_paid_date: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order::Entity")]
    Orders,
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Reduced view returned by the profile routes: identity and pay settings
/// an employee may see about themselves, nothing hashed or administrative.
#[derive(Debug, Serialize, Deserialize)]
pub struct EmployeeProfile {
    pub id: i32,
    pub username: String,
    pub email: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub position: String,
    pub department: String,
    pub salary_toggle: bool,
}

impl From<Model> for EmployeeProfile {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            username: m.username,
            email: m.email,
            first_name: m.first_name,
            last_name: m.last_name,
            phone: m.phone,
            position: m.position,
            department: m.department,
            salary_toggle: m.salary_toggle,
        }
    }
}
