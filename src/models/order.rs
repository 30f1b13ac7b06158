use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const STATUSES: &[&str] = &["pending", "processing", "shipped", "delivered", "cancelled"];
pub const PAYMENT_STATUSES: &[&str] = &["pending", "paid", "failed", "refunded"];
pub const PAYMENT_METHODS: &[&str] = &["cash", "card", "online", "bank_transfer"];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "orders")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub order_number: String,
    pub customer_name: String,
    pub customer_email: String,
    pub customer_phone: String,
    /// Commission attribution: the employee who earns per-order commission.
    pub employee_id: Option<i32>,
    /// Authorship: the employee who entered the order. Independent from
    /// attribution; an admin-created order has no author.
    pub created_by: Option<i32>,
    pub subtotal: f64,
    pub tax: f64,
    pub shipping: f64,
    pub discount: f64,
    pub total: f64,
    pub total_cost: f64,
    pub status: String,
    pub payment_status: String,
    pub payment_method: String,
    pub notes: String,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    Items,
    #[sea_orm(
        belongs_to = "super::employee::Entity",
        from = "Column::EmployeeId",
        to = "super::employee::Column::Id",
        on_update = "NoAction",
        on_delete = "SetNull"
    )]
    Employee,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl Related<super::employee::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Employee.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// Derived, never stored.
    pub fn profit(&self) -> f64 {
        self.total - self.total_cost
    }
}
