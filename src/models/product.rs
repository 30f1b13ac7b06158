use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

pub const CATEGORIES: &[&str] = &[
    "serum",
    "facewash",
    "sunscreen",
    "moisturizer",
    "cleanser",
    "toner",
    "mask",
    "cream",
    "eye_cream",
    "vaseline",
    "lip_balm",
    "micellar_water",
    "night_cream",
    "oil",
    "shampoo",
    "lotion",
    "peeling_gel",
    "shower_gel",
    "other",
];

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "products")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub name: String,
    pub description: String,
    pub category: String,
    pub cost_price: f64,
    pub selling_price: f64,
    pub stock: i32,
    pub min_stock: i32,
    pub sku: String,
    pub image_url: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(has_many = "super::order_item::Entity")]
    OrderItems,
}

impl Related<super::order_item::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::OrderItems.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    pub fn is_low_stock(&self) -> bool {
        self.stock <= self.min_stock
    }
}

/// What employees see when listing products: no cost price, no margin data.
#[derive(Debug, Serialize, Deserialize)]
pub struct ProductPublic {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub category: String,
    pub selling_price: f64,
    pub stock: i32,
    pub sku: String,
    pub image_url: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl From<Model> for ProductPublic {
    fn from(m: Model) -> Self {
        Self {
            id: m.id,
            name: m.name,
            description: m.description,
            category: m.category,
            selling_price: m.selling_price,
            stock: m.stock,
            sku: m.sku,
            image_url: m.image_url,
            is_active: m.is_active,
            created_at: m.created_at,
            updated_at: m.updated_at,
        }
    }
}
