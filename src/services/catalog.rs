//! Product factory: explicit default application before persistence.
//!
//! Defaults that the persistence layer used to apply implicitly (SKU
//! generation, selling-price markup) are a visible step here, invoked by
//! the create handler before the row is inserted.

use chrono::Utc;
use rand::distributions::Alphanumeric;
use rand::Rng;
use sea_orm::Set;
use serde::Deserialize;

use crate::domain::ApiError;
use crate::models::product::{self, CATEGORIES};
use crate::utils::time::now_rfc3339;

const MARKUP_FACTOR: f64 = 1.5;

#[derive(Debug, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub cost_price: f64,
    pub selling_price: Option<f64>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub stock: Option<i32>,
    pub min_stock: Option<i32>,
    pub image_url: Option<String>,
}

pub fn generate_sku() -> String {
    let suffix: String = rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(5)
        .map(|c| (c as char).to_ascii_uppercase())
        .collect();
    format!("PRD{}{}", Utc::now().timestamp_millis(), suffix)
}

/// Unset or zero selling price defaults to a 50% markup over cost.
pub fn default_selling_price(cost_price: f64, selling_price: Option<f64>) -> f64 {
    match selling_price {
        Some(p) if p > 0.0 => p,
        _ => cost_price * MARKUP_FACTOR,
    }
}

pub fn is_valid_category(category: &str) -> bool {
    CATEGORIES.contains(&category)
}

/// Validate and build the row to insert. All defaults applied here.
pub fn new_product(input: NewProduct) -> Result<product::ActiveModel, ApiError> {
    let name = input.name.trim().to_string();
    if name.is_empty() {
        return Err(ApiError::Validation(
            "Name and cost price are required".to_string(),
        ));
    }
    if !input.cost_price.is_finite() || input.cost_price < 0.0 {
        return Err(ApiError::Validation("Invalid cost price".to_string()));
    }

    let category = input.category.unwrap_or_else(|| "other".to_string());
    if !is_valid_category(&category) {
        return Err(ApiError::Validation("Invalid category".to_string()));
    }

    let selling_price = default_selling_price(input.cost_price, input.selling_price);
    if selling_price < 0.0 {
        return Err(ApiError::Validation("Invalid selling price".to_string()));
    }

    let now = now_rfc3339();
    Ok(product::ActiveModel {
        name: Set(name),
        description: Set(input
            .description
            .unwrap_or_else(|| "No description provided".to_string())),
        category: Set(category),
        cost_price: Set(input.cost_price),
        selling_price: Set(selling_price),
        stock: Set(input.stock.unwrap_or(0)),
        min_stock: Set(input.min_stock.unwrap_or(10)),
        sku: Set(generate_sku()),
        image_url: Set(input.image_url.map(|u| u.trim().to_string()).unwrap_or_default()),
        is_active: Set(true),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use sea_orm::ActiveValue;

    #[test]
    fn selling_price_defaults_to_markup() {
        assert_eq!(default_selling_price(100.0, None), 150.0);
        assert_eq!(default_selling_price(100.0, Some(0.0)), 150.0);
        assert_eq!(default_selling_price(100.0, Some(120.0)), 120.0);
    }

    #[test]
    fn sku_has_prefix_and_suffix() {
        let sku = generate_sku();
        assert!(sku.starts_with("PRD"));
        assert!(sku.len() > 8);
        assert_ne!(generate_sku(), sku);
    }

    #[test]
    fn factory_applies_defaults() {
        let model = new_product(NewProduct {
            name: "  Hydra Serum ".to_string(),
            cost_price: 100.0,
            selling_price: None,
            description: None,
            category: None,
            stock: None,
            min_stock: None,
            image_url: None,
        })
        .unwrap();

        assert_eq!(model.name, ActiveValue::Set("Hydra Serum".to_string()));
        assert_eq!(model.selling_price, ActiveValue::Set(150.0));
        assert_eq!(model.category, ActiveValue::Set("other".to_string()));
        assert_eq!(model.min_stock, ActiveValue::Set(10));
    }

    #[test]
    fn factory_rejects_bad_input() {
        let bad_name = new_product(NewProduct {
            name: "   ".to_string(),
            cost_price: 10.0,
            selling_price: None,
            description: None,
            category: None,
            stock: None,
            min_stock: None,
            image_url: None,
        });
        assert!(bad_name.is_err());

        let bad_category = new_product(NewProduct {
            name: "Toner".to_string(),
            cost_price: 10.0,
            selling_price: None,
            description: None,
            category: Some("weapons".to_string()),
            stock: None,
            min_stock: None,
            image_url: None,
        });
        assert!(bad_category.is_err());
    }
}
