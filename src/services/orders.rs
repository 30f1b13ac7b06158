//! Order pricing and lifecycle.
//!
//! Pricing resolves each line against the product catalog and snapshots
//! price-at-time and cost-at-time, so later product edits never change
//! historical orders. Stock is not decremented on creation; cancellation
//! restores stock per line (no cross-row transaction, see DESIGN.md).

use chrono::Utc;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::ApiError;
use crate::models::{order, order_item, product};
use crate::utils::time::now_rfc3339;

#[derive(Debug, Deserialize)]
pub struct OrderItemInput {
    pub product_id: i32,
    pub quantity: i32,
    /// Per-line price override from the entry form. Accepted as a number or
    /// a numeric string; anything non-positive falls back to the product's
    /// selling price.
    pub custom_price: Option<Value>,
}

#[derive(Debug, Deserialize)]
pub struct OrderInput {
    pub customer_name: String,
    pub customer_phone: String,
    #[serde(default)]
    pub customer_email: Option<String>,
    #[serde(default)]
    pub employee_id: Option<i32>,
    #[serde(default)]
    pub notes: Option<String>,
    pub items: Vec<OrderItemInput>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PricedItem {
    pub product_id: i32,
    pub quantity: i32,
    pub price_at_time: f64,
    pub cost_at_time: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct PricedOrder {
    pub items: Vec<PricedItem>,
    pub subtotal: f64,
    pub total_cost: f64,
}

/// Caller-supplied override wins when it parses as a positive number.
pub fn effective_price(custom: Option<&Value>, fallback: f64) -> f64 {
    let parsed = match custom {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    match parsed {
        Some(p) if p.is_finite() && p > 0.0 => p,
        _ => fallback,
    }
}

pub fn line_totals(unit_price: f64, unit_cost: f64, quantity: i32) -> (f64, f64) {
    let q = quantity as f64;
    (unit_price * q, unit_cost * q)
}

/// Resolve every line against the catalog and accumulate totals.
pub async fn price_items(
    db: &DatabaseConnection,
    items: &[OrderItemInput],
) -> Result<PricedOrder, ApiError> {
    if items.is_empty() {
        return Err(ApiError::Validation(
            "Order must contain at least one item".to_string(),
        ));
    }

    let mut subtotal = 0.0;
    let mut total_cost = 0.0;
    let mut priced = Vec::with_capacity(items.len());

    for item in items {
        if item.quantity < 1 {
            return Err(ApiError::Validation(
                "Item quantity must be at least 1".to_string(),
            ));
        }

        let product = product::Entity::find_by_id(item.product_id)
            .one(db)
            .await?
            .ok_or_else(|| {
                ApiError::NotFound(format!("Product not found: {}", item.product_id))
            })?;

        let price = effective_price(item.custom_price.as_ref(), product.selling_price);
        let (line_revenue, line_cost) = line_totals(price, product.cost_price, item.quantity);

        subtotal += line_revenue;
        total_cost += line_cost;

        priced.push(PricedItem {
            product_id: product.id,
            quantity: item.quantity,
            price_at_time: price,
            cost_at_time: product.cost_price,
        });
    }

    Ok(PricedOrder {
        items: priced,
        subtotal,
        total_cost,
    })
}

/// Timestamp plus a zero-padded sequence derived from the current count.
pub async fn next_order_number(db: &DatabaseConnection) -> Result<String, ApiError> {
    let count = order::Entity::find().count(db).await?;
    Ok(format!(
        "VND{}{:04}",
        Utc::now().timestamp_millis(),
        count + 1
    ))
}

/// Create and persist an order on the simplified entry path:
/// tax = shipping = discount = 0, so total == subtotal.
pub async fn create_order(
    db: &DatabaseConnection,
    input: OrderInput,
    created_by: Option<i32>,
) -> Result<order::Model, ApiError> {
    let priced = price_items(db, &input.items).await?;
    let order_number = next_order_number(db).await?;
    let now = now_rfc3339();

    let new_order = order::ActiveModel {
        order_number: Set(order_number),
        customer_name: Set(input.customer_name),
        customer_email: Set(input.customer_email.unwrap_or_default()),
        customer_phone: Set(input.customer_phone),
        employee_id: Set(input.employee_id),
        created_by: Set(created_by),
        subtotal: Set(priced.subtotal),
        tax: Set(0.0),
        shipping: Set(0.0),
        discount: Set(0.0),
        total: Set(priced.subtotal),
        total_cost: Set(priced.total_cost),
        status: Set("pending".to_owned()),
        payment_status: Set("pending".to_owned()),
        payment_method: Set("cash".to_owned()),
        notes: Set(input.notes.unwrap_or_default()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    };

    let saved = new_order.insert(db).await?;
    insert_items(db, saved.id, &priced.items).await?;

    Ok(saved)
}

/// Re-price and replace the line items of an existing order.
pub async fn update_order(
    db: &DatabaseConnection,
    existing: order::Model,
    input: OrderInput,
) -> Result<order::Model, ApiError> {
    let priced = price_items(db, &input.items).await?;

    let order_id = existing.id;
    let mut active: order::ActiveModel = existing.into();
    active.customer_name = Set(input.customer_name);
    active.customer_phone = Set(input.customer_phone);
    if let Some(email) = input.customer_email {
        active.customer_email = Set(email);
    }
    active.employee_id = Set(input.employee_id);
    active.subtotal = Set(priced.subtotal);
    active.total = Set(priced.subtotal);
    active.total_cost = Set(priced.total_cost);
    active.updated_at = Set(now_rfc3339());

    let updated = active.update(db).await?;

    order_item::Entity::delete_many()
        .filter(order_item::Column::OrderId.eq(order_id))
        .exec(db)
        .await?;
    insert_items(db, order_id, &priced.items).await?;

    Ok(updated)
}

async fn insert_items(
    db: &DatabaseConnection,
    order_id: i32,
    items: &[PricedItem],
) -> Result<(), ApiError> {
    for item in items {
        let row = order_item::ActiveModel {
            order_id: Set(order_id),
            product_id: Set(item.product_id),
            quantity: Set(item.quantity),
            price_at_time: Set(item.price_at_time),
            cost_at_time: Set(item.cost_at_time),
            ..Default::default()
        };
        row.insert(db).await?;
    }
    Ok(())
}

pub async fn load_items(
    db: &DatabaseConnection,
    order_id: i32,
) -> Result<Vec<order_item::Model>, ApiError> {
    Ok(order_item::Entity::find()
        .filter(order_item::Column::OrderId.eq(order_id))
        .order_by_asc(order_item::Column::Id)
        .all(db)
        .await?)
}

/// Cancel an order and restore stock for each line. The per-line stock
/// writes and the final status write are separate statements; a crash in
/// between can leave stock partially restored (accepted, see DESIGN.md).
pub async fn cancel_order(db: &DatabaseConnection, id: i32) -> Result<order::Model, ApiError> {
    let existing = order::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Order not found".to_string()))?;

    if existing.status == "cancelled" {
        return Err(ApiError::Validation(
            "Order is already cancelled".to_string(),
        ));
    }

    let items = load_items(db, existing.id).await?;
    for item in items {
        if let Some(p) = product::Entity::find_by_id(item.product_id).one(db).await? {
            let restored = p.stock + item.quantity;
            let mut active: product::ActiveModel = p.into();
            active.stock = Set(restored);
            active.updated_at = Set(now_rfc3339());
            active.update(db).await?;
        }
    }

    let mut active: order::ActiveModel = existing.into();
    active.status = Set("cancelled".to_owned());
    active.updated_at = Set(now_rfc3339());
    Ok(active.update(db).await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn custom_price_wins_when_positive() {
        assert_eq!(effective_price(Some(&json!(60.0)), 90.0), 60.0);
        assert_eq!(effective_price(Some(&json!("60")), 90.0), 60.0);
        assert_eq!(effective_price(Some(&json!("  72.5 ")), 90.0), 72.5);
    }

    #[test]
    fn bad_custom_price_falls_back_to_selling_price() {
        assert_eq!(effective_price(None, 90.0), 90.0);
        assert_eq!(effective_price(Some(&json!(0)), 90.0), 90.0);
        assert_eq!(effective_price(Some(&json!(-5)), 90.0), 90.0);
        assert_eq!(effective_price(Some(&json!("free")), 90.0), 90.0);
        assert_eq!(effective_price(Some(&json!(null)), 90.0), 90.0);
    }

    #[test]
    fn line_totals_scale_by_quantity() {
        // quantity 2, cost 40, custom price 60 -> revenue 120, cost 80
        let (revenue, cost) = line_totals(60.0, 40.0, 2);
        assert_eq!(revenue, 120.0);
        assert_eq!(cost, 80.0);
        assert_eq!(revenue - cost, 40.0);
    }
}
