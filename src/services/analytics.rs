//! Read-only aggregations for the reporting endpoints.
//!
//! Everything here is recomputed from the orders and products tables on
//! each request. Rows are fetched and grouped in Rust; the datasets these
//! reports run over are small-shop sized.

use std::collections::HashMap;

use chrono::{Datelike, Utc};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use serde::Serialize;
use serde_json::{json, Value};

use crate::domain::ApiError;
use crate::models::{employee, order, order_item, product};
use crate::utils::time::{parse_rfc3339, period_starts};

/// Margin as a percentage; 0 when there is no revenue, never NaN.
pub fn margin(profit: f64, revenue: f64) -> f64 {
    if revenue > 0.0 {
        profit / revenue * 100.0
    } else {
        0.0
    }
}

#[derive(Debug, Default)]
struct Accum {
    orders: u64,
    revenue: f64,
    cost: f64,
}

impl Accum {
    fn add(&mut self, o: &order::Model) {
        self.orders += 1;
        self.revenue += o.total;
        self.cost += o.total_cost;
    }

    fn profit(&self) -> f64 {
        self.revenue - self.cost
    }
}

pub async fn dashboard(db: &DatabaseConnection) -> Result<Value, ApiError> {
    let (today_start, month_start, year_start) = period_starts(Utc::now());

    // Year-to-date covers the two narrower windows, one fetch is enough.
    let orders = order::Entity::find()
        .filter(order::Column::CreatedAt.gte(year_start.clone()))
        .all(db)
        .await?;

    let mut today = Accum::default();
    let mut monthly = Accum::default();
    let mut yearly = Accum::default();
    for o in &orders {
        yearly.add(o);
        if o.created_at >= month_start {
            monthly.add(o);
        }
        if o.created_at >= today_start {
            today.add(o);
        }
    }

    let products = product::Entity::find()
        .filter(product::Column::IsActive.eq(true))
        .all(db)
        .await?;
    let low_stock = products.iter().filter(|p| p.is_low_stock()).count();

    let employees = employee::Entity::find()
        .filter(employee::Column::IsActive.eq(true))
        .all(db)
        .await?;

    Ok(json!({
        "today": {
            "orders": today.orders,
            "revenue": today.revenue,
            "profit": today.profit(),
        },
        "monthly": {
            "orders": monthly.orders,
            "revenue": monthly.revenue,
            "cost": monthly.cost,
            "profit": monthly.profit(),
        },
        "yearly": {
            "orders": yearly.orders,
            "revenue": yearly.revenue,
            "cost": yearly.cost,
            "profit": yearly.profit(),
        },
        "inventory": {
            "totalProducts": products.len(),
            "lowStockProducts": low_stock,
        },
        "employees": {
            "total": employees.len(),
        },
    }))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SalesPeriod {
    Daily,
    Monthly,
    Yearly,
}

impl SalesPeriod {
    /// Unknown values fall back to monthly, matching the dashboard client.
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("daily") => SalesPeriod::Daily,
            Some("yearly") => SalesPeriod::Yearly,
            _ => SalesPeriod::Monthly,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SalesBucket {
    pub year: i32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub month: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub day: Option<u32>,
    pub total_orders: u64,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub average_order_value: f64,
    pub profit: f64,
    pub profit_margin: f64,
}

/// Group orders into calendar buckets, optionally restricted to a year or
/// a single month of a year. Buckets come back in chronological order.
pub async fn sales_by_period(
    db: &DatabaseConnection,
    period: SalesPeriod,
    year: Option<i32>,
    month: Option<u32>,
) -> Result<Vec<SalesBucket>, ApiError> {
    let mut query = order::Entity::find();
    if let Some(y) = year {
        if let Some(m) = month {
            let (start, end) = crate::utils::time::month_bounds(y, m)
                .ok_or_else(|| ApiError::Validation("Invalid year or month".to_string()))?;
            query = query
                .filter(order::Column::CreatedAt.gte(start))
                .filter(order::Column::CreatedAt.lt(end));
        } else {
            let (start, _) = crate::utils::time::month_bounds(y, 1)
                .ok_or_else(|| ApiError::Validation("Invalid year".to_string()))?;
            let (end, _) = crate::utils::time::month_bounds(y + 1, 1)
                .ok_or_else(|| ApiError::Validation("Invalid year".to_string()))?;
            query = query
                .filter(order::Column::CreatedAt.gte(start))
                .filter(order::Column::CreatedAt.lt(end));
        }
    }
    let orders = query.all(db).await?;

    let mut buckets: HashMap<(i32, Option<u32>, Option<u32>), Accum> = HashMap::new();
    for o in &orders {
        let Some(created) = parse_rfc3339(&o.created_at) else {
            continue;
        };
        let key = match period {
            SalesPeriod::Daily => (created.year(), Some(created.month()), Some(created.day())),
            SalesPeriod::Monthly => (created.year(), Some(created.month()), None),
            SalesPeriod::Yearly => (created.year(), None, None),
        };
        buckets.entry(key).or_default().add(o);
    }

    let mut out: Vec<SalesBucket> = buckets
        .into_iter()
        .map(|((year, month, day), acc)| {
            let profit = acc.profit();
            SalesBucket {
                year,
                month,
                day,
                total_orders: acc.orders,
                total_revenue: acc.revenue,
                total_cost: acc.cost,
                average_order_value: if acc.orders > 0 {
                    acc.revenue / acc.orders as f64
                } else {
                    0.0
                },
                profit,
                profit_margin: margin(profit, acc.revenue),
            }
        })
        .collect();
    out.sort_by_key(|b| (b.year, b.month, b.day));
    Ok(out)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PerformanceSort {
    Revenue,
    Quantity,
    Profit,
}

impl PerformanceSort {
    pub fn parse(s: Option<&str>) -> Self {
        match s {
            Some("quantity") => PerformanceSort::Quantity,
            Some("profit") => PerformanceSort::Profit,
            _ => PerformanceSort::Revenue,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ProductPerformance {
    pub product_id: i32,
    pub name: String,
    pub sku: String,
    pub category: String,
    pub total_quantity: i64,
    pub total_revenue: f64,
    pub total_cost: f64,
    pub order_count: u64,
    pub profit: f64,
    pub profit_margin: f64,
}

/// Per-product totals across all order lines, ranked descending by the
/// requested measure and truncated to `limit`.
pub async fn product_performance(
    db: &DatabaseConnection,
    sort_by: PerformanceSort,
    limit: usize,
) -> Result<Vec<ProductPerformance>, ApiError> {
    let items = order_item::Entity::find().all(db).await?;

    #[derive(Default)]
    struct Totals {
        quantity: i64,
        revenue: f64,
        cost: f64,
        lines: u64,
    }
    let mut per_product: HashMap<i32, Totals> = HashMap::new();
    for item in &items {
        let t = per_product.entry(item.product_id).or_default();
        t.quantity += item.quantity as i64;
        t.revenue += item.price_at_time * item.quantity as f64;
        t.cost += item.cost_at_time * item.quantity as f64;
        t.lines += 1;
    }

    let mut out = Vec::with_capacity(per_product.len());
    for (product_id, totals) in per_product {
        // Lines referencing a since-deleted product are dropped from the
        // ranking rather than reported as an unnamed row.
        let Some(p) = product::Entity::find_by_id(product_id).one(db).await? else {
            continue;
        };
        let profit = totals.revenue - totals.cost;
        out.push(ProductPerformance {
            product_id,
            name: p.name,
            sku: p.sku,
            category: p.category,
            total_quantity: totals.quantity,
            total_revenue: totals.revenue,
            total_cost: totals.cost,
            order_count: totals.lines,
            profit,
            profit_margin: margin(profit, totals.revenue),
        });
    }

    out.sort_by(|a, b| {
        let ord = match sort_by {
            PerformanceSort::Quantity => a.total_quantity.cmp(&b.total_quantity),
            PerformanceSort::Profit => a
                .profit
                .partial_cmp(&b.profit)
                .unwrap_or(std::cmp::Ordering::Equal),
            PerformanceSort::Revenue => a
                .total_revenue
                .partial_cmp(&b.total_revenue)
                .unwrap_or(std::cmp::Ordering::Equal),
        };
        ord.reverse()
    });
    out.truncate(limit);
    Ok(out)
}

/// Gross profit from orders minus salary expense over the period.
/// Salary expense = sum of active employees' monthly base salaries,
/// multiplied by the number of 30-day months the period spans (rounded up,
/// minimum 1).
pub async fn profit_loss(
    db: &DatabaseConnection,
    start_date: Option<&str>,
    end_date: Option<&str>,
) -> Result<Value, ApiError> {
    let mut query = order::Entity::find();
    let mut start_parsed = None;
    let mut end_parsed = None;
    if let Some(s) = start_date {
        let dt = crate::utils::time::parse_date_param(s)
            .ok_or_else(|| ApiError::Validation(format!("Invalid start date: {s}")))?;
        query = query.filter(order::Column::CreatedAt.gte(crate::utils::time::format_rfc3339(dt)));
        start_parsed = Some(dt);
    }
    if let Some(e) = end_date {
        let dt = crate::utils::time::parse_date_param(e)
            .ok_or_else(|| ApiError::Validation(format!("Invalid end date: {e}")))?;
        query = query.filter(order::Column::CreatedAt.lte(crate::utils::time::format_rfc3339(dt)));
        end_parsed = Some(dt);
    }
    let orders = query.all(db).await?;

    let mut acc = Accum::default();
    for o in &orders {
        acc.add(o);
    }

    let employees = employee::Entity::find()
        .filter(employee::Column::IsActive.eq(true))
        .all(db)
        .await?;
    let monthly_salaries: f64 = employees.iter().map(|e| e.base_salary / 12.0).sum();

    let months_in_period = match (start_parsed, end_parsed) {
        (Some(start), Some(end)) if end > start => {
            let days = (end - start).num_days() as f64;
            (days / 30.0).ceil().max(1.0)
        }
        _ => 1.0,
    };
    let salary_expenses = monthly_salaries * months_in_period;

    let gross_profit = acc.profit();
    let net_profit = gross_profit - salary_expenses;

    Ok(json!({
        "period": { "startDate": start_date, "endDate": end_date },
        "revenue": {
            "totalRevenue": acc.revenue,
            "totalOrders": acc.orders,
            "averageOrderValue": if acc.orders > 0 { acc.revenue / acc.orders as f64 } else { 0.0 },
        },
        "costs": {
            "costOfGoodsSold": acc.cost,
            "salaryExpenses": salary_expenses,
            "totalCosts": acc.cost + salary_expenses,
        },
        "profit": {
            "grossProfit": gross_profit,
            "grossProfitMargin": margin(gross_profit, acc.revenue),
            "netProfit": net_profit,
            "netProfitMargin": margin(net_profit, acc.revenue),
        },
    }))
}

pub async fn inventory(db: &DatabaseConnection) -> Result<Value, ApiError> {
    let products = product::Entity::find()
        .filter(product::Column::IsActive.eq(true))
        .all(db)
        .await?;

    let mut stock_value = 0.0;
    let mut selling_value = 0.0;
    #[derive(Default)]
    struct CatTotals {
        count: u64,
        stock: i64,
        stock_value: f64,
    }
    let mut categories: HashMap<String, CatTotals> = HashMap::new();
    let mut low_stock = Vec::new();

    for p in &products {
        stock_value += p.stock as f64 * p.cost_price;
        selling_value += p.stock as f64 * p.selling_price;
        let c = categories.entry(p.category.clone()).or_default();
        c.count += 1;
        c.stock += p.stock as i64;
        c.stock_value += p.stock as f64 * p.cost_price;
        if p.is_low_stock() {
            low_stock.push(json!({
                "id": p.id,
                "name": p.name,
                "sku": p.sku,
                "currentStock": p.stock,
                "minStock": p.min_stock,
                "category": p.category,
            }));
        }
    }

    let mut category_distribution: Vec<Value> = categories
        .into_iter()
        .map(|(category, t)| {
            json!({
                "category": category,
                "count": t.count,
                "totalStock": t.stock,
                "stockValue": t.stock_value,
            })
        })
        .collect();
    category_distribution.sort_by(|a, b| {
        a["category"]
            .as_str()
            .unwrap_or_default()
            .cmp(b["category"].as_str().unwrap_or_default())
    });

    Ok(json!({
        "summary": {
            "totalProducts": products.len(),
            "lowStockCount": low_stock.len(),
            "totalStockValue": stock_value,
            "potentialRevenue": selling_value,
        },
        "lowStockProducts": low_stock,
        "categoryDistribution": category_distribution,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_revenue_margin_is_zero() {
        assert_eq!(margin(0.0, 0.0), 0.0);
        assert_eq!(margin(-100.0, 0.0), 0.0);
        assert_eq!(margin(50.0, 200.0), 25.0);
    }

    #[test]
    fn period_parsing_defaults_to_monthly() {
        assert_eq!(SalesPeriod::parse(Some("daily")), SalesPeriod::Daily);
        assert_eq!(SalesPeriod::parse(Some("yearly")), SalesPeriod::Yearly);
        assert_eq!(SalesPeriod::parse(Some("hourly")), SalesPeriod::Monthly);
        assert_eq!(SalesPeriod::parse(None), SalesPeriod::Monthly);
    }

    #[test]
    fn sort_parsing_defaults_to_revenue() {
        assert_eq!(
            PerformanceSort::parse(Some("quantity")),
            PerformanceSort::Quantity
        );
        assert_eq!(PerformanceSort::parse(None), PerformanceSort::Revenue);
    }
}
