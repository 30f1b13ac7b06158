//! Commission accrual, reset and monthly salary.
//!
//! Two views of commission coexist and are not required to agree:
//! - "unpaid since reset": flat rate x orders attributed to the employee
//!   and created strictly after `commission_paid_date`;
//! - "period salary": flat rate x orders attributed within a calendar
//!   month, ignoring the reset cutoff.
//!
//! A reset only moves the cutoff forward; it never deletes orders or
//! changes their attribution.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use serde::Serialize;

use crate::domain::ApiError;
use crate::models::{employee, order};
use crate::utils::time::{month_bounds, now_rfc3339, parse_rfc3339};

/// Strict greater-than: an order created in the same instant as the reset
/// is excluded, so a reset always reads back as exactly 0 unpaid.
pub fn counts_toward_unpaid(order_created_at: &str, cutoff: Option<&str>) -> bool {
    match cutoff {
        None => true,
        Some(cutoff) => match (parse_rfc3339(order_created_at), parse_rfc3339(cutoff)) {
            (Some(created), Some(cut)) => created > cut,
            // Stored format is fixed-width UTC, so string order matches
            // chronological order for anything we wrote ourselves.
            _ => order_created_at > cutoff,
        },
    }
}

pub fn unpaid_total(eligible_count: usize, rate: f64, salary_toggle: bool) -> f64 {
    if salary_toggle {
        eligible_count as f64 * rate
    } else {
        0.0
    }
}

pub fn monthly_base(annual_base_salary: f64) -> f64 {
    annual_base_salary / 12.0
}

#[derive(Debug, Serialize)]
pub struct CommissionOverview {
    pub order_count: usize,
    pub eligible_order_count: usize,
    pub commission_per_order: f64,
    pub total_commission: f64,
    pub commission_paid_date: Option<String>,
}

/// Summarize a set of already-fetched attributed orders against the
/// employee's cutoff and toggle.
pub fn overview(employee: &employee::Model, orders: &[order::Model]) -> CommissionOverview {
    let eligible = orders
        .iter()
        .filter(|o| counts_toward_unpaid(&o.created_at, employee.commission_paid_date.as_deref()))
        .count();

    CommissionOverview {
        order_count: orders.len(),
        eligible_order_count: eligible,
        commission_per_order: employee.commission_per_order,
        total_commission: unpaid_total(eligible, employee.commission_per_order, employee.salary_toggle),
        commission_paid_date: employee.commission_paid_date.clone(),
    }
}

#[derive(Debug, Serialize)]
pub struct ResetOutcome {
    pub reset_date: String,
    pub total_orders_kept: u64,
}

/// Move the cutoff to now. Order history is untouched; only future
/// unpaid-commission reads change.
pub async fn reset(db: &DatabaseConnection, employee_id: i32) -> Result<ResetOutcome, ApiError> {
    let existing = employee::Entity::find_by_id(employee_id)
        .one(db)
        .await?
        .ok_or_else(|| ApiError::NotFound("Employee not found".to_string()))?;

    let reset_date = now_rfc3339();
    let mut active: employee::ActiveModel = existing.into();
    active.commission_paid_date = Set(Some(reset_date.clone()));
    active.updated_at = Set(now_rfc3339());
    active.update(db).await?;

    let total_orders_kept = order::Entity::find()
        .filter(order::Column::EmployeeId.eq(employee_id))
        .count(db)
        .await?;

    Ok(ResetOutcome {
        reset_date,
        total_orders_kept,
    })
}

#[derive(Debug, Serialize)]
pub struct SalaryBreakdown {
    pub base_salary: f64,
    pub commission_per_order: f64,
    pub order_count: u64,
    pub commission_amount: f64,
    pub total_salary: f64,
}

pub fn salary_for_order_count(employee: &employee::Model, order_count: u64) -> SalaryBreakdown {
    let base = monthly_base(employee.base_salary);
    let commission = unpaid_total(
        order_count as usize,
        employee.commission_per_order,
        employee.salary_toggle,
    );
    SalaryBreakdown {
        base_salary: base,
        commission_per_order: employee.commission_per_order,
        order_count,
        commission_amount: commission,
        total_salary: base + commission,
    }
}

/// Period-scoped salary: attributed orders in [year, month], independent
/// of the commission reset cutoff.
pub async fn monthly_salary(
    db: &DatabaseConnection,
    employee: &employee::Model,
    year: i32,
    month: u32,
) -> Result<SalaryBreakdown, ApiError> {
    let (start, end) = month_bounds(year, month)
        .ok_or_else(|| ApiError::Validation("Invalid year or month".to_string()))?;

    let order_count = order::Entity::find()
        .filter(order::Column::EmployeeId.eq(employee.id))
        .filter(order::Column::CreatedAt.gte(start))
        .filter(order::Column::CreatedAt.lt(end))
        .count(db)
        .await?;

    Ok(salary_for_order_count(employee, order_count))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn employee_with(rate: f64, toggle: bool, cutoff: Option<&str>) -> employee::Model {
        employee::Model {
            id: 1,
            first_name: "Amira".to_string(),
            last_name: "Khan".to_string(),
            email: "amira@example.com".to_string(),
            username: "amira".to_string(),
            password_hash: "x".to_string(),
            phone: "555".to_string(),
            position: "sales_associate".to_string(),
            department: "sales".to_string(),
            base_salary: 24000.0,
            commission_per_order: rate,
            hire_date: "2024-01-01T00:00:00.000Z".to_string(),
            is_active: true,
            termination_date: None,
            salary_toggle: toggle,
            last_login: None,
            commission_paid_date: cutoff.map(|s| s.to_string()),
            created_at: "2024-01-01T00:00:00.000Z".to_string(),
            updated_at: "2024-01-01T00:00:00.000Z".to_string(),
        }
    }

    fn order_at(created_at: &str) -> order::Model {
        order::Model {
            id: 0,
            order_number: "VND1".to_string(),
            customer_name: "C".to_string(),
            customer_email: String::new(),
            customer_phone: "1".to_string(),
            employee_id: Some(1),
            created_by: None,
            subtotal: 100.0,
            tax: 0.0,
            shipping: 0.0,
            discount: 0.0,
            total: 100.0,
            total_cost: 60.0,
            status: "pending".to_string(),
            payment_status: "pending".to_string(),
            payment_method: "cash".to_string(),
            notes: String::new(),
            created_at: created_at.to_string(),
            updated_at: created_at.to_string(),
        }
    }

    #[test]
    fn no_cutoff_counts_all_history() {
        assert!(counts_toward_unpaid("2025-01-01T00:00:00.000Z", None));
    }

    #[test]
    fn cutoff_is_strictly_exclusive() {
        let cutoff = Some("2025-06-01T12:00:00.000Z");
        assert!(!counts_toward_unpaid("2025-06-01T11:59:59.000Z", cutoff));
        // same instant as the reset: excluded
        assert!(!counts_toward_unpaid("2025-06-01T12:00:00.000Z", cutoff));
        assert!(counts_toward_unpaid("2025-06-01T12:00:00.001Z", cutoff));
    }

    #[test]
    fn toggle_off_forces_zero_commission() {
        let emp = employee_with(20.0, false, None);
        let orders: Vec<order::Model> = (0..10)
            .map(|i| order_at(&format!("2025-06-0{}T00:00:00.000Z", (i % 9) + 1)))
            .collect();
        let summary = overview(&emp, &orders);
        assert_eq!(summary.order_count, 10);
        assert_eq!(summary.eligible_order_count, 10);
        assert_eq!(summary.total_commission, 0.0);
    }

    #[test]
    fn overview_applies_cutoff_and_rate() {
        let emp = employee_with(50.0, true, Some("2025-06-15T00:00:00.000Z"));
        let orders = vec![
            order_at("2025-06-10T00:00:00.000Z"), // before cutoff
            order_at("2025-06-15T00:00:00.000Z"), // at cutoff: excluded
            order_at("2025-06-20T00:00:00.000Z"),
            order_at("2025-06-25T00:00:00.000Z"),
        ];
        let summary = overview(&emp, &orders);
        assert_eq!(summary.order_count, 4);
        assert_eq!(summary.eligible_order_count, 2);
        assert_eq!(summary.total_commission, 100.0);
    }

    #[test]
    fn salary_is_base_over_twelve_plus_commission() {
        let emp = employee_with(50.0, true, None);
        let breakdown = salary_for_order_count(&emp, 3);
        assert_eq!(breakdown.base_salary, 2000.0);
        assert_eq!(breakdown.commission_amount, 150.0);
        assert_eq!(breakdown.total_salary, 2150.0);
    }
}
