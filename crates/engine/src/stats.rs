//! User-scoped statistics.

use chrono::NaiveDate;
use uuid::Uuid;

use crate::CategoryKind;

/// Upper bound of the monthly comparison window.
pub const MAX_COMPARISON_MONTHS: u32 = 24;

/// Totals over every plan of a user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Overview {
    pub total_plans: u64,
    pub active_plans: u64,
    pub archived_plans: u64,
    pub total_budget_cents: i64,
    pub total_spent_cents: i64,
}

/// Completed spend of one category.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategorySpending {
    pub category_id: Uuid,
    pub title: String,
    pub kind: CategoryKind,
    pub spent_cents: i64,
    pub planned_cents: i64,
}

/// Budgets and completed spend of the plans starting in one month.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MonthTotals {
    /// First day of the month.
    pub month: NaiveDate,
    pub budget_cents: i64,
    pub spent_cents: i64,
}
