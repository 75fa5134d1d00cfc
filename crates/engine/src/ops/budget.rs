//! Budget invariant checks and running totals.
//!
//! Two totals exist on purpose:
//!
//! - the write-time total sums every item amount of the plan, completed or
//!   not, and is what a new or changed amount is checked against;
//! - the spent total sums completed items only and is what callers display.

use sea_orm::{ConnectionTrait, DatabaseTransaction, Statement};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, plans};

use super::Engine;

impl Engine {
    /// Sum of every item amount in the plan.
    pub(super) async fn planned_total(
        &self,
        db: &DatabaseTransaction,
        plan_id: Uuid,
    ) -> ResultEngine<i64> {
        let stmt = Statement::from_sql_and_values(
            db.get_database_backend(),
            "SELECT COALESCE(SUM(i.amount_cents), 0) AS sum \
             FROM expense_items i \
             INNER JOIN expense_categories c ON c.id = i.category_id \
             WHERE c.plan_id = ?;",
            vec![plan_id.into()],
        );
        sum_of(db, stmt).await
    }

    /// Sum of completed item amounts in the plan.
    pub(super) async fn spent_total(
        &self,
        db: &DatabaseTransaction,
        plan_id: Uuid,
    ) -> ResultEngine<i64> {
        let stmt = Statement::from_sql_and_values(
            db.get_database_backend(),
            "SELECT COALESCE(SUM(i.amount_cents), 0) AS sum \
             FROM expense_items i \
             INNER JOIN expense_categories c ON c.id = i.category_id \
             WHERE c.plan_id = ? AND i.is_completed = ?;",
            vec![plan_id.into(), true.into()],
        );
        sum_of(db, stmt).await
    }

    /// Reject a write that would move the planned total above the budget.
    ///
    /// `previous_cents` is the amount being replaced (0 for a new item). The
    /// caller must hold the plan lock.
    pub(super) async fn ensure_within_budget(
        &self,
        db: &DatabaseTransaction,
        plan: &plans::Model,
        previous_cents: i64,
        next_cents: i64,
    ) -> ResultEngine<()> {
        let current = self.planned_total(db, plan.id).await?;
        let projected = current
            .checked_sub(previous_cents)
            .and_then(|total| total.checked_add(next_cents));
        if !projected.is_some_and(|total| total <= plan.budget_cents) {
            tracing::debug!(
                plan_id = %plan.id,
                budget_cents = plan.budget_cents,
                current_cents = current,
                next_cents,
                "item write rejected, budget exceeded"
            );
            return Err(EngineError::BudgetExceeded(format!(
                "items total exceeds budget {} of plan {}",
                plan.budget_cents, plan.id
            )));
        }
        Ok(())
    }
}

async fn sum_of(db: &DatabaseTransaction, stmt: Statement) -> ResultEngine<i64> {
    match db.query_one(stmt).await? {
        Some(row) => Ok(row.try_get("", "sum")?),
        None => Ok(0),
    }
}
