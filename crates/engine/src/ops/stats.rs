use std::collections::BTreeMap;

use chrono::{Datelike, NaiveDate};
use sea_orm::{
    ConnectionTrait, PaginatorTrait, QueryFilter, Statement, TransactionTrait, prelude::*,
};
use uuid::Uuid;

use crate::{
    CategoryKind, CategorySpending, EngineError, MAX_COMPARISON_MONTHS, MonthTotals, Overview,
    ResultEngine, plans,
};

use super::{
    Engine,
    plans::{load_categories, load_items},
    with_tx,
};

impl Engine {
    /// Plan counts and totals over every plan of the user.
    pub async fn overview(&self, user_id: Uuid, today: NaiveDate) -> ResultEngine<Overview> {
        with_tx!(self, |db_tx| {
            let total_plans = plans::Entity::find()
                .filter(plans::Column::UserId.eq(user_id))
                .count(&db_tx)
                .await?;
            let active_plans = plans::Entity::find()
                .filter(plans::Column::UserId.eq(user_id))
                .filter(plans::Column::PeriodEnd.gte(today))
                .count(&db_tx)
                .await?;

            let backend = db_tx.get_database_backend();
            let total_budget_cents: i64 = {
                let stmt = Statement::from_sql_and_values(
                    backend,
                    "SELECT COALESCE(SUM(budget_cents), 0) AS sum \
                     FROM budget_plans WHERE user_id = ?;",
                    vec![user_id.into()],
                );
                match db_tx.query_one(stmt).await? {
                    Some(row) => row.try_get("", "sum")?,
                    None => 0,
                }
            };
            let total_spent_cents: i64 = {
                let stmt = Statement::from_sql_and_values(
                    backend,
                    "SELECT COALESCE(SUM(i.amount_cents), 0) AS sum \
                     FROM expense_items i \
                     INNER JOIN expense_categories c ON c.id = i.category_id \
                     INNER JOIN budget_plans p ON p.id = c.plan_id \
                     WHERE p.user_id = ? AND i.is_completed = ?;",
                    vec![user_id.into(), true.into()],
                );
                match db_tx.query_one(stmt).await? {
                    Some(row) => row.try_get("", "sum")?,
                    None => 0,
                }
            };

            Ok(Overview {
                total_plans,
                active_plans,
                archived_plans: total_plans - active_plans,
                total_budget_cents,
                total_spent_cents,
            })
        })
    }

    /// Planned and spent amounts per category, in category order.
    pub async fn spending_by_category(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
    ) -> ResultEngine<Vec<CategorySpending>> {
        with_tx!(self, |db_tx| {
            self.require_plan(&db_tx, plan_id, user_id).await?;
            let categories = load_categories(&db_tx, plan_id).await?;
            let ids: Vec<Uuid> = categories.iter().map(|c| c.id).collect();
            let mut items = load_items(&db_tx, &ids).await?;

            categories
                .into_iter()
                .map(|category| {
                    let (planned_cents, spent_cents) = items
                        .remove(&category.id)
                        .unwrap_or_default()
                        .iter()
                        .fold((0, 0), |(planned, spent), item| {
                            let done = if item.is_completed { item.amount_cents } else { 0 };
                            (planned + item.amount_cents, spent + done)
                        });
                    Ok(CategorySpending {
                        kind: CategoryKind::try_from(category.category_type.as_str())?,
                        category_id: category.id,
                        title: category.title,
                        spent_cents,
                        planned_cents,
                    })
                })
                .collect::<ResultEngine<Vec<_>>>()
        })
    }

    /// Budgets and completed spend grouped by the month each plan starts in.
    ///
    /// Newest month first, at most `months` entries; the window is capped at
    /// [`MAX_COMPARISON_MONTHS`].
    pub async fn monthly_comparison(
        &self,
        user_id: Uuid,
        months: u32,
    ) -> ResultEngine<Vec<MonthTotals>> {
        if months == 0 {
            return Err(EngineError::InvalidInput(
                "months must be > 0".to_string(),
            ));
        }
        let months = months.min(MAX_COMPARISON_MONTHS) as usize;

        with_tx!(self, |db_tx| {
            let stmt = Statement::from_sql_and_values(
                db_tx.get_database_backend(),
                "SELECT p.period_start AS period_start, p.budget_cents AS budget_cents, \
                 COALESCE(SUM(CASE WHEN i.is_completed = ? THEN i.amount_cents ELSE 0 END), 0) \
                 AS spent_cents \
                 FROM budget_plans p \
                 LEFT JOIN expense_categories c ON c.plan_id = p.id \
                 LEFT JOIN expense_items i ON i.category_id = c.id \
                 WHERE p.user_id = ? \
                 GROUP BY p.id, p.period_start, p.budget_cents;",
                vec![true.into(), user_id.into()],
            );

            let mut by_month: BTreeMap<NaiveDate, (i64, i64)> = BTreeMap::new();
            for row in db_tx.query_all(stmt).await? {
                let period_start: NaiveDate = row.try_get("", "period_start")?;
                let budget: i64 = row.try_get("", "budget_cents")?;
                let spent: i64 = row.try_get("", "spent_cents")?;

                let month = period_start.with_day(1).unwrap_or(period_start);
                let totals = by_month.entry(month).or_default();
                totals.0 = totals.0.saturating_add(budget);
                totals.1 = totals.1.saturating_add(spent);
            }

            Ok(by_month
                .into_iter()
                .rev()
                .take(months)
                .map(|(month, (budget_cents, spent_cents))| MonthTotals {
                    month,
                    budget_cents,
                    spent_cents,
                })
                .collect())
        })
    }
}
