//! The module contains `BudgetPlan` and the views built on top of it.

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::{ActiveValue, prelude::*};
use uuid::Uuid;

use crate::{ExpenseCategory, ExpenseItem, Note};

/// Background color used when a plan is created without one.
pub const DEFAULT_BACKGROUND_COLOR: &str = "#FDF7F7";

/// A budget plan.
///
/// A plan caps spending (`budget_cents`, minor currency units) over a
/// period of days. Plans whose `period_end` is before today are archived;
/// there is no status flag.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BudgetPlan {
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub budget_cents: i64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub background_color: String,
    pub is_ai_generated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Budget, spent and remaining amounts of one plan.
///
/// `spent_cents` only counts completed items.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlanBalance {
    pub budget_cents: i64,
    pub spent_cents: i64,
    pub remaining_cents: i64,
}

impl PlanBalance {
    pub fn new(budget_cents: i64, spent_cents: i64) -> Self {
        Self {
            budget_cents,
            spent_cents,
            remaining_cents: budget_cents.saturating_sub(spent_cents),
        }
    }
}

/// A plan as shown in listings.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanSummary {
    pub plan: BudgetPlan,
    pub balance: PlanBalance,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CategoryWithItems {
    pub category: ExpenseCategory,
    pub items: Vec<ExpenseItem>,
}

/// The whole tree of a plan, children ordered by position.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlanDetail {
    pub plan: BudgetPlan,
    pub balance: PlanBalance,
    pub categories: Vec<CategoryWithItems>,
    pub notes: Vec<Note>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budget_plans")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub title: String,
    pub budget_cents: i64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub background_color: String,
    pub is_ai_generated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
    #[sea_orm(has_many = "super::categories::Entity")]
    Categories,
    #[sea_orm(has_many = "super::notes::Entity")]
    Notes,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl Related<super::categories::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Categories.def()
    }
}

impl Related<super::notes::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Notes.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for BudgetPlan {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            title: model.title,
            budget_cents: model.budget_cents,
            period_start: model.period_start,
            period_end: model.period_end,
            background_color: model.background_color,
            is_ai_generated: model.is_ai_generated,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

impl From<&BudgetPlan> for ActiveModel {
    fn from(plan: &BudgetPlan) -> Self {
        Self {
            id: ActiveValue::Set(plan.id),
            user_id: ActiveValue::Set(plan.user_id),
            title: ActiveValue::Set(plan.title.clone()),
            budget_cents: ActiveValue::Set(plan.budget_cents),
            period_start: ActiveValue::Set(plan.period_start),
            period_end: ActiveValue::Set(plan.period_end),
            background_color: ActiveValue::Set(plan.background_color.clone()),
            is_ai_generated: ActiveValue::Set(plan.is_ai_generated),
            created_at: ActiveValue::Set(plan.created_at),
            updated_at: ActiveValue::Set(plan.updated_at),
        }
    }
}
