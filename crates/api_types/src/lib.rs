use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a category groups required or discretionary expenses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    Mandatory,
    Optional,
}

/// Traffic-light priority of an expense item.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriorityColor {
    Red,
    Yellow,
    Green,
}

/// Author of a note: the user, or the advisor.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteType {
    Ai,
    #[default]
    User,
}

pub mod user {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserNew {
        pub email: String,
        pub password: String,
        pub name: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub email: String,
        pub name: Option<String>,
        pub created_at: DateTime<Utc>,
    }
}

pub mod plan {
    use super::*;
    use crate::{category::CategoryDetailView, note::NoteView};

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlanNew {
        pub title: String,
        pub budget_cents: i64,
        pub period_start: NaiveDate,
        pub period_end: NaiveDate,
        /// `#RRGGBB`; the server default applies when missing.
        pub background_color: Option<String>,
    }

    /// Full replacement of title, budget and period.
    ///
    /// Missing optional fields keep their stored value.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlanUpdate {
        pub title: String,
        pub budget_cents: i64,
        pub period_start: NaiveDate,
        pub period_end: NaiveDate,
        pub background_color: Option<String>,
        pub is_ai_generated: Option<bool>,
    }

    /// A plan together with its categories, items and notes, as produced by
    /// a plan generator.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct GeneratedPlanNew {
        #[serde(flatten)]
        pub plan: PlanNew,
        pub categories: Vec<CategoryTree>,
        #[serde(default)]
        pub notes: Vec<NoteTree>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryTree {
        pub title: String,
        pub category_type: CategoryType,
        #[serde(default)]
        pub items: Vec<ItemTree>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemTree {
        pub title: String,
        pub amount_cents: i64,
        pub priority_color: PriorityColor,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NoteTree {
        pub content: String,
        #[serde(default)]
        pub note_type: NoteType,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlanView {
        pub id: Uuid,
        pub title: String,
        pub budget_cents: i64,
        pub period_start: NaiveDate,
        pub period_end: NaiveDate,
        pub background_color: String,
        pub is_ai_generated: bool,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
    pub struct Balance {
        pub budget_cents: i64,
        pub spent_cents: i64,
        pub remaining_cents: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlanSummaryView {
        #[serde(flatten)]
        pub plan: PlanView,
        pub balance: Balance,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlanList {
        pub plans: Vec<PlanSummaryView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct PlanDetailView {
        #[serde(flatten)]
        pub plan: PlanView,
        pub balance: Balance,
        pub categories: Vec<CategoryDetailView>,
        pub notes: Vec<NoteView>,
    }
}

pub mod category {
    use super::*;
    use crate::item::ItemView;

    /// Body of both category creation and update.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryInput {
        pub title: String,
        pub category_type: CategoryType,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub plan_id: Uuid,
        pub title: String,
        pub category_type: CategoryType,
        pub sort_order: i32,
        pub created_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryDetailView {
        #[serde(flatten)]
        pub category: CategoryView,
        pub items: Vec<ItemView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategorySpendingView {
        pub category_id: Uuid,
        pub title: String,
        pub category_type: CategoryType,
        pub spent_cents: i64,
        pub planned_cents: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct SpendingList {
        pub categories: Vec<CategorySpendingView>,
    }
}

pub mod item {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemNew {
        pub title: String,
        pub amount_cents: i64,
        pub priority_color: PriorityColor,
        #[serde(default)]
        pub is_completed: bool,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemUpdate {
        pub title: String,
        pub amount_cents: i64,
        pub priority_color: PriorityColor,
    }

    /// Set the completion flag, or flip it when `is_completed` is missing.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct ItemToggle {
        pub is_completed: Option<bool>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemPriority {
        pub priority_color: PriorityColor,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct ItemView {
        pub id: Uuid,
        pub category_id: Uuid,
        pub title: String,
        pub amount_cents: i64,
        pub priority_color: PriorityColor,
        pub is_completed: bool,
        pub sort_order: i32,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod note {
    use super::*;

    /// Body of both note creation and update.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct NoteInput {
        pub content: String,
        #[serde(default)]
        pub note_type: NoteType,
    }

    /// Query string of the note listing.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct NoteFilter {
        #[serde(rename = "type")]
        pub note_type: Option<NoteType>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NoteView {
        pub id: Uuid,
        pub plan_id: Uuid,
        pub content: String,
        pub note_type: NoteType,
        pub sort_order: i32,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct NoteList {
        pub notes: Vec<NoteView>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct AdviceList {
        pub advices: Vec<NoteView>,
    }
}

pub mod order {
    use super::*;

    /// Complete new order of a sibling collection, first element first.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct Reorder {
        pub ids: Vec<Uuid>,
    }
}

pub mod stats {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct Overview {
        pub total_plans: u64,
        pub active_plans: u64,
        pub archived_plans: u64,
        pub total_budget_cents: i64,
        pub total_spent_cents: i64,
    }

    /// Query of `GET /stats/monthly-comparison`. Kept as text so a bad
    /// value can be reported with the usual error body.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MonthsQuery {
        pub months: Option<String>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthTotals {
        /// `YYYY-MM`.
        pub month: String,
        pub budget_cents: i64,
        pub spent_cents: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyComparison {
        pub months: Vec<MonthTotals>,
    }
}
