//! Ledger store of the planner.
//!
//! The [`Engine`] owns every durable write: plans, their ordered categories,
//! items and notes. Amount-affecting writes are checked against the plan
//! budget and position-affecting writes go through one reorder routine, both
//! under a per-plan lock taken at the start of the database transaction.

pub use categories::{CategoryKind, ExpenseCategory};
pub use commands::{
    CategoryDraft, ItemDraft, NewItemCmd, NewPlanCmd, NoteDraft, UpdateItemCmd, UpdatePlanCmd,
};
pub use error::EngineError;
pub use items::{ExpenseItem, Priority};
pub use notes::{Note, NoteKind};
pub use ops::{Engine, EngineBuilder};
pub use plans::{BudgetPlan, CategoryWithItems, PlanBalance, PlanDetail, PlanSummary};
pub use stats::{CategorySpending, MAX_COMPARISON_MONTHS, MonthTotals, Overview};
pub use users::User;

mod categories;
mod commands;
mod error;
mod items;
mod notes;
mod ops;
mod plans;
mod stats;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
