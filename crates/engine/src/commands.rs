//! Command structs for engine operations.
//!
//! These types group parameters for write operations (plan creation and
//! update, item writes, generated plan trees), keeping call sites readable
//! and avoiding long argument lists.

use chrono::NaiveDate;

use crate::{CategoryKind, NoteKind, Priority};

/// Create a budget plan.
#[derive(Clone, Debug)]
pub struct NewPlanCmd {
    pub title: String,
    pub budget_cents: i64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    /// `#RRGGBB`, the default color is used when missing.
    pub background_color: Option<String>,
    pub is_ai_generated: bool,
}

impl NewPlanCmd {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        budget_cents: i64,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Self {
        Self {
            title: title.into(),
            budget_cents,
            period_start,
            period_end,
            background_color: None,
            is_ai_generated: false,
        }
    }

    #[must_use]
    pub fn background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    #[must_use]
    pub fn ai_generated(mut self, value: bool) -> Self {
        self.is_ai_generated = value;
        self
    }
}

/// Update a budget plan.
///
/// Title, budget and period are always replaced. Color and AI flag are left
/// untouched when `None`.
#[derive(Clone, Debug)]
pub struct UpdatePlanCmd {
    pub title: String,
    pub budget_cents: i64,
    pub period_start: NaiveDate,
    pub period_end: NaiveDate,
    pub background_color: Option<String>,
    pub is_ai_generated: Option<bool>,
}

impl UpdatePlanCmd {
    #[must_use]
    pub fn new(
        title: impl Into<String>,
        budget_cents: i64,
        period_start: NaiveDate,
        period_end: NaiveDate,
    ) -> Self {
        Self {
            title: title.into(),
            budget_cents,
            period_start,
            period_end,
            background_color: None,
            is_ai_generated: None,
        }
    }

    #[must_use]
    pub fn background_color(mut self, color: impl Into<String>) -> Self {
        self.background_color = Some(color.into());
        self
    }

    #[must_use]
    pub fn ai_generated(mut self, value: bool) -> Self {
        self.is_ai_generated = Some(value);
        self
    }
}

/// Create an expense item.
#[derive(Clone, Debug)]
pub struct NewItemCmd {
    pub title: String,
    pub amount_cents: i64,
    pub priority: Priority,
    pub is_completed: bool,
}

impl NewItemCmd {
    #[must_use]
    pub fn new(title: impl Into<String>, amount_cents: i64, priority: Priority) -> Self {
        Self {
            title: title.into(),
            amount_cents,
            priority,
            is_completed: false,
        }
    }

    #[must_use]
    pub fn completed(mut self, value: bool) -> Self {
        self.is_completed = value;
        self
    }
}

/// Replace title, amount and priority of an expense item.
#[derive(Clone, Debug)]
pub struct UpdateItemCmd {
    pub title: String,
    pub amount_cents: i64,
    pub priority: Priority,
}

impl UpdateItemCmd {
    #[must_use]
    pub fn new(title: impl Into<String>, amount_cents: i64, priority: Priority) -> Self {
        Self {
            title: title.into(),
            amount_cents,
            priority,
        }
    }
}

/// One category of a generated plan tree.
#[derive(Clone, Debug)]
pub struct CategoryDraft {
    pub title: String,
    pub kind: CategoryKind,
    pub items: Vec<ItemDraft>,
}

impl CategoryDraft {
    #[must_use]
    pub fn new(title: impl Into<String>, kind: CategoryKind) -> Self {
        Self {
            title: title.into(),
            kind,
            items: Vec::new(),
        }
    }

    #[must_use]
    pub fn item(mut self, item: ItemDraft) -> Self {
        self.items.push(item);
        self
    }
}

#[derive(Clone, Debug)]
pub struct ItemDraft {
    pub title: String,
    pub amount_cents: i64,
    pub priority: Priority,
}

impl ItemDraft {
    #[must_use]
    pub fn new(title: impl Into<String>, amount_cents: i64, priority: Priority) -> Self {
        Self {
            title: title.into(),
            amount_cents,
            priority,
        }
    }
}

#[derive(Clone, Debug)]
pub struct NoteDraft {
    pub content: String,
    pub kind: NoteKind,
}

impl NoteDraft {
    #[must_use]
    pub fn new(content: impl Into<String>, kind: NoteKind) -> Self {
        Self {
            content: content.into(),
            kind,
        }
    }
}
