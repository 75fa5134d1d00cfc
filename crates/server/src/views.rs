//! Conversions between engine types and API bodies.

use api_types::{
    CategoryType, NoteType, PriorityColor,
    category::{CategoryDetailView, CategorySpendingView, CategoryView},
    item::ItemView,
    note::NoteView,
    plan::{Balance, PlanDetailView, PlanSummaryView, PlanView},
    stats::MonthTotals,
    user::UserView,
};

pub fn map_category_type(kind: engine::CategoryKind) -> CategoryType {
    match kind {
        engine::CategoryKind::Mandatory => CategoryType::Mandatory,
        engine::CategoryKind::Optional => CategoryType::Optional,
    }
}

pub fn category_kind(kind: CategoryType) -> engine::CategoryKind {
    match kind {
        CategoryType::Mandatory => engine::CategoryKind::Mandatory,
        CategoryType::Optional => engine::CategoryKind::Optional,
    }
}

pub fn map_priority(priority: engine::Priority) -> PriorityColor {
    match priority {
        engine::Priority::Red => PriorityColor::Red,
        engine::Priority::Yellow => PriorityColor::Yellow,
        engine::Priority::Green => PriorityColor::Green,
    }
}

pub fn priority(color: PriorityColor) -> engine::Priority {
    match color {
        PriorityColor::Red => engine::Priority::Red,
        PriorityColor::Yellow => engine::Priority::Yellow,
        PriorityColor::Green => engine::Priority::Green,
    }
}

pub fn map_note_type(kind: engine::NoteKind) -> NoteType {
    match kind {
        engine::NoteKind::Ai => NoteType::Ai,
        engine::NoteKind::User => NoteType::User,
    }
}

pub fn note_kind(kind: NoteType) -> engine::NoteKind {
    match kind {
        NoteType::Ai => engine::NoteKind::Ai,
        NoteType::User => engine::NoteKind::User,
    }
}

pub fn map_user(user: engine::User) -> UserView {
    UserView {
        id: user.id,
        email: user.email,
        name: user.name,
        created_at: user.created_at,
    }
}

pub fn map_plan(plan: engine::BudgetPlan) -> PlanView {
    PlanView {
        id: plan.id,
        title: plan.title,
        budget_cents: plan.budget_cents,
        period_start: plan.period_start,
        period_end: plan.period_end,
        background_color: plan.background_color,
        is_ai_generated: plan.is_ai_generated,
        created_at: plan.created_at,
        updated_at: plan.updated_at,
    }
}

pub fn map_balance(balance: engine::PlanBalance) -> Balance {
    Balance {
        budget_cents: balance.budget_cents,
        spent_cents: balance.spent_cents,
        remaining_cents: balance.remaining_cents,
    }
}

pub fn map_summary(summary: engine::PlanSummary) -> PlanSummaryView {
    PlanSummaryView {
        plan: map_plan(summary.plan),
        balance: map_balance(summary.balance),
    }
}

pub fn map_detail(detail: engine::PlanDetail) -> PlanDetailView {
    PlanDetailView {
        plan: map_plan(detail.plan),
        balance: map_balance(detail.balance),
        categories: detail
            .categories
            .into_iter()
            .map(|entry| CategoryDetailView {
                category: map_category(entry.category),
                items: entry.items.into_iter().map(map_item).collect(),
            })
            .collect(),
        notes: detail.notes.into_iter().map(map_note).collect(),
    }
}

pub fn map_category(category: engine::ExpenseCategory) -> CategoryView {
    CategoryView {
        id: category.id,
        plan_id: category.plan_id,
        title: category.title,
        category_type: map_category_type(category.kind),
        sort_order: category.sort_order,
        created_at: category.created_at,
    }
}

pub fn map_month(totals: engine::MonthTotals) -> MonthTotals {
    MonthTotals {
        month: totals.month.format("%Y-%m").to_string(),
        budget_cents: totals.budget_cents,
        spent_cents: totals.spent_cents,
    }
}

pub fn map_spending(spending: engine::CategorySpending) -> CategorySpendingView {
    CategorySpendingView {
        category_id: spending.category_id,
        title: spending.title,
        category_type: map_category_type(spending.kind),
        spent_cents: spending.spent_cents,
        planned_cents: spending.planned_cents,
    }
}

pub fn map_item(item: engine::ExpenseItem) -> ItemView {
    ItemView {
        id: item.id,
        category_id: item.category_id,
        title: item.title,
        amount_cents: item.amount_cents,
        priority_color: map_priority(item.priority),
        is_completed: item.is_completed,
        sort_order: item.sort_order,
        created_at: item.created_at,
        updated_at: item.updated_at,
    }
}

pub fn map_note(note: engine::Note) -> NoteView {
    NoteView {
        id: note.id,
        plan_id: note.plan_id,
        content: note.content,
        note_type: map_note_type(note.kind),
        sort_order: note.sort_order,
        created_at: note.created_at,
        updated_at: note.updated_at,
    }
}
