//! Initial schema migration.
//!
//! Creates the complete schema for the planner:
//!
//! - `users`: account identity and credentials
//! - `budget_plans`: budget ceilings over a date period, owned by a user
//! - `expense_categories`: ordered groups of expenses inside a plan
//! - `expense_items`: ordered, prioritized expenses inside a category
//! - `notes`: ordered free-form notes (user written or AI advice) on a plan
//!
//! `sort_order` columns carry no uniqueness constraint: density is kept by the
//! engine's append and reorder operations.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

// ─────────────────────────────────────────────────────────────────────────────
// Table identifiers
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Iden)]
enum Users {
    Table,
    Id,
    Email,
    PasswordHash,
    Name,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum BudgetPlans {
    Table,
    Id,
    UserId,
    Title,
    BudgetCents,
    PeriodStart,
    PeriodEnd,
    BackgroundColor,
    IsAiGenerated,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum ExpenseCategories {
    Table,
    Id,
    PlanId,
    Title,
    CategoryType,
    SortOrder,
    CreatedAt,
}

#[derive(Iden)]
enum ExpenseItems {
    Table,
    Id,
    CategoryId,
    Title,
    AmountCents,
    PriorityColor,
    IsCompleted,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Notes {
    Table,
    Id,
    PlanId,
    Content,
    NoteType,
    SortOrder,
    CreatedAt,
    UpdatedAt,
}

// ─────────────────────────────────────────────────────────────────────────────
// Migration implementation
// ─────────────────────────────────────────────────────────────────────────────

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // ───────────────────────────────────────────────────────────────────
        // 1. Users
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Users::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Users::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Users::Email).string().not_null())
                    .col(ColumnDef::new(Users::PasswordHash).string().not_null())
                    .col(ColumnDef::new(Users::Name).string())
                    .col(
                        ColumnDef::new(Users::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Users::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-users-email-unique")
                    .table(Users::Table)
                    .col(Users::Email)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 2. Budget plans
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(BudgetPlans::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(BudgetPlans::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(BudgetPlans::UserId).uuid().not_null())
                    .col(ColumnDef::new(BudgetPlans::Title).string().not_null())
                    .col(
                        ColumnDef::new(BudgetPlans::BudgetCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(BudgetPlans::PeriodStart).date().not_null())
                    .col(ColumnDef::new(BudgetPlans::PeriodEnd).date().not_null())
                    .col(
                        ColumnDef::new(BudgetPlans::BackgroundColor)
                            .string()
                            .not_null()
                            .default("#FDF7F7"),
                    )
                    .col(
                        ColumnDef::new(BudgetPlans::IsAiGenerated)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(BudgetPlans::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(BudgetPlans::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-budget_plans-user_id")
                            .from(BudgetPlans::Table, BudgetPlans::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-budget_plans-user_id-period_end")
                    .table(BudgetPlans::Table)
                    .col(BudgetPlans::UserId)
                    .col(BudgetPlans::PeriodEnd)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 3. Expense categories
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseCategories::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseCategories::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseCategories::PlanId).uuid().not_null())
                    .col(ColumnDef::new(ExpenseCategories::Title).string().not_null())
                    .col(
                        ColumnDef::new(ExpenseCategories::CategoryType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseCategories::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ExpenseCategories::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_categories-plan_id")
                            .from(ExpenseCategories::Table, ExpenseCategories::PlanId)
                            .to(BudgetPlans::Table, BudgetPlans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_categories-plan_id-sort_order")
                    .table(ExpenseCategories::Table)
                    .col(ExpenseCategories::PlanId)
                    .col(ExpenseCategories::SortOrder)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 4. Expense items
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(ExpenseItems::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ExpenseItems::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(ExpenseItems::CategoryId).uuid().not_null())
                    .col(ColumnDef::new(ExpenseItems::Title).string().not_null())
                    .col(
                        ColumnDef::new(ExpenseItems::AmountCents)
                            .big_integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseItems::PriorityColor)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseItems::IsCompleted)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(ExpenseItems::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(ExpenseItems::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ExpenseItems::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-expense_items-category_id")
                            .from(ExpenseItems::Table, ExpenseItems::CategoryId)
                            .to(ExpenseCategories::Table, ExpenseCategories::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-expense_items-category_id-sort_order")
                    .table(ExpenseItems::Table)
                    .col(ExpenseItems::CategoryId)
                    .col(ExpenseItems::SortOrder)
                    .to_owned(),
            )
            .await?;

        // ───────────────────────────────────────────────────────────────────
        // 5. Notes
        // ───────────────────────────────────────────────────────────────────
        manager
            .create_table(
                Table::create()
                    .table(Notes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Notes::Id).uuid().not_null().primary_key())
                    .col(ColumnDef::new(Notes::PlanId).uuid().not_null())
                    .col(ColumnDef::new(Notes::Content).text().not_null())
                    .col(ColumnDef::new(Notes::NoteType).string().not_null())
                    .col(
                        ColumnDef::new(Notes::SortOrder)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(
                        ColumnDef::new(Notes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notes::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk-notes-plan_id")
                            .from(Notes::Table, Notes::PlanId)
                            .to(BudgetPlans::Table, BudgetPlans::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx-notes-plan_id-sort_order")
                    .table(Notes::Table)
                    .col(Notes::PlanId)
                    .col(Notes::SortOrder)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        // Drop in reverse order of creation (respecting FK dependencies)
        manager
            .drop_table(Table::drop().table(Notes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseItems::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ExpenseCategories::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(BudgetPlans::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Users::Table).to_owned())
            .await?;
        Ok(())
    }
}
