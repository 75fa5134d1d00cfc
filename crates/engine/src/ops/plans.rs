use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, Statement, TransactionTrait,
    prelude::*,
};
use uuid::Uuid;

use crate::{
    BudgetPlan, CategoryDraft, CategoryKind, CategoryWithItems, EngineError, ExpenseCategory,
    ExpenseItem, ItemDraft, NewPlanCmd, Note, NoteDraft, NoteKind, PlanBalance, PlanDetail,
    PlanSummary, Priority, ResultEngine, UpdatePlanCmd,
    categories::{self, DEFAULT_CATALOG},
    items, notes, plans,
    util::{
        copy_title, normalize_color, normalize_content, normalize_title, validate_amount,
        validate_period,
    },
};

use super::{Engine, with_tx};

impl Engine {
    /// Create a plan with the default category catalog.
    pub async fn create_plan(&self, user_id: Uuid, cmd: NewPlanCmd) -> ResultEngine<BudgetPlan> {
        let plan = validated_plan(user_id, &cmd)?;

        with_tx!(self, |db_tx| {
            self.lock_user(&db_tx, user_id).await?;
            plans::ActiveModel::from(&plan).insert(&db_tx).await?;

            for (position, (title, kind)) in DEFAULT_CATALOG.iter().enumerate() {
                insert_category(&db_tx, plan.id, title, *kind, position as i32, plan.created_at)
                    .await?;
            }

            Ok(plan)
        })
    }

    /// Create a plan from a complete category/item/note tree.
    ///
    /// The whole tree is validated before anything is written: at least one
    /// category, non-blank titles and contents, positive amounts and a sum
    /// of amounts within the budget. Positions follow the input order.
    pub async fn create_plan_with_details(
        &self,
        user_id: Uuid,
        cmd: NewPlanCmd,
        categories: Vec<CategoryDraft>,
        notes: Vec<NoteDraft>,
    ) -> ResultEngine<BudgetPlan> {
        let plan = validated_plan(user_id, &cmd)?;
        let categories = validated_tree(plan.budget_cents, categories)?;
        let notes = notes
            .into_iter()
            .map(|note| Ok(NoteDraft::new(normalize_content(&note.content)?, note.kind)))
            .collect::<ResultEngine<Vec<_>>>()?;

        with_tx!(self, |db_tx| {
            self.lock_user(&db_tx, user_id).await?;
            plans::ActiveModel::from(&plan).insert(&db_tx).await?;

            for (position, draft) in categories.iter().enumerate() {
                let category = insert_category(
                    &db_tx,
                    plan.id,
                    &draft.title,
                    draft.kind,
                    position as i32,
                    plan.created_at,
                )
                .await?;
                for (item_position, item) in draft.items.iter().enumerate() {
                    insert_item(
                        &db_tx,
                        category.id,
                        &item.title,
                        item.amount_cents,
                        item.priority,
                        false,
                        item_position as i32,
                        plan.created_at,
                    )
                    .await?;
                }
            }

            for (position, note) in notes.iter().enumerate() {
                insert_note(
                    &db_tx,
                    plan.id,
                    &note.content,
                    note.kind,
                    position as i32,
                    plan.created_at,
                )
                .await?;
            }

            Ok(plan)
        })
    }

    /// Update a plan.
    ///
    /// Lowering the budget below the current items total is allowed.
    pub async fn update_plan(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        cmd: UpdatePlanCmd,
    ) -> ResultEngine<BudgetPlan> {
        let title = normalize_title(&cmd.title, "plan")?;
        validate_amount(cmd.budget_cents, "budget")?;
        validate_period(cmd.period_start, cmd.period_end)?;
        let color = cmd
            .background_color
            .as_deref()
            .map(|color| normalize_color(Some(color)))
            .transpose()?;

        with_tx!(self, |db_tx| {
            self.lock_plan(&db_tx, plan_id, user_id).await?;
            let model = self.require_plan(&db_tx, plan_id, user_id).await?;

            let mut active: plans::ActiveModel = model.into();
            active.title = ActiveValue::Set(title);
            active.budget_cents = ActiveValue::Set(cmd.budget_cents);
            active.period_start = ActiveValue::Set(cmd.period_start);
            active.period_end = ActiveValue::Set(cmd.period_end);
            if let Some(color) = color {
                active.background_color = ActiveValue::Set(color);
            }
            if let Some(is_ai_generated) = cmd.is_ai_generated {
                active.is_ai_generated = ActiveValue::Set(is_ai_generated);
            }
            active.updated_at = ActiveValue::Set(Utc::now());

            let model = active.update(&db_tx).await?;
            Ok(BudgetPlan::from(model))
        })
    }

    /// Delete a plan with all its categories, items and notes.
    pub async fn delete_plan(&self, user_id: Uuid, plan_id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.lock_plan(&db_tx, plan_id, user_id).await?;
            let plan = self.require_plan(&db_tx, plan_id, user_id).await?;

            db_tx
                .execute(Statement::from_sql_and_values(
                    db_tx.get_database_backend(),
                    "DELETE FROM expense_items WHERE category_id IN \
                     (SELECT id FROM expense_categories WHERE plan_id = ?);",
                    vec![plan.id.into()],
                ))
                .await?;
            categories::Entity::delete_many()
                .filter(categories::Column::PlanId.eq(plan.id))
                .exec(&db_tx)
                .await?;
            notes::Entity::delete_many()
                .filter(notes::Column::PlanId.eq(plan.id))
                .exec(&db_tx)
                .await?;
            plans::Entity::delete_by_id(plan.id).exec(&db_tx).await?;

            Ok(())
        })
    }

    /// Deep copy a plan under fresh ids.
    ///
    /// Titles, amounts, kinds, completion flags and positions are kept; the
    /// plan title gets a `Copy of ` prefix.
    pub async fn duplicate_plan(&self, user_id: Uuid, plan_id: Uuid) -> ResultEngine<BudgetPlan> {
        with_tx!(self, |db_tx| {
            self.lock_plan(&db_tx, plan_id, user_id).await?;
            let source = self.require_plan(&db_tx, plan_id, user_id).await?;
            let now = Utc::now();

            let copy = BudgetPlan {
                id: Uuid::new_v4(),
                user_id,
                title: copy_title(&source.title),
                budget_cents: source.budget_cents,
                period_start: source.period_start,
                period_end: source.period_end,
                background_color: source.background_color.clone(),
                is_ai_generated: source.is_ai_generated,
                created_at: now,
                updated_at: now,
            };
            plans::ActiveModel::from(&copy).insert(&db_tx).await?;

            let source_categories = load_categories(&db_tx, source.id).await?;
            let category_ids: Vec<Uuid> = source_categories.iter().map(|c| c.id).collect();
            let mut source_items = load_items(&db_tx, &category_ids).await?;

            for category in source_categories {
                let kind = CategoryKind::try_from(category.category_type.as_str())?;
                let copied =
                    insert_category(&db_tx, copy.id, &category.title, kind, category.sort_order, now)
                        .await?;
                for item in source_items.remove(&category.id).unwrap_or_default() {
                    insert_item(
                        &db_tx,
                        copied.id,
                        &item.title,
                        item.amount_cents,
                        Priority::try_from(item.priority_color.as_str())?,
                        item.is_completed,
                        item.sort_order,
                        now,
                    )
                    .await?;
                }
            }

            for note in load_notes(&db_tx, source.id, None).await? {
                let kind = NoteKind::try_from(note.note_type.as_str())?;
                insert_note(&db_tx, copy.id, &note.content, kind, note.sort_order, now).await?;
            }

            Ok(copy)
        })
    }

    pub async fn plan(&self, user_id: Uuid, plan_id: Uuid) -> ResultEngine<BudgetPlan> {
        with_tx!(self, |db_tx| {
            let model = self.require_plan(&db_tx, plan_id, user_id).await?;
            Ok(BudgetPlan::from(model))
        })
    }

    /// Budget, spent (completed items only) and remaining amount of a plan.
    pub async fn plan_balance(&self, user_id: Uuid, plan_id: Uuid) -> ResultEngine<PlanBalance> {
        with_tx!(self, |db_tx| {
            let model = self.require_plan(&db_tx, plan_id, user_id).await?;
            let spent = self.spent_total(&db_tx, model.id).await?;
            Ok(PlanBalance::new(model.budget_cents, spent))
        })
    }

    pub async fn plan_detail(&self, user_id: Uuid, plan_id: Uuid) -> ResultEngine<PlanDetail> {
        with_tx!(self, |db_tx| {
            let model = self.require_plan(&db_tx, plan_id, user_id).await?;
            let spent = self.spent_total(&db_tx, model.id).await?;

            let category_models = load_categories(&db_tx, model.id).await?;
            let category_ids: Vec<Uuid> = category_models.iter().map(|c| c.id).collect();
            let mut items_by_category = load_items(&db_tx, &category_ids).await?;

            let categories = category_models
                .into_iter()
                .map(|category| {
                    let items = items_by_category
                        .remove(&category.id)
                        .unwrap_or_default()
                        .into_iter()
                        .map(ExpenseItem::try_from)
                        .collect::<ResultEngine<Vec<_>>>()?;
                    Ok(CategoryWithItems {
                        category: ExpenseCategory::try_from(category)?,
                        items,
                    })
                })
                .collect::<ResultEngine<Vec<_>>>()?;

            let notes = load_notes(&db_tx, model.id, None)
                .await?
                .into_iter()
                .map(Note::try_from)
                .collect::<ResultEngine<Vec<_>>>()?;

            Ok(PlanDetail {
                balance: PlanBalance::new(model.budget_cents, spent),
                plan: BudgetPlan::from(model),
                categories,
                notes,
            })
        })
    }

    /// Plans whose period ends on or after `today`, newest first.
    pub async fn list_active_plans(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> ResultEngine<Vec<PlanSummary>> {
        with_tx!(self, |db_tx| {
            let models = plans::Entity::find()
                .filter(plans::Column::UserId.eq(user_id))
                .filter(plans::Column::PeriodEnd.gte(today))
                .order_by_desc(plans::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            self.summaries(&db_tx, models).await
        })
    }

    /// Plans whose period ended before `today`, latest end first.
    pub async fn list_archived_plans(
        &self,
        user_id: Uuid,
        today: NaiveDate,
    ) -> ResultEngine<Vec<PlanSummary>> {
        with_tx!(self, |db_tx| {
            let models = plans::Entity::find()
                .filter(plans::Column::UserId.eq(user_id))
                .filter(plans::Column::PeriodEnd.lt(today))
                .order_by_desc(plans::Column::PeriodEnd)
                .order_by_desc(plans::Column::CreatedAt)
                .all(&db_tx)
                .await?;
            self.summaries(&db_tx, models).await
        })
    }

    async fn summaries(
        &self,
        db: &DatabaseTransaction,
        models: Vec<plans::Model>,
    ) -> ResultEngine<Vec<PlanSummary>> {
        let mut summaries = Vec::with_capacity(models.len());
        for model in models {
            let spent = self.spent_total(db, model.id).await?;
            summaries.push(PlanSummary {
                balance: PlanBalance::new(model.budget_cents, spent),
                plan: BudgetPlan::from(model),
            });
        }
        Ok(summaries)
    }
}

fn validated_plan(user_id: Uuid, cmd: &NewPlanCmd) -> ResultEngine<BudgetPlan> {
    let title = normalize_title(&cmd.title, "plan")?;
    validate_amount(cmd.budget_cents, "budget")?;
    validate_period(cmd.period_start, cmd.period_end)?;
    let background_color = normalize_color(cmd.background_color.as_deref())?;
    let now = Utc::now();

    Ok(BudgetPlan {
        id: Uuid::new_v4(),
        user_id,
        title,
        budget_cents: cmd.budget_cents,
        period_start: cmd.period_start,
        period_end: cmd.period_end,
        background_color,
        is_ai_generated: cmd.is_ai_generated,
        created_at: now,
        updated_at: now,
    })
}

/// Normalize a generated category tree and check it against the budget.
fn validated_tree(
    budget_cents: i64,
    categories: Vec<CategoryDraft>,
) -> ResultEngine<Vec<CategoryDraft>> {
    if categories.is_empty() {
        return Err(EngineError::InvalidInput(
            "a plan needs at least one category".to_string(),
        ));
    }

    let mut total: i64 = 0;
    let mut validated = Vec::with_capacity(categories.len());
    for draft in categories {
        let mut category = CategoryDraft::new(normalize_title(&draft.title, "category")?, draft.kind);
        for item in draft.items {
            validate_amount(item.amount_cents, "item")?;
            total = total.checked_add(item.amount_cents).ok_or_else(|| {
                EngineError::BudgetExceeded("items total overflows".to_string())
            })?;
            category.items.push(ItemDraft::new(
                normalize_title(&item.title, "item")?,
                item.amount_cents,
                item.priority,
            ));
        }
        validated.push(category);
    }

    if total > budget_cents {
        return Err(EngineError::BudgetExceeded(format!(
            "items total {total} exceeds budget {budget_cents}"
        )));
    }
    Ok(validated)
}

pub(super) async fn insert_category(
    db: &DatabaseTransaction,
    plan_id: Uuid,
    title: &str,
    kind: CategoryKind,
    position: i32,
    created_at: DateTime<Utc>,
) -> ResultEngine<categories::Model> {
    let model = categories::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        plan_id: ActiveValue::Set(plan_id),
        title: ActiveValue::Set(title.to_string()),
        category_type: ActiveValue::Set(kind.as_str().to_string()),
        sort_order: ActiveValue::Set(position),
        created_at: ActiveValue::Set(created_at),
    }
    .insert(db)
    .await?;
    Ok(model)
}

#[allow(clippy::too_many_arguments)]
pub(super) async fn insert_item(
    db: &DatabaseTransaction,
    category_id: Uuid,
    title: &str,
    amount_cents: i64,
    priority: Priority,
    is_completed: bool,
    position: i32,
    created_at: DateTime<Utc>,
) -> ResultEngine<items::Model> {
    let model = items::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        category_id: ActiveValue::Set(category_id),
        title: ActiveValue::Set(title.to_string()),
        amount_cents: ActiveValue::Set(amount_cents),
        priority_color: ActiveValue::Set(priority.as_str().to_string()),
        is_completed: ActiveValue::Set(is_completed),
        sort_order: ActiveValue::Set(position),
        created_at: ActiveValue::Set(created_at),
        updated_at: ActiveValue::Set(created_at),
    }
    .insert(db)
    .await?;
    Ok(model)
}

pub(super) async fn insert_note(
    db: &DatabaseTransaction,
    plan_id: Uuid,
    content: &str,
    kind: NoteKind,
    position: i32,
    created_at: DateTime<Utc>,
) -> ResultEngine<notes::Model> {
    let model = notes::ActiveModel {
        id: ActiveValue::Set(Uuid::new_v4()),
        plan_id: ActiveValue::Set(plan_id),
        content: ActiveValue::Set(content.to_string()),
        note_type: ActiveValue::Set(kind.as_str().to_string()),
        sort_order: ActiveValue::Set(position),
        created_at: ActiveValue::Set(created_at),
        updated_at: ActiveValue::Set(created_at),
    }
    .insert(db)
    .await?;
    Ok(model)
}

pub(super) async fn load_categories(
    db: &DatabaseTransaction,
    plan_id: Uuid,
) -> ResultEngine<Vec<categories::Model>> {
    Ok(categories::Entity::find()
        .filter(categories::Column::PlanId.eq(plan_id))
        .order_by_asc(categories::Column::SortOrder)
        .order_by_asc(categories::Column::CreatedAt)
        .all(db)
        .await?)
}

/// Items of the given categories, grouped by category and ordered.
pub(super) async fn load_items(
    db: &DatabaseTransaction,
    category_ids: &[Uuid],
) -> ResultEngine<HashMap<Uuid, Vec<items::Model>>> {
    let mut grouped: HashMap<Uuid, Vec<items::Model>> = HashMap::new();
    if category_ids.is_empty() {
        return Ok(grouped);
    }
    let models = items::Entity::find()
        .filter(items::Column::CategoryId.is_in(category_ids.iter().copied()))
        .order_by_asc(items::Column::SortOrder)
        .order_by_asc(items::Column::CreatedAt)
        .all(db)
        .await?;
    for model in models {
        grouped.entry(model.category_id).or_default().push(model);
    }
    Ok(grouped)
}

pub(super) async fn load_notes(
    db: &DatabaseTransaction,
    plan_id: Uuid,
    kind: Option<NoteKind>,
) -> ResultEngine<Vec<notes::Model>> {
    let mut query = notes::Entity::find().filter(notes::Column::PlanId.eq(plan_id));
    if let Some(kind) = kind {
        query = query.filter(notes::Column::NoteType.eq(kind.as_str()));
    }
    Ok(query
        .order_by_asc(notes::Column::SortOrder)
        .order_by_asc(notes::Column::CreatedAt)
        .all(db)
        .await?)
}
