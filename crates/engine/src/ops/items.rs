use chrono::Utc;
use sea_orm::{ActiveValue, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ExpenseItem, NewItemCmd, Priority, ResultEngine, UpdateItemCmd, items,
    util::{normalize_title, validate_amount},
};

use super::{Engine, access::PlanChild, plans::insert_item, with_tx};

impl Engine {
    /// Append an item to a category of the plan.
    ///
    /// Fails with `BudgetExceeded` when the amounts of all items of the plan,
    /// completed or not, would go above the budget.
    pub async fn create_item(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        category_id: Uuid,
        cmd: NewItemCmd,
    ) -> ResultEngine<ExpenseItem> {
        let title = normalize_title(&cmd.title, "item")?;
        validate_amount(cmd.amount_cents, "item")?;

        with_tx!(self, |db_tx| {
            self.lock_plan(&db_tx, plan_id, user_id).await?;
            let category = self.require_category(&db_tx, category_id, user_id).await?;
            if category.plan_id != plan_id {
                return Err(EngineError::KeyNotFound("category not exists".to_string()));
            }
            let plan = self.require_plan(&db_tx, plan_id, user_id).await?;
            self.ensure_within_budget(&db_tx, &plan, 0, cmd.amount_cents)
                .await?;

            let position = self
                .next_position::<items::Entity>(&db_tx, category.id)
                .await?;
            let model = insert_item(
                &db_tx,
                category.id,
                &title,
                cmd.amount_cents,
                cmd.priority,
                cmd.is_completed,
                position,
                Utc::now(),
            )
            .await?;
            ExpenseItem::try_from(model)
        })
    }

    /// Replace title, amount and priority of an item.
    ///
    /// The budget is checked with the old amount swapped for the new one.
    pub async fn update_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        cmd: UpdateItemCmd,
    ) -> ResultEngine<ExpenseItem> {
        let title = normalize_title(&cmd.title, "item")?;
        validate_amount(cmd.amount_cents, "item")?;

        with_tx!(self, |db_tx| {
            self.lock_plan_of(&db_tx, PlanChild::Item, item_id, user_id)
                .await?;
            let (model, plan_id) = self.require_item(&db_tx, item_id, user_id).await?;
            let plan = self.require_plan(&db_tx, plan_id, user_id).await?;
            self.ensure_within_budget(&db_tx, &plan, model.amount_cents, cmd.amount_cents)
                .await?;

            let mut active: items::ActiveModel = model.into();
            active.title = ActiveValue::Set(title);
            active.amount_cents = ActiveValue::Set(cmd.amount_cents);
            active.priority_color = ActiveValue::Set(cmd.priority.as_str().to_string());
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            ExpenseItem::try_from(model)
        })
    }

    /// Set or flip the completed flag. `None` flips the current value.
    ///
    /// Amounts do not change, so the budget is not checked.
    pub async fn toggle_item(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        completed: Option<bool>,
    ) -> ResultEngine<ExpenseItem> {
        with_tx!(self, |db_tx| {
            self.lock_plan_of(&db_tx, PlanChild::Item, item_id, user_id)
                .await?;
            let (model, _) = self.require_item(&db_tx, item_id, user_id).await?;
            let completed = completed.unwrap_or(!model.is_completed);

            let mut active: items::ActiveModel = model.into();
            active.is_completed = ActiveValue::Set(completed);
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            ExpenseItem::try_from(model)
        })
    }

    pub async fn set_item_priority(
        &self,
        user_id: Uuid,
        item_id: Uuid,
        priority: Priority,
    ) -> ResultEngine<ExpenseItem> {
        with_tx!(self, |db_tx| {
            self.lock_plan_of(&db_tx, PlanChild::Item, item_id, user_id)
                .await?;
            let (model, _) = self.require_item(&db_tx, item_id, user_id).await?;

            let mut active: items::ActiveModel = model.into();
            active.priority_color = ActiveValue::Set(priority.as_str().to_string());
            active.updated_at = ActiveValue::Set(Utc::now());
            let model = active.update(&db_tx).await?;
            ExpenseItem::try_from(model)
        })
    }

    /// Delete an item. Returns the owning plan id.
    pub async fn delete_item(&self, user_id: Uuid, item_id: Uuid) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            self.lock_plan_of(&db_tx, PlanChild::Item, item_id, user_id)
                .await?;
            let (model, plan_id) = self.require_item(&db_tx, item_id, user_id).await?;
            items::Entity::delete_by_id(model.id).exec(&db_tx).await?;
            Ok(plan_id)
        })
    }

    /// Plan owning an item.
    pub async fn item_plan_id(&self, user_id: Uuid, item_id: Uuid) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            let (_, plan_id) = self.require_item(&db_tx, item_id, user_id).await?;
            Ok(plan_id)
        })
    }

    /// Reorder every item of the category owning `anchor_id`.
    pub async fn reorder_items(
        &self,
        user_id: Uuid,
        anchor_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.lock_plan_of(&db_tx, PlanChild::Item, anchor_id, user_id)
                .await?;
            let (anchor, _) = self.require_item(&db_tx, anchor_id, user_id).await?;
            self.apply_order::<items::Entity>(&db_tx, anchor.category_id, ordered_ids)
                .await
        })
    }
}
