use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{CategoryKind, ExpenseCategory, ResultEngine, categories, items, util::normalize_title};

use super::{Engine, access::PlanChild, plans::insert_category, with_tx};

impl Engine {
    /// Append a category at the end of the plan's categories.
    pub async fn create_category(
        &self,
        user_id: Uuid,
        plan_id: Uuid,
        title: &str,
        kind: CategoryKind,
    ) -> ResultEngine<ExpenseCategory> {
        let title = normalize_title(title, "category")?;

        with_tx!(self, |db_tx| {
            self.lock_plan(&db_tx, plan_id, user_id).await?;
            let position = self
                .next_position::<categories::Entity>(&db_tx, plan_id)
                .await?;
            let model =
                insert_category(&db_tx, plan_id, &title, kind, position, Utc::now()).await?;
            ExpenseCategory::try_from(model)
        })
    }

    pub async fn update_category(
        &self,
        user_id: Uuid,
        category_id: Uuid,
        title: &str,
        kind: CategoryKind,
    ) -> ResultEngine<ExpenseCategory> {
        let title = normalize_title(title, "category")?;

        with_tx!(self, |db_tx| {
            self.lock_plan_of(&db_tx, PlanChild::Category, category_id, user_id)
                .await?;
            let model = self.require_category(&db_tx, category_id, user_id).await?;
            let mut active: categories::ActiveModel = model.into();
            active.title = ActiveValue::Set(title);
            active.category_type = ActiveValue::Set(kind.as_str().to_string());
            let model = active.update(&db_tx).await?;
            ExpenseCategory::try_from(model)
        })
    }

    /// Delete a category and its items. Returns the owning plan id.
    pub async fn delete_category(&self, user_id: Uuid, category_id: Uuid) -> ResultEngine<Uuid> {
        with_tx!(self, |db_tx| {
            self.lock_plan_of(&db_tx, PlanChild::Category, category_id, user_id)
                .await?;
            let model = self.require_category(&db_tx, category_id, user_id).await?;

            items::Entity::delete_many()
                .filter(items::Column::CategoryId.eq(model.id))
                .exec(&db_tx)
                .await?;
            categories::Entity::delete_by_id(model.id)
                .exec(&db_tx)
                .await?;

            Ok(model.plan_id)
        })
    }

    /// Reorder every category of the plan owning `anchor_id`.
    pub async fn reorder_categories(
        &self,
        user_id: Uuid,
        anchor_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.lock_plan_of(&db_tx, PlanChild::Category, anchor_id, user_id)
                .await?;
            let anchor = self.require_category(&db_tx, anchor_id, user_id).await?;
            self.apply_order::<categories::Entity>(&db_tx, anchor.plan_id, ordered_ids)
                .await
        })
    }
}
