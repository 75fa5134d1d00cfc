use sea_orm::{
    DatabaseTransaction, JoinType, QueryFilter, QuerySelect, Statement, prelude::*,
    sea_query::Expr,
};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, categories, items, notes, plans, users};

use super::Engine;

/// Child rows whose owning plan can be locked from the child id alone.
#[derive(Clone, Copy, Debug)]
pub(super) enum PlanChild {
    Category,
    Item,
    Note,
}

impl PlanChild {
    fn label(self) -> &'static str {
        match self {
            Self::Category => "category",
            Self::Item => "item",
            Self::Note => "note",
        }
    }

    fn plan_id_query(self) -> &'static str {
        match self {
            Self::Category => "SELECT plan_id FROM expense_categories WHERE id = ?",
            Self::Item => {
                "SELECT c.plan_id FROM expense_items i \
                 INNER JOIN expense_categories c ON c.id = i.category_id WHERE i.id = ?"
            }
            Self::Note => "SELECT plan_id FROM notes WHERE id = ?",
        }
    }
}

/// Generates a `require_*` method for an entity owned directly by a plan.
///
/// The row is only returned when the owning plan belongs to the user.
macro_rules! impl_owned_by_plan {
    ($require_fn:ident, $entity:path, $model:path, $err_msg:literal) => {
        pub(super) async fn $require_fn(
            &self,
            db: &DatabaseTransaction,
            id: Uuid,
            user_id: Uuid,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(id)
                .inner_join(plans::Entity)
                .filter(plans::Column::UserId.eq(user_id))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_owned_by_plan!(
        require_category,
        categories::Entity,
        categories::Model,
        "category not exists"
    );

    impl_owned_by_plan!(require_note, notes::Entity, notes::Model, "note not exists");

    /// Take the write lock through the user row, for writes that create a
    /// plan and so have no plan row to lock yet.
    pub(super) async fn lock_user(
        &self,
        db: &DatabaseTransaction,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        let result = users::Entity::update_many()
            .col_expr(
                users::Column::UpdatedAt,
                Expr::col(users::Column::UpdatedAt).into(),
            )
            .filter(users::Column::Id.eq(user_id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("user not exists".to_string()));
        }
        Ok(())
    }

    pub(super) async fn require_plan(
        &self,
        db: &DatabaseTransaction,
        plan_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<plans::Model> {
        plans::Entity::find_by_id(plan_id)
            .filter(plans::Column::UserId.eq(user_id))
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("plan not exists".to_string()))
    }

    /// Take the exclusive per-plan lock for the rest of the transaction.
    ///
    /// Must be the first statement of every writing transaction. The no-op
    /// update grabs the SQLite write lock, or the row lock on backends that
    /// have one, so writers on the same plan are serialized. A transaction
    /// that reads first and writes later cannot upgrade its shared lock while
    /// another writer is active and fails with `SQLITE_BUSY`.
    pub(super) async fn lock_plan(
        &self,
        db: &DatabaseTransaction,
        plan_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        let result = plans::Entity::update_many()
            .col_expr(
                plans::Column::BudgetCents,
                Expr::col(plans::Column::BudgetCents).into(),
            )
            .filter(plans::Column::Id.eq(plan_id))
            .filter(plans::Column::UserId.eq(user_id))
            .exec(db)
            .await?;
        if result.rows_affected == 0 {
            return Err(EngineError::KeyNotFound("plan not exists".to_string()));
        }
        Ok(())
    }

    /// Take the plan lock starting from one of its children.
    ///
    /// Same lock as [`Engine::lock_plan`], for callers that only know a
    /// child id. The child is read after this returns, so it cannot change
    /// between the read and the write.
    pub(super) async fn lock_plan_of(
        &self,
        db: &DatabaseTransaction,
        child: PlanChild,
        child_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<()> {
        let sql = format!(
            "UPDATE budget_plans SET budget_cents = budget_cents \
             WHERE user_id = ? AND id = ({});",
            child.plan_id_query()
        );
        let result = db
            .execute(Statement::from_sql_and_values(
                db.get_database_backend(),
                sql,
                vec![user_id.into(), child_id.into()],
            ))
            .await?;
        if result.rows_affected() == 0 {
            return Err(EngineError::KeyNotFound(format!(
                "{} not exists",
                child.label()
            )));
        }
        Ok(())
    }

    /// Resolve an item owned by the user, together with its plan id.
    pub(super) async fn require_item(
        &self,
        db: &DatabaseTransaction,
        item_id: Uuid,
        user_id: Uuid,
    ) -> ResultEngine<(items::Model, Uuid)> {
        let row = items::Entity::find_by_id(item_id)
            .find_also_related(categories::Entity)
            .join(JoinType::InnerJoin, categories::Relation::Plan.def())
            .filter(plans::Column::UserId.eq(user_id))
            .one(db)
            .await?;
        match row {
            Some((item, Some(category))) => Ok((item, category.plan_id)),
            _ => Err(EngineError::KeyNotFound("item not exists".to_string())),
        }
    }
}
