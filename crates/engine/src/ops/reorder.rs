//! Positions of ordered children: categories of a plan, items of a
//! category, notes of a plan.
//!
//! New children are appended at `max + 1`. Deletes leave gaps until the
//! collection is reordered, and a reorder always rewrites the whole
//! collection to `0..N` in one statement.

use sea_orm::{
    DatabaseTransaction, EntityTrait, PaginatorTrait, QueryFilter, QuerySelect, prelude::*,
    sea_query::{CaseStatement, Expr},
};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, categories, items, notes, util::ensure_unique_ids};

use super::Engine;

/// An entity whose rows are ordered inside a parent.
pub(super) trait Sequenced: EntityTrait {
    const LABEL: &'static str;

    fn id_column() -> Self::Column;
    fn parent_column() -> Self::Column;
    fn position_column() -> Self::Column;
}

macro_rules! impl_sequenced {
    ($module:ident, $parent:ident, $label:literal) => {
        impl Sequenced for $module::Entity {
            const LABEL: &'static str = $label;

            fn id_column() -> Self::Column {
                $module::Column::Id
            }

            fn parent_column() -> Self::Column {
                $module::Column::$parent
            }

            fn position_column() -> Self::Column {
                $module::Column::SortOrder
            }
        }
    };
}

impl_sequenced!(categories, PlanId, "category");
impl_sequenced!(items, CategoryId, "item");
impl_sequenced!(notes, PlanId, "note");

impl Engine {
    /// Position for a child appended to `parent_id`.
    pub(super) async fn next_position<E>(
        &self,
        db: &DatabaseTransaction,
        parent_id: Uuid,
    ) -> ResultEngine<i32>
    where
        E: Sequenced,
    {
        let max: Option<Option<i32>> = E::find()
            .select_only()
            .column_as(E::position_column().max(), "max")
            .filter(E::parent_column().eq(parent_id))
            .into_tuple()
            .one(db)
            .await?;
        Ok(max.flatten().map_or(0, |value| value + 1))
    }

    /// Rewrite the positions of every child of `parent_id` to follow
    /// `ordered_ids`.
    ///
    /// The list must name each live child exactly once. The caller must hold
    /// the lock of the plan owning `parent_id`.
    pub(super) async fn apply_order<E>(
        &self,
        db: &DatabaseTransaction,
        parent_id: Uuid,
        ordered_ids: &[Uuid],
    ) -> ResultEngine<()>
    where
        E: Sequenced,
        E::Model: Sync,
    {
        ensure_unique_ids(ordered_ids, E::LABEL)?;
        let expected = ordered_ids.len() as u64;

        let live = E::find()
            .filter(E::parent_column().eq(parent_id))
            .count(db)
            .await?;
        let owned = E::find()
            .filter(E::parent_column().eq(parent_id))
            .filter(E::id_column().is_in(ordered_ids.iter().copied()))
            .count(db)
            .await?;
        if owned != expected {
            return Err(EngineError::InvalidInput(format!(
                "{} order contains {} ids from another collection",
                E::LABEL,
                expected - owned
            )));
        }
        if live != expected {
            return Err(EngineError::InvalidInput(format!(
                "{} order lists {expected} ids but the collection has {live}",
                E::LABEL
            )));
        }

        let positions = ordered_ids
            .iter()
            .enumerate()
            .fold(CaseStatement::new(), |case, (index, id)| {
                case.case(E::id_column().eq(*id), Expr::val(index as i32))
            })
            .finally(Expr::col(E::position_column()));

        let result = E::update_many()
            .col_expr(E::position_column(), positions.into())
            .filter(E::parent_column().eq(parent_id))
            .filter(E::id_column().is_in(ordered_ids.iter().copied()))
            .exec(db)
            .await?;
        if result.rows_affected != expected {
            return Err(EngineError::KeyNotFound(format!(
                "{} order changed while reordering",
                E::LABEL
            )));
        }
        Ok(())
    }
}
