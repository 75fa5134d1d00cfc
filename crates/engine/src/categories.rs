//! Expense categories of a plan.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

/// Whether the expenses in a category can be skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CategoryKind {
    Mandatory,
    Optional,
}

impl CategoryKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Mandatory => "mandatory",
            Self::Optional => "optional",
        }
    }
}

impl TryFrom<&str> for CategoryKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "mandatory" => Ok(Self::Mandatory),
            "optional" => Ok(Self::Optional),
            other => Err(EngineError::InvalidInput(format!(
                "invalid category type: {other}"
            ))),
        }
    }
}

/// Categories every new plan starts with, in position order.
pub(crate) const DEFAULT_CATALOG: [(&str, CategoryKind); 6] = [
    ("Housing", CategoryKind::Mandatory),
    ("Utilities", CategoryKind::Mandatory),
    ("Food", CategoryKind::Mandatory),
    ("Transport", CategoryKind::Mandatory),
    ("Entertainment", CategoryKind::Optional),
    ("Other", CategoryKind::Optional),
];

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ExpenseCategory {
    pub id: Uuid,
    pub plan_id: Uuid,
    pub title: String,
    pub kind: CategoryKind,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "expense_categories")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub plan_id: Uuid,
    pub title: String,
    pub category_type: String,
    pub sort_order: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::plans::Entity",
        from = "Column::PlanId",
        to = "super::plans::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    Plan,
    #[sea_orm(has_many = "super::items::Entity")]
    Items,
}

impl Related<super::plans::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Plan.def()
    }
}

impl Related<super::items::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Items.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl TryFrom<Model> for ExpenseCategory {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            plan_id: model.plan_id,
            title: model.title,
            kind: CategoryKind::try_from(model.category_type.as_str())?,
            sort_order: model.sort_order,
            created_at: model.created_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_round_trips_through_storage_string() {
        for kind in [CategoryKind::Mandatory, CategoryKind::Optional] {
            assert_eq!(CategoryKind::try_from(kind.as_str()).unwrap(), kind);
        }
        assert!(CategoryKind::try_from("luxury").is_err());
    }

    #[test]
    fn default_catalog_has_four_mandatory_then_two_optional() {
        let kinds: Vec<_> = DEFAULT_CATALOG.iter().map(|(_, kind)| *kind).collect();
        assert_eq!(&kinds[..4], &[CategoryKind::Mandatory; 4]);
        assert_eq!(&kinds[4..], &[CategoryKind::Optional; 2]);
    }
}
