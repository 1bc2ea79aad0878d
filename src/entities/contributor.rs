//! Contributor entity - "this resident shares the cost of this expense".
//!
//! Keyed by `(expense_id, resident_id)`, so a resident contributes to an expense at most once.
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Contributor database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "contributors")]
pub struct Model {
    /// ID of the shared expense
    #[sea_orm(primary_key, auto_increment = false)]
    pub expense_id: i64,
    /// ID of the resident sharing the cost
    #[sea_orm(primary_key, auto_increment = false)]
    pub resident_id: i64,
}

/// Defines relationships between Contributor and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each contribution belongs to one expense
    #[sea_orm(
        belongs_to = "super::expense::Entity",
        from = "Column::ExpenseId",
        to = "super::expense::Column::Id"
    )]
    Expense,
    /// Each contribution belongs to one resident
    #[sea_orm(
        belongs_to = "super::resident::Entity",
        from = "Column::ResidentId",
        to = "super::resident::Column::Id"
    )]
    Resident,
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl Related<super::resident::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Resident.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
