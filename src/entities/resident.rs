//! Resident entity - A person living in the household.
//!
//! Residents front money for expenses, share the cost of expenses, and pay each other back.
//! Nicknames are unique case-insensitively; that rule is enforced by `core::resident`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Resident database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "residents")]
pub struct Model {
    /// Unique identifier for the resident
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Display name (e.g., "Alice")
    pub nickname: String,
    /// When the resident was added
    pub created_at: DateTimeUtc,
}

/// Defines relationships between Resident and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Expenses this resident fronted the money for
    #[sea_orm(has_many = "super::expense::Entity")]
    Expenses,
    /// Expenses this resident shares the cost of
    #[sea_orm(has_many = "super::contributor::Entity")]
    Contributions,
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expenses.def()
    }
}

impl Related<super::contributor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
