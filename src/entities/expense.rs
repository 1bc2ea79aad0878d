//! Expense entity - Something bought for the household.
//!
//! `care_of` is the resident who fronted the money and is owed by every contributor.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Expense database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "expenses")]
pub struct Model {
    /// Unique identifier for the expense
    #[sea_orm(primary_key)]
    pub id: i64,
    /// When the expense was logged
    pub created_at: DateTimeUtc,
    /// What was bought (e.g., "Groceries", "Electric bill")
    pub item: String,
    /// Total price
    pub price: f64,
    /// ID of the resident who paid and is owed
    pub care_of: i64,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Defines relationships between Expense and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each expense was fronted by one resident
    #[sea_orm(
        belongs_to = "super::resident::Entity",
        from = "Column::CareOf",
        to = "super::resident::Column::Id"
    )]
    CareOf,
    /// One expense has many contributors
    #[sea_orm(has_many = "super::contributor::Entity")]
    Contributors,
    /// Payments that were made toward this expense
    #[sea_orm(has_many = "super::payment_for::Entity")]
    PaymentLinks,
}

impl Related<super::resident::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::CareOf.def()
    }
}

impl Related<super::contributor::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Contributors.def()
    }
}

impl Related<super::payment_for::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
