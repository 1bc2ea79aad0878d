//! Payment entity - A settlement where `paid_by` transferred `amount` to `received_by`.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payments")]
pub struct Model {
    /// Unique identifier for the payment
    #[sea_orm(primary_key)]
    pub id: i64,
    /// When the payment was recorded
    pub created_at: DateTimeUtc,
    /// ID of the resident who handed over the money
    pub paid_by: i64,
    /// ID of the resident who received the money
    pub received_by: i64,
    /// Amount transferred
    pub amount: f64,
    /// Free-form notes
    pub notes: Option<String>,
}

/// Defines relationships between Payment and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Expenses this payment was meant to settle
    #[sea_orm(has_many = "super::payment_for::Entity")]
    PaymentLinks,
}

impl Related<super::payment_for::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PaymentLinks.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
