//! Payment link entity - Which expenses a payment was meant to settle.
//!
//! Purely informational; balances are computed from payments alone.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Payment link database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "payment_for")]
pub struct Model {
    /// ID of the payment
    #[sea_orm(primary_key, auto_increment = false)]
    pub payment_id: i64,
    /// ID of the expense the payment went toward
    #[sea_orm(primary_key, auto_increment = false)]
    pub expense_id: i64,
}

/// Defines relationships between payment links and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each link belongs to one payment
    #[sea_orm(
        belongs_to = "super::payment::Entity",
        from = "Column::PaymentId",
        to = "super::payment::Column::Id"
    )]
    Payment,
    /// Each link points at one expense
    #[sea_orm(
        belongs_to = "super::expense::Entity",
        from = "Column::ExpenseId",
        to = "super::expense::Column::Id"
    )]
    Expense,
}

impl Related<super::payment::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Payment.def()
    }
}

impl Related<super::expense::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Expense.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
