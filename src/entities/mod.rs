//! Entity module - Contains all SeaORM entity definitions for the database.
//! These entities represent the database tables and their relationships.
//! Each entity has a Model struct for data and an Entity struct for operations.

pub mod contributor;
pub mod expense;
pub mod payment;
pub mod payment_for;
pub mod resident;

// Re-export specific types to avoid conflicts
pub use contributor::{
    Column as ContributorColumn, Entity as Contributor, Model as ContributorModel,
};
pub use expense::{Column as ExpenseColumn, Entity as Expense, Model as ExpenseModel};
pub use payment::{Column as PaymentColumn, Entity as Payment, Model as PaymentModel};
pub use payment_for::{
    Column as PaymentForColumn, Entity as PaymentFor, Model as PaymentForModel,
};
pub use resident::{Column as ResidentColumn, Entity as Resident, Model as ResidentModel};
