//! Shared test utilities.
//!
//! This module provides common helper functions for setting up test databases
//! and creating test records with sensible defaults.

use crate::{
    core::{
        expense::{self, CreatedExpense, NewExpense},
        payment::{self, CreatedPayment, NewPayment},
        resident,
    },
    entities,
    errors::Result,
};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a resident model without touching the database.
#[must_use]
pub fn test_resident_model(id: i64, nickname: &str) -> entities::resident::Model {
    entities::resident::Model {
        id,
        nickname: nickname.to_string(),
        created_at: chrono::Utc::now(),
    }
}

/// Creates a resident with the given nickname.
pub async fn create_test_resident(
    db: &DatabaseConnection,
    nickname: &str,
) -> Result<entities::resident::Model> {
    resident::create_resident(db, nickname).await
}

/// Creates an expense split between `contributors`.
///
/// # Defaults
/// * `notes`: None
pub async fn create_test_expense(
    db: &DatabaseConnection,
    item: &str,
    price: f64,
    care_of: i64,
    contributors: &[i64],
) -> Result<CreatedExpense> {
    expense::create_expense(
        db,
        NewExpense {
            item: item.to_string(),
            price,
            care_of,
            contributors: contributors.to_vec(),
            notes: None,
        },
    )
    .await
}

/// Creates a payment that isn't linked to any expense.
pub async fn create_test_payment(
    db: &DatabaseConnection,
    paid_by: i64,
    received_by: i64,
    amount: f64,
) -> Result<CreatedPayment> {
    payment::create_payment(
        db,
        NewPayment {
            paid_by,
            received_by,
            amount,
            notes: None,
            for_expenses: Vec::new(),
        },
    )
    .await
}

/// Sets up a database with Alice, Bob and Cara.
/// Returns (db, [alice, bob, cara]).
pub async fn setup_household() -> Result<(DatabaseConnection, [entities::resident::Model; 3])> {
    let db = setup_test_db().await?;
    let alice = create_test_resident(&db, "Alice").await?;
    let bob = create_test_resident(&db, "Bob").await?;
    let cara = create_test_resident(&db, "Cara").await?;
    Ok((db, [alice, bob, cara]))
}
