//! Expense business logic - Logging shared purchases and who splits them.
//!
//! An expense is always written together with its contributors inside one database
//! transaction, and deleting an expense removes its contributions and payment links
//! with it. Every write returns a receipt describing the rows it touched so callers
//! can publish the matching change events.

use crate::{
    core::snapshot::{Change, ChangeEvent},
    entities::{Contributor, Expense, PaymentFor, Resident, contributor, expense, payment_for},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Input for [`create_expense`].
#[derive(Debug, Clone)]
pub struct NewExpense {
    /// What was bought
    pub item: String,
    /// Total price, must be positive
    pub price: f64,
    /// Resident who paid for it
    pub care_of: i64,
    /// Residents sharing the cost (may include `care_of`)
    pub contributors: Vec<i64>,
    /// Optional free-form notes
    pub notes: Option<String>,
}

/// Rows written by [`create_expense`].
#[derive(Debug, Clone)]
pub struct CreatedExpense {
    /// The inserted expense
    pub expense: expense::Model,
    /// One row per distinct contributor
    pub contributions: Vec<contributor::Model>,
}

impl CreatedExpense {
    /// Change events for the inserted rows.
    #[must_use]
    pub fn changes(&self) -> Vec<ChangeEvent> {
        std::iter::once(ChangeEvent::Expense(Change::Inserted(self.expense.clone())))
            .chain(
                self.contributions
                    .iter()
                    .cloned()
                    .map(|c| ChangeEvent::Contribution(Change::Inserted(c))),
            )
            .collect()
    }
}

/// Rows removed by [`delete_expense`].
#[derive(Debug, Clone)]
pub struct RemovedExpense {
    /// The deleted expense
    pub expense: expense::Model,
    /// Contributions removed along with it
    pub contributions: Vec<contributor::Model>,
    /// Payment links removed along with it
    pub payment_links: Vec<payment_for::Model>,
}

impl RemovedExpense {
    /// Change events for the deleted rows, dependants first.
    #[must_use]
    pub fn changes(&self) -> Vec<ChangeEvent> {
        let contributions = self
            .contributions
            .iter()
            .cloned()
            .map(|c| ChangeEvent::Contribution(Change::Deleted(c)));
        let links = self
            .payment_links
            .iter()
            .cloned()
            .map(|l| ChangeEvent::PaymentLink(Change::Deleted(l)));
        contributions
            .chain(links)
            .chain(std::iter::once(ChangeEvent::Expense(Change::Deleted(
                self.expense.clone(),
            ))))
            .collect()
    }
}

async fn ensure_resident_exists<C>(db: &C, resident_id: i64) -> Result<()>
where
    C: ConnectionTrait,
{
    Resident::find_by_id(resident_id)
        .one(db)
        .await?
        .map(|_| ())
        .ok_or_else(|| Error::ResidentNotFound {
            name: resident_id.to_string(),
        })
}

async fn find_expense<C>(db: &C, expense_id: i64) -> Result<expense::Model>
where
    C: ConnectionTrait,
{
    Expense::find_by_id(expense_id)
        .one(db)
        .await?
        .ok_or(Error::ExpenseNotFound { id: expense_id })
}

/// Logs an expense and its contributors atomically.
///
/// # Errors
/// Returns an error if:
/// - The item is empty or whitespace-only
/// - The price is zero, negative, or not finite
/// - No contributors are given
/// - `care_of` or any contributor does not exist
/// - The database write fails
pub async fn create_expense(db: &DatabaseConnection, new: NewExpense) -> Result<CreatedExpense> {
    let item = new.item.trim();
    if item.is_empty() {
        return Err(Error::Validation {
            message: "Expense item cannot be empty".to_string(),
        });
    }

    if !new.price.is_finite() || new.price <= 0.0 {
        return Err(Error::InvalidAmount { amount: new.price });
    }

    let mut contributors = new.contributors;
    contributors.sort_unstable();
    contributors.dedup();
    if contributors.is_empty() {
        return Err(Error::Validation {
            message: "An expense needs at least one contributor".to_string(),
        });
    }

    let txn = db.begin().await?;

    ensure_resident_exists(&txn, new.care_of).await?;
    for &resident_id in &contributors {
        ensure_resident_exists(&txn, resident_id).await?;
    }

    let expense = expense::ActiveModel {
        created_at: Set(chrono::Utc::now()),
        item: Set(item.to_string()),
        price: Set(new.price),
        care_of: Set(new.care_of),
        notes: Set(new.notes.filter(|n| !n.trim().is_empty())),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut contributions = Vec::with_capacity(contributors.len());
    for resident_id in contributors {
        let row = contributor::ActiveModel {
            expense_id: Set(expense.id),
            resident_id: Set(resident_id),
        }
        .insert(&txn)
        .await?;
        contributions.push(row);
    }

    txn.commit().await?;

    info!(
        "Logged expense {} '{}' ({:.2}) with {} contributor(s)",
        expense.id,
        expense.item,
        expense.price,
        contributions.len()
    );
    Ok(CreatedExpense {
        expense,
        contributions,
    })
}

/// Retrieves all expenses in insertion order.
pub async fn get_all_expenses(db: &DatabaseConnection) -> Result<Vec<expense::Model>> {
    Expense::find()
        .order_by_asc(expense::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds an expense by its unique ID.
pub async fn get_expense_by_id(
    db: &DatabaseConnection,
    expense_id: i64,
) -> Result<Option<expense::Model>> {
    Expense::find_by_id(expense_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every contribution row, ordered by expense then resident.
pub async fn get_all_contributions(db: &DatabaseConnection) -> Result<Vec<contributor::Model>> {
    Contributor::find()
        .order_by_asc(contributor::Column::ExpenseId)
        .order_by_asc(contributor::Column::ResidentId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the contributions of one expense.
pub async fn get_contributions_for_expense(
    db: &DatabaseConnection,
    expense_id: i64,
) -> Result<Vec<contributor::Model>> {
    Contributor::find()
        .filter(contributor::Column::ExpenseId.eq(expense_id))
        .order_by_asc(contributor::Column::ResidentId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Adds a resident to the people sharing an expense.
pub async fn add_contributor(
    db: &DatabaseConnection,
    expense_id: i64,
    resident_id: i64,
) -> Result<contributor::Model> {
    find_expense(db, expense_id).await?;
    ensure_resident_exists(db, resident_id).await?;

    let existing = Contributor::find_by_id((expense_id, resident_id))
        .one(db)
        .await?;
    if existing.is_some() {
        return Err(Error::Validation {
            message: format!("Resident {resident_id} already contributes to expense {expense_id}"),
        });
    }

    contributor::ActiveModel {
        expense_id: Set(expense_id),
        resident_id: Set(resident_id),
    }
    .insert(db)
    .await
    .map_err(Into::into)
}

/// Removes a resident from the people sharing an expense.
pub async fn remove_contributor(
    db: &DatabaseConnection,
    expense_id: i64,
    resident_id: i64,
) -> Result<contributor::Model> {
    let row = Contributor::find_by_id((expense_id, resident_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::Validation {
            message: format!("Resident {resident_id} does not contribute to expense {expense_id}"),
        })?;

    Contributor::delete_by_id((expense_id, resident_id))
        .exec(db)
        .await?;
    Ok(row)
}

/// Deletes an expense together with its contributions and payment links.
pub async fn delete_expense(db: &DatabaseConnection, expense_id: i64) -> Result<RemovedExpense> {
    let txn = db.begin().await?;

    let expense = find_expense(&txn, expense_id).await?;

    let contributions = Contributor::find()
        .filter(contributor::Column::ExpenseId.eq(expense_id))
        .all(&txn)
        .await?;
    let payment_links = PaymentFor::find()
        .filter(payment_for::Column::ExpenseId.eq(expense_id))
        .all(&txn)
        .await?;

    Contributor::delete_many()
        .filter(contributor::Column::ExpenseId.eq(expense_id))
        .exec(&txn)
        .await?;
    PaymentFor::delete_many()
        .filter(payment_for::Column::ExpenseId.eq(expense_id))
        .exec(&txn)
        .await?;
    Expense::delete_by_id(expense_id).exec(&txn).await?;

    txn.commit().await?;

    info!(
        "Deleted expense {} '{}' ({} contribution(s), {} payment link(s))",
        expense.id,
        expense.item,
        contributions.len(),
        payment_links.len()
    );
    Ok(RemovedExpense {
        expense,
        contributions,
        payment_links,
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::payment::{self, NewPayment};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn new_expense(item: &str, price: f64, care_of: i64, contributors: Vec<i64>) -> NewExpense {
        NewExpense {
            item: item.to_string(),
            price,
            care_of,
            contributors,
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_create_expense_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_expense(&db, new_expense("  ", 10.0, 1, vec![1])).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        let result = create_expense(&db, new_expense("Rice", 0.0, 1, vec![1])).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: 0.0 }
        ));

        let result = create_expense(&db, new_expense("Rice", -5.0, 1, vec![1])).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: _ }));

        let result = create_expense(&db, new_expense("Rice", f64::NAN, 1, vec![1])).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: _ }));

        let result = create_expense(&db, new_expense("Rice", 10.0, 1, vec![])).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_expense_with_contributors() -> Result<()> {
        let (db, [alice, bob, cara]) = setup_household().await?;

        let created = create_expense(
            &db,
            NewExpense {
                item: " Groceries ".to_string(),
                price: 300.0,
                care_of: alice.id,
                contributors: vec![cara.id, alice.id, bob.id, cara.id],
                notes: Some("weekly run".to_string()),
            },
        )
        .await?;

        assert_eq!(created.expense.item, "Groceries");
        assert_eq!(created.expense.price, 300.0);
        assert_eq!(created.expense.care_of, alice.id);
        assert_eq!(created.expense.notes.as_deref(), Some("weekly run"));
        assert_eq!(created.contributions.len(), 3);

        let stored = get_contributions_for_expense(&db, created.expense.id).await?;
        assert_eq!(stored, created.contributions);

        let changes = created.changes();
        assert_eq!(changes.len(), 4);
        assert!(matches!(changes[0], ChangeEvent::Expense(Change::Inserted(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_expense_unknown_resident_writes_nothing() -> Result<()> {
        let (db, [alice, bob, _]) = setup_household().await?;

        let result = create_expense(
            &db,
            new_expense("Rice", 50.0, alice.id, vec![bob.id, 999]),
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ResidentNotFound { name } if name == "999"
        ));

        let result = create_expense(&db, new_expense("Rice", 50.0, 998, vec![bob.id])).await;
        assert!(matches!(result.unwrap_err(), Error::ResidentNotFound { name: _ }));

        assert!(get_all_expenses(&db).await?.is_empty());
        assert!(get_all_contributions(&db).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_expenses_are_listed_in_insertion_order() -> Result<()> {
        let (db, [alice, bob, _]) = setup_household().await?;
        let first = create_test_expense(&db, "Water", 30.0, bob.id, &[alice.id, bob.id]).await?;
        let second = create_test_expense(&db, "Apples", 12.0, alice.id, &[alice.id]).await?;

        let ids: Vec<i64> = get_all_expenses(&db).await?.into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![first.expense.id, second.expense.id]);

        let found = get_expense_by_id(&db, second.expense.id).await?.unwrap();
        assert_eq!(found.item, "Apples");
        assert!(get_expense_by_id(&db, 999).await?.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_add_and_remove_contributor() -> Result<()> {
        let (db, [alice, bob, cara]) = setup_household().await?;
        let created = create_test_expense(
            &db,
            "Internet",
            90.0,
            alice.id,
            &[alice.id, bob.id],
        )
        .await?;
        let expense_id = created.expense.id;

        let added = add_contributor(&db, expense_id, cara.id).await?;
        assert_eq!(added.resident_id, cara.id);
        assert_eq!(get_contributions_for_expense(&db, expense_id).await?.len(), 3);

        let duplicate = add_contributor(&db, expense_id, cara.id).await;
        assert!(matches!(duplicate.unwrap_err(), Error::Validation { message: _ }));

        let missing_expense = add_contributor(&db, 999, cara.id).await;
        assert!(matches!(
            missing_expense.unwrap_err(),
            Error::ExpenseNotFound { id: 999 }
        ));

        let removed = remove_contributor(&db, expense_id, bob.id).await?;
        assert_eq!(removed.resident_id, bob.id);
        assert_eq!(get_contributions_for_expense(&db, expense_id).await?.len(), 2);

        let again = remove_contributor(&db, expense_id, bob.id).await;
        assert!(matches!(again.unwrap_err(), Error::Validation { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_expense_cascades() -> Result<()> {
        let (db, [alice, bob, cara]) = setup_household().await?;
        let kept = create_test_expense(
            &db,
            "Rent",
            900.0,
            alice.id,
            &[alice.id, bob.id, cara.id],
        )
        .await?;
        let doomed = create_test_expense(&db, "Pizza", 45.0, bob.id, &[bob.id, cara.id]).await?;

        let created_payment = payment::create_payment(
            &db,
            NewPayment {
                paid_by: cara.id,
                received_by: bob.id,
                amount: 22.5,
                notes: None,
                for_expenses: vec![doomed.expense.id, kept.expense.id],
            },
        )
        .await?;

        let removed = delete_expense(&db, doomed.expense.id).await?;
        assert_eq!(removed.expense.id, doomed.expense.id);
        assert_eq!(removed.contributions.len(), 2);
        assert_eq!(removed.payment_links.len(), 1);

        assert!(get_expense_by_id(&db, doomed.expense.id).await?.is_none());
        assert!(get_contributions_for_expense(&db, doomed.expense.id).await?.is_empty());
        assert_eq!(get_all_contributions(&db).await?.len(), 3);

        // The payment itself survives, only the link to the deleted expense goes
        let links = payment::get_links_for_payment(&db, created_payment.payment.id).await?;
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].expense_id, kept.expense.id);

        let changes = removed.changes();
        assert_eq!(changes.len(), 4);
        assert!(matches!(changes[3], ChangeEvent::Expense(Change::Deleted(_))));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_missing_expense() -> Result<()> {
        let db = setup_test_db().await?;

        let result = delete_expense(&db, 42).await;
        assert!(matches!(result.unwrap_err(), Error::ExpenseNotFound { id: 42 }));

        Ok(())
    }
}
