//! Payment business logic - Recording settlements between residents.
//!
//! A payment moves money from `paid_by` to `received_by` and may name the expenses it was
//! meant to settle. Those links are kept for reference only; balances are computed from the
//! payment amount alone.

use crate::{
    core::snapshot::{Change, ChangeEvent},
    entities::{Expense, Payment, PaymentFor, Resident, payment, payment_for},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::info;

/// Input for [`create_payment`].
#[derive(Debug, Clone)]
pub struct NewPayment {
    /// Resident handing over the money
    pub paid_by: i64,
    /// Resident receiving the money
    pub received_by: i64,
    /// Amount transferred, must be positive
    pub amount: f64,
    /// Optional free-form notes
    pub notes: Option<String>,
    /// Expenses this payment is meant to settle (may be empty)
    pub for_expenses: Vec<i64>,
}

/// Rows written by [`create_payment`].
#[derive(Debug, Clone)]
pub struct CreatedPayment {
    /// The inserted payment
    pub payment: payment::Model,
    /// One link per distinct expense
    pub links: Vec<payment_for::Model>,
}

impl CreatedPayment {
    /// Change events for the inserted rows.
    #[must_use]
    pub fn changes(&self) -> Vec<ChangeEvent> {
        std::iter::once(ChangeEvent::Payment(Change::Inserted(self.payment.clone())))
            .chain(
                self.links
                    .iter()
                    .cloned()
                    .map(|l| ChangeEvent::PaymentLink(Change::Inserted(l))),
            )
            .collect()
    }
}

/// Rows removed by [`delete_payment`].
#[derive(Debug, Clone)]
pub struct RemovedPayment {
    /// The deleted payment
    pub payment: payment::Model,
    /// Links removed along with it
    pub links: Vec<payment_for::Model>,
}

impl RemovedPayment {
    /// Change events for the deleted rows, links first.
    #[must_use]
    pub fn changes(&self) -> Vec<ChangeEvent> {
        self.links
            .iter()
            .cloned()
            .map(|l| ChangeEvent::PaymentLink(Change::Deleted(l)))
            .chain(std::iter::once(ChangeEvent::Payment(Change::Deleted(
                self.payment.clone(),
            ))))
            .collect()
    }
}

/// Records a payment and the expenses it went toward, atomically.
///
/// # Errors
/// Returns an error if:
/// - The amount is zero, negative, or not finite
/// - Payer and receiver are the same resident
/// - Either resident or any linked expense does not exist
/// - The database write fails
pub async fn create_payment(db: &DatabaseConnection, new: NewPayment) -> Result<CreatedPayment> {
    if !new.amount.is_finite() || new.amount <= 0.0 {
        return Err(Error::InvalidAmount { amount: new.amount });
    }

    if new.paid_by == new.received_by {
        return Err(Error::Validation {
            message: "A resident cannot pay themselves".to_string(),
        });
    }

    let mut for_expenses = new.for_expenses;
    for_expenses.sort_unstable();
    for_expenses.dedup();

    let txn = db.begin().await?;

    for resident_id in [new.paid_by, new.received_by] {
        if Resident::find_by_id(resident_id).one(&txn).await?.is_none() {
            return Err(Error::ResidentNotFound {
                name: resident_id.to_string(),
            });
        }
    }
    for &expense_id in &for_expenses {
        if Expense::find_by_id(expense_id).one(&txn).await?.is_none() {
            return Err(Error::ExpenseNotFound { id: expense_id });
        }
    }

    let payment = payment::ActiveModel {
        created_at: Set(chrono::Utc::now()),
        paid_by: Set(new.paid_by),
        received_by: Set(new.received_by),
        amount: Set(new.amount),
        notes: Set(new.notes.filter(|n| !n.trim().is_empty())),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    let mut links = Vec::with_capacity(for_expenses.len());
    for expense_id in for_expenses {
        let link = payment_for::ActiveModel {
            payment_id: Set(payment.id),
            expense_id: Set(expense_id),
        }
        .insert(&txn)
        .await?;
        links.push(link);
    }

    txn.commit().await?;

    info!(
        "Recorded payment {}: resident {} -> resident {} ({:.2})",
        payment.id, payment.paid_by, payment.received_by, payment.amount
    );
    Ok(CreatedPayment { payment, links })
}

/// Retrieves all payments in insertion order.
pub async fn get_all_payments(db: &DatabaseConnection) -> Result<Vec<payment::Model>> {
    Payment::find()
        .order_by_asc(payment::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Finds a payment by its unique ID.
pub async fn get_payment_by_id(
    db: &DatabaseConnection,
    payment_id: i64,
) -> Result<Option<payment::Model>> {
    Payment::find_by_id(payment_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Retrieves every payment link, ordered by payment then expense.
pub async fn get_all_payment_links(db: &DatabaseConnection) -> Result<Vec<payment_for::Model>> {
    PaymentFor::find()
        .order_by_asc(payment_for::Column::PaymentId)
        .order_by_asc(payment_for::Column::ExpenseId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Retrieves the expenses one payment was meant to settle.
pub async fn get_links_for_payment(
    db: &DatabaseConnection,
    payment_id: i64,
) -> Result<Vec<payment_for::Model>> {
    PaymentFor::find()
        .filter(payment_for::Column::PaymentId.eq(payment_id))
        .order_by_asc(payment_for::Column::ExpenseId)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Deletes a payment together with its expense links.
pub async fn delete_payment(db: &DatabaseConnection, payment_id: i64) -> Result<RemovedPayment> {
    let txn = db.begin().await?;

    let payment = Payment::find_by_id(payment_id)
        .one(&txn)
        .await?
        .ok_or(Error::PaymentNotFound { id: payment_id })?;

    let links = PaymentFor::find()
        .filter(payment_for::Column::PaymentId.eq(payment_id))
        .all(&txn)
        .await?;

    PaymentFor::delete_many()
        .filter(payment_for::Column::PaymentId.eq(payment_id))
        .exec(&txn)
        .await?;
    Payment::delete_by_id(payment_id).exec(&txn).await?;

    txn.commit().await?;

    info!(
        "Deleted payment {} ({} expense link(s))",
        payment.id,
        links.len()
    );
    Ok(RemovedPayment { payment, links })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    fn new_payment(paid_by: i64, received_by: i64, amount: f64) -> NewPayment {
        NewPayment {
            paid_by,
            received_by,
            amount,
            notes: None,
            for_expenses: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_create_payment_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = create_payment(&db, new_payment(1, 2, 0.0)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidAmount { amount: 0.0 }
        ));

        let result = create_payment(&db, new_payment(1, 2, -10.0)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: _ }));

        let result = create_payment(&db, new_payment(1, 2, f64::INFINITY)).await;
        assert!(matches!(result.unwrap_err(), Error::InvalidAmount { amount: _ }));

        let result = create_payment(&db, new_payment(1, 1, 10.0)).await;
        assert!(matches!(result.unwrap_err(), Error::Validation { message: _ }));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_payment_with_links() -> Result<()> {
        let (db, [alice, bob, _]) = setup_household().await?;
        let groceries = create_test_expense(
            &db,
            "Groceries",
            60.0,
            alice.id,
            &[alice.id, bob.id],
        )
        .await?;

        let created = create_payment(
            &db,
            NewPayment {
                paid_by: bob.id,
                received_by: alice.id,
                amount: 30.0,
                notes: Some("  ".to_string()),
                for_expenses: vec![groceries.expense.id, groceries.expense.id],
            },
        )
        .await?;

        assert_eq!(created.payment.amount, 30.0);
        assert_eq!(created.payment.paid_by, bob.id);
        assert_eq!(created.payment.received_by, alice.id);
        assert!(created.payment.notes.is_none());
        assert_eq!(created.links.len(), 1);
        assert_eq!(created.changes().len(), 2);

        let stored = get_payment_by_id(&db, created.payment.id).await?.unwrap();
        assert_eq!(stored.amount, 30.0);
        assert_eq!(get_links_for_payment(&db, created.payment.id).await?, created.links);
        assert_eq!(get_all_payment_links(&db).await?.len(), 1);

        Ok(())
    }

    #[tokio::test]
    async fn test_create_payment_unknown_references() -> Result<()> {
        let (db, [alice, bob, _]) = setup_household().await?;

        let result = create_payment(&db, new_payment(bob.id, 404, 10.0)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::ResidentNotFound { name } if name == "404"
        ));

        let mut with_missing_expense = new_payment(bob.id, alice.id, 10.0);
        with_missing_expense.for_expenses = vec![77];
        let result = create_payment(&db, with_missing_expense).await;
        assert!(matches!(result.unwrap_err(), Error::ExpenseNotFound { id: 77 }));

        assert!(get_all_payments(&db).await?.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_payment_cascades_links() -> Result<()> {
        let (db, [alice, bob, cara]) = setup_household().await?;
        let rent = create_test_expense(
            &db,
            "Rent",
            900.0,
            alice.id,
            &[alice.id, bob.id, cara.id],
        )
        .await?;
        let created = create_payment(
            &db,
            NewPayment {
                paid_by: cara.id,
                received_by: alice.id,
                amount: 300.0,
                notes: Some("March rent".to_string()),
                for_expenses: vec![rent.expense.id],
            },
        )
        .await?;
        let other = create_test_payment(&db, bob.id, alice.id, 100.0).await?;

        let removed = delete_payment(&db, created.payment.id).await?;
        assert_eq!(removed.payment.notes.as_deref(), Some("March rent"));
        assert_eq!(removed.links.len(), 1);
        assert!(get_all_payment_links(&db).await?.is_empty());

        let remaining: Vec<i64> = get_all_payments(&db).await?.into_iter().map(|p| p.id).collect();
        assert_eq!(remaining, vec![other.payment.id]);

        let changes = removed.changes();
        assert!(matches!(changes[0], ChangeEvent::PaymentLink(Change::Deleted(_))));
        assert!(matches!(changes[1], ChangeEvent::Payment(Change::Deleted(_))));

        let again = delete_payment(&db, created.payment.id).await;
        assert!(matches!(
            again.unwrap_err(),
            Error::PaymentNotFound { id } if id == created.payment.id
        ));

        Ok(())
    }
}
