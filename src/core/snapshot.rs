//! In-memory snapshot of the household records and the change events that update it.
//!
//! A [`Snapshot`] is loaded once from the database and then kept current by folding
//! [`ChangeEvent`]s into it: inserts add a row, updates replace the row with the same
//! primary key, deletes remove it. The balance matrix is always recomputed from the whole
//! snapshot, never patched.

use crate::{
    core::{
        expense,
        ledger::{self, BalanceMatrix},
        payment, resident,
    },
    entities::{
        contributor, expense as expense_entity, payment as payment_entity, payment_for,
        resident as resident_entity,
    },
    errors::Result,
};
use sea_orm::DatabaseConnection;
use tracing::debug;

/// What happened to a single row.
#[derive(Debug, Clone, PartialEq)]
pub enum Change<T> {
    /// Row was created
    Inserted(T),
    /// Row was modified; carries the new version
    Updated(T),
    /// Row was removed; carries the last known version
    Deleted(T),
}

/// A row change in one of the household collections.
#[derive(Debug, Clone, PartialEq)]
pub enum ChangeEvent {
    /// Change to the `residents` collection
    Resident(Change<resident_entity::Model>),
    /// Change to the `expenses` collection
    Expense(Change<expense_entity::Model>),
    /// Change to the `contributors` collection
    Contribution(Change<contributor::Model>),
    /// Change to the `payments` collection
    Payment(Change<payment_entity::Model>),
    /// Change to the `payment_for` collection
    PaymentLink(Change<payment_for::Model>),
}

impl ChangeEvent {
    /// Name of the affected collection, for logging.
    #[must_use]
    pub const fn collection(&self) -> &'static str {
        match self {
            Self::Resident(_) => "residents",
            Self::Expense(_) => "expenses",
            Self::Contribution(_) => "contributors",
            Self::Payment(_) => "payments",
            Self::PaymentLink(_) => "payment_for",
        }
    }
}

/// Rows that can be located in a collection by primary key.
trait Keyed {
    type Key: PartialEq;
    fn key(&self) -> Self::Key;
}

impl Keyed for resident_entity::Model {
    type Key = i64;
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for expense_entity::Model {
    type Key = i64;
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for contributor::Model {
    type Key = (i64, i64);
    fn key(&self) -> (i64, i64) {
        (self.expense_id, self.resident_id)
    }
}

impl Keyed for payment_entity::Model {
    type Key = i64;
    fn key(&self) -> i64 {
        self.id
    }
}

impl Keyed for payment_for::Model {
    type Key = (i64, i64);
    fn key(&self) -> (i64, i64) {
        (self.payment_id, self.expense_id)
    }
}

fn fold<T: Keyed>(rows: &mut Vec<T>, change: Change<T>) {
    match change {
        Change::Inserted(row) | Change::Updated(row) => {
            let key = row.key();
            match rows.iter_mut().find(|r| r.key() == key) {
                Some(existing) => *existing = row,
                None => rows.push(row),
            }
        }
        Change::Deleted(row) => {
            let key = row.key();
            rows.retain(|r| r.key() != key);
        }
    }
}

/// Full copy of the household records the ledger is computed from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Snapshot {
    /// All residents
    pub residents: Vec<resident_entity::Model>,
    /// All expenses
    pub expenses: Vec<expense_entity::Model>,
    /// All contributor rows
    pub contributions: Vec<contributor::Model>,
    /// All payments
    pub payments: Vec<payment_entity::Model>,
    /// All payment-to-expense links
    pub payment_links: Vec<payment_for::Model>,
}

impl Snapshot {
    /// Folds one change into the snapshot.
    ///
    /// Inserting an existing key replaces the row; deleting an unknown key does nothing.
    pub fn apply(&mut self, event: ChangeEvent) {
        match event {
            ChangeEvent::Resident(change) => fold(&mut self.residents, change),
            ChangeEvent::Expense(change) => fold(&mut self.expenses, change),
            ChangeEvent::Contribution(change) => fold(&mut self.contributions, change),
            ChangeEvent::Payment(change) => fold(&mut self.payments, change),
            ChangeEvent::PaymentLink(change) => fold(&mut self.payment_links, change),
        }
    }

    /// Computes the balance matrix for the current contents.
    #[must_use]
    pub fn balances(&self) -> BalanceMatrix {
        ledger::compute_balances(
            &self.residents,
            &self.expenses,
            &self.contributions,
            &self.payments,
        )
    }
}

/// Loads every collection from the database.
///
/// Residents come back sorted by nickname, everything else by id.
pub async fn load_snapshot(db: &DatabaseConnection) -> Result<Snapshot> {
    let snapshot = Snapshot {
        residents: resident::get_all_residents(db).await?,
        expenses: expense::get_all_expenses(db).await?,
        contributions: expense::get_all_contributions(db).await?,
        payments: payment::get_all_payments(db).await?,
        payment_links: payment::get_all_payment_links(db).await?,
    };
    debug!(
        residents = snapshot.residents.len(),
        expenses = snapshot.expenses.len(),
        contributions = snapshot.contributions.len(),
        payments = snapshot.payments.len(),
        "Loaded snapshot"
    );
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::{expense::NewExpense, payment::NewPayment};
    use crate::test_utils::*;

    fn link(payment_id: i64, expense_id: i64) -> payment_for::Model {
        payment_for::Model {
            payment_id,
            expense_id,
        }
    }

    #[test]
    fn test_apply_insert_update_delete() {
        let mut snapshot = Snapshot::default();
        let alice = test_resident_model(1, "Alice");
        let mut renamed = alice.clone();
        renamed.nickname = "Ally".to_string();

        snapshot.apply(ChangeEvent::Resident(Change::Inserted(alice.clone())));
        assert_eq!(snapshot.residents, vec![alice.clone()]);

        snapshot.apply(ChangeEvent::Resident(Change::Updated(renamed.clone())));
        assert_eq!(snapshot.residents, vec![renamed.clone()]);

        // Deleting uses the key only, the payload may be stale
        snapshot.apply(ChangeEvent::Resident(Change::Deleted(alice)));
        assert!(snapshot.residents.is_empty());
    }

    #[test]
    fn test_duplicate_insert_replaces_row() {
        let mut snapshot = Snapshot::default();
        let bob = test_resident_model(2, "Bob");

        snapshot.apply(ChangeEvent::Resident(Change::Inserted(bob.clone())));
        snapshot.apply(ChangeEvent::Resident(Change::Inserted(bob)));

        assert_eq!(snapshot.residents.len(), 1);
    }

    #[test]
    fn test_update_of_unknown_row_inserts_it() {
        let mut snapshot = Snapshot::default();
        snapshot.apply(ChangeEvent::PaymentLink(Change::Updated(link(1, 2))));
        assert_eq!(snapshot.payment_links, vec![link(1, 2)]);
    }

    #[test]
    fn test_composite_keys() {
        let mut snapshot = Snapshot::default();
        for (expense_id, resident_id) in [(1, 1), (1, 2), (2, 1)] {
            snapshot.apply(ChangeEvent::Contribution(Change::Inserted(contributor::Model {
                expense_id,
                resident_id,
            })));
        }

        snapshot.apply(ChangeEvent::Contribution(Change::Deleted(contributor::Model {
            expense_id: 1,
            resident_id: 2,
        })));
        // Unknown key: no-op
        snapshot.apply(ChangeEvent::Contribution(Change::Deleted(contributor::Model {
            expense_id: 9,
            resident_id: 9,
        })));

        let keys: Vec<(i64, i64)> = snapshot.contributions.iter().map(Keyed::key).collect();
        assert_eq!(keys, vec![(1, 1), (2, 1)]);
    }

    #[test]
    fn test_collection_names() {
        let event = ChangeEvent::PaymentLink(Change::Inserted(link(1, 1)));
        assert_eq!(event.collection(), "payment_for");
        let event = ChangeEvent::Resident(Change::Deleted(test_resident_model(1, "Alice")));
        assert_eq!(event.collection(), "residents");
    }

    #[tokio::test]
    async fn test_load_snapshot_matches_database() -> Result<()> {
        let (db, [alice, bob, cara]) = setup_household().await?;
        let groceries = expense::create_expense(
            &db,
            NewExpense {
                item: "Groceries".to_string(),
                price: 300.0,
                care_of: alice.id,
                contributors: vec![alice.id, bob.id, cara.id],
                notes: None,
            },
        )
        .await?;
        payment::create_payment(
            &db,
            NewPayment {
                paid_by: bob.id,
                received_by: alice.id,
                amount: 100.0,
                notes: None,
                for_expenses: vec![groceries.expense.id],
            },
        )
        .await?;

        let snapshot = load_snapshot(&db).await?;
        assert_eq!(snapshot.residents.len(), 3);
        assert_eq!(snapshot.residents[0].nickname, "Alice");
        assert_eq!(snapshot.expenses.len(), 1);
        assert_eq!(snapshot.contributions.len(), 3);
        assert_eq!(snapshot.payments.len(), 1);
        assert_eq!(snapshot.payment_links.len(), 1);

        let balances = snapshot.balances();
        assert_eq!(balances.get(bob.id, alice.id), None);
        assert_eq!(balances.get(cara.id, alice.id), Some(100.0));

        Ok(())
    }

    #[tokio::test]
    async fn test_folding_receipts_matches_reload() -> Result<()> {
        let (db, [alice, bob, cara]) = setup_household().await?;
        let mut folded = load_snapshot(&db).await?;

        let rent = create_test_expense(
            &db,
            "Rent",
            900.0,
            alice.id,
            &[alice.id, bob.id, cara.id],
        )
        .await?;
        let snacks = create_test_expense(&db, "Snacks", 20.0, bob.id, &[bob.id, cara.id]).await?;
        let paid = create_test_payment(&db, cara.id, alice.id, 150.0).await?;
        for event in rent.changes().into_iter().chain(snacks.changes()).chain(paid.changes()) {
            folded.apply(event);
        }

        let removed = expense::delete_expense(&db, snacks.expense.id).await?;
        for event in removed.changes() {
            folded.apply(event);
        }

        let reloaded = load_snapshot(&db).await?;
        assert_eq!(folded.balances(), reloaded.balances());
        assert_eq!(folded.expenses.len(), reloaded.expenses.len());
        assert_eq!(folded.contributions.len(), reloaded.contributions.len());
        assert_eq!(folded.balances().get(cara.id, alice.id), Some(150.0));

        Ok(())
    }
}
