//! Balance computation - turns residents, expenses, contributions and payments into a
//! pairwise "who owes whom" matrix.
//!
//! The computation is pure and synchronous: every call receives complete snapshots and
//! returns a fresh [`BalanceMatrix`]. Callers recompute from scratch whenever any input
//! collection changes.

use crate::entities::{contributor, expense, payment, resident};
use std::collections::{BTreeMap, BTreeSet};

/// Resident primary key as used by the matrix.
pub type ResidentId = i64;

/// Pruned pairwise balances between residents.
///
/// A positive entry `(x, y) = v` means resident `x` owes resident `y` the amount `v`.
/// Both directions of every pair are stored, so `get(x, y) == -get(y, x)` for every stored
/// pair. Self-pairs never appear and entries that round to `0.00` are dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BalanceMatrix {
    rows: BTreeMap<ResidentId, BTreeMap<ResidentId, f64>>,
}

impl BalanceMatrix {
    /// Amount `debtor` owes `creditor`, or `None` when the pair is settled or unknown.
    #[must_use]
    pub fn get(&self, debtor: ResidentId, creditor: ResidentId) -> Option<f64> {
        self.rows.get(&debtor)?.get(&creditor).copied()
    }

    /// All non-zero balances of one resident, keyed by the other resident.
    #[must_use]
    pub fn row(&self, resident: ResidentId) -> Option<&BTreeMap<ResidentId, f64>> {
        self.rows.get(&resident)
    }

    /// True when every pair is settled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Number of stored entries, counting both directions of a pair.
    #[must_use]
    pub fn len(&self) -> usize {
        self.rows.values().map(BTreeMap::len).sum()
    }

    /// Iterates `(debtor, creditor, amount)` over every stored entry in id order.
    pub fn iter(&self) -> impl Iterator<Item = (ResidentId, ResidentId, f64)> + '_ {
        self.rows.iter().flat_map(|(&debtor, row)| {
            row.iter()
                .map(move |(&creditor, &amount)| (debtor, creditor, amount))
        })
    }
}

/// Unpruned working matrix with a zero entry for every ordered pair of distinct residents.
struct Tally {
    cells: BTreeMap<ResidentId, BTreeMap<ResidentId, f64>>,
}

impl Tally {
    fn new(residents: &[resident::Model]) -> Self {
        let ids: BTreeSet<ResidentId> = residents.iter().map(|r| r.id).collect();
        let cells = ids
            .iter()
            .map(|&a| {
                let row = ids
                    .iter()
                    .filter(|&&b| b != a)
                    .map(|&b| (b, 0.0))
                    .collect();
                (a, row)
            })
            .collect();
        Self { cells }
    }

    /// Moves `amount` of debt from `debtor` toward `creditor` and mirrors it.
    ///
    /// Pairs involving an unknown resident are left untouched.
    fn transfer(&mut self, debtor: ResidentId, creditor: ResidentId, amount: f64) {
        if debtor == creditor
            || !self.cells.contains_key(&debtor)
            || !self.cells.contains_key(&creditor)
        {
            return;
        }
        if let Some(cell) = self.cells.get_mut(&debtor).and_then(|r| r.get_mut(&creditor)) {
            *cell += amount;
        }
        if let Some(cell) = self.cells.get_mut(&creditor).and_then(|r| r.get_mut(&debtor)) {
            *cell -= amount;
        }
    }

    fn into_matrix(self) -> BalanceMatrix {
        let rows = self
            .cells
            .into_iter()
            .filter_map(|(debtor, row)| {
                let row: BTreeMap<ResidentId, f64> = row
                    .into_iter()
                    .map(|(creditor, amount)| (creditor, round_cents(amount)))
                    .filter(|&(_, amount)| amount != 0.0)
                    .collect();
                (!row.is_empty()).then_some((debtor, row))
            })
            .collect();
        BalanceMatrix { rows }
    }
}

/// Rounds to two decimal places, half away from zero.
///
/// Symmetric around zero, so mirrored entries stay exact negatives of each other.
#[must_use]
pub fn round_cents(amount: f64) -> f64 {
    let rounded = (amount * 100.0).round() / 100.0;
    // Normalise -0.0 so serialized output never shows a signed zero
    if rounded == 0.0 { 0.0 } else { rounded }
}

/// Computes the pruned pairwise balance matrix from complete snapshots.
///
/// Each expense is split evenly between its contributors; every contributor other than
/// the resident who fronted the money owes that resident one share. Payments then
/// reduce what the payer owes the receiver (and may flip the direction). Records that
/// point at residents outside `residents` contribute nothing, and an expense without
/// contributors has no effect. This function never fails.
#[must_use]
pub fn compute_balances(
    residents: &[resident::Model],
    expenses: &[expense::Model],
    contributions: &[contributor::Model],
    payments: &[payment::Model],
) -> BalanceMatrix {
    if residents.is_empty() {
        return BalanceMatrix::default();
    }

    let mut tally = Tally::new(residents);

    let mut by_expense: BTreeMap<i64, Vec<ResidentId>> = BTreeMap::new();
    for c in contributions {
        by_expense.entry(c.expense_id).or_default().push(c.resident_id);
    }

    for expense in expenses {
        let contributors = by_expense.get(&expense.id).map_or(&[][..], Vec::as_slice);
        // An empty contributor list keeps the divisor at 1; the loop below then does nothing
        #[allow(clippy::cast_precision_loss)] // contributor counts are tiny
        let share = expense.price / contributors.len().max(1) as f64;
        for &resident_id in contributors {
            if resident_id != expense.care_of {
                tally.transfer(resident_id, expense.care_of, share);
            }
        }
    }

    for p in payments {
        if p.paid_by != p.received_by {
            tally.transfer(p.paid_by, p.received_by, -p.amount);
        }
    }

    tally.into_matrix()
}
