//! Summary formatting - turns a balance matrix into "who owes whom" lines.
//!
//! This module provides framework-agnostic helpers for presenting balances. The bot layer
//! decides where the text goes; nothing here touches the database.

use crate::{
    core::ledger::{BalanceMatrix, ResidentId},
    entities::resident,
};
use std::cmp::Ordering;
use std::fmt::Write;

/// Line shown when nobody owes anybody.
pub const ALL_SETTLED: &str = "🎉 All settled! No outstanding balances.";

/// Smallest amount still shown as a debt.
const MIN_VISIBLE_AMOUNT: f64 = 0.009;

/// One outstanding debt: `from` owes `to` the given amount.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OweRow {
    /// Debtor
    pub from: ResidentId,
    /// Creditor
    pub to: ResidentId,
    /// Positive amount owed
    pub amount: f64,
}

/// Flattens the matrix into positive debts, largest first.
///
/// Only the positive direction of each pair is kept. Ties are ordered by debtor and
/// creditor id so output is stable.
#[must_use]
pub fn owed_rows(matrix: &BalanceMatrix) -> Vec<OweRow> {
    let mut rows: Vec<OweRow> = matrix
        .iter()
        .filter(|&(_, _, amount)| amount > MIN_VISIBLE_AMOUNT)
        .map(|(from, to, amount)| OweRow { from, to, amount })
        .collect();
    rows.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(Ordering::Equal)
            .then(a.from.cmp(&b.from))
            .then(a.to.cmp(&b.to))
    });
    rows
}

/// Nickname for an id, or `#<id>` if the resident is unknown.
#[must_use]
pub fn nickname_of(residents: &[resident::Model], id: ResidentId) -> String {
    residents
        .iter()
        .find(|r| r.id == id)
        .map_or_else(|| format!("#{id}"), |r| r.nickname.clone())
}

/// Formats an amount like `₱1,234.50` (or `-₱5.00`).
///
/// Non-finite amounts render as zero.
#[must_use]
pub fn format_currency(symbol: &str, amount: f64) -> String {
    if !amount.is_finite() {
        return format!("{symbol}0.00");
    }

    let fixed = format!("{:.2}", amount.abs());
    let (whole, cents) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{symbol}{grouped}.{cents}")
}

/// Renders one line per outstanding debt, or [`ALL_SETTLED`] when there are none.
#[must_use]
pub fn format_summary(
    residents: &[resident::Model],
    matrix: &BalanceMatrix,
    currency_symbol: &str,
) -> String {
    let rows = owed_rows(matrix);
    if rows.is_empty() {
        return ALL_SETTLED.to_string();
    }

    let mut text = String::new();
    for row in rows {
        // Writing to a String cannot fail
        let _ = writeln!(
            text,
            "• **{}** owes **{}** {}",
            nickname_of(residents, row.from),
            nickname_of(residents, row.to),
            format_currency(currency_symbol, row.amount)
        );
    }
    text
}
