//! Core business logic - framework-agnostic ledger, record and sync operations.

/// Expense and contributor operations
pub mod expense;
/// Change feed and the live ledger watcher
pub mod feed;
/// Pairwise balance computation
pub mod ledger;
/// Payment and payment link operations
pub mod payment;
/// Resident operations
pub mod resident;
/// Snapshots of the household records and change events
pub mod snapshot;
/// Presentation helpers for balances
pub mod summary;
