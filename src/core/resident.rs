//! Resident business logic - Adding, looking up and removing household members.
//!
//! Nicknames are trimmed before storage and compared case-insensitively, so "alice" and
//! " Alice " are the same person. All functions are async and return Result types.

use crate::{
    config::ResidentConfig,
    entities::{Contributor, Expense, Payment, Resident, contributor, expense, payment, resident},
    errors::{Error, Result},
};
use sea_orm::{Condition, PaginatorTrait, QueryOrder, Set, TransactionTrait, prelude::*};
use tracing::{debug, info};

fn normalize(nickname: &str) -> String {
    nickname.trim().to_lowercase()
}

/// Retrieves all residents, ordered alphabetically by nickname ignoring case.
pub async fn get_all_residents(db: &DatabaseConnection) -> Result<Vec<resident::Model>> {
    let mut residents = Resident::find()
        .order_by_asc(resident::Column::Id)
        .all(db)
        .await?;
    residents.sort_by_cached_key(|r| normalize(&r.nickname));
    Ok(residents)
}

/// Finds a resident by its unique ID.
pub async fn get_resident_by_id(
    db: &DatabaseConnection,
    resident_id: i64,
) -> Result<Option<resident::Model>> {
    Resident::find_by_id(resident_id)
        .one(db)
        .await
        .map_err(Into::into)
}

/// Finds a resident by nickname, ignoring case and surrounding whitespace.
pub async fn get_resident_by_nickname(
    db: &DatabaseConnection,
    nickname: &str,
) -> Result<Option<resident::Model>> {
    let wanted = normalize(nickname);
    let residents = get_all_residents(db).await?;
    Ok(residents
        .into_iter()
        .find(|r| normalize(&r.nickname) == wanted))
}

/// Adds a new resident after checking the nickname is non-empty and not already taken.
///
/// # Errors
/// Returns an error if:
/// - The nickname is empty or whitespace-only
/// - Another resident already has the same nickname (case-insensitive)
/// - The database insert fails
pub async fn create_resident(db: &DatabaseConnection, nickname: &str) -> Result<resident::Model> {
    let trimmed = nickname.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation {
            message: "Nickname cannot be empty".to_string(),
        });
    }

    if get_resident_by_nickname(db, trimmed).await?.is_some() {
        return Err(Error::DuplicateNickname {
            nickname: trimmed.to_string(),
        });
    }

    let resident = resident::ActiveModel {
        nickname: Set(trimmed.to_string()),
        created_at: Set(chrono::Utc::now()),
        ..Default::default()
    };

    let created = resident.insert(db).await?;
    info!("Added resident {} (id {})", created.nickname, created.id);
    Ok(created)
}

/// Counts the expenses, contributions and payments that point at a resident.
pub async fn count_references<C>(db: &C, resident_id: i64) -> Result<u64>
where
    C: ConnectionTrait,
{
    let expenses = Expense::find()
        .filter(expense::Column::CareOf.eq(resident_id))
        .count(db)
        .await?;
    let contributions = Contributor::find()
        .filter(contributor::Column::ResidentId.eq(resident_id))
        .count(db)
        .await?;
    let payments = Payment::find()
        .filter(
            Condition::any()
                .add(payment::Column::PaidBy.eq(resident_id))
                .add(payment::Column::ReceivedBy.eq(resident_id)),
        )
        .count(db)
        .await?;
    Ok(expenses + contributions + payments)
}

/// Removes a resident who is no longer referenced by any record.
///
/// Residents with expenses, contributions or payments are kept so the ledger history
/// stays intact; the caller gets [`Error::ResidentInUse`] instead.
pub async fn delete_resident(db: &DatabaseConnection, resident_id: i64) -> Result<resident::Model> {
    let txn = db.begin().await?;

    let resident = Resident::find_by_id(resident_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::ResidentNotFound {
            name: resident_id.to_string(),
        })?;

    let references = count_references(&txn, resident_id).await?;
    if references > 0 {
        return Err(Error::ResidentInUse {
            nickname: resident.nickname,
            references,
        });
    }

    Resident::delete_by_id(resident_id).exec(&txn).await?;
    txn.commit().await?;
    info!("Removed resident {} (id {})", resident.nickname, resident.id);
    Ok(resident)
}

/// Resolves a comma-separated list of nicknames to resident IDs.
///
/// Matching ignores case and whitespace. Duplicates are dropped, first occurrence wins.
///
/// # Errors
/// Returns [`Error::Validation`] for an empty list and [`Error::ResidentNotFound`] for
/// the first name that matches nobody.
pub fn resolve_nicknames(residents: &[resident::Model], list: &str) -> Result<Vec<i64>> {
    let mut ids = Vec::new();
    for name in list.split(',').map(str::trim).filter(|n| !n.is_empty()) {
        let wanted = normalize(name);
        let resident = residents
            .iter()
            .find(|r| normalize(&r.nickname) == wanted)
            .ok_or_else(|| Error::ResidentNotFound {
                name: name.to_string(),
            })?;
        if !ids.contains(&resident.id) {
            ids.push(resident.id);
        }
    }

    if ids.is_empty() {
        return Err(Error::Validation {
            message: "At least one resident is required".to_string(),
        });
    }
    Ok(ids)
}

/// Creates the configured residents that do not exist yet.
///
/// Returns the residents that were created.
pub async fn seed_residents(
    db: &DatabaseConnection,
    configs: &[ResidentConfig],
) -> Result<Vec<resident::Model>> {
    let mut created = Vec::new();
    for config in configs {
        if get_resident_by_nickname(db, &config.nickname).await?.is_some() {
            debug!("Resident {} already present, skipping", config.nickname);
            continue;
        }
        created.push(create_resident(db, &config.nickname).await?);
    }
    Ok(created)
}
