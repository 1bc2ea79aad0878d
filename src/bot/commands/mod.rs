//! Discord command implementations organized by category.

#![allow(clippy::too_long_first_doc_paragraph)]

/// Expense commands
pub mod expense;

/// General utility commands
pub mod general;

/// Payment commands
pub mod payment;

/// Resident management commands
pub mod resident;

/// Balance summary command
pub mod summary;

use crate::{
    core::resident::resolve_nicknames,
    entities::resident as resident_entity,
    errors::{Error, Result},
};

// Export commands
pub use expense::*;
pub use general::*;
pub use payment::*;
pub use resident::*;
pub use summary::*;

/// Most rows a list command prints.
pub(crate) const LIST_LIMIT: usize = 20;

/// Parses a comma-separated list of ids such as `"3, 5,8"`.
///
/// Blank entries are ignored and duplicates dropped; `None` means no ids.
pub(crate) fn parse_id_list(list: Option<&str>) -> Result<Vec<i64>> {
    let mut ids = Vec::new();
    for part in list.unwrap_or_default().split(',').map(str::trim) {
        if part.is_empty() {
            continue;
        }
        let id = part.trim_start_matches('#').parse::<i64>().map_err(|_| Error::Validation {
            message: format!("'{part}' is not a valid id"),
        })?;
        if !ids.contains(&id) {
            ids.push(id);
        }
    }
    Ok(ids)
}

/// Resolves a single nickname to a resident ID.
pub(crate) fn resolve_resident(
    residents: &[resident_entity::Model],
    nickname: &str,
) -> Result<i64> {
    match resolve_nicknames(residents, nickname)?.as_slice() {
        [id] => Ok(*id),
        _ => Err(Error::Validation {
            message: format!("Expected exactly one resident, got '{nickname}'"),
        }),
    }
}
