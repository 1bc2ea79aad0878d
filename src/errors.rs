//! Unified error type for the household ledger.

use thiserror::Error;

/// Every failure the crate can surface to a caller.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration file could not be read or parsed
    #[error("Configuration error: {message}")]
    Config {
        /// What went wrong
        message: String,
    },

    /// Input rejected before anything was written
    #[error("Invalid input: {message}")]
    Validation {
        /// What was wrong with the input
        message: String,
    },

    /// Price or payment amount that is zero, negative, or not a number
    #[error("Invalid amount: {amount}")]
    InvalidAmount {
        /// The rejected amount
        amount: f64,
    },

    /// No resident matches the given id or nickname
    #[error("Resident not found: {name}")]
    ResidentNotFound {
        /// Id or nickname that was looked up
        name: String,
    },

    /// No expense with this id
    #[error("Expense not found: {id}")]
    ExpenseNotFound {
        /// Expense id that was looked up
        id: i64,
    },

    /// No payment with this id
    #[error("Payment not found: {id}")]
    PaymentNotFound {
        /// Payment id that was looked up
        id: i64,
    },

    /// Another resident already uses this nickname (case-insensitive)
    #[error("Nickname already taken: {nickname}")]
    DuplicateNickname {
        /// The conflicting nickname
        nickname: String,
    },

    /// Resident is still referenced by expenses, contributions or payments
    #[error("Resident {nickname} is still referenced by {references} record(s)")]
    ResidentInUse {
        /// Nickname of the resident
        nickname: String,
        /// Number of records pointing at the resident
        references: u64,
    },

    /// Database error from `SeaORM`
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Environment variable error
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Formatting error while building a message
    #[error("Format error: {0}")]
    Fmt(#[from] std::fmt::Error),

    /// Serenity/Poise framework error
    #[error("Serenity/Poise framework error: {0}")]
    Framework(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::Framework(Box::new(value))
    }
}

impl Error {
    /// True for failures caused by the request itself (bad input, unknown or in-use
    /// records), as opposed to infrastructure failures.
    #[must_use]
    pub const fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. }
                | Self::InvalidAmount { .. }
                | Self::ResidentNotFound { .. }
                | Self::ExpenseNotFound { .. }
                | Self::PaymentNotFound { .. }
                | Self::DuplicateNickname { .. }
                | Self::ResidentInUse { .. }
        )
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_errors_are_distinguished() {
        assert!(Error::InvalidAmount { amount: -1.0 }.is_user_error());
        assert!(
            Error::ResidentInUse {
                nickname: "Bob".to_string(),
                references: 2,
            }
            .is_user_error()
        );
        assert!(!Error::Config {
            message: "bad".to_string(),
        }
        .is_user_error());
        assert!(!Error::Database(sea_orm::DbErr::Custom("boom".to_string())).is_user_error());
    }

    #[test]
    fn test_error_messages() {
        let err = Error::DuplicateNickname {
            nickname: "Alice".to_string(),
        };
        assert_eq!(err.to_string(), "Nickname already taken: Alice");

        let err = Error::ResidentInUse {
            nickname: "Bob".to_string(),
            references: 3,
        };
        assert_eq!(
            err.to_string(),
            "Resident Bob is still referenced by 3 record(s)"
        );
    }
}
