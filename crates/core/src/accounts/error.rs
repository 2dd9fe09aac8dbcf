//! Account error types.

use ledgerdesk_shared::{AppError, types::AccountId};
use thiserror::Error;

/// Errors raised by chart-of-accounts lookups and hierarchical selection.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccountError {
    /// No account with this id in the chart.
    #[error("Account not found: {0}")]
    NotFound(AccountId),

    /// No account with this code in the chart.
    #[error("Account code not found: {0}")]
    CodeNotFound(String),

    /// Account exists but cannot receive postings.
    #[error("Account {code} is inactive")]
    Inactive {
        /// Account code.
        code: String,
    },

    /// Account type string not recognized.
    #[error("Unknown account type: {0}")]
    UnknownType(String),

    /// Selected item is not a child of the upstream selection.
    #[error("Selection at level {level} is not a child of the level above")]
    InvalidSelection {
        /// 0-based level.
        level: usize,
    },

    /// Level beyond the cascade depth.
    #[error("Level {level} does not exist (cascade has {depth} levels)")]
    LevelOutOfRange {
        /// 0-based level requested.
        level: usize,
        /// Number of levels.
        depth: usize,
    },
}

impl AccountError {
    /// Returns the error code for display and logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "ACCOUNT_NOT_FOUND",
            Self::CodeNotFound(_) => "ACCOUNT_CODE_NOT_FOUND",
            Self::Inactive { .. } => "ACCOUNT_INACTIVE",
            Self::UnknownType(_) => "UNKNOWN_ACCOUNT_TYPE",
            Self::InvalidSelection { .. } => "INVALID_SELECTION",
            Self::LevelOutOfRange { .. } => "LEVEL_OUT_OF_RANGE",
        }
    }
}

impl From<AccountError> for AppError {
    fn from(err: AccountError) -> Self {
        match err {
            AccountError::NotFound(_) | AccountError::CodeNotFound(_) => {
                Self::NotFound(err.to_string())
            }
            other => Self::Validation(other.to_string()),
        }
    }
}
