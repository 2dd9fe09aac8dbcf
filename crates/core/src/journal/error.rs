//! Journal error types for validation and state errors.
//!
//! Each variant belongs to one [`ErrorClass`]: validation errors are
//! corrected by the user in place, stale-state errors mean the entry is no
//! longer in a state that allows the action.

use ledgerdesk_shared::{AppError, ErrorClass, types::AmountError};
use rust_decimal::Decimal;
use thiserror::Error;

use super::entry::EntryStatus;

/// Errors that can occur during journal entry operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JournalError {
    // ========== Validation Errors ==========
    /// Entry must have at least 2 lines.
    #[error("Journal entry must have at least 2 lines, found {count}")]
    InsufficientLines {
        /// Number of lines present.
        count: usize,
    },

    /// Entry is not balanced (debits != credits).
    #[error("Journal entry is not balanced. Debit: {debit}, Credit: {credit}")]
    Unbalanced {
        /// Total debit amount.
        debit: Decimal,
        /// Total credit amount.
        credit: Decimal,
    },

    /// Every line is empty, so there is nothing to post.
    #[error("Journal entry has no amounts")]
    ZeroTotal,

    /// A required header field is blank.
    #[error("Required field missing: {0}")]
    MissingField(&'static str),

    /// A line carrying an amount has no account.
    #[error("Line {line} has no account")]
    MissingAccount {
        /// 1-based line number.
        line: usize,
    },

    /// A line carries both a debit and a credit.
    #[error("Line {line} has both a debit and a credit amount")]
    BothSidesPopulated {
        /// 1-based line number.
        line: usize,
    },

    /// Amount input was rejected.
    #[error(transparent)]
    InvalidAmount(#[from] AmountError),

    /// Line index does not exist.
    #[error("Line {index} does not exist (entry has {len} lines)")]
    LineOutOfRange {
        /// 0-based index requested.
        index: usize,
        /// Number of lines present.
        len: usize,
    },

    /// Reference is already used by another entry of the tenant.
    #[error("Reference {0} is already in use")]
    DuplicateReference(String),

    /// Form-level rule violations, already formatted for display.
    #[error("Invalid journal entry: {0}")]
    InvalidForm(String),

    // ========== Stale State Errors ==========
    /// Cannot modify a posted entry.
    #[error("Cannot modify posted journal entry")]
    CannotModifyPosted,

    /// Only draft entries can be deleted.
    #[error("Can only delete draft journal entries")]
    CanOnlyDeleteDraft,

    /// Entry has been soft-deleted.
    #[error("Journal entry has been deleted")]
    Deleted,

    /// Attempted an invalid status transition.
    #[error("Invalid status transition from {from} to {to}")]
    InvalidTransition {
        /// The current status.
        from: EntryStatus,
        /// The attempted target status.
        to: EntryStatus,
    },
}

impl JournalError {
    /// Returns the error code for display and logs.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InsufficientLines { .. } => "INSUFFICIENT_LINES",
            Self::Unbalanced { .. } => "UNBALANCED_ENTRY",
            Self::ZeroTotal => "ZERO_TOTAL",
            Self::MissingField(_) => "MISSING_FIELD",
            Self::MissingAccount { .. } => "MISSING_ACCOUNT",
            Self::BothSidesPopulated { .. } => "BOTH_SIDES_POPULATED",
            Self::InvalidAmount(_) => "INVALID_AMOUNT",
            Self::LineOutOfRange { .. } => "LINE_OUT_OF_RANGE",
            Self::DuplicateReference(_) => "DUPLICATE_REFERENCE",
            Self::InvalidForm(_) => "INVALID_FORM",
            Self::CannotModifyPosted => "CANNOT_MODIFY_POSTED",
            Self::CanOnlyDeleteDraft => "CAN_ONLY_DELETE_DRAFT",
            Self::Deleted => "ENTRY_DELETED",
            Self::InvalidTransition { .. } => "INVALID_TRANSITION",
        }
    }

    /// Returns how the caller is expected to react.
    #[must_use]
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::CannotModifyPosted
            | Self::CanOnlyDeleteDraft
            | Self::Deleted
            | Self::InvalidTransition { .. } => ErrorClass::StaleState,
            _ => ErrorClass::Validation,
        }
    }
}

impl From<JournalError> for AppError {
    fn from(err: JournalError) -> Self {
        match err.class() {
            ErrorClass::StaleState => Self::StaleState(err.to_string()),
            _ => match err {
                JournalError::DuplicateReference(_) => Self::Conflict(err.to_string()),
                other => Self::Validation(other.to_string()),
            },
        }
    }
}
