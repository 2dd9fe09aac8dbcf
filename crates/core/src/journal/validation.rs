//! Business rule validation for journal entries.
//!
//! `validate_for_save` is what a draft must satisfy before it is sent to
//! the backend; `validate_for_post` adds the balance rule and requires an
//! account on every line.

use super::balance::BalanceValidator;
use super::entry::{JournalEntry, MIN_LINES};
use super::error::JournalError;
use super::line::JournalEntryLine;

/// Checks the structural line rules shared by save and post.
///
/// # Errors
///
/// `InsufficientLines`, `BothSidesPopulated`, or `MissingAccount` for a line
/// that carries an amount without an account.
pub fn validate_lines(lines: &[JournalEntryLine]) -> Result<(), JournalError> {
    if lines.len() < MIN_LINES {
        return Err(JournalError::InsufficientLines { count: lines.len() });
    }

    for (index, line) in lines.iter().enumerate() {
        if line.has_both_sides() {
            return Err(JournalError::BothSidesPopulated { line: index + 1 });
        }
        if line.side().is_some() && line.account_id.is_none() {
            return Err(JournalError::MissingAccount { line: index + 1 });
        }
    }

    Ok(())
}

/// Validates a draft before saving.
///
/// # Errors
///
/// Returns the first rule violated.
pub fn validate_for_save(entry: &JournalEntry) -> Result<(), JournalError> {
    if entry.reference().trim().is_empty() {
        return Err(JournalError::MissingField("reference"));
    }
    if entry.description().trim().is_empty() {
        return Err(JournalError::MissingField("description"));
    }
    validate_lines(entry.lines())
}

/// Validates a draft before posting.
///
/// # Errors
///
/// Returns the first rule violated.
pub fn validate_for_post(entry: &JournalEntry) -> Result<(), JournalError> {
    validate_for_save(entry)?;

    for (index, line) in entry.lines().iter().enumerate() {
        if line.account_id.is_none() {
            return Err(JournalError::MissingAccount { line: index + 1 });
        }
    }

    BalanceValidator::summarize(entry.lines()).ensure_balanced()
}
