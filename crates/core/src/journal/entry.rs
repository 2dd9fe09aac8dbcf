//! Journal entry aggregate.
//!
//! Status and lines are private. Header setters and line edits go through
//! [`JournalEntry::ensure_editable`], so a posted or deleted entry rejects
//! every mutation before anything is sent to the backend. Status changes
//! only through [`super::lifecycle::EntryLifecycle`].

use chrono::NaiveDate;
use ledgerdesk_shared::types::{AccountId, Amount, JournalEntryId};
use serde::{Deserialize, Serialize};
use std::fmt;

use super::balance::{BalanceSummary, BalanceValidator};
use super::error::JournalError;
use super::line::JournalEntryLine;

/// Minimum number of lines an entry carries.
pub const MIN_LINES: usize = 2;

/// Posting status of a journal entry.
///
/// Valid transitions:
/// - Draft → Posted (post, guarded by balance)
/// - Posted → Draft (force to draft, audited override)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// Entry is being drafted and can be modified.
    Draft,
    /// Entry is part of the ledger (immutable).
    Posted,
}

impl EntryStatus {
    /// Returns the string representation of the status.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Draft => "draft",
            Self::Posted => "posted",
        }
    }

    /// Parses a status from a string.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "draft" => Some(Self::Draft),
            "posted" => Some(Self::Posted),
            _ => None,
        }
    }

    /// Returns true if the entry can be modified.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(self, Self::Draft)
    }
}

impl fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Category tag of a journal entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntryType {
    /// Manual journal entry.
    #[default]
    Manual,
    /// Sales invoice.
    Invoice,
    /// Payment (incoming or outgoing).
    Payment,
    /// Expense.
    Expense,
    /// Imported bank transaction.
    BankTransaction,
    /// Tenant-defined category.
    Custom(String),
}

impl EntryType {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::Manual => "manual",
            Self::Invoice => "invoice",
            Self::Payment => "payment",
            Self::Expense => "expense",
            Self::BankTransaction => "bank_transaction",
            Self::Custom(tag) => tag,
        }
    }
}

impl From<String> for EntryType {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "manual" | "" => Self::Manual,
            "invoice" => Self::Invoice,
            "payment" => Self::Payment,
            "expense" => Self::Expense,
            "bank_transaction" | "bank" => Self::BankTransaction,
            _ => Self::Custom(value.trim().to_string()),
        }
    }
}

impl From<EntryType> for String {
    fn from(value: EntryType) -> Self {
        value.as_str().to_string()
    }
}

impl fmt::Display for EntryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A journal entry: a header plus its debit/credit lines.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntry {
    /// Backend id, `None` until first saved.
    #[serde(default)]
    id: Option<JournalEntryId>,
    entry_date: NaiveDate,
    #[serde(default)]
    reference: String,
    #[serde(default)]
    entry_type: EntryType,
    #[serde(default)]
    description: String,
    status: EntryStatus,
    lines: Vec<JournalEntryLine>,
    #[serde(default)]
    is_deleted: bool,
}

impl JournalEntry {
    /// A fresh draft with two empty lines.
    #[must_use]
    pub fn new_draft(entry_date: NaiveDate) -> Self {
        Self {
            id: None,
            entry_date,
            reference: String::new(),
            entry_type: EntryType::Manual,
            description: String::new(),
            status: EntryStatus::Draft,
            lines: vec![JournalEntryLine::empty(); MIN_LINES],
            is_deleted: false,
        }
    }

    /// A draft with the given header and lines. Used when materializing an
    /// entry from a form or a fixture.
    ///
    /// # Errors
    ///
    /// Returns `InsufficientLines` for fewer than two lines.
    pub fn draft_with_lines(
        entry_date: NaiveDate,
        reference: impl Into<String>,
        entry_type: EntryType,
        description: impl Into<String>,
        lines: Vec<JournalEntryLine>,
    ) -> Result<Self, JournalError> {
        if lines.len() < MIN_LINES {
            return Err(JournalError::InsufficientLines { count: lines.len() });
        }
        Ok(Self {
            id: None,
            entry_date,
            reference: reference.into(),
            entry_type,
            description: description.into(),
            status: EntryStatus::Draft,
            lines,
            is_deleted: false,
        })
    }

    // ---------------------------------------------------------------------
    // Accessors
    // ---------------------------------------------------------------------

    /// Backend id.
    #[must_use]
    pub fn id(&self) -> Option<JournalEntryId> {
        self.id
    }

    /// Date of the economic event.
    #[must_use]
    pub fn entry_date(&self) -> NaiveDate {
        self.entry_date
    }

    /// Human-readable reference.
    #[must_use]
    pub fn reference(&self) -> &str {
        &self.reference
    }

    /// Category tag.
    #[must_use]
    pub fn entry_type(&self) -> &EntryType {
        &self.entry_type
    }

    /// Free-text description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Posting status.
    #[must_use]
    pub fn status(&self) -> EntryStatus {
        self.status
    }

    /// Lines in display order.
    #[must_use]
    pub fn lines(&self) -> &[JournalEntryLine] {
        &self.lines
    }

    /// True once soft-deleted.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.is_deleted
    }

    /// Current totals.
    #[must_use]
    pub fn balance(&self) -> BalanceSummary {
        BalanceValidator::summarize(&self.lines)
    }

    /// True if the entry accepts edits.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        self.ensure_editable().is_ok()
    }

    /// Fails unless the entry is an active draft.
    ///
    /// # Errors
    ///
    /// `Deleted` for soft-deleted entries, `CannotModifyPosted` for posted ones.
    pub fn ensure_editable(&self) -> Result<(), JournalError> {
        if self.is_deleted {
            return Err(JournalError::Deleted);
        }
        if !self.status.is_editable() {
            return Err(JournalError::CannotModifyPosted);
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Header edits
    // ---------------------------------------------------------------------

    /// Sets the entry date.
    ///
    /// # Errors
    ///
    /// Fails unless the entry is an editable draft.
    pub fn set_entry_date(&mut self, entry_date: NaiveDate) -> Result<(), JournalError> {
        self.ensure_editable()?;
        self.entry_date = entry_date;
        Ok(())
    }

    /// Sets the reference.
    ///
    /// # Errors
    ///
    /// Fails unless the entry is an editable draft.
    pub fn set_reference(&mut self, reference: impl Into<String>) -> Result<(), JournalError> {
        self.ensure_editable()?;
        self.reference = reference.into().trim().to_string();
        Ok(())
    }

    /// Sets the category tag.
    ///
    /// # Errors
    ///
    /// Fails unless the entry is an editable draft.
    pub fn set_entry_type(&mut self, entry_type: EntryType) -> Result<(), JournalError> {
        self.ensure_editable()?;
        self.entry_type = entry_type;
        Ok(())
    }

    /// Sets the description.
    ///
    /// # Errors
    ///
    /// Fails unless the entry is an editable draft.
    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), JournalError> {
        self.ensure_editable()?;
        self.description = description.into();
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Line edits
    // ---------------------------------------------------------------------

    /// Appends an empty line and returns its index.
    ///
    /// # Errors
    ///
    /// Fails unless the entry is an editable draft.
    pub fn add_line(&mut self) -> Result<usize, JournalError> {
        self.push_line(JournalEntryLine::empty())
    }

    /// Appends `line` and returns its index.
    ///
    /// # Errors
    ///
    /// Fails unless the entry is an editable draft.
    pub fn push_line(&mut self, line: JournalEntryLine) -> Result<usize, JournalError> {
        self.ensure_editable()?;
        self.lines.push(line);
        Ok(self.lines.len() - 1)
    }

    /// Removes the line at `index`.
    ///
    /// # Errors
    ///
    /// Fails for non-drafts, bad indexes, or when only two lines remain.
    pub fn remove_line(&mut self, index: usize) -> Result<JournalEntryLine, JournalError> {
        self.ensure_editable()?;
        self.check_index(index)?;
        if self.lines.len() <= MIN_LINES {
            return Err(JournalError::InsufficientLines {
                count: self.lines.len() - 1,
            });
        }
        Ok(self.lines.remove(index))
    }

    /// Applies `edit` to the line at `index`.
    ///
    /// # Errors
    ///
    /// Fails for non-drafts or bad indexes, or with whatever `edit` returns.
    pub fn edit_line<F>(&mut self, index: usize, edit: F) -> Result<(), JournalError>
    where
        F: FnOnce(&mut JournalEntryLine) -> Result<(), JournalError>,
    {
        self.ensure_editable()?;
        self.check_index(index)?;
        // Edit a copy so a failing closure leaves the line untouched.
        let mut line = self.lines[index].clone();
        edit(&mut line)?;
        self.lines[index] = line;
        Ok(())
    }

    /// Sets the account of a line.
    ///
    /// # Errors
    ///
    /// Fails for non-drafts or bad indexes.
    pub fn set_line_account(
        &mut self,
        index: usize,
        account_id: Option<AccountId>,
    ) -> Result<(), JournalError> {
        self.edit_line(index, |line| {
            line.account_id = account_id;
            Ok(())
        })
    }

    /// Sets a line's debit, clearing its credit when non-zero.
    ///
    /// # Errors
    ///
    /// Fails for non-drafts or bad indexes.
    pub fn set_line_debit(&mut self, index: usize, amount: Amount) -> Result<(), JournalError> {
        self.edit_line(index, |line| {
            line.set_debit(amount);
            Ok(())
        })
    }

    /// Sets a line's credit, clearing its debit when non-zero.
    ///
    /// # Errors
    ///
    /// Fails for non-drafts or bad indexes.
    pub fn set_line_credit(&mut self, index: usize, amount: Amount) -> Result<(), JournalError> {
        self.edit_line(index, |line| {
            line.set_credit(amount);
            Ok(())
        })
    }

    /// Replaces every line at once (e.g. from a template).
    ///
    /// # Errors
    ///
    /// Fails for non-drafts or fewer than two lines.
    pub fn replace_lines(&mut self, lines: Vec<JournalEntryLine>) -> Result<(), JournalError> {
        self.ensure_editable()?;
        if lines.len() < MIN_LINES {
            return Err(JournalError::InsufficientLines { count: lines.len() });
        }
        self.lines = lines;
        Ok(())
    }

    fn check_index(&self, index: usize) -> Result<(), JournalError> {
        if index >= self.lines.len() {
            return Err(JournalError::LineOutOfRange {
                index,
                len: self.lines.len(),
            });
        }
        Ok(())
    }

    // ---------------------------------------------------------------------
    // Crate-internal state changes
    // ---------------------------------------------------------------------

    pub(crate) fn set_status(&mut self, status: EntryStatus) {
        self.status = status;
    }

    pub(crate) fn mark_deleted(&mut self) {
        self.is_deleted = true;
    }

    /// Records the id assigned by the backing store.
    pub fn assign_id(&mut self, id: JournalEntryId) {
        self.id = Some(id);
    }
}
