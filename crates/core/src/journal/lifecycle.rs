//! Journal entry lifecycle state machine.
//!
//! | From   | To        | Guard            | Trigger          |
//! |--------|-----------|------------------|------------------|
//! | Draft  | Posted    | entry balanced   | `post`           |
//! | Posted | Draft     | none (audited)   | `force_to_draft` |
//! | Draft  | (deleted) | none             | `delete`         |
//! | Posted | (deleted) | forbidden        | -                |
//!
//! The `check_*` functions work on a bare status, for callers that only
//! know what the backend reported. The entry-level functions also apply
//! the transition and return the resulting [`LifecycleAction`].

use chrono::{DateTime, Utc};
use ledgerdesk_shared::types::AuditEventId;
use tracing::{info, warn};

use super::balance::BalanceSummary;
use super::entry::{EntryStatus, JournalEntry};
use super::error::JournalError;
use super::validation::validate_for_post;

/// Reason recorded for an override given without one.
pub const NO_REASON_GIVEN: &str = "no reason given";

/// A completed lifecycle transition with its audit data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleAction {
    /// Draft → Posted.
    Post {
        /// The new status after posting.
        new_status: EntryStatus,
        /// Who posted the entry.
        posted_by: String,
        /// When the entry was posted.
        posted_at: DateTime<Utc>,
        /// Totals at the moment of posting.
        totals: BalanceSummary,
    },
    /// Posted → Draft, bypassing the balance guard.
    ForceToDraft {
        /// The new status (Draft).
        new_status: EntryStatus,
        /// Audit event recorded for the override.
        audit_id: AuditEventId,
        /// Who forced the entry back to draft.
        forced_by: String,
        /// When the override happened.
        forced_at: DateTime<Utc>,
        /// Why the override was needed.
        reason: String,
    },
    /// Draft soft-deleted.
    Delete {
        /// Who deleted the entry.
        deleted_by: String,
        /// When the entry was deleted.
        deleted_at: DateTime<Utc>,
    },
}

impl LifecycleAction {
    /// Returns the status after this action, `None` for deletion.
    #[must_use]
    pub fn new_status(&self) -> Option<EntryStatus> {
        match self {
            Self::Post { new_status, .. } | Self::ForceToDraft { new_status, .. } => {
                Some(*new_status)
            }
            Self::Delete { .. } => None,
        }
    }

    /// True for the administrative override, which callers must surface
    /// differently from ordinary edits.
    #[must_use]
    pub fn is_override(&self) -> bool {
        matches!(self, Self::ForceToDraft { .. })
    }
}

/// Stateless lifecycle rules.
pub struct EntryLifecycle;

impl EntryLifecycle {
    /// Check if a status transition is valid.
    #[must_use]
    pub fn is_valid_transition(from: EntryStatus, to: EntryStatus) -> bool {
        matches!(
            (from, to),
            (EntryStatus::Draft, EntryStatus::Posted) | (EntryStatus::Posted, EntryStatus::Draft)
        )
    }

    /// Edits are allowed only on drafts.
    ///
    /// # Errors
    ///
    /// `CannotModifyPosted` for posted entries.
    pub fn check_edit(status: EntryStatus) -> Result<(), JournalError> {
        match status {
            EntryStatus::Draft => Ok(()),
            EntryStatus::Posted => Err(JournalError::CannotModifyPosted),
        }
    }

    /// Posting needs a draft whose totals balance.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` for posted entries; `Unbalanced`/`ZeroTotal` otherwise.
    pub fn check_post(status: EntryStatus, totals: &BalanceSummary) -> Result<(), JournalError> {
        if status != EntryStatus::Draft {
            return Err(JournalError::InvalidTransition {
                from: status,
                to: EntryStatus::Posted,
            });
        }
        totals.ensure_balanced()
    }

    /// Forcing back to draft only needs a posted entry; balance and reason
    /// are not checked.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` for drafts.
    pub fn check_force_to_draft(status: EntryStatus) -> Result<(), JournalError> {
        if status != EntryStatus::Posted {
            return Err(JournalError::InvalidTransition {
                from: status,
                to: EntryStatus::Draft,
            });
        }
        Ok(())
    }

    /// Only drafts can be deleted.
    ///
    /// # Errors
    ///
    /// `CanOnlyDeleteDraft` for posted entries.
    pub fn check_delete(status: EntryStatus) -> Result<(), JournalError> {
        match status {
            EntryStatus::Draft => Ok(()),
            EntryStatus::Posted => Err(JournalError::CanOnlyDeleteDraft),
        }
    }

    /// Posts `entry` after full validation.
    ///
    /// # Errors
    ///
    /// Any validation error, or a stale-state error if the entry is not an
    /// active draft. The entry is unchanged on error.
    pub fn post(
        entry: &mut JournalEntry,
        posted_by: &str,
    ) -> Result<LifecycleAction, JournalError> {
        if entry.is_deleted() {
            return Err(JournalError::Deleted);
        }
        let totals = entry.balance();
        Self::check_post(entry.status(), &totals)?;
        validate_for_post(entry)?;

        entry.set_status(EntryStatus::Posted);
        info!(
            entry_id = ?entry.id(),
            reference = %entry.reference(),
            total = %totals.total_debit,
            posted_by,
            "Journal entry posted"
        );

        Ok(LifecycleAction::Post {
            new_status: EntryStatus::Posted,
            posted_by: posted_by.to_string(),
            posted_at: Utc::now(),
            totals,
        })
    }

    /// Forces a posted entry back to draft, regardless of its balance.
    ///
    /// Every call emits one audit event on the `audit` target. A blank
    /// reason is recorded as [`NO_REASON_GIVEN`].
    ///
    /// # Errors
    ///
    /// `Deleted` or `InvalidTransition`; the entry is unchanged.
    pub fn force_to_draft(
        entry: &mut JournalEntry,
        forced_by: &str,
        reason: &str,
    ) -> Result<LifecycleAction, JournalError> {
        Self::reopen(entry)?;
        Ok(Self::record_override(entry, forced_by, reason))
    }

    /// Applies the Posted → Draft transition without an audit event.
    ///
    /// For the side that stores entries; the session requesting the
    /// override records it with [`EntryLifecycle::record_override`].
    ///
    /// # Errors
    ///
    /// `Deleted` or `InvalidTransition`; the entry is unchanged.
    pub fn reopen(entry: &mut JournalEntry) -> Result<(), JournalError> {
        if entry.is_deleted() {
            return Err(JournalError::Deleted);
        }
        Self::check_force_to_draft(entry.status())?;
        entry.set_status(EntryStatus::Draft);
        Ok(())
    }

    /// Emits the audit event for an accepted override of `entry`.
    #[must_use]
    pub fn record_override(entry: &JournalEntry, forced_by: &str, reason: &str) -> LifecycleAction {
        let reason = match reason.trim() {
            "" => NO_REASON_GIVEN,
            given => given,
        };
        let audit_id = AuditEventId::new();
        let totals = entry.balance();
        warn!(
            target: "audit",
            %audit_id,
            entry_id = ?entry.id(),
            reference = %entry.reference(),
            forced_by,
            reason,
            was_balanced = totals.is_balanced,
            "Posted journal entry forced back to draft"
        );

        LifecycleAction::ForceToDraft {
            new_status: EntryStatus::Draft,
            audit_id,
            forced_by: forced_by.to_string(),
            forced_at: Utc::now(),
            reason: reason.to_string(),
        }
    }

    /// Soft-deletes a draft.
    ///
    /// # Errors
    ///
    /// `CanOnlyDeleteDraft` for posted entries, `Deleted` if already deleted.
    pub fn delete(
        entry: &mut JournalEntry,
        deleted_by: &str,
    ) -> Result<LifecycleAction, JournalError> {
        if entry.is_deleted() {
            return Err(JournalError::Deleted);
        }
        Self::check_delete(entry.status())?;

        entry.mark_deleted();
        info!(
            entry_id = ?entry.id(),
            reference = %entry.reference(),
            deleted_by,
            "Journal entry deleted"
        );

        Ok(LifecycleAction::Delete {
            deleted_by: deleted_by.to_string(),
            deleted_at: Utc::now(),
        })
    }
}
