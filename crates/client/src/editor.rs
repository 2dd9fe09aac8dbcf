//! Single-session journal entry editor.
//!
//! The editor owns one entry and drives it through save, post, force to
//! draft and delete. Every action validates locally first, so a validation
//! error never reaches the network. A failed request leaves the local entry
//! exactly as it was, still editable, and a transport failure can be
//! retried with [`JournalEditor::retry`].

use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use ledgerdesk_core::cache::{Mutation, QueryCache, QueryKey};
use ledgerdesk_core::journal::{
    BalanceSummary, EntryLifecycle, JournalEntry, JournalEntryForm, JournalError, LifecycleAction,
    ReferenceGenerator, validate_for_post, validate_for_save,
};
use ledgerdesk_shared::types::JournalEntryId;
use ledgerdesk_shared::{AppError, AppResult};
use tracing::{info, warn};

use crate::api::{EntryQuery, JournalApi, fetch_all};
use crate::directory::AccountDirectory;
use crate::submit::{SubmitState, SubmitTracker};

/// A network action the editor can repeat after a transport failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operation {
    /// Create or update.
    Save,
    /// Draft → Posted.
    Post,
    /// Posted → Draft override.
    ForceToDraft {
        /// Reason recorded with the override.
        reason: String,
    },
    /// Soft delete.
    Delete,
}

/// Editing session for one journal entry.
pub struct JournalEditor<A: JournalApi + ?Sized> {
    api: Arc<A>,
    cache: QueryCache,
    tracker: SubmitTracker,
    actor: String,
    entry: JournalEntry,
    saved: Option<JournalEntry>,
    last_failed: Option<Operation>,
}

impl<A: JournalApi + ?Sized> JournalEditor<A> {
    /// Starts editing a fresh draft dated `entry_date`.
    #[must_use]
    pub fn new_draft(
        api: Arc<A>,
        cache: QueryCache,
        actor: impl Into<String>,
        entry_date: NaiveDate,
    ) -> Self {
        Self::from_entry(api, cache, actor, JournalEntry::new_draft(entry_date))
    }

    /// Starts editing `entry`. An entry with an id is treated as saved.
    #[must_use]
    pub fn from_entry(
        api: Arc<A>,
        cache: QueryCache,
        actor: impl Into<String>,
        entry: JournalEntry,
    ) -> Self {
        let saved = entry.id().is_some().then(|| entry.clone());
        Self {
            api,
            cache,
            tracker: SubmitTracker::new(),
            actor: actor.into(),
            entry,
            saved,
            last_failed: None,
        }
    }

    /// Loads entry `id`, from the cache when present.
    ///
    /// # Errors
    ///
    /// Whatever the backend returns.
    pub async fn open(
        api: Arc<A>,
        cache: QueryCache,
        actor: impl Into<String>,
        id: JournalEntryId,
    ) -> AppResult<Self> {
        let key = QueryKey::entry(id);
        let entry = match cache.get::<JournalEntry>(&key) {
            Some(entry) => entry,
            None => {
                let entry = api.get_entry(id).await?;
                cache_entry(&cache, &entry);
                entry
            }
        };
        Ok(Self::from_entry(api, cache, actor, entry))
    }

    /// Shares `tracker` with other views of the same entry.
    #[must_use]
    pub fn with_tracker(mut self, tracker: SubmitTracker) -> Self {
        self.tracker = tracker;
        self
    }

    /// The entry being edited.
    #[must_use]
    pub fn entry(&self) -> &JournalEntry {
        &self.entry
    }

    /// Mutable access for edits. The entry's own guards reject changes to a
    /// posted or deleted entry.
    pub fn entry_mut(&mut self) -> &mut JournalEntry {
        &mut self.entry
    }

    /// Live totals.
    #[must_use]
    pub fn balance(&self) -> BalanceSummary {
        self.entry.balance()
    }

    /// True when local edits have not been saved.
    #[must_use]
    pub fn is_dirty(&self) -> bool {
        self.saved.as_ref() != Some(&self.entry)
    }

    /// State of the most recent submission.
    #[must_use]
    pub fn submit_state(&self) -> SubmitState {
        self.tracker.state()
    }

    /// The tracker guarding this entry's submissions.
    #[must_use]
    pub fn tracker(&self) -> &SubmitTracker {
        &self.tracker
    }

    /// The action that failed with a retryable error, if any.
    #[must_use]
    pub fn last_failed(&self) -> Option<&Operation> {
        self.last_failed.as_ref()
    }

    /// Fills a blank reference with the next free `JE-NNNNNN` number.
    ///
    /// # Errors
    ///
    /// Backend errors while listing entries, or `CannotModifyPosted`.
    pub async fn suggest_reference(&mut self) -> AppResult<()> {
        if !self.entry.reference().trim().is_empty() {
            return Ok(());
        }
        let existing = fetch_all(self.api.as_ref(), &self.cache, &EntryQuery::default()).await?;
        let next = ReferenceGenerator::default().next(existing.iter().map(JournalEntry::reference));
        self.entry.set_reference(next)?;
        Ok(())
    }

    /// Creates or updates the entry on the backend.
    ///
    /// # Errors
    ///
    /// Validation errors before any request; backend errors otherwise.
    pub async fn save(&mut self) -> AppResult<()> {
        self.entry.ensure_editable()?;
        validate_for_save(&self.entry)?;
        let form = JournalEntryForm::from_entry(&self.entry).without_blank_lines();
        form.check()?;

        let guard = self.tracker.begin()?;
        let result = match self.entry.id() {
            Some(id) => self.api.update_entry(id, &form).await,
            None => self.api.create_entry(&form).await,
        };
        guard.finish(&result);
        let saved = self.settle(Operation::Save, result)?;

        let mutation = match self.entry.id() {
            Some(id) => Mutation::UpdateEntry(id),
            None => Mutation::CreateEntry,
        };
        self.adopt(saved, &mutation);
        info!(
            entry_id = ?self.entry.id(),
            reference = %self.entry.reference(),
            actor = %self.actor,
            "Journal entry saved"
        );
        Ok(())
    }

    /// Posts the entry, saving pending edits first.
    ///
    /// # Errors
    ///
    /// `Unbalanced`/`ZeroTotal` and other validation errors before any
    /// write; `Validation` when a line uses an unknown or inactive account;
    /// `StaleState` if the entry is already posted.
    pub async fn post(&mut self) -> AppResult<LifecycleAction> {
        self.ensure_active()?;
        let totals = self.entry.balance();
        EntryLifecycle::check_post(self.entry.status(), &totals)?;
        validate_for_post(&self.entry)?;
        self.ensure_accounts_postable().await?;

        if self.is_dirty() {
            self.save().await?;
        }
        let id = self.require_id()?;

        let guard = self.tracker.begin()?;
        let result = self.api.post_entry(id).await;
        guard.finish(&result);
        let posted = self.settle(Operation::Post, result)?;

        self.adopt(posted, &Mutation::PostEntry(id));
        info!(
            entry_id = %id,
            reference = %self.entry.reference(),
            total = %totals.total_debit,
            actor = %self.actor,
            "Journal entry posted"
        );
        Ok(LifecycleAction::Post {
            new_status: self.entry.status(),
            posted_by: self.actor.clone(),
            posted_at: Utc::now(),
            totals,
        })
    }

    /// Forces a posted entry back to draft. The override is audit-logged
    /// once, after the backend accepts it. A blank reason is allowed.
    ///
    /// # Errors
    ///
    /// `InvalidTransition` before any request; backend errors otherwise.
    pub async fn force_to_draft(&mut self, reason: &str) -> AppResult<LifecycleAction> {
        self.ensure_active()?;
        EntryLifecycle::check_force_to_draft(self.entry.status())?;
        let id = self.require_id()?;

        let guard = self.tracker.begin()?;
        let result = self.api.set_draft(id, reason.trim()).await;
        guard.finish(&result);
        let reopened = self.settle(
            Operation::ForceToDraft {
                reason: reason.to_string(),
            },
            result,
        )?;

        let action = EntryLifecycle::record_override(&self.entry, &self.actor, reason);
        self.adopt(reopened, &Mutation::SetDraft(id));
        Ok(action)
    }

    /// Soft-deletes the draft. An unsaved draft is discarded locally.
    ///
    /// # Errors
    ///
    /// `CanOnlyDeleteDraft` before any request; backend errors otherwise.
    pub async fn delete(&mut self) -> AppResult<LifecycleAction> {
        self.ensure_active()?;
        EntryLifecycle::check_delete(self.entry.status())?;

        let Some(id) = self.entry.id() else {
            return Ok(EntryLifecycle::delete(&mut self.entry, &self.actor)?);
        };

        let guard = self.tracker.begin()?;
        let result = self.api.delete_entry(id).await;
        guard.finish(&result);
        self.settle(Operation::Delete, result)?;

        let action = EntryLifecycle::delete(&mut self.entry, &self.actor)?;
        self.saved = Some(self.entry.clone());
        self.cache.apply(&Mutation::DeleteEntry(id));
        Ok(action)
    }

    /// Repeats the action that last failed with a transport error.
    ///
    /// # Errors
    ///
    /// `Validation` when there is nothing to retry; otherwise whatever the
    /// repeated action returns.
    pub async fn retry(&mut self) -> AppResult<Option<LifecycleAction>> {
        let Some(operation) = self.last_failed.clone() else {
            return Err(AppError::Validation("Nothing to retry".to_string()));
        };
        info!(?operation, entry_id = ?self.entry.id(), "Retrying journal entry action");
        match operation {
            Operation::Save => self.save().await.map(|()| None),
            Operation::Post => self.post().await.map(Some),
            Operation::ForceToDraft { reason } => self.force_to_draft(&reason).await.map(Some),
            Operation::Delete => self.delete().await.map(Some),
        }
    }

    /// Replaces the local entry with the backend's copy, discarding local
    /// edits. Used after a stale-state error.
    ///
    /// # Errors
    ///
    /// `Validation` for an unsaved entry; backend errors otherwise.
    pub async fn reload(&mut self) -> AppResult<()> {
        let id = self.require_id()?;
        let entry = self.api.get_entry(id).await?;
        cache_entry(&self.cache, &entry);
        self.saved = Some(entry.clone());
        self.entry = entry;
        self.last_failed = None;
        Ok(())
    }

    fn ensure_active(&self) -> Result<(), JournalError> {
        if self.entry.is_deleted() {
            return Err(JournalError::Deleted);
        }
        Ok(())
    }

    async fn ensure_accounts_postable(&self) -> AppResult<()> {
        let chart = AccountDirectory::new(Arc::clone(&self.api), self.cache.clone())
            .chart()
            .await?;
        for (index, line) in self.entry.lines().iter().enumerate() {
            let Some(account_id) = line.account_id else {
                continue;
            };
            if let Err(e) = chart.ensure_postable(account_id) {
                return Err(AppError::Validation(format!("Line {}: {e}", index + 1)));
            }
        }
        Ok(())
    }

    fn require_id(&self) -> AppResult<JournalEntryId> {
        self.entry
            .id()
            .ok_or_else(|| AppError::Validation("Journal entry has not been saved".to_string()))
    }

    fn settle<T>(&mut self, operation: Operation, result: AppResult<T>) -> AppResult<T> {
        match result {
            Ok(value) => {
                self.last_failed = None;
                Ok(value)
            }
            Err(err) => {
                warn!(
                    ?operation,
                    entry_id = ?self.entry.id(),
                    error = %err,
                    retryable = err.is_retryable(),
                    "Journal entry action failed"
                );
                self.last_failed = err.is_retryable().then_some(operation);
                Err(err)
            }
        }
    }

    fn adopt(&mut self, entry: JournalEntry, mutation: &Mutation) {
        self.cache.apply(mutation);
        cache_entry(&self.cache, &entry);
        self.saved = Some(entry.clone());
        self.entry = entry;
    }
}

fn cache_entry(cache: &QueryCache, entry: &JournalEntry) {
    if let Some(id) = entry.id()
        && let Err(e) = cache.set(QueryKey::entry(id), entry)
    {
        warn!(entry_id = %id, error = %e, "Failed to cache journal entry");
    }
}

impl<A: JournalApi + ?Sized> std::fmt::Debug for JournalEditor<A> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JournalEditor")
            .field("entry_id", &self.entry.id())
            .field("status", &self.entry.status())
            .field("actor", &self.actor)
            .field("dirty", &self.is_dirty())
            .finish_non_exhaustive()
    }
}
