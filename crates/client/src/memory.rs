//! In-memory `JournalApi` with the backend's rules.
//!
//! Ids are assigned on create, references are unique per tenant
//! (case-insensitive), only drafts can be edited or deleted, and deleted
//! entries disappear from every listing. Transport failures can be injected
//! to exercise retry paths. Overrides are applied without an audit event;
//! the requesting session records it.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use ledgerdesk_core::accounts::ChartOfAccount;
use ledgerdesk_core::journal::{EntryLifecycle, JournalEntry, JournalEntryForm, ReferenceGenerator};
use ledgerdesk_shared::types::{JournalEntryId, PageResponse};
use ledgerdesk_shared::{AppError, AppResult};
use tokio::sync::Mutex;
use tracing::debug;

use crate::api::{EntryQuery, JournalApi};

/// Actor recorded for transitions performed by the in-memory backend.
const BACKEND_ACTOR: &str = "backend";

#[derive(Debug, Default)]
struct Store {
    entries: BTreeMap<JournalEntryId, JournalEntry>,
    accounts: Vec<ChartOfAccount>,
    next_id: i64,
}

impl Store {
    fn active(&self, id: JournalEntryId) -> AppResult<&JournalEntry> {
        self.entries
            .get(&id)
            .filter(|e| !e.is_deleted())
            .ok_or_else(|| AppError::NotFound(format!("Journal entry {id}")))
    }

    fn active_mut(&mut self, id: JournalEntryId) -> AppResult<&mut JournalEntry> {
        self.entries
            .get_mut(&id)
            .filter(|e| !e.is_deleted())
            .ok_or_else(|| AppError::NotFound(format!("Journal entry {id}")))
    }

    fn check_reference(&self, reference: &str, except: Option<JournalEntryId>) -> AppResult<()> {
        let taken = self
            .entries
            .values()
            .filter(|e| !e.is_deleted() && e.id() != except)
            .map(JournalEntry::reference);
        ReferenceGenerator::ensure_unique(reference, taken).map_err(AppError::from)
    }

    fn allocate_id(&mut self) -> JournalEntryId {
        self.next_id += 1;
        JournalEntryId::new(self.next_id)
    }
}

/// Journal backend kept in memory.
#[derive(Debug, Default)]
pub struct InMemoryJournalApi {
    store: Mutex<Store>,
    failures: AtomicUsize,
    calls: AtomicUsize,
    latency: Option<Duration>,
}

impl InMemoryJournalApi {
    /// An empty backend.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A backend serving `accounts` as its chart of accounts.
    #[must_use]
    pub fn with_accounts(accounts: Vec<ChartOfAccount>) -> Self {
        Self {
            store: Mutex::new(Store {
                accounts,
                ..Store::default()
            }),
            ..Self::default()
        }
    }

    /// Delays every call by `latency`.
    #[must_use]
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = Some(latency);
        self
    }

    /// Makes the next `count` calls fail with a transport error.
    pub fn fail_next(&self, count: usize) {
        self.failures.store(count, Ordering::SeqCst);
    }

    /// Number of calls received, including failed ones.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Stores `entry` as-is, assigning an id if it has none.
    pub async fn insert(&self, mut entry: JournalEntry) -> JournalEntryId {
        let mut store = self.store.lock().await;
        let id = match entry.id() {
            Some(id) => {
                store.next_id = store.next_id.max(id.get());
                id
            }
            None => {
                let id = store.allocate_id();
                entry.assign_id(id);
                id
            }
        };
        store.entries.insert(id, entry);
        id
    }

    /// Posts an entry as if another session had done it, bypassing fault
    /// injection and the call counter.
    ///
    /// # Errors
    ///
    /// Same as [`JournalApi::post_entry`].
    pub async fn post_externally(&self, id: JournalEntryId) -> AppResult<()> {
        let mut store = self.store.lock().await;
        let entry = store.active_mut(id)?;
        EntryLifecycle::post(entry, "another-session")?;
        Ok(())
    }

    /// Snapshot of a stored entry, deleted ones included.
    pub async fn snapshot(&self, id: JournalEntryId) -> Option<JournalEntry> {
        self.store.lock().await.entries.get(&id).cloned()
    }

    async fn enter(&self, operation: &'static str) -> AppResult<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
        let injected = self
            .failures
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
            .is_ok();
        if injected {
            debug!(operation, "Injected transport failure");
            return Err(AppError::Transport(format!("{operation}: connection reset")));
        }
        Ok(())
    }
}

fn check_form(form: &JournalEntryForm) -> AppResult<()> {
    form.check().map_err(AppError::from)
}

#[async_trait]
impl JournalApi for InMemoryJournalApi {
    async fn list_entries(&self, query: &EntryQuery) -> AppResult<PageResponse<JournalEntry>> {
        self.enter("list_entries").await?;
        let store = self.store.lock().await;
        let mut items: Vec<JournalEntry> = store
            .entries
            .values()
            .filter(|e| query.matches(e))
            .cloned()
            .collect();
        items.sort_by(|a, b| {
            b.entry_date()
                .cmp(&a.entry_date())
                .then_with(|| b.id().cmp(&a.id()))
        });
        Ok(PageResponse::from_items(items, query.page))
    }

    async fn get_entry(&self, id: JournalEntryId) -> AppResult<JournalEntry> {
        self.enter("get_entry").await?;
        self.store.lock().await.active(id).cloned()
    }

    async fn create_entry(&self, form: &JournalEntryForm) -> AppResult<JournalEntry> {
        self.enter("create_entry").await?;
        check_form(form)?;
        let mut store = self.store.lock().await;
        store.check_reference(&form.reference, None)?;

        let mut entry = form.clone().into_draft()?;
        let id = store.allocate_id();
        entry.assign_id(id);
        store.entries.insert(id, entry.clone());
        Ok(entry)
    }

    async fn update_entry(
        &self,
        id: JournalEntryId,
        form: &JournalEntryForm,
    ) -> AppResult<JournalEntry> {
        self.enter("update_entry").await?;
        check_form(form)?;
        let mut store = self.store.lock().await;
        EntryLifecycle::check_edit(store.active(id)?.status())?;
        store.check_reference(&form.reference, Some(id))?;

        let mut entry = form.clone().into_draft()?;
        entry.assign_id(id);
        store.entries.insert(id, entry.clone());
        Ok(entry)
    }

    async fn delete_entry(&self, id: JournalEntryId) -> AppResult<()> {
        self.enter("delete_entry").await?;
        let mut store = self.store.lock().await;
        let entry = store.active_mut(id)?;
        EntryLifecycle::delete(entry, BACKEND_ACTOR)?;
        Ok(())
    }

    async fn post_entry(&self, id: JournalEntryId) -> AppResult<JournalEntry> {
        self.enter("post_entry").await?;
        let mut store = self.store.lock().await;
        let entry = store.active_mut(id)?;
        EntryLifecycle::post(entry, BACKEND_ACTOR)?;
        Ok(entry.clone())
    }

    async fn set_draft(&self, id: JournalEntryId, reason: &str) -> AppResult<JournalEntry> {
        self.enter("set_draft").await?;
        let mut store = self.store.lock().await;
        let entry = store.active_mut(id)?;
        EntryLifecycle::reopen(entry)?;
        debug!(entry_id = %id, reason, "Journal entry returned to draft");
        Ok(entry.clone())
    }

    async fn list_accounts(&self) -> AppResult<Vec<ChartOfAccount>> {
        self.enter("list_accounts").await?;
        Ok(self.store.lock().await.accounts.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use ledgerdesk_core::journal::{EntryStatus, EntryType, JournalEntryLine};
    use ledgerdesk_shared::types::{AccountId, Amount, PageRequest};
    use rust_decimal_macros::dec;

    fn entry(reference: &str, day: u32) -> JournalEntry {
        let amount = Amount::new(dec!(40)).unwrap();
        JournalEntry::draft_with_lines(
            NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
            reference,
            EntryType::Manual,
            "Stationery",
            vec![
                JournalEntryLine::debit(AccountId::new(6200), amount),
                JournalEntryLine::credit(AccountId::new(1000), amount),
            ],
        )
        .unwrap()
    }

    #[tokio::test]
    async fn test_listing_is_newest_first_and_paged() {
        let api = InMemoryJournalApi::new();
        for day in 1..=5 {
            api.insert(entry(&format!("JE-{day:06}"), day)).await;
        }

        let query = EntryQuery::default().with_page(PageRequest::new(1, 2));
        let page = api.list_entries(&query).await.unwrap();

        assert_eq!(page.meta.total, 5);
        assert_eq!(page.meta.total_pages, 3);
        let refs: Vec<&str> = page.data.iter().map(JournalEntry::reference).collect();
        assert_eq!(refs, vec!["JE-000005", "JE-000004"]);
    }

    #[tokio::test]
    async fn test_insert_keeps_existing_id_and_advances_sequence() {
        let api = InMemoryJournalApi::new();
        let mut existing = entry("JE-000010", 1);
        existing.assign_id(JournalEntryId::new(10));
        api.insert(existing).await;

        let id = api.insert(entry("JE-000011", 2)).await;
        assert_eq!(id, JournalEntryId::new(11));
    }

    #[tokio::test]
    async fn test_posted_entry_cannot_be_deleted() {
        let api = InMemoryJournalApi::new();
        let id = api.insert(entry("JE-000001", 1)).await;
        let posted = api.post_entry(id).await.unwrap();
        assert_eq!(posted.status(), EntryStatus::Posted);

        assert!(matches!(
            api.delete_entry(id).await,
            Err(AppError::StaleState(_))
        ));
        let reopened = api.set_draft(id, "Correct the date").await.unwrap();
        assert_eq!(reopened.status(), EntryStatus::Draft);
        api.delete_entry(id).await.unwrap();
        assert!(matches!(api.get_entry(id).await, Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_injected_failures_are_counted() {
        let api = InMemoryJournalApi::new();
        api.fail_next(2);

        assert!(api.list_accounts().await.unwrap_err().is_retryable());
        assert!(api.list_accounts().await.is_err());
        assert!(api.list_accounts().await.is_ok());
        assert_eq!(api.call_count(), 3);
    }
}
