//! Editing session against the in-memory backend.

mod common;

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use common::{CASH, RENT, SALES, backend, date, rent_editor};
use ledgerdesk_client::{
    EntryQuery, InMemoryJournalApi, JournalApi, JournalEditor, Operation, SubmitState,
    SubmitTracker, list_cached,
};
use ledgerdesk_core::cache::{QueryCache, QueryKey};
use ledgerdesk_core::journal::{EntryStatus, JournalError, LifecycleAction, NO_REASON_GIVEN};
use ledgerdesk_shared::AppError;
use ledgerdesk_shared::types::{AccountId, Amount};
use rust_decimal_macros::dec;
use tracing::{Event, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::util::SubscriberInitExt;

/// Counts events on the `audit` target.
#[derive(Clone, Default)]
struct AuditEvents(Arc<AtomicUsize>);

impl AuditEvents {
    fn count(&self) -> usize {
        self.0.load(Ordering::SeqCst)
    }
}

impl<S: Subscriber> Layer<S> for AuditEvents {
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        if event.metadata().target() == "audit" {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }
}

#[tokio::test]
async fn test_save_assigns_id_and_caches_entry() {
    let api = backend();
    let cache = QueryCache::new();
    let mut editor = rent_editor(&api, &cache, "JE-000001", dec!(100), dec!(100));

    editor.save().await.unwrap();

    let id = editor.entry().id().expect("saved entry has an id");
    assert!(!editor.is_dirty());
    assert!(matches!(editor.submit_state(), SubmitState::Succeeded));
    assert!(cache.contains(&QueryKey::entry(id)));
    let listed = api.list_entries(&EntryQuery::default()).await.unwrap();
    assert_eq!(listed.meta.total, 1);
}

#[tokio::test]
async fn test_unbalanced_post_never_reaches_backend() {
    let api = backend();
    let cache = QueryCache::new();
    let mut editor = rent_editor(&api, &cache, "JE-000001", dec!(100.00), dec!(99.99));

    let err = editor.post().await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(err.to_string().contains("Debit: 100.00, Credit: 99.99"));
    assert_eq!(api.call_count(), 0);
    assert_eq!(editor.entry().status(), EntryStatus::Draft);
    assert_eq!(editor.balance().difference(), dec!(0.01));
}

#[tokio::test]
async fn test_post_saves_pending_edits_first() {
    let api = backend();
    let cache = QueryCache::new();
    let mut editor = rent_editor(&api, &cache, "JE-000001", dec!(250), dec!(250));

    let action = editor.post().await.unwrap();

    // Chart of accounts, create, post.
    assert_eq!(api.call_count(), 3);
    assert_eq!(editor.entry().status(), EntryStatus::Posted);
    assert_eq!(action.new_status(), Some(EntryStatus::Posted));
    match action {
        LifecycleAction::Post { posted_by, totals, .. } => {
            assert_eq!(posted_by, "maria");
            assert_eq!(totals.total_credit, dec!(250.00));
        }
        other => panic!("unexpected action {other:?}"),
    }
}

#[tokio::test]
async fn test_posted_entry_rejects_edits_locally() {
    let api = backend();
    let cache = QueryCache::new();
    let mut editor = rent_editor(&api, &cache, "JE-000001", dec!(10), dec!(10));
    editor.post().await.unwrap();
    let calls = api.call_count();

    assert_eq!(
        editor.entry_mut().set_description("changed"),
        Err(JournalError::CannotModifyPosted)
    );
    assert!(matches!(editor.save().await, Err(AppError::StaleState(_))));
    assert!(matches!(editor.delete().await, Err(AppError::StaleState(_))));
    assert_eq!(api.call_count(), calls);
}

#[tokio::test]
async fn test_force_to_draft_without_reason_reopens() {
    let api = backend();
    let cache = QueryCache::new();
    let mut editor = rent_editor(&api, &cache, "JE-000001", dec!(10), dec!(10));
    editor.post().await.unwrap();

    let action = editor.force_to_draft("  ").await.unwrap();
    assert!(action.is_override());
    match action {
        LifecycleAction::ForceToDraft { reason, forced_by, .. } => {
            assert_eq!(reason, NO_REASON_GIVEN);
            assert_eq!(forced_by, "maria");
        }
        other => panic!("unexpected action {other:?}"),
    }
    assert_eq!(editor.entry().status(), EntryStatus::Draft);
    editor
        .entry_mut()
        .set_line_account(0, Some(AccountId::new(SALES)))
        .unwrap();
}

#[tokio::test]
async fn test_force_to_draft_emits_one_audit_event() {
    let audit = AuditEvents::default();
    let _guard = tracing_subscriber::registry()
        .with(audit.clone())
        .set_default();

    let api = backend();
    let cache = QueryCache::new();
    let mut editor = rent_editor(&api, &cache, "JE-000001", dec!(10), dec!(10));
    editor.post().await.unwrap();
    assert_eq!(audit.count(), 0);

    editor.force_to_draft("Wrong expense account").await.unwrap();
    assert_eq!(audit.count(), 1);
}

#[tokio::test]
async fn test_post_rejects_inactive_account() {
    let mut accounts = common::accounts();
    for account in &mut accounts {
        account.is_active = account.id != AccountId::new(RENT);
    }
    let api = Arc::new(InMemoryJournalApi::with_accounts(accounts));
    let cache = QueryCache::new();
    let mut editor = rent_editor(&api, &cache, "JE-000001", dec!(10), dec!(10));

    let err = editor.post().await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    assert!(err.to_string().contains("Line 1: Account 6100 is inactive"));
    assert_eq!(editor.entry().status(), EntryStatus::Draft);
    assert!(editor.entry().id().is_none());
    // Only the chart was read.
    assert_eq!(api.call_count(), 1);
}

#[tokio::test]
async fn test_post_rejects_unknown_account() {
    let api = backend();
    let cache = QueryCache::new();
    let mut editor = rent_editor(&api, &cache, "JE-000001", dec!(10), dec!(10));
    editor.save().await.unwrap();
    editor
        .entry_mut()
        .set_line_account(1, Some(AccountId::new(9999)))
        .unwrap();

    let err = editor.post().await.unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
    let stored = api.snapshot(editor.entry().id().unwrap()).await.unwrap();
    assert_eq!(stored.status(), EntryStatus::Draft);
    assert_eq!(stored.lines()[1].account_id, Some(AccountId::new(CASH)));
}

#[tokio::test]
async fn test_save_makes_cached_listing_stale() {
    let api = backend();
    let cache = QueryCache::new();
    let query = EntryQuery::default();
    let key = QueryKey::entry_list(&query.cache_params());

    assert!(list_cached(api.as_ref(), &cache, &query).await.unwrap().data.is_empty());
    assert!(cache.contains(&key));
    list_cached(api.as_ref(), &cache, &query).await.unwrap();
    assert_eq!(api.call_count(), 1);

    rent_editor(&api, &cache, "JE-000001", dec!(10), dec!(10))
        .save()
        .await
        .unwrap();
    assert!(!cache.contains(&key));

    let listed = list_cached(api.as_ref(), &cache, &query).await.unwrap();
    assert_eq!(listed.meta.total, 1);
}

#[tokio::test]
async fn test_delete_draft_removes_it_from_listings() {
    let api = backend();
    let cache = QueryCache::new();
    let mut editor = rent_editor(&api, &cache, "JE-000001", dec!(10), dec!(10));
    editor.save().await.unwrap();
    let id = editor.entry().id().unwrap();

    editor.delete().await.unwrap();

    assert!(editor.entry().is_deleted());
    let listed = api.list_entries(&EntryQuery::default()).await.unwrap();
    assert!(listed.data.is_empty());
    assert!(matches!(api.get_entry(id).await, Err(AppError::NotFound(_))));
    assert!(api.snapshot(id).await.unwrap().is_deleted());
}

#[tokio::test]
async fn test_transport_failure_preserves_entry_and_retries() {
    let api = backend();
    let cache = QueryCache::new();
    let mut editor = rent_editor(&api, &cache, "JE-000001", dec!(75), dec!(75));
    let before = editor.entry().clone();

    api.fail_next(1);
    let err = editor.save().await.unwrap_err();

    assert!(err.is_retryable());
    assert_eq!(editor.entry(), &before);
    assert_eq!(editor.last_failed(), Some(&Operation::Save));
    assert!(editor.submit_state().error().is_some());
    editor.entry_mut().set_description("July rent, office").unwrap();

    assert_eq!(editor.retry().await.unwrap(), None);
    assert!(editor.entry().id().is_some());
    assert_eq!(editor.entry().description(), "July rent, office");
    assert!(editor.last_failed().is_none());
    assert!(matches!(editor.retry().await, Err(AppError::Validation(_))));
}

#[tokio::test]
async fn test_backend_stale_state_is_not_retryable() {
    let api = backend();
    let cache = QueryCache::new();
    let mut editor = rent_editor(&api, &cache, "JE-000001", dec!(10), dec!(10));
    editor.save().await.unwrap();
    let id = editor.entry().id().unwrap();
    api.post_externally(id).await.unwrap();

    editor.entry_mut().set_description("edited meanwhile").unwrap();
    let err = editor.save().await.unwrap_err();

    assert!(matches!(err, AppError::StaleState(_)));
    assert!(editor.last_failed().is_none());
    editor.reload().await.unwrap();
    assert_eq!(editor.entry().status(), EntryStatus::Posted);
    assert_eq!(editor.entry().description(), "July rent");
}

#[tokio::test]
async fn test_second_submit_while_pending_is_refused() {
    let api = Arc::new(
        InMemoryJournalApi::with_accounts(common::accounts())
            .with_latency(Duration::from_millis(50)),
    );
    let cache = QueryCache::new();
    let tracker = SubmitTracker::new();
    let mut first =
        rent_editor(&api, &cache, "JE-000001", dec!(10), dec!(10)).with_tracker(tracker.clone());
    let mut second =
        rent_editor(&api, &cache, "JE-000002", dec!(10), dec!(10)).with_tracker(tracker.clone());

    let (a, b) = tokio::join!(first.save(), second.save());

    let (ok, refused) = if a.is_ok() { (a, b) } else { (b, a) };
    assert!(ok.is_ok());
    assert!(matches!(refused, Err(AppError::Conflict(_))));
    assert_eq!(api.call_count(), 1);
    assert!(matches!(tracker.state(), SubmitState::Succeeded));
}

#[tokio::test]
async fn test_duplicate_reference_rejected_case_insensitively() {
    let api = backend();
    let cache = QueryCache::new();
    rent_editor(&api, &cache, "JE-000001", dec!(1), dec!(1))
        .save()
        .await
        .unwrap();

    let mut duplicate = rent_editor(&api, &cache, "je-000001", dec!(1), dec!(1));
    assert!(matches!(
        duplicate.save().await,
        Err(AppError::Conflict(_))
    ));
}

#[tokio::test]
async fn test_suggest_reference_continues_sequence() {
    let api = backend();
    let cache = QueryCache::new();
    rent_editor(&api, &cache, "JE-000041", dec!(1), dec!(1))
        .save()
        .await
        .unwrap();

    let mut editor = JournalEditor::new_draft(Arc::clone(&api), cache.clone(), "maria", date());
    editor.suggest_reference().await.unwrap();
    assert_eq!(editor.entry().reference(), "JE-000042");
}

#[tokio::test]
async fn test_blank_placeholder_lines_are_not_sent() {
    let api = backend();
    let cache = QueryCache::new();
    let mut editor = rent_editor(&api, &cache, "JE-000001", dec!(5), dec!(5));
    editor.entry_mut().add_line().unwrap();

    editor.save().await.unwrap();

    assert_eq!(editor.entry().lines().len(), 2);
}

#[tokio::test]
async fn test_open_reads_through_cache() {
    let api = backend();
    let cache = QueryCache::new();
    let mut editor = rent_editor(&api, &cache, "JE-000001", dec!(5), dec!(5));
    editor.save().await.unwrap();
    let id = editor.entry().id().unwrap();
    let calls = api.call_count();

    let reopened = JournalEditor::open(Arc::clone(&api), cache.clone(), "maria", id)
        .await
        .unwrap();

    assert_eq!(reopened.entry(), editor.entry());
    assert!(!reopened.is_dirty());
    assert_eq!(api.call_count(), calls);
}

#[tokio::test]
async fn test_line_edits_keep_one_side() {
    let api = backend();
    let cache = QueryCache::new();
    let mut editor = rent_editor(&api, &cache, "JE-000001", dec!(5), dec!(5));
    editor
        .entry_mut()
        .set_line_credit(0, Amount::new(dec!(5)).unwrap())
        .unwrap();

    let line = &editor.entry().lines()[0];
    assert!(line.debit_amount().is_zero());
    assert_eq!(line.account_id, Some(AccountId::new(RENT)));
    assert!(!editor.balance().is_balanced);
    assert_eq!(editor.entry().lines()[1].account_id, Some(AccountId::new(CASH)));
}
