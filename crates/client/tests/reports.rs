//! Cached lookups and reports against the in-memory backend.

mod common;

use std::sync::Arc;

use common::{CASH, RENT, SALES, backend, date, rent_editor};
use ledgerdesk_client::{AccountDirectory, InMemoryJournalApi, JournalEditor, LedgerReports};
use ledgerdesk_core::cache::{QueryCache, QueryKey};
use ledgerdesk_core::reports::ReportPeriod;
use ledgerdesk_shared::AppError;
use ledgerdesk_shared::types::{AccountId, Amount};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

async fn post_sale(api: &Arc<InMemoryJournalApi>, cache: &QueryCache, value: Decimal) {
    let mut editor = JournalEditor::new_draft(Arc::clone(api), cache.clone(), "maria", date());
    let amount = Amount::new(value).unwrap();
    let entry = editor.entry_mut();
    entry.set_reference("JE-000100").unwrap();
    entry.set_description("Cash sale").unwrap();
    entry.set_line_account(0, Some(AccountId::new(CASH))).unwrap();
    entry.set_line_debit(0, amount).unwrap();
    entry.set_line_account(1, Some(AccountId::new(SALES))).unwrap();
    entry.set_line_credit(1, amount).unwrap();
    editor.post().await.unwrap();
}

#[tokio::test]
async fn test_chart_is_fetched_once() {
    let api = backend();
    let directory = AccountDirectory::new(Arc::clone(&api), QueryCache::new());

    let chart = directory.chart().await.unwrap();
    assert_eq!(chart.len(), 3);
    directory.chart().await.unwrap();
    assert_eq!(api.call_count(), 1);

    directory.refresh().await.unwrap();
    assert_eq!(api.call_count(), 2);
}

#[tokio::test]
async fn test_general_ledger_follows_posted_entries() {
    let api = backend();
    let cache = QueryCache::new();
    post_sale(&api, &cache, dec!(1000)).await;
    rent_editor(&api, &cache, "JE-000101", dec!(300), dec!(300))
        .post()
        .await
        .unwrap();
    // A draft never shows up in the ledger.
    rent_editor(&api, &cache, "JE-000102", dec!(50), dec!(50))
        .save()
        .await
        .unwrap();

    let reports = LedgerReports::new(Arc::clone(&api), cache.clone());
    let ledger = reports
        .general_ledger(AccountId::new(CASH), ReportPeriod::default())
        .await
        .unwrap();

    assert_eq!(ledger.lines.len(), 2);
    assert_eq!(ledger.closing_balance, dec!(700));
    assert_eq!(ledger.account_code, "1000");
}

#[tokio::test]
async fn test_unknown_account_is_not_found() {
    let api = backend();
    let reports = LedgerReports::new(Arc::clone(&api), QueryCache::new());
    let err = reports
        .general_ledger(AccountId::new(42), ReportPeriod::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn test_trial_balance_invalidated_by_force_to_draft() {
    let api = backend();
    let cache = QueryCache::new();
    post_sale(&api, &cache, dec!(500)).await;
    let mut rent = rent_editor(&api, &cache, "JE-000101", dec!(200), dec!(200));
    rent.post().await.unwrap();

    let reports = LedgerReports::new(Arc::clone(&api), cache.clone());
    let report = reports.trial_balance(None).await.unwrap();
    assert!(report.totals.is_balanced);
    assert_eq!(report.totals.total_debit, dec!(500));
    assert!(cache.contains(&QueryKey::trial_balance(None)));

    rent.force_to_draft("Posted to the wrong period").await.unwrap();
    assert!(!cache.contains(&QueryKey::trial_balance(None)));

    let report = reports.trial_balance(None).await.unwrap();
    let rent_row = report
        .rows
        .iter()
        .find(|r| r.account_id == AccountId::new(RENT));
    assert!(rent_row.is_none());
    assert_eq!(report.totals.total_credit, dec!(500));
}
