//! Shared fixtures for client integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use chrono::NaiveDate;
use ledgerdesk_client::{InMemoryJournalApi, JournalEditor};
use ledgerdesk_core::accounts::{AccountType, ChartOfAccount};
use ledgerdesk_core::cache::QueryCache;
use ledgerdesk_shared::types::{AccountId, Amount};
use rust_decimal::Decimal;

pub const CASH: i64 = 1000;
pub const SALES: i64 = 4000;
pub const RENT: i64 = 6100;

pub fn date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2026, 7, 1).unwrap()
}

pub fn accounts() -> Vec<ChartOfAccount> {
    [
        (CASH, "1000", "Cash", AccountType::Asset),
        (SALES, "4000", "Sales", AccountType::Revenue),
        (RENT, "6100", "Rent", AccountType::Expense),
    ]
    .into_iter()
    .map(|(id, code, name, account_type)| ChartOfAccount {
        id: AccountId::new(id),
        account_code: code.to_string(),
        account_name: name.to_string(),
        account_type,
        group_id: None,
        is_active: true,
    })
    .collect()
}

pub fn backend() -> Arc<InMemoryJournalApi> {
    Arc::new(InMemoryJournalApi::with_accounts(accounts()))
}

/// A draft editor with the header filled in and a rent/cash line pair.
pub fn rent_editor(
    api: &Arc<InMemoryJournalApi>,
    cache: &QueryCache,
    reference: &str,
    debit: Decimal,
    credit: Decimal,
) -> JournalEditor<InMemoryJournalApi> {
    let mut editor = JournalEditor::new_draft(Arc::clone(api), cache.clone(), "maria", date());
    let entry = editor.entry_mut();
    entry.set_reference(reference).unwrap();
    entry.set_description("July rent").unwrap();
    entry.set_line_account(0, Some(AccountId::new(RENT))).unwrap();
    entry.set_line_debit(0, Amount::new(debit).unwrap()).unwrap();
    entry.set_line_account(1, Some(AccountId::new(CASH))).unwrap();
    entry.set_line_credit(1, Amount::new(credit).unwrap()).unwrap();
    editor
}
