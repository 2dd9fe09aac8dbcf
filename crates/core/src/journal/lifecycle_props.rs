//! Property-based tests for the entry lifecycle.

use chrono::NaiveDate;
use ledgerdesk_shared::types::{AccountId, Amount};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::entry::{EntryStatus, EntryType, JournalEntry};
use super::error::JournalError;
use super::lifecycle::EntryLifecycle;
use super::line::JournalEntryLine;

fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn entry(debit: Decimal, credit: Decimal) -> JournalEntry {
    JournalEntry::draft_with_lines(
        NaiveDate::from_ymd_opt(2026, 6, 30).unwrap(),
        "JE-000100",
        EntryType::Manual,
        "Accrual",
        vec![
            JournalEntryLine::debit(AccountId::new(5000), Amount::new(debit).unwrap()),
            JournalEntryLine::credit(AccountId::new(2100), Amount::new(credit).unwrap()),
        ],
    )
    .unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Posting succeeds exactly when the entry balances.
    #[test]
    fn prop_post_guarded_by_balance(debit in positive_amount(), credit in positive_amount()) {
        let mut e = entry(debit, credit);
        let result = EntryLifecycle::post(&mut e, "tester");
        if debit == credit {
            prop_assert!(result.is_ok());
            prop_assert_eq!(e.status(), EntryStatus::Posted);
        } else {
            let is_unbalanced = matches!(result, Err(JournalError::Unbalanced { .. }));
            prop_assert!(is_unbalanced);
            prop_assert_eq!(e.status(), EntryStatus::Draft);
        }
    }

    /// A posted entry rejects every edit and keeps its content.
    #[test]
    fn prop_posted_rejects_edits(value in positive_amount(), new_value in positive_amount()) {
        let mut e = entry(value, value);
        EntryLifecycle::post(&mut e, "tester").unwrap();
        let before = e.clone();

        prop_assert_eq!(
            e.set_line_debit(0, Amount::new(new_value).unwrap()),
            Err(JournalError::CannotModifyPosted)
        );
        prop_assert_eq!(e.set_description("changed"), Err(JournalError::CannotModifyPosted));
        prop_assert_eq!(e.add_line(), Err(JournalError::CannotModifyPosted));
        prop_assert_eq!(e, before);
    }

    /// Force-to-draft succeeds from Posted with any reason, blank included,
    /// and the entry becomes editable again.
    #[test]
    fn prop_force_to_draft_from_posted(value in positive_amount(), reason in "[a-z ]{0,20}") {
        let mut e = entry(value, value);
        EntryLifecycle::post(&mut e, "tester").unwrap();
        let action = EntryLifecycle::force_to_draft(&mut e, "admin", &reason).unwrap();
        prop_assert!(action.is_override());
        prop_assert_eq!(e.status(), EntryStatus::Draft);
        prop_assert!(e.set_description("corrected").is_ok());
    }
}
