//! Property-based tests for entry balance calculation.

use ledgerdesk_shared::types::{AccountId, Amount};
use proptest::prelude::*;
use rust_decimal::Decimal;

use super::balance::BalanceValidator;
use super::line::{JournalEntryLine, LineSide};

/// Strategy for an amount between 0.01 and 1,000,000.00.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (1i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

/// Strategy for a single populated line.
fn line_strategy() -> impl Strategy<Value = JournalEntryLine> {
    (positive_amount(), any::<bool>(), 1i64..50).prop_map(|(value, is_debit, account)| {
        let amount = Amount::new(value).unwrap();
        if is_debit {
            JournalEntryLine::debit(AccountId::new(account), amount)
        } else {
            JournalEntryLine::credit(AccountId::new(account), amount)
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Balance depends only on the multiset of lines, never their order.
    #[test]
    fn prop_order_does_not_matter(lines in prop::collection::vec(line_strategy(), 2..12)) {
        let forward = BalanceValidator::summarize(&lines);
        let mut reversed = lines.clone();
        reversed.reverse();
        let backward = BalanceValidator::summarize(&reversed);
        prop_assert_eq!(forward, backward);
    }

    /// Balanced iff the column sums are equal and non-zero.
    #[test]
    fn prop_balanced_iff_equal_nonzero(lines in prop::collection::vec(line_strategy(), 0..12)) {
        let debit: Decimal = lines.iter().map(|l| l.debit_amount().value()).sum();
        let credit: Decimal = lines.iter().map(|l| l.credit_amount().value()).sum();
        let summary = BalanceValidator::summarize(&lines);
        prop_assert_eq!(summary.is_balanced, debit == credit && debit > Decimal::ZERO);
        prop_assert_eq!(summary.difference(), debit - credit);
    }

    /// Mirroring every debit with an equal credit always balances.
    #[test]
    fn prop_mirrored_lines_balance(amounts in prop::collection::vec(positive_amount(), 1..10)) {
        let mut lines = Vec::new();
        for value in &amounts {
            let amount = Amount::new(*value).unwrap();
            lines.push(JournalEntryLine::debit(AccountId::new(1), amount));
            lines.push(JournalEntryLine::credit(AccountId::new(2), amount));
        }
        prop_assert!(BalanceValidator::is_balanced(&lines));
    }

    /// Entering a non-zero amount on one side clears the other.
    #[test]
    fn prop_one_side_per_line(first in positive_amount(), second in positive_amount()) {
        let mut line = JournalEntryLine::empty();
        line.set_debit(Amount::new(first).unwrap());
        line.set_credit(Amount::new(second).unwrap());
        prop_assert!(!line.has_both_sides());
        prop_assert_eq!(line.side(), Some(LineSide::Credit));
        prop_assert!(line.debit_amount().is_zero());
    }
}
