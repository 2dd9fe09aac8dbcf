//! Debit/credit balance of a journal entry.
//!
//! Recomputed on every line edit, so it is a pure pass over the lines. It
//! trusts the per-line invariant (at most one side populated) and simply
//! sums both columns.

use ledgerdesk_shared::types::round_to_scale;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::JournalError;
use super::line::JournalEntryLine;

/// Totals of an entry's lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSummary {
    /// Sum of the debit column, rounded to two places.
    pub total_debit: Decimal,
    /// Sum of the credit column, rounded to two places.
    pub total_credit: Decimal,
    /// Debits equal credits and are greater than zero.
    pub is_balanced: bool,
}

impl BalanceSummary {
    /// Builds a summary from raw column sums.
    ///
    /// Both totals are rounded before comparison; a zero total is never
    /// balanced, which keeps an empty entry from being posted.
    #[must_use]
    pub fn new(total_debit: Decimal, total_credit: Decimal) -> Self {
        let total_debit = round_to_scale(total_debit);
        let total_credit = round_to_scale(total_credit);
        Self {
            total_debit,
            total_credit,
            is_balanced: total_debit == total_credit && total_debit > Decimal::ZERO,
        }
    }

    /// Debit minus credit.
    #[must_use]
    pub fn difference(&self) -> Decimal {
        self.total_debit - self.total_credit
    }

    /// Fails unless the entry is postable.
    ///
    /// # Errors
    ///
    /// `ZeroTotal` when nothing has been entered, `Unbalanced` otherwise.
    pub fn ensure_balanced(&self) -> Result<(), JournalError> {
        if self.is_balanced {
            return Ok(());
        }
        if self.total_debit.is_zero() && self.total_credit.is_zero() {
            return Err(JournalError::ZeroTotal);
        }
        Err(JournalError::Unbalanced {
            debit: self.total_debit,
            credit: self.total_credit,
        })
    }
}

/// Computes entry totals.
pub struct BalanceValidator;

impl BalanceValidator {
    /// Sums the debit and credit columns of `lines`.
    #[must_use]
    pub fn summarize(lines: &[JournalEntryLine]) -> BalanceSummary {
        let total_debit: Decimal = lines.iter().map(|l| l.debit_amount().value()).sum();
        let total_credit: Decimal = lines.iter().map(|l| l.credit_amount().value()).sum();

        BalanceSummary::new(total_debit, total_credit)
    }

    /// Shorthand for `summarize(lines).is_balanced`.
    #[must_use]
    pub fn is_balanced(lines: &[JournalEntryLine]) -> bool {
        Self::summarize(lines).is_balanced
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerdesk_shared::types::{AccountId, Amount, MAX_AMOUNT};
    use rust_decimal_macros::dec;

    fn debit(value: Decimal) -> JournalEntryLine {
        JournalEntryLine::debit(AccountId::new(1), Amount::new(value).unwrap())
    }

    fn credit(value: Decimal) -> JournalEntryLine {
        JournalEntryLine::credit(AccountId::new(2), Amount::new(value).unwrap())
    }

    #[test]
    fn test_equal_totals_are_balanced() {
        let summary = BalanceValidator::summarize(&[debit(dec!(100.00)), credit(dec!(100.00))]);
        assert!(summary.is_balanced);
        assert_eq!(summary.total_debit, dec!(100.00));
        assert_eq!(summary.total_credit, dec!(100.00));
        assert_eq!(summary.difference(), Decimal::ZERO);
        assert!(summary.ensure_balanced().is_ok());
    }

    #[test]
    fn test_one_cent_off_is_unbalanced() {
        let summary = BalanceValidator::summarize(&[debit(dec!(100.00)), credit(dec!(99.99))]);
        assert!(!summary.is_balanced);
        assert_eq!(summary.difference(), dec!(0.01));
        assert_eq!(
            summary.ensure_balanced(),
            Err(JournalError::Unbalanced {
                debit: dec!(100.00),
                credit: dec!(99.99),
            })
        );
    }

    #[test]
    fn test_zero_total_is_not_balanced() {
        let lines = [JournalEntryLine::empty(), JournalEntryLine::empty()];
        let summary = BalanceValidator::summarize(&lines);
        assert!(!summary.is_balanced);
        assert_eq!(summary.total_debit, summary.total_credit);
        assert_eq!(summary.ensure_balanced(), Err(JournalError::ZeroTotal));
    }

    #[test]
    fn test_no_lines_is_not_balanced() {
        assert!(!BalanceValidator::is_balanced(&[]));
    }

    #[test]
    fn test_many_small_lines_do_not_drift() {
        // 0.10 ten times is exactly 1.00 in decimal; binary floats give 0.9999999999999999.
        let mut lines: Vec<JournalEntryLine> = (0..10).map(|_| debit(dec!(0.10))).collect();
        lines.push(credit(dec!(1.00)));
        let summary = BalanceValidator::summarize(&lines);
        assert!(summary.is_balanced);
        assert_eq!(summary.total_debit, dec!(1.00));
    }

    #[test]
    fn test_thirds_compare_after_rounding() {
        // 33.33 * 3 = 99.99, so a 100.00 credit stays one cent off.
        let lines = [
            debit(dec!(33.33)),
            debit(dec!(33.33)),
            debit(dec!(33.33)),
            credit(dec!(100.00)),
        ];
        let summary = BalanceValidator::summarize(&lines);
        assert!(!summary.is_balanced);
        assert_eq!(summary.difference(), dec!(-0.01));
    }

    #[test]
    fn test_largest_amounts_sum_without_overflow() {
        assert!(Amount::parse("50000000000000000000000000000").is_err());

        let mut lines: Vec<JournalEntryLine> = (0..1000).map(|_| debit(MAX_AMOUNT)).collect();
        lines.extend((0..1000).map(|_| credit(MAX_AMOUNT)));
        let summary = BalanceValidator::summarize(&lines);
        assert!(summary.is_balanced);
        assert_eq!(summary.total_debit, dec!(999999999999990.00));
    }

    #[test]
    fn test_summary_rounds_raw_totals() {
        let summary = BalanceSummary::new(dec!(10.004), dec!(10.00));
        assert!(summary.is_balanced);
        assert_eq!(summary.total_debit.to_string(), "10.00");
    }
}
