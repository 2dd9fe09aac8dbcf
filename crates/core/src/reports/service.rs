//! Report generation service.

use std::collections::BTreeMap;

use ledgerdesk_shared::types::AccountId;
use rust_decimal::Decimal;
use tracing::debug;

use super::error::ReportError;
use super::types::{
    GeneralLedger, LedgerLine, ReportPeriod, TrialBalanceReport, TrialBalanceRow,
    TrialBalanceTotals,
};
use crate::accounts::{ChartOfAccount, ChartOfAccounts};
use crate::journal::{EntryStatus, JournalEntry};

/// Service for generating ledger reports.
pub struct ReportService;

impl ReportService {
    /// Entries that belong in the ledger: posted and not deleted.
    pub fn ledger_entries(entries: &[JournalEntry]) -> impl Iterator<Item = &JournalEntry> {
        entries
            .iter()
            .filter(|e| e.status() == EntryStatus::Posted && !e.is_deleted())
    }

    /// Builds the general ledger of `account` over `period`.
    ///
    /// Lines dated before the period fold into the opening balance; lines
    /// after it are ignored. Lines on the same date keep their input order.
    #[must_use]
    pub fn general_ledger(
        entries: &[JournalEntry],
        account: &ChartOfAccount,
        period: ReportPeriod,
    ) -> GeneralLedger {
        let account_type = account.account_type;
        let mut opening_balance = Decimal::ZERO;
        let mut lines = Vec::new();

        for entry in Self::ledger_entries(entries) {
            let date = entry.entry_date();
            for line in entry.lines().iter().filter(|l| l.account_id == Some(account.id)) {
                let debit = line.debit_amount().value();
                let credit = line.credit_amount().value();
                if period.is_before(date) {
                    opening_balance += account_type.balance_change(debit, credit);
                } else if period.contains(date) {
                    lines.push(LedgerLine {
                        entry_id: entry.id(),
                        entry_date: date,
                        reference: entry.reference().to_string(),
                        description: line.effective_description(entry.description()).to_string(),
                        debit,
                        credit,
                        running_balance: Decimal::ZERO,
                    });
                }
            }
        }

        lines.sort_by_key(|l| l.entry_date);

        let mut balance = opening_balance;
        for line in &mut lines {
            balance += account_type.balance_change(line.debit, line.credit);
            line.running_balance = balance;
        }

        let total_debit = lines.iter().map(|l| l.debit).sum();
        let total_credit = lines.iter().map(|l| l.credit).sum();

        debug!(
            account_id = %account.id,
            lines = lines.len(),
            closing_balance = %balance,
            "Generated general ledger"
        );

        GeneralLedger {
            account_id: account.id,
            account_code: account.account_code.clone(),
            account_name: account.account_name.clone(),
            account_type,
            period,
            opening_balance,
            lines,
            total_debit,
            total_credit,
            closing_balance: balance,
        }
    }

    /// Builds the trial balance up to `as_of` (inclusive).
    ///
    /// # Errors
    ///
    /// `AccountNotFound` when a posted line references an account that is
    /// not in `chart`.
    pub fn trial_balance(
        entries: &[JournalEntry],
        chart: &ChartOfAccounts,
        as_of: Option<chrono::NaiveDate>,
    ) -> Result<TrialBalanceReport, ReportError> {
        let mut sums: BTreeMap<AccountId, (Decimal, Decimal)> = BTreeMap::new();

        for entry in Self::ledger_entries(entries) {
            if as_of.is_some_and(|date| entry.entry_date() > date) {
                continue;
            }
            for line in entry.lines() {
                let Some(account_id) = line.account_id else {
                    continue;
                };
                let slot = sums.entry(account_id).or_default();
                slot.0 += line.debit_amount().value();
                slot.1 += line.credit_amount().value();
            }
        }

        let mut rows = Vec::with_capacity(sums.len());
        for (account_id, (total_debit, total_credit)) in sums {
            let account = chart
                .get(account_id)
                .ok_or(ReportError::AccountNotFound(account_id))?;
            let net = total_debit - total_credit;
            let (debit_balance, credit_balance) = if net >= Decimal::ZERO {
                (net, Decimal::ZERO)
            } else {
                (Decimal::ZERO, -net)
            };
            rows.push(TrialBalanceRow {
                account_id,
                account_code: account.account_code.clone(),
                account_name: account.account_name.clone(),
                account_type: account.account_type,
                total_debit,
                total_credit,
                debit_balance,
                credit_balance,
            });
        }
        rows.sort_by(|a, b| a.account_code.cmp(&b.account_code));

        let total_debit: Decimal = rows.iter().map(|r| r.debit_balance).sum();
        let total_credit: Decimal = rows.iter().map(|r| r.credit_balance).sum();

        Ok(TrialBalanceReport {
            as_of,
            rows,
            totals: TrialBalanceTotals {
                total_debit,
                total_credit,
                is_balanced: total_debit == total_credit,
            },
        })
    }
}
