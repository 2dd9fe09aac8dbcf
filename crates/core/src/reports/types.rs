//! Report data types.

use chrono::NaiveDate;
use ledgerdesk_shared::types::{AccountId, JournalEntryId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::ReportError;
use crate::accounts::AccountType;

/// Inclusive date window; open on either side when unset.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportPeriod {
    /// First day included.
    pub from: Option<NaiveDate>,
    /// Last day included.
    pub to: Option<NaiveDate>,
}

impl ReportPeriod {
    /// Builds a period, rejecting `from > to`.
    ///
    /// # Errors
    ///
    /// `InvalidDateRange` when both bounds are set and reversed.
    pub fn new(from: Option<NaiveDate>, to: Option<NaiveDate>) -> Result<Self, ReportError> {
        if let (Some(start), Some(end)) = (from, to)
            && start > end
        {
            return Err(ReportError::InvalidDateRange { start, end });
        }
        Ok(Self { from, to })
    }

    /// Period ending on `date`, open at the start.
    #[must_use]
    pub fn as_of(date: NaiveDate) -> Self {
        Self {
            from: None,
            to: Some(date),
        }
    }

    /// True if `date` is inside the window.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.from.is_none_or(|from| date >= from) && self.to.is_none_or(|to| date <= to)
    }

    /// True if `date` falls before the window starts.
    #[must_use]
    pub fn is_before(&self, date: NaiveDate) -> bool {
        self.from.is_some_and(|from| date < from)
    }
}

/// One posted line in an account's general ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerLine {
    /// Entry the line belongs to.
    pub entry_id: Option<JournalEntryId>,
    /// Entry date.
    pub entry_date: NaiveDate,
    /// Entry reference.
    pub reference: String,
    /// Line description, inherited from the entry when blank.
    pub description: String,
    /// Debit amount.
    pub debit: Decimal,
    /// Credit amount.
    pub credit: Decimal,
    /// Balance after this line, on the account's normal side.
    pub running_balance: Decimal,
}

/// General ledger of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeneralLedger {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub account_code: String,
    /// Account name.
    pub account_name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Reporting window.
    pub period: ReportPeriod,
    /// Balance carried in from before the window.
    pub opening_balance: Decimal,
    /// Lines inside the window, by date.
    pub lines: Vec<LedgerLine>,
    /// Sum of debits inside the window.
    pub total_debit: Decimal,
    /// Sum of credits inside the window.
    pub total_credit: Decimal,
    /// Balance after the last line.
    pub closing_balance: Decimal,
}

/// One account row of the trial balance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialBalanceRow {
    /// Account ID.
    pub account_id: AccountId,
    /// Account code.
    pub account_code: String,
    /// Account name.
    pub account_name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Sum of posted debits.
    pub total_debit: Decimal,
    /// Sum of posted credits.
    pub total_credit: Decimal,
    /// Net balance shown in the debit column, zero otherwise.
    pub debit_balance: Decimal,
    /// Net balance shown in the credit column, zero otherwise.
    pub credit_balance: Decimal,
}

/// Trial balance report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialBalanceReport {
    /// Last date included, `None` for all posted entries.
    pub as_of: Option<NaiveDate>,
    /// Rows in account code order; accounts without activity are omitted.
    pub rows: Vec<TrialBalanceRow>,
    /// Column totals.
    pub totals: TrialBalanceTotals,
}

/// Trial balance totals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrialBalanceTotals {
    /// Sum of the debit balance column.
    pub total_debit: Decimal,
    /// Sum of the credit balance column.
    pub total_credit: Decimal,
    /// Whether the columns agree.
    pub is_balanced: bool,
}
