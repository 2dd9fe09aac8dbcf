//! Journal entry lines.

use ledgerdesk_shared::types::{AccountId, Amount, AmountError};
use serde::{Deserialize, Serialize};

/// Which column of a line carries its amount.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSide {
    /// Debit column.
    Debit,
    /// Credit column.
    Credit,
}

/// A single debit or credit line of a journal entry.
///
/// Amounts are private: a non-zero value written to one side clears the
/// other, so a line never carries both.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JournalEntryLine {
    /// The account posted to, unset while the user has not picked one.
    pub account_id: Option<AccountId>,
    /// Line description; blank means "use the entry description".
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    debit_amount: Amount,
    #[serde(default)]
    credit_amount: Amount,
}

impl JournalEntryLine {
    /// An empty line, as a new entry starts with.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// A debit line.
    #[must_use]
    pub fn debit(account_id: AccountId, amount: Amount) -> Self {
        let mut line = Self {
            account_id: Some(account_id),
            ..Self::default()
        };
        line.set_debit(amount);
        line
    }

    /// A credit line.
    #[must_use]
    pub fn credit(account_id: AccountId, amount: Amount) -> Self {
        let mut line = Self {
            account_id: Some(account_id),
            ..Self::default()
        };
        line.set_credit(amount);
        line
    }

    /// Debit amount (zero for credit lines).
    #[must_use]
    pub fn debit_amount(&self) -> Amount {
        self.debit_amount
    }

    /// Credit amount (zero for debit lines).
    #[must_use]
    pub fn credit_amount(&self) -> Amount {
        self.credit_amount
    }

    /// Sets the debit amount; a non-zero debit clears the credit.
    pub fn set_debit(&mut self, amount: Amount) {
        self.debit_amount = amount;
        if !amount.is_zero() {
            self.credit_amount = Amount::ZERO;
        }
    }

    /// Sets the credit amount; a non-zero credit clears the debit.
    pub fn set_credit(&mut self, amount: Amount) {
        self.credit_amount = amount;
        if !amount.is_zero() {
            self.debit_amount = Amount::ZERO;
        }
    }

    /// Parses raw cell input into the debit column.
    ///
    /// # Errors
    ///
    /// Returns an error for non-numeric or negative input; the line is left
    /// unchanged.
    pub fn set_debit_input(&mut self, input: &str) -> Result<(), AmountError> {
        let amount = Amount::parse(input)?;
        self.set_debit(amount);
        Ok(())
    }

    /// Parses raw cell input into the credit column.
    ///
    /// # Errors
    ///
    /// Returns an error for non-numeric or negative input; the line is left
    /// unchanged.
    pub fn set_credit_input(&mut self, input: &str) -> Result<(), AmountError> {
        let amount = Amount::parse(input)?;
        self.set_credit(amount);
        Ok(())
    }

    /// The side carrying an amount, if any.
    #[must_use]
    pub fn side(&self) -> Option<LineSide> {
        match (self.debit_amount.is_zero(), self.credit_amount.is_zero()) {
            (false, true) => Some(LineSide::Debit),
            (true, false) => Some(LineSide::Credit),
            _ => None,
        }
    }

    /// True when both columns carry an amount. Only reachable through
    /// deserialized data.
    #[must_use]
    pub fn has_both_sides(&self) -> bool {
        !self.debit_amount.is_zero() && !self.credit_amount.is_zero()
    }

    /// True when the line has neither an account nor an amount.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.account_id.is_none() && self.debit_amount.is_zero() && self.credit_amount.is_zero()
    }

    /// Line description, falling back to the entry description when blank.
    #[must_use]
    pub fn effective_description<'a>(&'a self, entry_description: &'a str) -> &'a str {
        if self.description.trim().is_empty() {
            entry_description
        } else {
            &self.description
        }
    }
}
