//! Chart of accounts.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use ledgerdesk_shared::types::{AccountGroupId, AccountId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::AccountError;
use crate::journal::LineSide;

/// Account classification.
///
/// Asset and Expense accounts are debit-normal: their balance grows with
/// debits. Liability, Equity and Revenue accounts are credit-normal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountType {
    /// Asset.
    Asset,
    /// Liability.
    Liability,
    /// Equity.
    Equity,
    /// Revenue.
    Revenue,
    /// Expense.
    Expense,
}

impl AccountType {
    /// Returns the wire representation.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Asset => "asset",
            Self::Liability => "liability",
            Self::Equity => "equity",
            Self::Revenue => "revenue",
            Self::Expense => "expense",
        }
    }

    /// The side on which the balance normally sits.
    #[must_use]
    pub fn normal_side(self) -> LineSide {
        match self {
            Self::Asset | Self::Expense => LineSide::Debit,
            Self::Liability | Self::Equity | Self::Revenue => LineSide::Credit,
        }
    }

    /// Balance change caused by a line with the given amounts.
    ///
    /// - Asset/Expense: debit - credit
    /// - Liability/Equity/Revenue: credit - debit
    #[must_use]
    pub fn balance_change(self, debit: Decimal, credit: Decimal) -> Decimal {
        match self.normal_side() {
            LineSide::Debit => debit - credit,
            LineSide::Credit => credit - debit,
        }
    }
}

impl FromStr for AccountType {
    type Err = AccountError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "asset" => Ok(Self::Asset),
            "liability" => Ok(Self::Liability),
            "equity" => Ok(Self::Equity),
            "revenue" | "income" => Ok(Self::Revenue),
            "expense" => Ok(Self::Expense),
            _ => Err(AccountError::UnknownType(s.to_string())),
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const fn default_active() -> bool {
    true
}

/// One account of the chart, as returned by `GET /chart-of-accounts`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChartOfAccount {
    /// Account ID.
    pub id: AccountId,
    /// Account code, e.g. `1000`.
    pub account_code: String,
    /// Display name.
    pub account_name: String,
    /// Classification.
    pub account_type: AccountType,
    /// Group the account belongs to, if any.
    #[serde(default)]
    pub group_id: Option<AccountGroupId>,
    /// Inactive accounts stay visible in reports but accept no postings.
    #[serde(default = "default_active")]
    pub is_active: bool,
}

impl ChartOfAccount {
    /// `code - name`, as shown in account pickers.
    #[must_use]
    pub fn label(&self) -> String {
        format!("{} - {}", self.account_code, self.account_name)
    }
}

/// A tenant's chart of accounts, ordered by account code.
#[derive(Debug, Clone, Default)]
pub struct ChartOfAccounts {
    accounts: Vec<ChartOfAccount>,
    by_id: HashMap<AccountId, usize>,
}

impl ChartOfAccounts {
    /// Builds the chart, sorting accounts by code.
    #[must_use]
    pub fn new(mut accounts: Vec<ChartOfAccount>) -> Self {
        accounts.sort_by(|a, b| a.account_code.cmp(&b.account_code));
        let by_id = accounts
            .iter()
            .enumerate()
            .map(|(index, account)| (account.id, index))
            .collect();
        Self { accounts, by_id }
    }

    /// All accounts in code order.
    #[must_use]
    pub fn accounts(&self) -> &[ChartOfAccount] {
        &self.accounts
    }

    /// Number of accounts.
    #[must_use]
    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    /// True when the chart has no accounts.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Looks up an account by id.
    #[must_use]
    pub fn get(&self, id: AccountId) -> Option<&ChartOfAccount> {
        self.by_id.get(&id).map(|&index| &self.accounts[index])
    }

    /// Looks up an account by id, failing when absent.
    ///
    /// # Errors
    ///
    /// `NotFound` if the id is not in the chart.
    pub fn require(&self, id: AccountId) -> Result<&ChartOfAccount, AccountError> {
        self.get(id).ok_or(AccountError::NotFound(id))
    }

    /// Looks up an account by code.
    ///
    /// # Errors
    ///
    /// `CodeNotFound` if no account has this code.
    pub fn find_by_code(&self, code: &str) -> Result<&ChartOfAccount, AccountError> {
        let code = code.trim();
        self.accounts
            .iter()
            .find(|a| a.account_code == code)
            .ok_or_else(|| AccountError::CodeNotFound(code.to_string()))
    }

    /// Active accounts, for pickers.
    pub fn active(&self) -> impl Iterator<Item = &ChartOfAccount> {
        self.accounts.iter().filter(|a| a.is_active)
    }

    /// Accounts of one type.
    pub fn of_type(&self, account_type: AccountType) -> impl Iterator<Item = &ChartOfAccount> {
        self.accounts
            .iter()
            .filter(move |a| a.account_type == account_type)
    }

    /// Checks that `id` exists and can receive postings.
    ///
    /// # Errors
    ///
    /// `NotFound` or `Inactive`.
    pub fn ensure_postable(&self, id: AccountId) -> Result<&ChartOfAccount, AccountError> {
        let account = self.require(id)?;
        if !account.is_active {
            return Err(AccountError::Inactive {
                code: account.account_code.clone(),
            });
        }
        Ok(account)
    }
}

impl FromIterator<ChartOfAccount> for ChartOfAccounts {
    fn from_iter<I: IntoIterator<Item = ChartOfAccount>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}
