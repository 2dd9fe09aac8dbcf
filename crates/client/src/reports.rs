//! Ledger reports fetched through the API.
//!
//! Reports are computed locally from posted entries and cached until a
//! status change or deletion invalidates them.

use std::sync::Arc;

use chrono::NaiveDate;
use ledgerdesk_core::cache::{QueryCache, QueryKey};
use ledgerdesk_core::reports::{GeneralLedger, ReportPeriod, ReportService, TrialBalanceReport};
use ledgerdesk_shared::AppResult;
use ledgerdesk_shared::types::AccountId;
use serde::Serialize;
use tracing::warn;

use crate::api::{EntryQuery, JournalApi, fetch_all};
use crate::directory::AccountDirectory;

/// General ledger and trial balance over the backend's posted entries.
pub struct LedgerReports<A: JournalApi + ?Sized> {
    api: Arc<A>,
    cache: QueryCache,
    accounts: AccountDirectory<A>,
}

impl<A: JournalApi + ?Sized> LedgerReports<A> {
    /// Creates the report helper.
    #[must_use]
    pub fn new(api: Arc<A>, cache: QueryCache) -> Self {
        let accounts = AccountDirectory::new(Arc::clone(&api), cache.clone());
        Self {
            api,
            cache,
            accounts,
        }
    }

    /// General ledger of `account_id` over `period`.
    ///
    /// # Errors
    ///
    /// `NotFound` for an unknown account; backend errors.
    pub async fn general_ledger(
        &self,
        account_id: AccountId,
        period: ReportPeriod,
    ) -> AppResult<GeneralLedger> {
        let key = QueryKey::ledger(account_id, &period_params(period));
        if let Some(ledger) = self.cache.get(&key) {
            return Ok(ledger);
        }

        let chart = self.accounts.chart().await?;
        let account = chart.require(account_id)?;
        let entries = fetch_all(self.api.as_ref(), &self.cache, &EntryQuery::posted()).await?;
        let ledger = ReportService::general_ledger(&entries, account, period);
        store(&self.cache, key, &ledger);
        Ok(ledger)
    }

    /// Trial balance up to `as_of`.
    ///
    /// # Errors
    ///
    /// `NotFound` when a posted line references an unknown account; backend
    /// errors.
    pub async fn trial_balance(&self, as_of: Option<NaiveDate>) -> AppResult<TrialBalanceReport> {
        let key = QueryKey::trial_balance(as_of);
        if let Some(report) = self.cache.get(&key) {
            return Ok(report);
        }

        let chart = self.accounts.chart().await?;
        let entries = fetch_all(self.api.as_ref(), &self.cache, &EntryQuery::posted()).await?;
        let report = ReportService::trial_balance(&entries, &chart, as_of)?;
        store(&self.cache, key, &report);
        Ok(report)
    }
}

fn period_params(period: ReportPeriod) -> String {
    let bound = |d: Option<NaiveDate>| d.map_or_else(|| "*".to_string(), |d| d.to_string());
    format!("{}..{}", bound(period.from), bound(period.to))
}

fn store<T: Serialize>(cache: &QueryCache, key: String, value: &T) {
    if let Err(e) = cache.set(key.clone(), value) {
        warn!(key, error = %e, "Failed to cache report");
    }
}
