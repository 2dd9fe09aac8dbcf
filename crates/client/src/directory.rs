//! Cached chart-of-accounts lookup.

use std::sync::Arc;

use ledgerdesk_core::accounts::{ChartOfAccount, ChartOfAccounts};
use ledgerdesk_core::cache::{QueryCache, QueryKey};
use ledgerdesk_shared::AppResult;
use tracing::{debug, warn};

use crate::api::JournalApi;

/// Chart of accounts loaded through the API and kept in the query cache.
pub struct AccountDirectory<A: JournalApi + ?Sized> {
    api: Arc<A>,
    cache: QueryCache,
}

impl<A: JournalApi + ?Sized> AccountDirectory<A> {
    /// Creates a directory over `api`.
    #[must_use]
    pub fn new(api: Arc<A>, cache: QueryCache) -> Self {
        Self { api, cache }
    }

    /// The chart of accounts, fetched on first use.
    ///
    /// # Errors
    ///
    /// Backend errors on a cache miss.
    pub async fn chart(&self) -> AppResult<ChartOfAccounts> {
        if let Some(accounts) = self.cache.get::<Vec<ChartOfAccount>>(QueryKey::ACCOUNTS) {
            return Ok(ChartOfAccounts::new(accounts));
        }
        let accounts = self.api.list_accounts().await?;
        debug!(count = accounts.len(), "Loaded chart of accounts");
        if let Err(e) = self.cache.set(QueryKey::ACCOUNTS, &accounts) {
            warn!(error = %e, "Failed to cache chart of accounts");
        }
        Ok(ChartOfAccounts::new(accounts))
    }

    /// Drops the cached chart and fetches it again.
    ///
    /// # Errors
    ///
    /// Backend errors.
    pub async fn refresh(&self) -> AppResult<ChartOfAccounts> {
        self.cache.invalidate(QueryKey::ACCOUNTS);
        self.chart().await
    }
}
