//! Backend API abstraction.
//!
//! [`JournalApi`] mirrors the REST endpoints one method per call:
//!
//! | Method | Endpoint |
//! |--------|----------|
//! | `list_entries` | `GET /journal-entries` |
//! | `get_entry` | `GET /journal-entries/{id}` |
//! | `create_entry` | `POST /journal-entries` |
//! | `update_entry` | `PUT /journal-entries/{id}` |
//! | `delete_entry` | `DELETE /journal-entries/{id}` |
//! | `post_entry` | `POST /journal-entries/{id}/post` |
//! | `set_draft` | `POST /journal-entries/{id}/set-draft` |
//! | `list_accounts` | `GET /chart-of-accounts` |

use async_trait::async_trait;
use chrono::NaiveDate;
use ledgerdesk_core::accounts::ChartOfAccount;
use ledgerdesk_core::cache::{QueryCache, QueryKey};
use ledgerdesk_core::journal::{EntryStatus, JournalEntry, JournalEntryForm};
use ledgerdesk_shared::AppResult;
use ledgerdesk_shared::types::{JournalEntryId, MAX_PER_PAGE, PageRequest, PageResponse};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Filters for entry listings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryQuery {
    /// Only entries with this status.
    pub status: Option<EntryStatus>,
    /// Case-insensitive match on reference or description.
    pub search: Option<String>,
    /// First entry date included.
    pub from: Option<NaiveDate>,
    /// Last entry date included.
    pub to: Option<NaiveDate>,
    /// Page to fetch.
    pub page: PageRequest,
}

impl EntryQuery {
    /// Query for posted entries only.
    #[must_use]
    pub fn posted() -> Self {
        Self {
            status: Some(EntryStatus::Posted),
            ..Self::default()
        }
    }

    /// Same filters, different page.
    #[must_use]
    pub fn with_page(mut self, page: PageRequest) -> Self {
        self.page = page;
        self
    }

    /// Query string pairs, in a stable order.
    #[must_use]
    pub fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(status) = self.status {
            pairs.push(("status", status.as_str().to_string()));
        }
        if let Some(search) = self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            pairs.push(("search", search.to_string()));
        }
        if let Some(from) = self.from {
            pairs.push(("from", from.to_string()));
        }
        if let Some(to) = self.to {
            pairs.push(("to", to.to_string()));
        }
        pairs.push(("page", self.page.page.to_string()));
        pairs.push(("per_page", self.page.limit().to_string()));
        pairs
    }

    /// Cache key suffix identifying this query.
    #[must_use]
    pub fn cache_params(&self) -> String {
        self.to_pairs()
            .into_iter()
            .map(|(k, v)| format!("{k}={v}"))
            .collect::<Vec<_>>()
            .join("&")
    }

    /// True if `entry` passes the filters (pagination aside).
    #[must_use]
    pub fn matches(&self, entry: &JournalEntry) -> bool {
        if entry.is_deleted() {
            return false;
        }
        if self.status.is_some_and(|s| s != entry.status()) {
            return false;
        }
        if self.from.is_some_and(|from| entry.entry_date() < from)
            || self.to.is_some_and(|to| entry.entry_date() > to)
        {
            return false;
        }
        match self.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            Some(needle) => {
                let needle = needle.to_lowercase();
                entry.reference().to_lowercase().contains(&needle)
                    || entry.description().to_lowercase().contains(&needle)
            }
            None => true,
        }
    }
}

/// Journal entry backend.
///
/// Implementations map backend failures onto [`ledgerdesk_shared::AppError`]:
/// 404 to `NotFound`, 409 to `StaleState` (or `Conflict` for a duplicate
/// reference), 400/422 to `Validation`, anything else to `Transport`.
#[async_trait]
pub trait JournalApi: Send + Sync {
    /// Lists active (non-deleted) entries.
    async fn list_entries(&self, query: &EntryQuery) -> AppResult<PageResponse<JournalEntry>>;

    /// Fetches one entry.
    async fn get_entry(&self, id: JournalEntryId) -> AppResult<JournalEntry>;

    /// Creates a draft from `form`.
    async fn create_entry(&self, form: &JournalEntryForm) -> AppResult<JournalEntry>;

    /// Replaces a draft's content with `form`.
    async fn update_entry(&self, id: JournalEntryId, form: &JournalEntryForm)
    -> AppResult<JournalEntry>;

    /// Soft-deletes a draft.
    async fn delete_entry(&self, id: JournalEntryId) -> AppResult<()>;

    /// Posts a balanced draft.
    async fn post_entry(&self, id: JournalEntryId) -> AppResult<JournalEntry>;

    /// Forces a posted entry back to draft.
    async fn set_draft(&self, id: JournalEntryId, reason: &str) -> AppResult<JournalEntry>;

    /// Lists the tenant's chart of accounts.
    async fn list_accounts(&self) -> AppResult<Vec<ChartOfAccount>>;
}

/// One page of `query`, read through the query cache.
///
/// Pages are stored under [`QueryKey::entry_list`] and dropped by any
/// entry mutation applied to `cache`.
///
/// # Errors
///
/// Backend errors on a cache miss.
pub async fn list_cached<A>(
    api: &A,
    cache: &QueryCache,
    query: &EntryQuery,
) -> AppResult<PageResponse<JournalEntry>>
where
    A: JournalApi + ?Sized,
{
    let key = QueryKey::entry_list(&query.cache_params());
    if let Some(page) = cache.get(&key) {
        return Ok(page);
    }
    let page = api.list_entries(query).await?;
    if let Err(e) = cache.set(key, &page) {
        warn!(error = %e, "Failed to cache journal entry listing");
    }
    Ok(page)
}

/// Fetches every page matching `query`.
///
/// # Errors
///
/// The first error returned by the backend.
pub async fn fetch_all<A>(
    api: &A,
    cache: &QueryCache,
    query: &EntryQuery,
) -> AppResult<Vec<JournalEntry>>
where
    A: JournalApi + ?Sized,
{
    let mut page = PageRequest::new(1, MAX_PER_PAGE);
    let mut entries = Vec::new();
    loop {
        let response = list_cached(api, cache, &query.clone().with_page(page)).await?;
        let has_next = response.has_next();
        entries.extend(response.data);
        if !has_next {
            return Ok(entries);
        }
        page = PageRequest::new(page.page + 1, MAX_PER_PAGE);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerdesk_core::journal::EntryType;

    fn date(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 5, day).unwrap()
    }

    fn entry(reference: &str, description: &str) -> JournalEntry {
        let mut entry = JournalEntry::new_draft(date(10));
        entry.set_reference(reference).unwrap();
        entry.set_description(description).unwrap();
        entry.set_entry_type(EntryType::Expense).unwrap();
        entry
    }

    #[test]
    fn test_query_pairs() {
        let query = EntryQuery {
            status: Some(EntryStatus::Draft),
            search: Some("  rent ".to_string()),
            from: Some(date(1)),
            to: None,
            page: PageRequest::new(2, 50),
        };
        assert_eq!(
            query.to_pairs(),
            vec![
                ("status", "draft".to_string()),
                ("search", "rent".to_string()),
                ("from", "2026-05-01".to_string()),
                ("page", "2".to_string()),
                ("per_page", "50".to_string()),
            ]
        );
        assert_eq!(
            query.cache_params(),
            "status=draft&search=rent&from=2026-05-01&page=2&per_page=50"
        );
    }

    #[test]
    fn test_matches_search_and_dates() {
        let e = entry("JE-000010", "Office Rent May");
        let mut query = EntryQuery {
            search: Some("rent".to_string()),
            ..EntryQuery::default()
        };
        assert!(query.matches(&e));
        query.from = Some(date(11));
        assert!(!query.matches(&e));
        query.from = None;
        query.search = Some("je-0000".to_string());
        assert!(query.matches(&e));
        assert!(!EntryQuery::posted().matches(&e));
    }
}
