//! Cache keys and mutation invalidation policy.

use chrono::NaiveDate;
use ledgerdesk_shared::types::{AccountId, JournalEntryId};

/// Builders for cache keys.
pub struct QueryKey;

impl QueryKey {
    /// Prefix shared by every entry listing.
    pub const ENTRY_LISTS: &'static str = "journal-entries:list:";
    /// Prefix shared by every general ledger view.
    pub const LEDGERS: &'static str = "ledger:";
    /// Chart of accounts.
    pub const ACCOUNTS: &'static str = "chart-of-accounts";
    /// Prefix shared by every trial balance.
    pub const TRIAL_BALANCES: &'static str = "trial-balance:";

    /// Key for one page of an entry listing; `params` is the serialized query.
    #[must_use]
    pub fn entry_list(params: &str) -> String {
        format!("{}{params}", Self::ENTRY_LISTS)
    }

    /// Key for a single entry.
    #[must_use]
    pub fn entry(id: JournalEntryId) -> String {
        format!("journal-entry:{id}")
    }

    /// Key for the general ledger of one account; `params` narrows it to a
    /// period.
    #[must_use]
    pub fn ledger(account_id: AccountId, params: &str) -> String {
        format!("{}{account_id}:{params}", Self::LEDGERS)
    }

    /// Key for the trial balance as of a date, or over all entries.
    #[must_use]
    pub fn trial_balance(as_of: Option<NaiveDate>) -> String {
        match as_of {
            Some(date) => format!("{}{date}", Self::TRIAL_BALANCES),
            None => format!("{}all", Self::TRIAL_BALANCES),
        }
    }
}

/// One invalidation instruction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invalidation {
    /// Drop exactly this key.
    Key(String),
    /// Drop every key starting with this prefix.
    Prefix(String),
}

/// A backend write and the cached reads it makes stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    /// New draft created.
    CreateEntry,
    /// Draft content replaced.
    UpdateEntry(JournalEntryId),
    /// Draft soft-deleted.
    DeleteEntry(JournalEntryId),
    /// Draft posted.
    PostEntry(JournalEntryId),
    /// Posted entry forced back to draft.
    SetDraft(JournalEntryId),
}

impl Mutation {
    /// Keys this mutation invalidates.
    ///
    /// Drafts never reach the ledger, so only status changes and deletions
    /// touch ledger views and the trial balance.
    #[must_use]
    pub fn invalidations(&self) -> Vec<Invalidation> {
        let lists = Invalidation::Prefix(QueryKey::ENTRY_LISTS.to_string());
        match *self {
            Self::CreateEntry => vec![lists],
            Self::UpdateEntry(id) => vec![Invalidation::Key(QueryKey::entry(id)), lists],
            Self::DeleteEntry(id) | Self::PostEntry(id) | Self::SetDraft(id) => vec![
                Invalidation::Key(QueryKey::entry(id)),
                lists,
                Invalidation::Prefix(QueryKey::LEDGERS.to_string()),
                Invalidation::Prefix(QueryKey::TRIAL_BALANCES.to_string()),
            ],
        }
    }

    /// Short name for logs.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::CreateEntry => "create_entry",
            Self::UpdateEntry(_) => "update_entry",
            Self::DeleteEntry(_) => "delete_entry",
            Self::PostEntry(_) => "post_entry",
            Self::SetDraft(_) => "set_draft",
        }
    }
}
