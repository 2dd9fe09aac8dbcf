//! REST client and editing session for LedgerDesk.
//!
//! - [`JournalApi`] abstracts the backend; [`HttpJournalApi`] talks to the
//!   real one and [`InMemoryJournalApi`] implements the same rules locally.
//! - [`JournalEditor`] drives one entry through save, post, force to draft
//!   and delete, with a pending/success/error submit state.
//! - [`AccountDirectory`] and [`LedgerReports`] serve cached lookups.

pub mod api;
pub mod directory;
pub mod editor;
pub mod http;
pub mod memory;
pub mod reports;
pub mod submit;

pub use api::{EntryQuery, JournalApi, fetch_all, list_cached};
pub use directory::AccountDirectory;
pub use editor::{JournalEditor, Operation};
pub use http::HttpJournalApi;
pub use memory::InMemoryJournalApi;
pub use reports::LedgerReports;
pub use submit::{SubmitError, SubmitGuard, SubmitState, SubmitTracker};
