//! Journal entry domain logic.
//!
//! This module implements:
//! - Journal entry lines and the one-side-per-line rule
//! - Debit/credit balance calculation
//! - The Draft/Posted lifecycle and its audited override
//! - Business rule validation for save and post
//! - The typed entry form shared by create and update
//! - Reference number generation

pub mod balance;
pub mod entry;
pub mod error;
pub mod form;
pub mod lifecycle;
pub mod line;
pub mod reference;
pub mod validation;

#[cfg(test)]
mod balance_props;
#[cfg(test)]
mod lifecycle_props;

pub use balance::{BalanceSummary, BalanceValidator};
pub use entry::{EntryStatus, EntryType, JournalEntry, MIN_LINES};
pub use error::JournalError;
pub use form::{JournalEntryForm, LineForm, field_messages};
pub use lifecycle::{EntryLifecycle, LifecycleAction, NO_REASON_GIVEN};
pub use line::{JournalEntryLine, LineSide};
pub use reference::ReferenceGenerator;
pub use validation::{validate_for_post, validate_for_save, validate_lines};
