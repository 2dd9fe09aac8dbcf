//! Chart of accounts and hierarchical selection.
//!
//! - Account types and their normal balance side
//! - The tenant's chart of accounts as loaded from the backend
//! - Generic parent/child hierarchies for cascading selects

pub mod chart;
pub mod error;
pub mod hierarchy;

pub use chart::{AccountType, ChartOfAccount, ChartOfAccounts};
pub use error::AccountError;
pub use hierarchy::{CascadeSelection, Hierarchy};
