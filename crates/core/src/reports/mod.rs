//! Ledger reports over posted journal entries.
//!
//! Only entries that are posted and not deleted contribute. Drafts never
//! reach the ledger, whatever their balance.
//!
//! - General ledger for one account, with opening and running balances
//! - Trial balance across the chart of accounts

pub mod error;
pub mod service;
pub mod types;


pub use error::ReportError;
pub use service::ReportService;
pub use types::*;
