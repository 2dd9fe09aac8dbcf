//! Core business logic for LedgerDesk.
//!
//! This crate holds the domain rules with no network dependencies. The
//! REST client and the CLI build on top of it.
//!
//! # Modules
//!
//! - `journal` - Journal entries, balance validation and the posting lifecycle
//! - `accounts` - Chart of accounts and cascading selection
//! - `cache` - Query cache with mutation-driven invalidation
//! - `reports` - General ledger and trial balance over posted entries

pub mod accounts;
pub mod cache;
pub mod journal;
pub mod reports;
