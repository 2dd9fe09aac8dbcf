//! Client-side query cache.
//!
//! Results of backend reads are cached under string keys with a TTL. Every
//! write declares the keys it makes stale through [`Mutation`], and the
//! cache notifies subscribers of each change so views can refetch.

pub mod keys;
pub mod query;

pub use keys::{Invalidation, Mutation, QueryKey};
pub use query::{CacheEvent, QueryCache, SubscriptionId};
