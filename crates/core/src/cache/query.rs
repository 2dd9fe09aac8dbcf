//! Query result cache using Moka.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use dashmap::DashMap;
use moka::sync::Cache;
use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use super::keys::{Invalidation, Mutation};

/// Default cache capacity (number of entries).
const DEFAULT_CACHE_CAPACITY: u64 = 500;

/// Default time-to-live for cache entries (5 minutes).
const DEFAULT_TTL_SECS: u64 = 300;

/// Handle returned by [`QueryCache::subscribe`].
pub type SubscriptionId = u64;

/// Change notification delivered to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheEvent {
    /// A value was stored.
    Set(String),
    /// A single key was dropped.
    Invalidated(String),
    /// Every key under a prefix was dropped.
    InvalidatedPrefix(String),
    /// The whole cache was cleared.
    Cleared,
}

type Listener = Arc<dyn Fn(&CacheEvent) + Send + Sync>;

/// Cache of backend query results, stored as JSON.
///
/// Cloning shares the underlying storage and subscriber list.
#[derive(Clone)]
pub struct QueryCache {
    cache: Cache<String, Arc<serde_json::Value>>,
    listeners: Arc<DashMap<SubscriptionId, Listener>>,
    next_id: Arc<AtomicU64>,
}

impl QueryCache {
    /// Creates a cache with default settings: 500 entries, 5 minute TTL.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DEFAULT_CACHE_CAPACITY, DEFAULT_TTL_SECS)
    }

    /// Creates a cache with custom capacity and TTL.
    #[must_use]
    pub fn with_config(max_capacity: u64, ttl_secs: u64) -> Self {
        let cache = Cache::builder()
            .max_capacity(max_capacity)
            .time_to_live(Duration::from_secs(ttl_secs))
            .build();

        Self {
            cache,
            listeners: Arc::new(DashMap::new()),
            next_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Returns the cached value for `key`.
    ///
    /// A value that no longer deserializes into `T` is dropped and treated
    /// as a miss.
    #[must_use]
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let value = self.cache.get(key)?;
        match T::deserialize(value.as_ref()) {
            Ok(typed) => {
                debug!(key, "Query cache hit");
                Some(typed)
            }
            Err(e) => {
                warn!(key, error = %e, "Dropping cached value of unexpected shape");
                self.cache.invalidate(key);
                None
            }
        }
    }

    /// Stores `value` under `key`.
    ///
    /// # Errors
    ///
    /// Returns the serialization error; the cache is unchanged.
    pub fn set<T: Serialize>(
        &self,
        key: impl Into<String>,
        value: &T,
    ) -> Result<(), serde_json::Error> {
        let key = key.into();
        let json = serde_json::to_value(value)?;
        self.cache.insert(key.clone(), Arc::new(json));
        self.notify(&CacheEvent::Set(key));
        Ok(())
    }

    /// True when `key` is cached.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.cache.contains_key(key)
    }

    /// Drops `key`.
    pub fn invalidate(&self, key: &str) {
        self.cache.invalidate(key);
        self.notify(&CacheEvent::Invalidated(key.to_string()));
    }

    /// Drops every key starting with `prefix`.
    pub fn invalidate_prefix(&self, prefix: &str) {
        let stale: Vec<Arc<String>> = self
            .cache
            .iter()
            .filter(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key)
            .collect();
        for key in &stale {
            self.cache.invalidate(key.as_str());
        }
        debug!(prefix, dropped = stale.len(), "Invalidated cache prefix");
        self.notify(&CacheEvent::InvalidatedPrefix(prefix.to_string()));
    }

    /// Drops everything.
    pub fn invalidate_all(&self) {
        self.cache.invalidate_all();
        self.notify(&CacheEvent::Cleared);
    }

    /// Applies the invalidation policy of `mutation`.
    pub fn apply(&self, mutation: &Mutation) {
        debug!(mutation = mutation.name(), "Applying cache invalidation");
        for invalidation in mutation.invalidations() {
            match invalidation {
                Invalidation::Key(key) => self.invalidate(&key),
                Invalidation::Prefix(prefix) => self.invalidate_prefix(&prefix),
            }
        }
    }

    /// Registers `listener` for every subsequent [`CacheEvent`].
    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(&CacheEvent) + Send + Sync + 'static,
    {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.listeners.insert(id, Arc::new(listener));
        id
    }

    /// Removes a listener. Returns false if it was not registered.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.listeners.remove(&id).is_some()
    }

    /// Runs cache maintenance tasks.
    pub fn run_pending_tasks(&self) {
        self.cache.run_pending_tasks();
    }

    fn notify(&self, event: &CacheEvent) {
        // Collect first so a listener may (un)subscribe without deadlocking.
        let listeners: Vec<Listener> = self
            .listeners
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        for listener in listeners {
            listener(event);
        }
    }
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for QueryCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryCache")
            .field("entries", &self.cache.entry_count())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}
