//! In-memory TTL cache.
//!
//! [`TtlCache`] memoizes expensive or rate-limited lookups: primary-source
//! queries and per-title metadata lookups. Entries expire after a fixed TTL
//! (or never, for memo tables) and the store is capped at a fixed number of
//! entries, evicting the oldest insertion first when full.
//!
//! Time is read from [`tokio::time::Instant`] so tests can drive expiry with a
//! paused runtime clock.
//!
//! # Known limitation
//!
//! [`TtlCache::get_or_compute`] has no single-flight: concurrent callers that
//! miss on the same key each run their factory, and the last write wins.
//! Callers that need one upstream call per key store a shared cell through
//! [`TtlCache::get_or_insert_with`] instead.

pub mod key;

pub use key::{ListingKey, ListingKind, SearchKey};

use parking_lot::Mutex;
use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::time::Duration;
use tokio::time::Instant;

/// Entry in the cache.
struct CacheEntry<V> {
    value: V,
    expires_at: Option<Instant>,
    seq: u64,
}

impl<V> CacheEntry<V> {
    fn is_expired(&self, now: Instant) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }
}

struct Store<K, V> {
    entries: HashMap<K, CacheEntry<V>>,
    next_seq: u64,
}

/// Thread-safe key/value cache with per-entry expiry and a size bound.
pub struct TtlCache<K, V> {
    store: Mutex<Store<K, V>>,
    ttl: Option<Duration>,
    max_entries: usize,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Create a cache whose entries expire `ttl` after insertion.
    ///
    /// `max_entries` is clamped to at least 1.
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self::with_ttl(Some(ttl), max_entries)
    }

    /// Create a cache whose entries never expire; only the size bound evicts.
    pub fn without_expiry(max_entries: usize) -> Self {
        Self::with_ttl(None, max_entries)
    }

    /// Create a cache with an optional TTL.
    pub fn with_ttl(ttl: Option<Duration>, max_entries: usize) -> Self {
        Self {
            store: Mutex::new(Store {
                entries: HashMap::new(),
                next_seq: 0,
            }),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    /// Get a fresh value, evicting the entry if it has expired.
    pub fn get(&self, key: &K) -> Option<V> {
        let now = Instant::now();
        let mut store = self.store.lock();
        match store.entries.get(key) {
            Some(entry) if !entry.is_expired(now) => Some(entry.value.clone()),
            Some(_) => {
                store.entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or overwrite a value.
    ///
    /// Expired entries are purged first. If the store is still full, the
    /// oldest insertions are evicted until the new key fits.
    pub fn set(&self, key: K, value: V) {
        self.set_with_ttl(key, value, self.ttl);
    }

    /// Insert or overwrite a value with its own TTL instead of the cache's.
    ///
    /// `None` means the entry never expires.
    pub fn set_with_ttl(&self, key: K, value: V, ttl: Option<Duration>) {
        let now = Instant::now();
        let mut store = self.store.lock();
        Self::insert_locked(&mut store, self.max_entries, now, key, value, ttl);
    }

    /// Return the fresh value for `key`, or insert the one built by `make`.
    ///
    /// The check and the insert happen under one lock, so concurrent callers
    /// all observe the same value. `make` must not touch the cache.
    pub fn get_or_insert_with<F>(&self, key: K, make: F) -> V
    where
        F: FnOnce() -> V,
    {
        let now = Instant::now();
        let mut store = self.store.lock();
        if let Some(entry) = store.entries.get(&key) {
            if !entry.is_expired(now) {
                return entry.value.clone();
            }
        }
        let value = make();
        Self::insert_locked(
            &mut store,
            self.max_entries,
            now,
            key,
            value.clone(),
            self.ttl,
        );
        value
    }

    fn insert_locked(
        store: &mut Store<K, V>,
        max_entries: usize,
        now: Instant,
        key: K,
        value: V,
        ttl: Option<Duration>,
    ) {
        let expires_at = ttl.and_then(|ttl| now.checked_add(ttl));
        store.entries.retain(|_, entry| !entry.is_expired(now));

        if !store.entries.contains_key(&key) {
            while store.entries.len() >= max_entries {
                let oldest = store
                    .entries
                    .iter()
                    .min_by_key(|(_, entry)| entry.seq)
                    .map(|(k, _)| k.clone());
                match oldest {
                    Some(k) => {
                        store.entries.remove(&k);
                    }
                    None => break,
                }
            }
        }

        let seq = store.next_seq;
        store.next_seq += 1;
        store.entries.insert(
            key,
            CacheEntry {
                value,
                expires_at,
                seq,
            },
        );
    }

    /// Return the cached value or compute, store and return a new one.
    ///
    /// `factory` runs without the cache lock held. Concurrent misses on the
    /// same key may each run their factory.
    pub async fn get_or_compute<F, Fut>(&self, key: K, factory: F) -> V
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = V>,
    {
        if let Some(value) = self.get(&key) {
            return value;
        }
        let value = factory().await;
        self.set(key, value.clone());
        value
    }

    /// Like [`get_or_compute`](Self::get_or_compute) for fallible factories.
    ///
    /// Errors are returned to the caller and never cached.
    pub async fn try_get_or_compute<F, Fut, E>(&self, key: K, factory: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key) {
            return Ok(value);
        }
        let value = factory().await?;
        self.set(key, value.clone());
        Ok(value)
    }

    /// Remove an entry from the cache.
    pub fn remove(&self, key: &K) {
        self.store.lock().entries.remove(key);
    }

    /// Clear all entries.
    pub fn clear(&self) {
        self.store.lock().entries.clear();
    }

    /// Remove expired entries.
    pub fn purge_expired(&self) {
        let now = Instant::now();
        self.store
            .lock()
            .entries
            .retain(|_, entry| !entry.is_expired(now));
    }

    /// Number of stored entries, including expired ones not yet purged.
    pub fn len(&self) -> usize {
        self.store.lock().entries.len()
    }

    /// Check if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Configured size bound.
    pub fn max_entries(&self) -> usize {
        self.max_entries
    }

    /// Configured TTL, `None` when entries never expire.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl
    }
}
