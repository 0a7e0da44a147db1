//! Trait definition and wrappers for metadata lookups.
//!
//! Every enrichment source is a [`MetadataLookup`]: given a human-readable
//! title, make a best-effort attempt to fetch one piece of metadata. Lookups
//! never fail; a timeout, a missing match and a malformed response all come
//! back as `None`.

use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::trace;

use crate::cache::TtlCache;
use crate::config::EnrichmentConfig;

/// Async trait that all metadata lookups implement.
///
/// Implementations wrap a single upstream source and are shared across tasks
/// behind an `Arc`.
#[async_trait]
pub trait MetadataLookup<T>: Send + Sync {
    /// Short, lowercase identifier of the upstream source (e.g. `"jikan"`).
    fn name(&self) -> &'static str;

    /// Fetch the value for `title`, or `None` when it is unknown or the
    /// upstream could not be reached.
    async fn lookup(&self, title: &str) -> Option<T>;
}

/// A lookup that never finds anything.
///
/// Stands in for providers that are disabled in configuration.
#[derive(Debug, Clone, Copy)]
pub struct Absent {
    name: &'static str,
}

impl Absent {
    pub fn new(name: &'static str) -> Self {
        Self { name }
    }
}

#[async_trait]
impl<T> MetadataLookup<T> for Absent
where
    T: Send + 'static,
{
    fn name(&self) -> &'static str {
        self.name
    }

    async fn lookup(&self, _title: &str) -> Option<T> {
        None
    }
}

/// How long per-title lookup results are remembered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MemoPolicy {
    /// Distinct titles remembered.
    pub max_entries: usize,
    /// Lifetime of a found value; `None` keeps it until evicted.
    pub ttl: Option<Duration>,
    /// Lifetime of a miss. Timeouts and upstream errors are misses too, so
    /// this stays short.
    pub miss_ttl: Duration,
}

impl MemoPolicy {
    pub const DEFAULT_MISS_TTL: Duration = Duration::from_secs(300);

    /// Keep hits until evicted and misses for [`Self::DEFAULT_MISS_TTL`].
    pub fn new(max_entries: usize) -> Self {
        Self {
            max_entries,
            ttl: None,
            miss_ttl: Self::DEFAULT_MISS_TTL,
        }
    }

    pub fn from_config(config: &EnrichmentConfig) -> Self {
        Self {
            max_entries: config.memo_max_entries,
            ttl: config.memo_ttl(),
            miss_ttl: config.memo_miss_ttl(),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    pub fn with_miss_ttl(mut self, miss_ttl: Duration) -> Self {
        self.miss_ttl = miss_ttl;
        self
    }

    /// Expiry to store `value` with.
    pub(crate) fn ttl_for<T>(&self, value: &Option<T>) -> Option<Duration> {
        match value {
            Some(_) => self.ttl,
            None => Some(self.ttl.map_or(self.miss_ttl, |ttl| ttl.min(self.miss_ttl))),
        }
    }

    pub(crate) fn cache<K, V>(&self) -> TtlCache<K, V>
    where
        K: Eq + Hash + Clone,
        V: Clone,
    {
        TtlCache::with_ttl(self.ttl, self.max_entries)
    }
}

/// Per-title memoization around another lookup.
///
/// Results are remembered per trimmed, case-folded title. Found values follow
/// the policy TTL (by default they never expire and only the size bound
/// evicts). Absence is remembered only for the short miss TTL, since the
/// inner lookup reports a timeout or a rate limit as absence too.
pub struct Memoized<T> {
    inner: Arc<dyn MetadataLookup<T>>,
    policy: MemoPolicy,
    memo: TtlCache<String, Option<T>>,
}

impl<T> Memoized<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(inner: Arc<dyn MetadataLookup<T>>, policy: MemoPolicy) -> Self {
        Self {
            inner,
            memo: policy.cache(),
            policy,
        }
    }

    /// Number of titles currently remembered.
    pub fn remembered(&self) -> usize {
        self.memo.len()
    }
}

#[async_trait]
impl<T> MetadataLookup<T> for Memoized<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn name(&self) -> &'static str {
        self.inner.name()
    }

    async fn lookup(&self, title: &str) -> Option<T> {
        let key = title.trim().to_lowercase();
        if key.is_empty() {
            return None;
        }
        if let Some(value) = self.memo.get(&key) {
            return value;
        }

        trace!(provider = self.inner.name(), title, "memo miss");
        let value = self.inner.lookup(title).await;
        let ttl = self.policy.ttl_for(&value);
        self.memo.set_with_ttl(key, value.clone(), ttl);
        value
    }
}
