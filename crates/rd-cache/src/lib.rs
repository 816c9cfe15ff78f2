//! Read-through cache layer for RD.
//!
//! This crate provides an in-process key-value store that sits in front of
//! slow or rate-limited loaders (typically remote fetches):
//!
//! - [`Cache`]: Read-through store with per-entry TTL and an optional content stamp
//! - [`StampValidator`]: Pluggable predicate deciding whether a stored stamp still matches
//! - [`Clock`]: Time source used for expiry, swappable in tests
//! - [`Invalidate`]: Object-safe eviction interface for heterogeneous caches
//!
//! # Validity
//!
//! An entry is served only when it is younger than the TTL **and** the
//! validator accepts its stamp. Otherwise the loader runs, and its value
//! replaces the entry. Loader errors are returned as-is and nothing is stored.
//!
//! There is no size bound and no in-flight deduplication: two concurrent
//! misses on the same key both run the loader and the last store wins. The
//! internal lock is only held for map operations, never across a loader.
//!
//! # Example
//!
//! ```
//! use std::convert::Infallible;
//! use rd_cache::Cache;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cache: Cache<String, String> = Cache::new("files");
//!
//! let value = cache
//!     .get("guide.mdx".to_owned(), Some("sha1"), || async {
//!         Ok::<_, Infallible>("# Guide".to_owned())
//!     })
//!     .await
//!     .unwrap();
//! assert_eq!(value, "# Guide");
//! assert_eq!(cache.lookup("guide.mdx", Some("sha1")), Some("# Guide".to_owned()));
//! # }
//! ```

mod clock;
mod validator;

use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::{Duration, Instant};

#[cfg(any(test, feature = "mock"))]
pub use clock::ManualClock;
pub use clock::{Clock, SystemClock};
pub use validator::{ExactStamp, StampValidator};

/// Default time-to-live for cache entries (5 minutes).
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// A stored value with the time it was stored and its content stamp.
///
/// Entries are only ever replaced wholesale, never updated in place.
#[derive(Clone, Debug)]
pub struct CacheEntry<V> {
    /// Cached value.
    pub value: V,
    /// When the value was stored.
    pub stored_at: Instant,
    /// Content identity supplied at store time (e.g., a blob sha).
    pub stamp: Option<String>,
}

/// Eviction interface shared by all caches regardless of value type.
///
/// Lets a single invalidator hold caches of different value types behind
/// `Arc<dyn Invalidate>`.
pub trait Invalidate: Send + Sync {
    /// Cache name used in logs and for addressing single-key eviction.
    fn name(&self) -> &str;

    /// Remove one entry. No-op if the key is absent.
    ///
    /// Returns `true` if an entry was removed.
    fn invalidate_key(&self, key: &str) -> bool;

    /// Remove every entry.
    fn clear(&self);
}

/// In-process read-through cache.
///
/// Cheap to share behind an `Arc`; all methods take `&self`.
pub struct Cache<K, V> {
    name: String,
    ttl: Duration,
    clock: Arc<dyn Clock>,
    validator: Arc<dyn StampValidator>,
    entries: RwLock<HashMap<K, CacheEntry<V>>>,
}

impl<K, V> fmt::Debug for Cache<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("name", &self.name)
            .field("ttl", &self.ttl)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}

impl<K, V> Cache<K, V>
where
    K: Eq + Hash + fmt::Debug,
    V: Clone,
{
    /// Create an empty cache with [`DEFAULT_TTL`], the system clock and
    /// [`ExactStamp`] validation.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ttl: DEFAULT_TTL,
            clock: Arc::new(SystemClock),
            validator: Arc::new(ExactStamp),
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Set the time-to-live. A zero TTL makes every lookup a miss.
    #[must_use]
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Replace the time source.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Replace the stamp validity predicate.
    #[must_use]
    pub fn with_validator(mut self, validator: impl StampValidator + 'static) -> Self {
        self.validator = Arc::new(validator);
        self
    }

    /// Cache name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Configured time-to-live.
    #[must_use]
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Return the cached value if present, fresh, and stamp-valid.
    ///
    /// # Arguments
    ///
    /// * `key` - Cache key
    /// * `stamp` - Expected content stamp (`None` skips stamp validation with [`ExactStamp`])
    pub fn lookup<Q>(&self, key: &Q, stamp: Option<&str>) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Eq + Hash + fmt::Debug + ?Sized,
    {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let Some(entry) = entries.get(key) else {
            tracing::debug!(cache = %self.name, ?key, "cache miss");
            return None;
        };

        let age = self.clock.now().saturating_duration_since(entry.stored_at);
        if age >= self.ttl {
            tracing::debug!(cache = %self.name, ?key, ?age, "cache entry expired");
            return None;
        }

        if !self.validator.is_valid(entry.stamp.as_deref(), stamp) {
            tracing::debug!(
                cache = %self.name,
                ?key,
                stored = ?entry.stamp,
                requested = ?stamp,
                "cache stamp mismatch"
            );
            return None;
        }

        tracing::debug!(cache = %self.name, ?key, "cache hit");
        Some(entry.value.clone())
    }

    /// Store a value, replacing any previous entry for the key.
    pub fn insert(&self, key: K, value: V, stamp: Option<String>) {
        let entry = CacheEntry {
            value,
            stored_at: self.clock.now(),
            stamp,
        };
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, entry);
    }

    /// Read-through lookup.
    ///
    /// Returns the cached value when [`lookup`](Self::lookup) hits. Otherwise
    /// awaits `loader`, stores its value under `key` with the current time and
    /// `stamp`, and returns it. A loader error is returned unchanged and the
    /// cache is left untouched.
    pub async fn get<F, Fut, E>(&self, key: K, stamp: Option<&str>, loader: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.lookup(&key, stamp) {
            return Ok(value);
        }

        let value = loader().await?;
        self.insert(key, value.clone(), stamp.map(str::to_owned));
        Ok(value)
    }

    /// Remove one entry. No-op if absent.
    ///
    /// Returns `true` if an entry was removed.
    pub fn invalidate<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Eq + Hash + fmt::Debug + ?Sized,
    {
        let removed = self
            .entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(key)
            .is_some();
        tracing::debug!(cache = %self.name, ?key, removed, "cache entry invalidated");
        removed
    }

    /// Remove every entry.
    pub fn clear(&self) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let count = entries.len();
        entries.clear();
        tracing::debug!(cache = %self.name, count, "cache cleared");
    }

    /// Number of stored entries, including expired ones not yet replaced.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// True if nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V> Invalidate for Cache<String, V>
where
    V: Clone + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn invalidate_key(&self, key: &str) -> bool {
        self.invalidate(key)
    }

    fn clear(&self) {
        Cache::clear(self);
    }
}
