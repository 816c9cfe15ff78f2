//! Cache eviction across all site caches.

use std::sync::Arc;

use rd_cache::Invalidate;

use crate::error::UnknownCache;

/// Evicts entries from a set of named caches.
///
/// Evicting a single file entry leaves derived caches (listing, tree) as they
/// are; use [`invalidate_all`](Self::invalidate_all) for a consistent reset.
#[derive(Clone, Default)]
pub struct CacheInvalidator {
    caches: Vec<Arc<dyn Invalidate>>,
}

impl CacheInvalidator {
    /// Create an invalidator with no caches.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a cache.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<dyn Invalidate>) -> Self {
        self.caches.push(cache);
        self
    }

    /// Names of the registered caches.
    pub fn cache_names(&self) -> impl Iterator<Item = &str> {
        self.caches.iter().map(|c| c.name())
    }

    /// Clear every registered cache.
    pub fn invalidate_all(&self) {
        for cache in &self.caches {
            cache.clear();
        }
        tracing::info!(caches = self.caches.len(), "all caches cleared");
    }

    /// Remove `key` from the cache named `cache`.
    ///
    /// Returns whether an entry was removed.
    ///
    /// # Errors
    ///
    /// Returns [`UnknownCache`] if no registered cache has that name.
    pub fn invalidate(&self, cache: &str, key: &str) -> Result<bool, UnknownCache> {
        let target = self
            .caches
            .iter()
            .find(|c| c.name() == cache)
            .ok_or_else(|| UnknownCache(cache.to_owned()))?;

        let removed = target.invalidate_key(key);
        tracing::info!(cache, key, removed, "cache key invalidated");
        Ok(removed)
    }
}

impl std::fmt::Debug for CacheInvalidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.cache_names()).finish()
    }
}
