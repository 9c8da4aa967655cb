//! Bounded memo of recent classifications, keyed by exact message text.

use std::num::NonZeroUsize;
use std::sync::Mutex;

use lru::LruCache;

use super::category::Category;

/// Default number of remembered classifications.
pub const DEFAULT_CACHE_CAPACITY: usize = 1000;

/// Least-recently-used cache of message → category.
///
/// `None` when built with capacity 0, which disables caching. The guard is a
/// plain mutex: no await points happen while it is held.
pub struct CategoryCache {
    inner: Mutex<Option<LruCache<String, Category>>>,
}

impl CategoryCache {
    pub fn new(capacity: usize) -> Self {
        Self {
            inner: Mutex::new(NonZeroUsize::new(capacity).map(LruCache::new)),
        }
    }

    /// Look up a message, marking it recently used.
    pub fn get(&self, message: &str) -> Option<Category> {
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        inner.as_mut()?.get(message).copied()
    }

    /// Remember a classification. `Uncategorized` is never stored.
    pub fn insert(&self, message: &str, category: Category) {
        if category.is_uncategorized() {
            return;
        }
        let mut inner = self.inner.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(cache) = inner.as_mut() {
            cache.put(message.to_string(), category);
        }
    }

    pub fn len(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .as_ref()
            .map_or(0, LruCache::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for CategoryCache {
    fn default() -> Self {
        Self::new(DEFAULT_CACHE_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stores_and_returns_category() {
        let cache = CategoryCache::new(4);
        cache.insert("wrong number", Category::WrongNumber);
        assert_eq!(cache.get("wrong number"), Some(Category::WrongNumber));
        assert_eq!(cache.get("Wrong number"), None);
    }

    #[test]
    fn evicts_least_recently_used() {
        let cache = CategoryCache::new(2);
        cache.insert("a", Category::New);
        cache.insert("b", Category::Spanish);
        // Touch "a" so "b" becomes the eviction candidate.
        assert!(cache.get("a").is_some());
        cache.insert("c", Category::LandLoan);

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("a"), Some(Category::New));
        assert_eq!(cache.get("b"), None);
        assert_eq!(cache.get("c"), Some(Category::LandLoan));
    }

    #[test]
    fn reinsert_updates_without_growing() {
        let cache = CategoryCache::new(2);
        cache.insert("a", Category::New);
        cache.insert("a", Category::HoldingOff);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a"), Some(Category::HoldingOff));
    }

    #[test]
    fn never_stores_uncategorized() {
        let cache = CategoryCache::new(2);
        cache.insert("??", Category::Uncategorized);
        assert!(cache.is_empty());
    }

    #[test]
    fn full_cache_keeps_exactly_capacity_entries() {
        let cache = CategoryCache::new(DEFAULT_CACHE_CAPACITY);
        for i in 0..DEFAULT_CACHE_CAPACITY + 5 {
            cache.insert(&format!("message {i}"), Category::New);
        }
        assert_eq!(cache.len(), DEFAULT_CACHE_CAPACITY);
        assert_eq!(cache.get("message 0"), None);
        assert_eq!(cache.get("message 4"), None);
        assert_eq!(cache.get("message 5"), Some(Category::New));
    }

    #[test]
    fn zero_capacity_disables_cache() {
        let cache = CategoryCache::new(0);
        cache.insert("a", Category::New);
        assert!(cache.is_empty());
        assert_eq!(cache.get("a"), None);
    }
}
