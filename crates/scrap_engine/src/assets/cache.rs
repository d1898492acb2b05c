//! Generic reference-counted resource cache

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

struct CacheEntry<R> {
    resource: Arc<R>,
    ref_count: usize,
}

/// Keyed cache of shared resources with manual reference counts
///
/// All access goes through one mutex, so a cache can be shared between
/// threads even though the engine only touches it from the main loop.
pub struct ResourceCache<K, R> {
    entries: Mutex<HashMap<K, CacheEntry<R>>>,
}

impl<K, R> Default for ResourceCache<K, R> {
    fn default() -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
        }
    }
}

impl<K: Eq + Hash + Clone, R> ResourceCache<K, R> {
    /// Create an empty cache
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<K, CacheEntry<R>>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Get the resource under `key`, creating it with `create` on a miss
    ///
    /// A hit increments the entry's count; a miss inserts with count 1. When
    /// `create` fails nothing is inserted.
    pub fn acquire<E>(&self, key: K, create: impl FnOnce() -> Result<R, E>) -> Result<Arc<R>, E> {
        let mut entries = self.lock();
        if let Some(entry) = entries.get_mut(&key) {
            entry.ref_count += 1;
            return Ok(Arc::clone(&entry.resource));
        }

        let resource = Arc::new(create()?);
        entries.insert(
            key,
            CacheEntry {
                resource: Arc::clone(&resource),
                ref_count: 1,
            },
        );
        Ok(resource)
    }

    /// Lower the count of `key`; returns the new count, `None` when not cached
    pub fn release(&self, key: &K) -> Option<usize> {
        let mut entries = self.lock();
        let entry = entries.get_mut(key)?;
        if entry.ref_count == 0 {
            log::warn!("Resource returned more often than it was acquired");
        }
        entry.ref_count = entry.ref_count.saturating_sub(1);
        Some(entry.ref_count)
    }

    /// Current count of `key`
    pub fn ref_count(&self, key: &K) -> Option<usize> {
        self.lock().get(key).map(|entry| entry.ref_count)
    }

    /// Whether `key` is cached
    pub fn contains(&self, key: &K) -> bool {
        self.lock().contains_key(key)
    }

    /// Remove every zero-count entry and hand it back for freeing
    pub fn release_unused(&self) -> Vec<(K, Arc<R>)> {
        let mut entries = self.lock();
        let unused: Vec<K> = entries
            .iter()
            .filter(|(_, entry)| entry.ref_count == 0)
            .map(|(key, _)| key.clone())
            .collect();

        unused
            .into_iter()
            .filter_map(|key| entries.remove(&key).map(|entry| (key, entry.resource)))
            .collect()
    }

    /// Remove every entry regardless of its count
    pub fn drain(&self) -> Vec<(K, Arc<R>)> {
        self.lock()
            .drain()
            .map(|(key, entry)| (key, entry.resource))
            .collect()
    }

    /// Number of cached entries
    pub fn len(&self) -> usize {
        self.lock().len()
    }

    /// Whether the cache is empty
    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(value: u32) -> impl FnOnce() -> Result<u32, ()> {
        move || Ok(value)
    }

    #[test]
    fn test_hit_reuses_resource_and_counts() {
        let cache = ResourceCache::<&str, u32>::new();
        let a = cache.acquire("a", make(1)).unwrap();
        let b = cache.acquire("a", make(2)).unwrap();

        assert!(Arc::ptr_eq(&a, &b));
        assert_eq!(*b, 1);
        assert_eq!(cache.ref_count(&"a"), Some(2));
    }

    #[test]
    fn test_zero_count_survives_until_sweep() {
        let cache = ResourceCache::<&str, u32>::new();
        cache.acquire("a", make(1)).unwrap();
        cache.acquire("b", make(2)).unwrap();

        assert_eq!(cache.release(&"a"), Some(0));
        assert!(cache.contains(&"a"));

        let freed = cache.release_unused();
        assert_eq!(freed.len(), 1);
        assert_eq!(freed[0].0, "a");
        assert!(!cache.contains(&"a"));
        assert!(cache.contains(&"b"));
    }

    #[test]
    fn test_failed_create_inserts_nothing() {
        let cache = ResourceCache::<&str, u32>::new();
        let result: Result<_, &str> = cache.acquire("a", || Err("boom"));
        assert!(result.is_err());
        assert!(cache.is_empty());
    }

    #[test]
    fn test_release_saturates_at_zero() {
        let cache = ResourceCache::<&str, u32>::new();
        cache.acquire("a", make(1)).unwrap();
        cache.release(&"a");
        assert_eq!(cache.release(&"a"), Some(0));
        assert_eq!(cache.release(&"missing"), None);
    }

    #[test]
    fn test_cache_shared_across_threads() {
        let cache = Arc::new(ResourceCache::<u32, u32>::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let cache = Arc::clone(&cache);
                std::thread::spawn(move || {
                    cache.acquire(7, make(7)).unwrap();
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        assert_eq!(cache.ref_count(&7), Some(4));
    }
}
