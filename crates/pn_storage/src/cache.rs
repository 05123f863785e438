use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::time::Instant;
use tracing::debug;

pub const DEFAULT_WINDOW: Duration = Duration::from_secs(5 * 60);

struct CacheEntry<V> {
    stored_at: Instant,
    value: V,
}

struct Inner<V> {
    entries: HashMap<String, CacheEntry<V>>,
    /// Bumped by every `clear()`
    generation: u64,
}

impl<V> Inner<V> {
    fn insert(&mut self, key: String, value: V) {
        self.entries.insert(
            key,
            CacheEntry {
                stored_at: Instant::now(),
                value,
            },
        );
    }
}

/// Time-windowed memoization of fetch results.
///
/// An entry is served while `now - stored_at < window`. A stale entry is
/// evicted by the lookup that finds it. `clear()` drops everything and
/// advances the generation so writers that started before the clear can
/// detect it through [`FreshnessCache::store_if_current`].
pub struct FreshnessCache<V> {
    window: Duration,
    inner: Mutex<Inner<V>>,
}

impl<V: Clone> FreshnessCache<V> {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            inner: Mutex::new(Inner {
                entries: HashMap::new(),
                generation: 0,
            }),
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    fn lock(&self) -> MutexGuard<'_, Inner<V>> {
        // The map is always left consistent, a panic elsewhere cannot corrupt it
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn lookup(&self, key: &str) -> Option<V> {
        let mut inner = self.lock();
        let fresh = match inner.entries.get(key) {
            Some(entry) => entry.stored_at.elapsed() < self.window,
            None => return None,
        };
        if fresh {
            return inner.entries.get(key).map(|entry| entry.value.clone());
        }
        inner.entries.remove(key);
        debug!(key, "evicted stale cache entry");
        None
    }

    pub fn store(&self, key: impl Into<String>, value: V) {
        self.lock().insert(key.into(), value);
    }

    /// Store only if no `clear()` happened since `generation` was read.
    /// Returns whether the value was stored.
    pub fn store_if_current(&self, generation: u64, key: impl Into<String>, value: V) -> bool {
        let mut inner = self.lock();
        if inner.generation != generation {
            return false;
        }
        inner.insert(key.into(), value);
        true
    }

    pub fn generation(&self) -> u64 {
        self.lock().generation
    }

    pub fn clear(&self) {
        let mut inner = self.lock();
        inner.entries.clear();
        inner.generation = inner.generation.wrapping_add(1);
    }

    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<V: Clone> Default for FreshnessCache<V> {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;


    #[tokio::test(start_paused = true)]
    async fn test_hit_within_window() {
        let cache = FreshnessCache::new(Duration::from_secs(300));
        cache.store("k", vec![1, 2, 3]);

        advance(Duration::from_secs(299)).await;
        assert_eq!(cache.lookup("k"), Some(vec![1, 2, 3]));
        assert_eq!(cache.lookup("other"), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_stale_entry_is_evicted() {
        let cache = FreshnessCache::new(Duration::from_secs(300));
        cache.store("k", "value".to_string());

        advance(Duration::from_secs(300)).await;
        assert_eq!(cache.lookup("k"), None);
        assert!(cache.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_store_overwrites_and_refreshes() {
        let cache = FreshnessCache::new(Duration::from_secs(10));
        cache.store("k", 1);
        advance(Duration::from_secs(8)).await;
        cache.store("k", 2);
        advance(Duration::from_secs(8)).await;
        assert_eq!(cache.lookup("k"), Some(2));
        assert_eq!(cache.len(), 1);
    }

    #[tokio::test]
    async fn test_clear_drops_everything() {
        let cache = FreshnessCache::default();
        cache.store("a", 1);
        cache.store("b", 2);
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.lookup("a"), None);
    }

    #[tokio::test]
    async fn test_store_if_current_rejects_after_clear() {
        let cache = FreshnessCache::default();
        let generation = cache.generation();
        cache.clear();
        assert!(!cache.store_if_current(generation, "k", 1));
        assert_eq!(cache.lookup("k"), None);

        let generation = cache.generation();
        assert!(cache.store_if_current(generation, "k", 2));
        assert_eq!(cache.lookup("k"), Some(2));

        cache.store("k", 3);
        assert_eq!(cache.generation(), generation);
        assert!(cache.store_if_current(generation, "k", 4));
        assert_eq!(cache.lookup("k"), Some(4));
    }
}
