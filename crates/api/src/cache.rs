//! Dashboard read-cache (§5 "read-mostly structure protected by a
//! reader-writer lock, 5-second TTL"). Grounded on `controller::tasks`'s
//! `tokio::sync::RwLock` pattern: reads take the shared lock and only
//! escalate to the write lock on a miss or expiry.

use std::collections::HashMap;
use std::hash::Hash;
use std::time::{Duration, Instant};

use tokio::sync::RwLock;

struct Entry<V> {
    value: V,
    inserted_at: Instant,
}

pub struct TtlCache<K, V> {
    ttl: Duration,
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K: Eq + Hash + Clone, V: Clone> TtlCache<K, V> {
    #[must_use]
    pub fn new(ttl: Duration) -> Self {
        Self { ttl, entries: RwLock::new(HashMap::new()) }
    }

    pub async fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().await;
        let entry = entries.get(key)?;
        if entry.inserted_at.elapsed() < self.ttl {
            Some(entry.value.clone())
        } else {
            None
        }
    }

    pub async fn insert(&self, key: K, value: V) {
        let mut entries = self.entries.write().await;
        entries.insert(key, Entry { value, inserted_at: Instant::now() });
    }

    /// Returns the cached value if fresh, otherwise computes it via
    /// `compute`, stores it, and returns it. `compute` may fail; failures
    /// are not cached.
    pub async fn get_or_compute<F, Fut, E>(&self, key: K, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: std::future::Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(&key).await {
            return Ok(value);
        }
        let value = compute().await?;
        self.insert(key, value.clone()).await;
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn fresh_entry_is_returned_from_cache() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(5));
        cache.insert("a", 1).await;
        assert_eq!(cache.get(&"a").await, Some(1));
    }

    #[tokio::test]
    async fn expired_entry_is_treated_as_a_miss() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_millis(10));
        cache.insert("a", 1).await;
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(cache.get(&"a").await, None);
    }

    #[tokio::test]
    async fn get_or_compute_only_computes_once_per_ttl() {
        let cache: TtlCache<&str, u32> = TtlCache::new(Duration::from_secs(5));
        let calls = std::sync::atomic::AtomicUsize::new(0);

        for _ in 0..3 {
            let result: Result<u32, std::convert::Infallible> = cache
                .get_or_compute("a", || async {
                    calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
                    Ok(42)
                })
                .await;
            assert_eq!(result.unwrap(), 42);
        }
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }
}
