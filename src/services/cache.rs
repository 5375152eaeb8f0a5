// src/services/cache.rs
use log::debug;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;

struct CacheEntry<V> {
    value: V,
    expires_at: Instant,
}

/// String-keyed cache with per-entry TTL. Expired entries read as absent and
/// are dropped on access; there is no background sweep. Instances are shared
/// via `AppState`, one per server process.
#[derive(Clone)]
pub struct TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    inner: Arc<Mutex<HashMap<String, CacheEntry<V>>>>,
}

impl<V> TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub async fn get(&self, key: &str) -> Option<V> {
        let mut cache = self.inner.lock().await;
        match cache.get(key) {
            Some(entry) if entry.expires_at > Instant::now() => {
                debug!("Cache HIT: {}", key);
                Some(entry.value.clone())
            }
            Some(_) => {
                debug!("Cache EXPIRED: {}", key);
                cache.remove(key);
                None
            }
            None => {
                debug!("Cache MISS: {}", key);
                None
            }
        }
    }

    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let mut cache = self.inner.lock().await;
        cache.insert(
            key.into(),
            CacheEntry {
                value,
                expires_at: Instant::now() + ttl,
            },
        );
    }
}

impl<V> Default for TtlCache<V>
where
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn get_returns_value_before_expiry() {
        let cache = TtlCache::<i32>::new();
        assert!(cache.get("rates").await.is_none());

        cache.set("rates", 42, Duration::from_secs(60)).await;
        assert_eq!(cache.get("rates").await, Some(42));
        // Unexpired reads are repeatable
        assert_eq!(cache.get("rates").await, Some(42));
    }

    #[tokio::test]
    async fn expired_entry_reads_as_absent() {
        let cache = TtlCache::<&'static str>::new();
        cache.set("rates", "9.02", Duration::from_millis(20)).await;
        assert_eq!(cache.get("rates").await, Some("9.02"));

        tokio::time::sleep(Duration::from_millis(40)).await;
        assert!(cache.get("rates").await.is_none());
    }

    #[tokio::test]
    async fn keys_are_independent() {
        let cache = TtlCache::<i32>::new();
        cache.set("a", 1, Duration::from_secs(60)).await;
        cache.set("b", 2, Duration::from_secs(60)).await;
        assert_eq!(cache.get("a").await, Some(1));
        assert_eq!(cache.get("b").await, Some(2));
        assert!(cache.get("c").await.is_none());
    }
}
