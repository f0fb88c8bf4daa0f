//! Generic cache with TTL (Time-To-Live) and per-key single-flight.
//!
//! Values are stored with an expiry on the monotonic clock and are never
//! returned once expired. [`TtlCache::get_or_compute`] only stores
//! successful results, and lets one caller per key compute while the others
//! wait for its result.

use std::collections::HashMap;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::{Mutex as AsyncMutex, RwLock};
use tokio::time::Instant;
use tracing::{debug, trace};

/// Longest time an entry is kept; longer TTLs are clamped to it.
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Cache entry holding a value and its expiry.
#[derive(Debug, Clone)]
pub struct CacheEntry<V> {
    pub value: V,
    expires_at: Instant,
}

impl<V> CacheEntry<V> {
    pub fn new(value: V, ttl: Duration) -> Self {
        let now = Instant::now();
        Self {
            value,
            expires_at: now.checked_add(ttl.min(MAX_TTL)).unwrap_or(now),
        }
    }

    /// Returns true if the entry has expired.
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Returns the time until expiration.
    pub fn time_until_expiry(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

type Guard = Arc<AsyncMutex<()>>;

/// Key-value cache with per-entry TTL.
#[derive(Debug)]
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, CacheEntry<V>>>,
    /// One guard per key with a compute in progress.
    in_flight: Mutex<HashMap<String, Guard>>,
}

impl<V> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            in_flight: Mutex::new(HashMap::new()),
        }
    }

    /// Stores `value` under `key` for `ttl`, replacing any previous entry.
    pub async fn put(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let key = key.into();
        debug!(key = %key, ttl_secs = ttl.as_secs(), "stored cache entry");
        self.entries
            .write()
            .await
            .insert(key, CacheEntry::new(value, ttl));
    }

    /// Removes a cache entry, returning its value even if it had expired.
    pub async fn remove(&self, key: &str) -> Option<V> {
        let entry = self.entries.write().await.remove(key);
        if entry.is_some() {
            debug!(key = %key, "removed cache entry");
        }
        entry.map(|e| e.value)
    }

    /// Clears all cache entries.
    pub async fn clear(&self) {
        let mut entries = self.entries.write().await;
        let count = entries.len();
        entries.clear();
        debug!(count, "cleared cache");
    }

    /// Removes all expired entries.
    pub async fn evict_expired(&self) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|key, entry| {
            let keep = !entry.is_expired();
            if !keep {
                trace!(key = %key, "evicting expired cache entry");
            }
            keep
        });
        let evicted = before - entries.len();
        if evicted > 0 {
            debug!(evicted, "evicted expired cache entries");
        }
        evicted
    }

    /// Number of stored entries, expired ones included until evicted.
    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Time left before `key` expires, if it holds a live entry.
    pub async fn time_until_expiry(&self, key: &str) -> Option<Duration> {
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(CacheEntry::time_until_expiry)
    }

    fn guard_for(&self, key: &str) -> Guard {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(in_flight.entry(key.to_string()).or_default())
    }

    /// Drops the side-table entry once nobody else holds or waits on it.
    fn release_guard(&self, key: &str, guard: &Guard) {
        let mut in_flight = self.in_flight.lock().unwrap_or_else(PoisonError::into_inner);
        // One reference in the table, one held by the caller.
        if Arc::strong_count(guard) <= 2 {
            in_flight.remove(key);
        }
    }
}

impl<V: Clone> TtlCache<V> {
    /// Returns a clone of the value under `key` if it has not expired.
    pub async fn get(&self, key: &str) -> Option<V> {
        self.entries
            .read()
            .await
            .get(key)
            .filter(|entry| !entry.is_expired())
            .map(|entry| entry.value.clone())
    }

    /// Returns the live value under `key`, or runs `compute` and stores its
    /// result for `ttl`.
    ///
    /// Errors are returned to the caller and nothing is stored. Concurrent
    /// callers for the same key wait for the first one; if it failed, the
    /// next waiter computes again.
    pub async fn get_or_compute<F, Fut, E>(&self, key: &str, ttl: Duration, compute: F) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key).await {
            trace!(key = %key, "cache hit");
            return Ok(value);
        }

        let guard = self.guard_for(key);
        let held = guard.lock().await;

        // Another caller may have filled the entry while we waited.
        if let Some(value) = self.get(key).await {
            trace!(key = %key, "cache filled while waiting");
            drop(held);
            self.release_guard(key, &guard);
            return Ok(value);
        }

        debug!(key = %key, "cache miss");
        let result = compute().await;
        match result {
            Ok(ref value) => self.put(key, value.clone(), ttl).await,
            Err(_) => debug!(key = %key, "compute failed; nothing cached"),
        }

        drop(held);
        self.release_guard(key, &guard);
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const MINUTE: Duration = Duration::from_secs(60);

    #[tokio::test(start_paused = true)]
    async fn put_and_get() {
        let cache = TtlCache::new();
        cache.put("a", 1, MINUTE).await;

        assert_eq!(cache.get("a").await, Some(1));
        assert_eq!(cache.get("b").await, None);
        assert_eq!(cache.len().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn expired_entries_are_never_returned() {
        let cache = TtlCache::new();
        cache.put("a", "v", MINUTE).await;

        tokio::time::advance(Duration::from_secs(59)).await;
        assert_eq!(cache.get("a").await, Some("v"));
        assert_eq!(cache.time_until_expiry("a").await, Some(Duration::from_secs(1)));

        tokio::time::advance(Duration::from_secs(1)).await;
        assert_eq!(cache.get("a").await, None);
        assert_eq!(cache.time_until_expiry("a").await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_ttl_is_clamped() {
        let cache = TtlCache::new();
        cache.put("a", 1, Duration::MAX).await;

        assert_eq!(cache.get("a").await, Some(1));
        assert_eq!(cache.time_until_expiry("a").await, Some(MAX_TTL));
    }

    #[tokio::test(start_paused = true)]
    async fn evict_expired() {
        let cache = TtlCache::new();
        cache.put("short", 1, Duration::from_secs(10)).await;
        cache.put("long", 2, MINUTE).await;

        tokio::time::advance(Duration::from_secs(30)).await;
        assert_eq!(cache.len().await, 2);
        assert_eq!(cache.evict_expired().await, 1);
        assert_eq!(cache.len().await, 1);
        assert_eq!(cache.get("long").await, Some(2));
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let cache = TtlCache::new();
        cache.put("a", 1, MINUTE).await;
        cache.put("b", 2, MINUTE).await;

        assert_eq!(cache.remove("a").await, Some(1));
        assert_eq!(cache.remove("a").await, None);
        cache.clear().await;
        assert!(cache.is_empty().await);
    }

    mod get_or_compute {
        use super::*;

        #[tokio::test(start_paused = true)]
        async fn hit_skips_compute() {
            let cache = TtlCache::new();
            cache.put("k", 7, MINUTE).await;

            let value: Result<i32, ()> = cache
                .get_or_compute("k", MINUTE, || async { panic!("should not compute") })
                .await;
            assert_eq!(value, Ok(7));
        }

        #[tokio::test(start_paused = true)]
        async fn miss_stores_result() {
            let cache = TtlCache::new();
            let value: Result<i32, ()> = cache.get_or_compute("k", MINUTE, || async { Ok(3) }).await;

            assert_eq!(value, Ok(3));
            assert_eq!(cache.get("k").await, Some(3));
        }

        #[tokio::test(start_paused = true)]
        async fn failure_is_not_cached() {
            let cache: TtlCache<i32> = TtlCache::new();
            let counter = AtomicUsize::new(0);
            let calls = &counter;

            for _ in 0..2 {
                let result: Result<i32, &str> = cache
                    .get_or_compute("k", MINUTE, move || async move {
                        calls.fetch_add(1, Ordering::SeqCst);
                        Err("offline")
                    })
                    .await;
                assert_eq!(result, Err("offline"));
                assert!(cache.is_empty().await);
            }
            assert_eq!(counter.load(Ordering::SeqCst), 2);
        }

        #[tokio::test(start_paused = true)]
        async fn recomputes_after_expiry() {
            let cache = TtlCache::new();
            let counter = AtomicUsize::new(0);
            let calls = &counter;
            let compute = move || async move { Ok::<_, ()>(calls.fetch_add(1, Ordering::SeqCst)) };

            assert_eq!(cache.get_or_compute("k", MINUTE, compute).await, Ok(0));
            assert_eq!(cache.get_or_compute("k", MINUTE, compute).await, Ok(0));

            tokio::time::advance(MINUTE).await;
            assert_eq!(cache.get_or_compute("k", MINUTE, compute).await, Ok(1));
        }

        #[tokio::test(start_paused = true)]
        async fn concurrent_callers_compute_once() {
            let cache = Arc::new(TtlCache::new());
            let calls = Arc::new(AtomicUsize::new(0));

            let tasks: Vec<_> = (0..8)
                .map(|_| {
                    let cache = Arc::clone(&cache);
                    let calls = Arc::clone(&calls);
                    tokio::spawn(async move {
                        cache
                            .get_or_compute("k", MINUTE, || async move {
                                calls.fetch_add(1, Ordering::SeqCst);
                                tokio::time::sleep(Duration::from_secs(1)).await;
                                Ok::<_, ()>("payload")
                            })
                            .await
                    })
                })
                .collect();

            for task in tasks {
                assert_eq!(task.await.unwrap(), Ok("payload"));
            }
            assert_eq!(calls.load(Ordering::SeqCst), 1);
            assert!(cache.in_flight.lock().unwrap().is_empty());
        }

        #[tokio::test(start_paused = true)]
        async fn waiter_retries_after_failed_compute() {
            let cache = Arc::new(TtlCache::new());
            let calls = Arc::new(AtomicUsize::new(0));

            let run = |fail: bool| {
                let cache = Arc::clone(&cache);
                let calls = Arc::clone(&calls);
                async move {
                    if !fail {
                        // Arrive while the failing compute is in progress.
                        tokio::time::sleep(Duration::from_millis(10)).await;
                    }
                    cache
                        .get_or_compute("k", MINUTE, || async move {
                            calls.fetch_add(1, Ordering::SeqCst);
                            tokio::time::sleep(Duration::from_secs(1)).await;
                            if fail { Err("boom") } else { Ok(42) }
                        })
                        .await
                }
            };

            let (first, second) = tokio::join!(run(true), run(false));
            assert_eq!(first, Err("boom"));
            assert_eq!(second, Ok(42));
            assert_eq!(calls.load(Ordering::SeqCst), 2);
            assert_eq!(cache.get("k").await, Some(42));
        }

        #[tokio::test(start_paused = true)]
        async fn different_keys_do_not_block() {
            let cache = Arc::new(TtlCache::new());
            let slow = {
                let cache = Arc::clone(&cache);
                async move {
                    cache
                        .get_or_compute("slow", MINUTE, || async {
                            tokio::time::sleep(Duration::from_secs(30)).await;
                            Ok::<_, ()>(1)
                        })
                        .await
                }
            };
            let fast = {
                let cache = Arc::clone(&cache);
                async move {
                    let started = Instant::now();
                    let value = cache
                        .get_or_compute("fast", MINUTE, || async { Ok::<_, ()>(2) })
                        .await;
                    (value, started.elapsed())
                }
            };

            let (slow, (fast, elapsed)) = tokio::join!(slow, fast);
            assert_eq!(slow, Ok(1));
            assert_eq!(fast, Ok(2));
            assert!(elapsed < Duration::from_secs(1));
        }
    }
}
