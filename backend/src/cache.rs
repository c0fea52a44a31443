//! Request de-duplication and short-TTL caching for read endpoints
//!
//! Several dashboard widgets ask for the same aggregates at the same time.
//! `FetchCache` gives each logical query a string key (keys embed the
//! business id, e.g. `low-stock-{business_id}`) and guarantees:
//!
//! - one underlying fetch per key at a time; concurrent callers share it
//! - a completed fetch throttles further fetches for `min_fetch_interval`
//! - values older than `ttl` are refetched on the next call
//! - a failed or timed-out fetch falls back to the stale value, or to
//!   `T::default()` when nothing was ever cached
//!
//! Instances are owned by `AppState` and passed to services explicitly, so
//! tests construct isolated caches and drive the clock with
//! `tokio::time::pause()`.

use std::collections::HashMap;
use std::future::Future;
use std::time::Duration;

use tokio::sync::{broadcast, Mutex};
use tokio::time::Instant;

use crate::error::AppError;

/// Tuning knobs for a [`FetchCache`]
#[derive(Debug, Clone, Copy)]
pub struct CachePolicy {
    /// Age after which a cached value is refetched
    pub ttl: Duration,
    /// Completed-fetch age under which no new fetch is issued, even past TTL
    pub min_fetch_interval: Duration,
    /// Budget for one underlying fetch; exceeding it counts as failure
    pub fetch_timeout: Duration,
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(30),
            min_fetch_interval: Duration::from_secs(3),
            fetch_timeout: Duration::from_secs(5),
        }
    }
}

struct Slot<T> {
    value: Option<(T, Instant)>,
    in_flight: Option<broadcast::Sender<Option<T>>>,
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Self {
            value: None,
            in_flight: None,
        }
    }
}

/// Keyed single-flight cache with throttle, TTL, and stale fallback
pub struct FetchCache<T> {
    policy: CachePolicy,
    slots: Mutex<HashMap<String, Slot<T>>>,
}

impl<T: Clone + Default + Send + 'static> FetchCache<T> {
    pub fn new(policy: CachePolicy) -> Self {
        Self {
            policy,
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Look up `key`, fetching through `fetch` when the entry is missing or
    /// expired. Never fails: errors and timeouts degrade to the stale value
    /// or `T::default()`.
    pub async fn get_or_fetch<F, Fut>(&self, key: &str, fetch: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let mut rx = {
            let mut slots = self.slots.lock().await;
            let slot = slots.entry(key.to_string()).or_default();

            let waiter = slot.in_flight.as_ref().map(|tx| tx.subscribe());
            match waiter {
                Some(rx) => rx,
                None => {
                    if let Some((value, fetched_at)) = &slot.value {
                        let age = fetched_at.elapsed();
                        if age < self.policy.min_fetch_interval || age < self.policy.ttl {
                            return value.clone();
                        }
                    }
                    let (tx, _) = broadcast::channel(1);
                    slot.in_flight = Some(tx);
                    drop(slots);
                    return self.run_fetch(key, fetch).await;
                }
            }
        };

        match rx.recv().await {
            Ok(Some(value)) => value,
            // The fetch failed (or the sender vanished): stale-or-default.
            _ => self.stale_or_default(key).await,
        }
    }

    /// Drop the cached value for `key`; the next call fetches fresh.
    /// Used after writes that invalidate a derived view.
    pub async fn invalidate(&self, key: &str) {
        let mut slots = self.slots.lock().await;
        if let Some(slot) = slots.get_mut(key) {
            slot.value = None;
        }
    }

    async fn run_fetch<F, Fut>(&self, key: &str, fetch: F) -> T
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, AppError>>,
    {
        let outcome = tokio::time::timeout(self.policy.fetch_timeout, fetch()).await;

        // Waiters subscribe under this lock, so clearing in_flight and
        // sending the outcome under it means none of them miss the message.
        let mut slots = self.slots.lock().await;
        let slot = slots.entry(key.to_string()).or_default();
        let tx = slot.in_flight.take();

        match outcome {
            Ok(Ok(value)) => {
                slot.value = Some((value.clone(), Instant::now()));
                if let Some(tx) = tx {
                    let _ = tx.send(Some(value.clone()));
                }
                value
            }
            Ok(Err(err)) => {
                tracing::warn!(key, error = %err, "fetch failed, serving cached value");
                if let Some(tx) = tx {
                    let _ = tx.send(None);
                }
                Self::slot_value_or_default(slot)
            }
            Err(_) => {
                tracing::warn!(
                    key,
                    timeout_ms = self.policy.fetch_timeout.as_millis() as u64,
                    "fetch timed out, serving cached value"
                );
                if let Some(tx) = tx {
                    let _ = tx.send(None);
                }
                Self::slot_value_or_default(slot)
            }
        }
    }

    async fn stale_or_default(&self, key: &str) -> T {
        let slots = self.slots.lock().await;
        slots
            .get(key)
            .and_then(|slot| slot.value.as_ref().map(|(value, _)| value.clone()))
            .unwrap_or_default()
    }

    fn slot_value_or_default(slot: &Slot<T>) -> T {
        slot.value
            .as_ref()
            .map(|(value, _)| value.clone())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::time::{advance, sleep};

    fn counting_policy() -> CachePolicy {
        CachePolicy::default()
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_calls_share_one_fetch() {
        let cache: FetchCache<i32> = FetchCache::new(counting_policy());
        let fetches = AtomicUsize::new(0);

        let fetch = || async {
            fetches.fetch_add(1, Ordering::SeqCst);
            sleep(Duration::from_millis(100)).await;
            Ok(42)
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch("k", fetch),
            cache.get_or_fetch("k", || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                sleep(Duration::from_millis(100)).await;
                Ok(42)
            })
        );

        assert_eq!(a, 42);
        assert_eq!(b, 42);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn throttle_returns_cached_without_new_fetch() {
        // TTL of zero isolates the throttle: without it every call would
        // refetch immediately.
        let cache: FetchCache<i32> = FetchCache::new(CachePolicy {
            ttl: Duration::ZERO,
            min_fetch_interval: Duration::from_secs(3),
            fetch_timeout: Duration::from_secs(5),
        });
        let fetches = AtomicUsize::new(0);

        let first = cache
            .get_or_fetch("k", || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            })
            .await;
        assert_eq!(first, 1);

        advance(Duration::from_secs(1)).await;
        let second = cache
            .get_or_fetch("k", || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(2)
            })
            .await;
        // Inside the throttle window the old value comes back untouched.
        assert_eq!(second, 1);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        advance(Duration::from_secs(3)).await;
        let third = cache
            .get_or_fetch("k", || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(3)
            })
            .await;
        assert_eq!(third, 3);
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn ttl_expiry_triggers_refetch() {
        let cache: FetchCache<i32> = FetchCache::new(counting_policy());
        let fetches = AtomicUsize::new(0);

        cache
            .get_or_fetch("k", || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            })
            .await;

        advance(Duration::from_secs(29)).await;
        let cached = cache
            .get_or_fetch("k", || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(2)
            })
            .await;
        assert_eq!(cached, 1);
        assert_eq!(fetches.load(Ordering::SeqCst), 1);

        advance(Duration::from_secs(2)).await;
        let refreshed = cache
            .get_or_fetch("k", || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(2)
            })
            .await;
        assert_eq!(refreshed, 2);
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_refetch_serves_stale_value() {
        let cache: FetchCache<i32> = FetchCache::new(counting_policy());

        cache.get_or_fetch("k", || async { Ok(7) }).await;
        advance(Duration::from_secs(31)).await;

        let value = cache
            .get_or_fetch("k", || async {
                Err(AppError::Internal("backend unavailable".to_string()))
            })
            .await;
        assert_eq!(value, 7);
    }

    #[tokio::test(start_paused = true)]
    async fn failure_with_empty_cache_returns_default() {
        let cache: FetchCache<Vec<i32>> = FetchCache::new(counting_policy());

        let value = cache
            .get_or_fetch("k", || async {
                Err(AppError::Internal("backend unavailable".to_string()))
            })
            .await;
        assert!(value.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn timeout_counts_as_failure() {
        let cache: FetchCache<i32> = FetchCache::new(counting_policy());

        let value = cache
            .get_or_fetch("k", || async {
                sleep(Duration::from_secs(10)).await;
                Ok(99)
            })
            .await;
        // Nothing was ever cached, so the timeout degrades to the default.
        assert_eq!(value, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn invalidate_forces_fresh_fetch() {
        let cache: FetchCache<i32> = FetchCache::new(counting_policy());
        let fetches = AtomicUsize::new(0);

        cache
            .get_or_fetch("k", || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(1)
            })
            .await;
        cache.invalidate("k").await;

        let value = cache
            .get_or_fetch("k", || async {
                fetches.fetch_add(1, Ordering::SeqCst);
                Ok(2)
            })
            .await;
        assert_eq!(value, 2);
        assert_eq!(fetches.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn waiters_fall_back_when_shared_fetch_fails() {
        let cache: FetchCache<i32> = FetchCache::new(counting_policy());

        // Seed a stale value, then expire it.
        cache.get_or_fetch("k", || async { Ok(5) }).await;
        advance(Duration::from_secs(31)).await;

        let failing = || async {
            sleep(Duration::from_millis(50)).await;
            Err(AppError::Internal("backend unavailable".to_string()))
        };

        let (a, b) = tokio::join!(
            cache.get_or_fetch("k", failing),
            cache.get_or_fetch("k", || async {
                sleep(Duration::from_millis(50)).await;
                Err(AppError::Internal("backend unavailable".to_string()))
            })
        );
        assert_eq!(a, 5);
        assert_eq!(b, 5);
    }
}
