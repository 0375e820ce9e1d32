//! Single-collection cache slot with stale-on-failure reads

use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, info, warn};

/// A complete collection as produced by one refresh
#[derive(Debug)]
pub struct Snapshot<T> {
    pub data: Arc<T>,
    /// Source that served the refresh
    pub source: String,
    pub fetched_at: DateTime<Utc>,
    pub expires_at: Instant,
}

impl<T> Snapshot<T> {
    pub fn is_expired(&self) -> bool {
        Instant::now() >= self.expires_at
    }

    /// Time left before expiry; zero once expired
    pub fn remaining(&self) -> Duration {
        self.expires_at.saturating_duration_since(Instant::now())
    }
}

/// Longest TTL a slot honours; larger values are clamped
pub const MAX_TTL: Duration = Duration::from_secs(100 * 365 * 24 * 60 * 60);

/// Cache slot for one collection.
///
/// Reads take a short synchronous lock to clone the current snapshot `Arc`.
/// Refreshes are serialized by an async mutex so concurrent callers hitting
/// an expired slot trigger a single upstream round, whether it succeeds or
/// fails.
pub struct CacheSlot<T> {
    name: &'static str,
    ttl: Duration,
    current: RwLock<Option<Arc<Snapshot<T>>>>,
    refresh_lock: Mutex<()>,
    /// Completed refresh attempts; only bumped while holding `refresh_lock`
    attempts: AtomicU64,
}

impl<T: Send + Sync> CacheSlot<T> {
    pub fn new(name: &'static str, ttl: Duration) -> Self {
        if ttl > MAX_TTL {
            warn!("TTL of cache slot {} clamped to {:?}", name, MAX_TTL);
        }
        let ttl = ttl.min(MAX_TTL);
        debug!("Creating cache slot {} (ttl: {:?})", name, ttl);
        Self {
            name,
            ttl,
            current: RwLock::new(None),
            refresh_lock: Mutex::new(()),
            attempts: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Current snapshot, expired or not
    pub fn snapshot(&self) -> Option<Arc<Snapshot<T>>> {
        self.current.read().clone()
    }

    /// Return a fresh snapshot, refreshing through `refresh` when the slot is
    /// empty, expired, or `force_refresh` is set.
    ///
    /// `refresh` yields the new data and the name of the source that served
    /// it, or `None` when nothing could be fetched. On `None` the previous
    /// snapshot is returned unchanged, including its expiry; with no previous
    /// snapshot the result is `None`.
    pub async fn get_or_refresh<F, Fut>(
        &self,
        force_refresh: bool,
        refresh: F,
    ) -> Option<Arc<Snapshot<T>>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Option<(T, String)>>,
    {
        let attempt = self.attempts.load(Ordering::Acquire);
        let observed = self.snapshot();

        if !force_refresh
            && let Some(snapshot) = &observed
            && !snapshot.is_expired()
        {
            metrics::counter!("arc_companion_cache_hits_total", "kind" => self.name).increment(1);
            return observed;
        }

        let _guard = self.refresh_lock.lock().await;

        // Another caller refreshed while we waited; take whatever it left
        let current = self.snapshot();
        if self.attempts.load(Ordering::Acquire) != attempt {
            debug!("Cache slot {} refreshed by a concurrent caller", self.name);
            match &current {
                Some(snapshot) if !snapshot.is_expired() => {
                    metrics::counter!("arc_companion_cache_hits_total", "kind" => self.name)
                        .increment(1);
                }
                Some(_) => {
                    metrics::counter!("arc_companion_stale_serves_total", "kind" => self.name)
                        .increment(1);
                }
                None => {}
            }
            return current;
        }

        metrics::counter!("arc_companion_cache_misses_total", "kind" => self.name).increment(1);
        debug!("Refreshing cache slot {}", self.name);

        let outcome = refresh().await;
        self.attempts.fetch_add(1, Ordering::AcqRel);

        match outcome {
            Some((data, source)) => {
                let snapshot = Arc::new(Snapshot {
                    data: Arc::new(data),
                    source,
                    fetched_at: Utc::now(),
                    expires_at: Instant::now() + self.ttl,
                });
                *self.current.write() = Some(snapshot.clone());
                info!(
                    "Cache slot {} refreshed from {}",
                    self.name, snapshot.source
                );
                Some(snapshot)
            }
            None => {
                metrics::counter!("arc_companion_refresh_failures_total", "kind" => self.name)
                    .increment(1);
                match current {
                    Some(stale) => {
                        metrics::counter!("arc_companion_stale_serves_total", "kind" => self.name)
                            .increment(1);
                        warn!(
                            "Refresh of {} failed, serving snapshot from {} fetched at {}",
                            self.name, stale.source, stale.fetched_at
                        );
                        Some(stale)
                    }
                    None => {
                        warn!("Refresh of {} failed and nothing is cached", self.name);
                        None
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    const LONG: Duration = Duration::from_secs(3600);

    async fn fill(slot: &CacheSlot<Vec<u32>>, data: Vec<u32>) -> Arc<Snapshot<Vec<u32>>> {
        slot.get_or_refresh(true, || async move { Some((data, "test".to_string())) })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_fresh_snapshot_skips_refresh() {
        let slot = CacheSlot::new("test", LONG);
        let first = fill(&slot, vec![1, 2]).await;

        let calls = AtomicUsize::new(0);
        let second = slot
            .get_or_refresh(false, || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Some((vec![9], "other".to_string()))
            })
            .await
            .unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_expired_snapshot_is_replaced() {
        let slot = CacheSlot::new("test", Duration::ZERO);
        fill(&slot, vec![1]).await;

        let next = slot
            .get_or_refresh(false, || async { Some((vec![2], "second".to_string())) })
            .await
            .unwrap();
        assert_eq!(*next.data, vec![2]);
        assert_eq!(next.source, "second");
    }

    #[tokio::test]
    async fn test_failed_refresh_serves_stale_without_extending_expiry() {
        let slot = CacheSlot::new("test", Duration::ZERO);
        let original = fill(&slot, vec![1, 2, 3]).await;

        let served = slot
            .get_or_refresh(false, || async { None })
            .await
            .unwrap();

        assert!(Arc::ptr_eq(&original, &served));
        assert_eq!(served.expires_at, original.expires_at);
        assert!(served.is_expired());
        assert!(Arc::ptr_eq(&slot.snapshot().unwrap(), &original));
    }

    #[tokio::test]
    async fn test_failed_refresh_with_nothing_cached() {
        let slot: CacheSlot<Vec<u32>> = CacheSlot::new("test", LONG);
        assert!(slot.get_or_refresh(false, || async { None }).await.is_none());
        assert!(slot.snapshot().is_none());
    }

    #[tokio::test]
    async fn test_force_refresh_bypasses_fresh_snapshot() {
        let slot = CacheSlot::new("test", LONG);
        fill(&slot, vec![1]).await;

        let forced = slot
            .get_or_refresh(true, || async { Some((vec![5], "forced".to_string())) })
            .await
            .unwrap();
        assert_eq!(*forced.data, vec![5]);
    }

    #[tokio::test]
    async fn test_concurrent_refreshes_fetch_once() {
        let slot = Arc::new(CacheSlot::new("test", LONG));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let slot = slot.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                slot.get_or_refresh(false, || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    Some((vec![7], "once".to_string()))
                })
                .await
                .unwrap()
            }));
        }

        for handle in handles {
            let snapshot = handle.await.unwrap();
            assert_eq!(*snapshot.data, vec![7]);
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_concurrent_failed_refreshes_fetch_once() {
        let slot = Arc::new(CacheSlot::<Vec<u32>>::new("test", LONG));
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..8 {
            let slot = slot.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                slot.get_or_refresh(false, || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    None
                })
                .await
            }));
        }

        for handle in handles {
            assert!(handle.await.unwrap().is_none());
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        // A later read is a new attempt
        slot.get_or_refresh(false, || async {
            calls.fetch_add(1, Ordering::SeqCst);
            None
        })
        .await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_concurrent_failed_refreshes_share_stale_snapshot() {
        let slot = Arc::new(CacheSlot::new("test", Duration::ZERO));
        let original = fill(&slot, vec![4]).await;
        let calls = Arc::new(AtomicUsize::new(0));

        let mut handles = Vec::new();
        for _ in 0..4 {
            let slot = slot.clone();
            let calls = calls.clone();
            handles.push(tokio::spawn(async move {
                slot.get_or_refresh(false, || async move {
                    calls.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(Duration::from_millis(20)).await;
                    None
                })
                .await
                .unwrap()
            }));
        }

        for handle in handles {
            assert!(Arc::ptr_eq(&handle.await.unwrap(), &original));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_oversized_ttl_is_clamped() {
        let slot = CacheSlot::new("test", Duration::from_secs(u64::MAX));
        assert_eq!(slot.ttl(), MAX_TTL);

        let snapshot = fill(&slot, vec![1]).await;
        assert!(!snapshot.is_expired());
    }
}
