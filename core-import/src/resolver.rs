//! # Rate-Limited Resolver
//!
//! Maps every search key to a streaming album id, concurrently, while
//! starting at most one lookup per interval.
//!
//! ## Model
//!
//! ```text
//! keys:      k0      k1      k2      k3
//! throttle:  |--iv---|--iv---|--iv---|
//! starts:    t0      t1      t2      t3        (one spawned task each)
//! finishes:      t1'   t0'        t3'  t2'    (any order)
//! slots:     [r0,    r1,     r2,     r3]      (written by input index)
//! ```
//!
//! Fan-out is bounded by start rate only, not by a worker count. Every
//! spawned lookup is joined before the call returns.
//!
//! ## Cancellation
//!
//! Once the token fires, no further lookups are started. Lookups already in
//! flight run to completion and are joined, their results are discarded,
//! and the call fails with [`ImportError::Cancelled`].
//!
//! ## Failures
//!
//! All-or-nothing: one failed lookup fails the batch. Failures are collected
//! with their input index and folded by
//! [`ImportError::from_lookup_failures`]. A search with zero results is not a
//! failure; it yields `None` for that slot.

use bridge_traits::error::Result as BridgeResult;
use bridge_traits::{AlbumId, AlbumSearch, BridgeError, SearchKey};
use core_async::select;
use core_async::sync::CancellationToken;
use core_async::task::{spawn, JoinHandle};
use core_async::time::{interval, Duration, Interval, MissedTickBehavior};
use std::sync::Arc;
use tracing::{debug, info, instrument, trace};

use crate::error::{ImportError, LookupFailure, Result};

/// Default spacing between two lookup starts (five per second).
pub const DEFAULT_LOOKUP_INTERVAL: Duration = Duration::from_millis(200);

/// Ticking gate releasing one start permit per period.
///
/// The first permit is immediate. A late consumer does not get a burst of
/// catch-up permits: the schedule shifts instead.
struct Throttle {
    ticker: Interval,
}

impl Throttle {
    fn new(period: Duration) -> Self {
        let mut ticker = interval(period.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        Self { ticker }
    }

    /// Wait for the next permit; `false` if cancelled first.
    async fn acquire(&mut self, cancel: &CancellationToken) -> bool {
        select! {
            biased;
            _ = cancel.cancelled() => false,
            _ = self.ticker.tick() => true,
        }
    }
}

/// Concurrent album resolver over an [`AlbumSearch`] port.
#[derive(Clone)]
pub struct RateLimitedResolver {
    search: Arc<dyn AlbumSearch>,
    interval: Duration,
}

impl RateLimitedResolver {
    pub fn new(search: Arc<dyn AlbumSearch>, interval: Duration) -> Self {
        Self { search, interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Resolve `keys` to album ids; output position `i` belongs to `keys[i]`.
    ///
    /// # Errors
    ///
    /// - [`ImportError::Cancelled`] if the token fired before every lookup
    ///   was started
    /// - [`ImportError::StreamingUnauthorized`] if any lookup was rejected
    ///   for credentials
    /// - [`ImportError::Lookup`] carrying every other per-item failure
    #[instrument(skip_all, fields(keys = keys.len(), interval_ms = self.interval.as_millis() as u64))]
    pub async fn resolve_all(
        &self,
        keys: &[SearchKey],
        cancel: &CancellationToken,
    ) -> Result<Vec<Option<AlbumId>>> {
        let total = keys.len();
        let mut throttle = Throttle::new(self.interval);
        let mut in_flight: Vec<JoinHandle<BridgeResult<Option<AlbumId>>>> =
            Vec::with_capacity(total);
        let mut cancelled = false;

        for (index, key) in keys.iter().enumerate() {
            if !throttle.acquire(cancel).await {
                cancelled = true;
                break;
            }

            trace!(index, artist = %key.artist, title = %key.title, "Dispatching lookup");
            let search = Arc::clone(&self.search);
            let key = key.clone();
            in_flight.push(spawn(async move { search.search_album(&key).await }));
        }

        let dispatched = in_flight.len();
        let mut slots: Vec<Option<AlbumId>> = vec![None; total];
        let mut failures = Vec::new();

        for (index, handle) in in_flight.into_iter().enumerate() {
            let outcome = handle.await.unwrap_or_else(|join_error| {
                Err(BridgeError::OperationFailed(format!(
                    "Lookup task aborted: {}",
                    join_error
                )))
            });

            match outcome {
                Ok(found) => slots[index] = found.filter(|id| !id.is_empty()),
                Err(error) => failures.push(LookupFailure {
                    index,
                    key: keys[index].clone(),
                    error,
                }),
            }
        }

        if cancelled {
            info!(dispatched, total, "Lookup batch cancelled");
            return Err(ImportError::Cancelled);
        }

        if !failures.is_empty() {
            debug!(failed = failures.len(), total, "Lookup batch failed");
            return Err(ImportError::from_lookup_failures(failures, total));
        }

        let matched = slots.iter().filter(|slot| slot.is_some()).count();
        debug!(matched, not_found = total - matched, "Lookup batch complete");
        Ok(slots)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use core_async::time::{sleep, Instant};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    /// Search fake keyed by title; records start instants.
    #[derive(Default)]
    struct ScriptedSearch {
        answers: HashMap<String, BridgeResult<Option<AlbumId>>>,
        latency: Duration,
        starts: Mutex<Vec<Instant>>,
        finished: AtomicUsize,
    }

    impl ScriptedSearch {
        fn answer(mut self, title: &str, answer: BridgeResult<Option<&str>>) -> Self {
            self.answers
                .insert(title.to_string(), answer.map(|id| id.map(str::to_string)));
            self
        }
    }

    #[async_trait]
    impl AlbumSearch for ScriptedSearch {
        async fn search_album(&self, key: &SearchKey) -> BridgeResult<Option<AlbumId>> {
            self.starts.lock().unwrap().push(Instant::now());
            sleep(self.latency).await;
            self.finished.fetch_add(1, Ordering::SeqCst);

            match self.answers.get(&key.title) {
                Some(Ok(found)) => Ok(found.clone()),
                Some(Err(BridgeError::Unauthorized(m))) => Err(BridgeError::Unauthorized(m.clone())),
                Some(Err(other)) => Err(BridgeError::Request(other.to_string())),
                None => Ok(Some(format!("id-{}", key.title))),
            }
        }
    }

    fn keys(titles: &[&str]) -> Vec<SearchKey> {
        titles.iter().map(|t| SearchKey::new("Artist", *t)).collect()
    }

    #[core_async::test]
    async fn test_resolves_in_input_order() {
        let search = Arc::new(ScriptedSearch::default());
        let resolver = RateLimitedResolver::new(search, Duration::from_millis(1));

        let ids = resolver
            .resolve_all(&keys(&["a", "b", "c"]), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(
            ids,
            vec![
                Some("id-a".to_string()),
                Some("id-b".to_string()),
                Some("id-c".to_string())
            ]
        );
    }

    #[core_async::test]
    async fn test_not_found_is_none_not_error() {
        let search = Arc::new(
            ScriptedSearch::default()
                .answer("missing", Ok(None))
                .answer("blank", Ok(Some(""))),
        );
        let resolver = RateLimitedResolver::new(search, Duration::from_millis(1));

        let ids = resolver
            .resolve_all(&keys(&["a", "missing", "blank"]), &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(ids, vec![Some("id-a".to_string()), None, None]);
    }

    #[core_async::test]
    async fn test_empty_input() {
        let resolver =
            RateLimitedResolver::new(Arc::new(ScriptedSearch::default()), Duration::from_millis(1));
        let ids = resolver
            .resolve_all(&[], &CancellationToken::new())
            .await
            .unwrap();
        assert!(ids.is_empty());
    }

    #[core_async::test]
    async fn test_starts_are_spaced_by_interval() {
        let search = Arc::new(ScriptedSearch::default());
        let resolver = RateLimitedResolver::new(search.clone(), Duration::from_millis(20));

        resolver
            .resolve_all(&keys(&["a", "b", "c", "d"]), &CancellationToken::new())
            .await
            .unwrap();

        let mut starts = search.starts.lock().unwrap().clone();
        starts.sort();
        assert_eq!(starts.len(), 4);
        // Three intervals between four starts, minus scheduling jitter
        assert!(starts[3] - starts[0] >= Duration::from_millis(50));
    }

    #[core_async::test]
    async fn test_single_failure_fails_batch() {
        let search = Arc::new(
            ScriptedSearch::default().answer("bad", Err(BridgeError::Request("503".into()))),
        );
        let resolver = RateLimitedResolver::new(search, Duration::from_millis(1));

        let result = resolver
            .resolve_all(&keys(&["a", "bad", "c"]), &CancellationToken::new())
            .await;

        match result {
            Err(ImportError::Lookup {
                failed,
                total,
                failures,
            }) => {
                assert_eq!(failed, 1);
                assert_eq!(total, 3);
                assert_eq!(failures[0].index, 1);
                assert_eq!(failures[0].key.title, "bad");
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[core_async::test]
    async fn test_unauthorized_lookup_requests_reauthentication() {
        let search = Arc::new(
            ScriptedSearch::default()
                .answer("b", Err(BridgeError::Request("timeout".into())))
                .answer("c", Err(BridgeError::Unauthorized("expired".into()))),
        );
        let resolver = RateLimitedResolver::new(search, Duration::from_millis(1));

        let result = resolver
            .resolve_all(&keys(&["a", "b", "c"]), &CancellationToken::new())
            .await;

        assert!(matches!(result, Err(ImportError::StreamingUnauthorized(_))));
    }

    #[core_async::test]
    async fn test_cancelled_before_start_dispatches_nothing() {
        let search = Arc::new(ScriptedSearch::default());
        let resolver = RateLimitedResolver::new(search.clone(), Duration::from_millis(1));
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = resolver.resolve_all(&keys(&["a", "b"]), &cancel).await;

        assert!(matches!(result, Err(ImportError::Cancelled)));
        assert!(search.starts.lock().unwrap().is_empty());
    }
}
