//! Request coalescing: dedup, debounce, and settle-window short-circuiting
//!
//! All callers sharing a dedup key attach to one in-flight execution and
//! observe the identical outcome; the executor runs at most once per
//! coalesced burst. With debouncing enabled, execution is delayed until the
//! key has been quiet for the debounce interval (trailing edge: each new
//! call pushes the deadline). Settled results are remembered for a short
//! window so near-simultaneous calls arriving just after settlement still
//! short-circuit instead of re-invoking the executor.
//!
//! `flush` cancels timers that have not fired yet; an executor that has
//! started always runs to completion. There is no hard cancellation of an
//! outbound call in this design.

use std::{collections::HashMap, future::Future, sync::Arc, time::Duration};

use futures::{FutureExt, future::BoxFuture};
use parking_lot::Mutex;
use tokio::{sync::broadcast, time::Instant};
use tracing::{debug, trace};

use crate::error::ApplicationError;

/// Delay after the last call under a key before the executor fires
const DEFAULT_DEBOUNCE_INTERVAL: Duration = Duration::from_millis(800);

/// How long a settled outcome short-circuits duplicate calls
const DEFAULT_DEDUP_WINDOW: Duration = Duration::from_secs(2);

/// Per-call options for [`RequestCoordinator::execute`]
#[derive(Debug, Clone, Copy)]
pub struct CoordinatorOptions {
    /// Delay execution until the key has been quiet for the debounce
    /// interval. Disabled, the executor is scheduled immediately (but still
    /// deduplicated).
    pub debounce: bool,
    /// Override for the settle window; `None` uses the coordinator default
    pub dedup_window: Option<Duration>,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            debounce: true,
            dedup_window: None,
        }
    }
}

impl CoordinatorOptions {
    /// Options with debouncing disabled
    #[must_use]
    pub const fn immediate() -> Self {
        Self {
            debounce: false,
            dedup_window: None,
        }
    }
}

/// Observability counters for the debug panel
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CoordinatorStats {
    /// Requests currently pending (debouncing or in flight)
    pub pending: usize,
    /// Settled results still inside their dedup window
    pub recent: usize,
    /// Debounce timers that have not fired yet
    pub active_timers: usize,
    /// Total executor invocations since construction
    pub executions: u64,
}

type Executor<T> = Box<dyn FnOnce() -> BoxFuture<'static, Result<T, ApplicationError>> + Send>;

struct PendingEntry<T> {
    tx: broadcast::Sender<Result<T, ApplicationError>>,
    deadline: Instant,
    dedup_window: Duration,
    executor: Option<Executor<T>>,
    running: bool,
}

struct RecentResult<T> {
    result: Result<T, ApplicationError>,
    stored_at: Instant,
    window: Duration,
}

impl<T> RecentResult<T> {
    fn is_fresh(&self) -> bool {
        self.stored_at.elapsed() <= self.window
    }
}

struct Inner<T> {
    pending: HashMap<String, PendingEntry<T>>,
    recent: HashMap<String, RecentResult<T>>,
    executions: u64,
}

/// Coalesces identical requests under single-writer, shared-outcome
/// semantics.
///
/// Internally synchronised; safe to share behind an `Arc`. There is no
/// parallel mutation hazard because every check-then-set sequence happens
/// under one lock with no suspension point inside.
pub struct RequestCoordinator<T> {
    inner: Arc<Mutex<Inner<T>>>,
    debounce_interval: Duration,
    dedup_window: Duration,
}

impl<T> std::fmt::Debug for RequestCoordinator<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.inner.lock();
        f.debug_struct("RequestCoordinator")
            .field("pending", &inner.pending.len())
            .field("recent", &inner.recent.len())
            .field("executions", &inner.executions)
            .finish_non_exhaustive()
    }
}

impl<T> Default for RequestCoordinator<T>
where
    T: Clone + Send + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> RequestCoordinator<T>
where
    T: Clone + Send + 'static,
{
    /// Coordinator with the default 800ms debounce and 2s dedup window
    #[must_use]
    pub fn new() -> Self {
        Self::with_intervals(DEFAULT_DEBOUNCE_INTERVAL, DEFAULT_DEDUP_WINDOW)
    }

    /// Coordinator with custom intervals
    #[must_use]
    pub fn with_intervals(debounce_interval: Duration, dedup_window: Duration) -> Self {
        Self {
            inner: Arc::new(Mutex::new(Inner {
                pending: HashMap::new(),
                recent: HashMap::new(),
                executions: 0,
            })),
            debounce_interval,
            dedup_window,
        }
    }

    /// Execute `executor` under `key`, coalescing with any burst in
    /// progress.
    ///
    /// When a pending request for `key` already exists, the caller attaches
    /// to it (and, with debouncing, pushes its deadline); the executor
    /// passed by attaching callers is dropped unused. Callers whose timer
    /// is flushed receive [`ApplicationError::Coordination`].
    pub async fn execute<F, Fut>(
        &self,
        key: &str,
        executor: F,
        options: CoordinatorOptions,
    ) -> Result<T, ApplicationError>
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = Result<T, ApplicationError>> + Send + 'static,
    {
        let mut rx = {
            let mut inner = self.inner.lock();

            match inner.recent.get(key) {
                Some(recent) if recent.is_fresh() => {
                    trace!(key = %key, "Duplicate call inside dedup window, short-circuiting");
                    return recent.result.clone();
                }
                Some(_) => {
                    inner.recent.remove(key);
                }
                None => {}
            }

            if let Some(entry) = inner.pending.get_mut(key) {
                if options.debounce && !entry.running {
                    entry.deadline = Instant::now() + self.debounce_interval;
                    trace!(key = %key, "Debounce deadline pushed");
                }
                entry.tx.subscribe()
            } else {
                let (tx, rx) = broadcast::channel(1);
                let deadline = if options.debounce {
                    Instant::now() + self.debounce_interval
                } else {
                    Instant::now()
                };
                inner.pending.insert(
                    key.to_string(),
                    PendingEntry {
                        tx,
                        deadline,
                        dedup_window: options.dedup_window.unwrap_or(self.dedup_window),
                        executor: Some(Box::new(move || executor().boxed())),
                        running: false,
                    },
                );
                self.spawn_driver(key.to_string());
                rx
            }
        };

        match rx.recv().await {
            Ok(result) => result,
            Err(_) => Err(ApplicationError::Coordination("flushed".to_string())),
        }
    }

    /// Cancel pending debounce timers for one key, or all keys.
    ///
    /// Has no effect on an already-executing request; in-flight executors
    /// always run to completion.
    pub fn flush(&self, key: Option<&str>) {
        let mut inner = self.inner.lock();
        match key {
            Some(key) => {
                if inner.pending.get(key).is_some_and(|e| !e.running) {
                    inner.pending.remove(key);
                    debug!(key = %key, "Flushed pending debounce timer");
                }
            }
            None => {
                let before = inner.pending.len();
                inner.pending.retain(|_, e| e.running);
                let flushed = before - inner.pending.len();
                if flushed > 0 {
                    debug!(flushed = flushed, "Flushed all pending debounce timers");
                }
            }
        }
    }

    /// Current counters; expired recent entries are purged first
    #[must_use]
    pub fn stats(&self) -> CoordinatorStats {
        let mut inner = self.inner.lock();
        inner.recent.retain(|_, r| r.is_fresh());
        CoordinatorStats {
            pending: inner.pending.len(),
            recent: inner.recent.len(),
            active_timers: inner.pending.values().filter(|e| !e.running).count(),
            executions: inner.executions,
        }
    }

    /// Drive one pending key: wait out the (possibly moving) deadline, run
    /// the executor, settle every attached waiter.
    fn spawn_driver(&self, key: String) {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move {
            loop {
                let deadline = {
                    let guard = inner.lock();
                    match guard.pending.get(&key) {
                        Some(entry) => entry.deadline,
                        // Flushed before firing; waiters see a closed channel.
                        None => return,
                    }
                };
                if Instant::now() >= deadline {
                    break;
                }
                tokio::time::sleep_until(deadline).await;
            }

            let (executor, tx, window) = {
                let mut guard = inner.lock();
                let Some(entry) = guard.pending.get_mut(&key) else {
                    return;
                };
                entry.running = true;
                (entry.executor.take(), entry.tx.clone(), entry.dedup_window)
            };
            let Some(executor) = executor else { return };

            let result = executor().await;

            {
                let mut guard = inner.lock();
                guard.pending.remove(&key);
                guard.executions += 1;
                guard.recent.insert(
                    key.clone(),
                    RecentResult {
                        result: result.clone(),
                        stored_at: Instant::now(),
                        window,
                    },
                );
            }
            // Settle after the maps are consistent so that a caller arriving
            // between remove and send still finds the recent result.
            let _ = tx.send(result);
        });
    }
}
