//! Correlation Registry - async-to-sync bridge for identity checks.
//!
//! Maps correlation IDs to callers parked on an authentication reply.
//!
//! Each entry is settled at most once. Settlement always happens while the
//! registry lock is held and always removes the entry, so whichever of
//! {reply, timeout, eviction, cancel} reaches the lock first owns the
//! outcome and every later attempt finds nothing.
//!
//! The `PENDING_WAITERS` gauge is process-wide: every registry adds its
//! inserts and subtracts its removals, so it reads the total across all
//! registries in the process.
//!
//! Entries are kept in insertion order (the cache is never read through a
//! promoting lookup), so the least-recently-used end is always the oldest
//! waiter. That end is what capacity overflow and the age sweep evict.

use crate::domain::correlation::CorrelationId;
use crate::domain::error::AwaitError;
use csms_telemetry::metrics::{LIVE_EVICTIONS, PENDING_WAITERS, STALE_REPLIES};
use lru::LruCache;
use parking_lot::Mutex;
use shared_types::{AuthenticationResponse, AuthenticationStatus};
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Why an entry was evicted without a reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EvictionReason {
    /// The registry was full and this was the oldest entry.
    Capacity,
    /// The entry outlived the registry's maximum age.
    Expired,
}

impl fmt::Display for EvictionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Capacity => f.write_str("capacity"),
            Self::Expired => f.write_str("expired"),
        }
    }
}

/// Callback run for every eviction. Runs under the registry lock, so it
/// must not call back into the registry.
pub type EvictionHook = Arc<dyn Fn(CorrelationId, EvictionReason) + Send + Sync>;

/// Final value delivered to a parked caller.
#[derive(Debug)]
enum Settlement {
    Reply(AuthenticationStatus),
    Evicted { reason: EvictionReason, age: Duration },
}

/// A caller parked on a reply
struct PendingWaiter {
    /// Single-assignment completion slot
    sender: oneshot::Sender<Settlement>,
    /// When the entry was registered
    created_at: Instant,
}

/// Handle returned by [`CorrelationRegistry::register`]. Pass it to
/// [`CorrelationRegistry::await_reply`] to block on the outcome.
///
/// Dropping it without awaiting abandons the wait; the entry stays until a
/// reply, the age sweep, or capacity eviction removes it.
#[derive(Debug)]
pub struct PendingReply {
    id: CorrelationId,
    receiver: oneshot::Receiver<Settlement>,
}

impl PendingReply {
    /// Correlation id of the registered request.
    pub fn id(&self) -> CorrelationId {
        self.id
    }
}

/// Statistics for the registry
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total waiters registered
    pub total_registered: AtomicU64,
    /// Total waiters settled by a reply
    pub total_completed: AtomicU64,
    /// Total waiters that timed out
    pub total_timeouts: AtomicU64,
    /// Total waiters evicted (capacity or age)
    pub total_evicted: AtomicU64,
    /// Total waiters cancelled, or whose caller had gone when the reply came
    pub total_cancelled: AtomicU64,
    /// Total replies with no live waiter
    pub total_stale_replies: AtomicU64,
}

impl PendingStats {
    /// Copy of the counters for reporting. Each counter is read separately.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            registered: self.total_registered.load(Ordering::Relaxed),
            completed: self.total_completed.load(Ordering::Relaxed),
            timeouts: self.total_timeouts.load(Ordering::Relaxed),
            evicted: self.total_evicted.load(Ordering::Relaxed),
            cancelled: self.total_cancelled.load(Ordering::Relaxed),
            stale_replies: self.total_stale_replies.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`PendingStats`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, serde::Serialize)]
pub struct StatsSnapshot {
    pub registered: u64,
    pub completed: u64,
    pub timeouts: u64,
    pub evicted: u64,
    pub cancelled: u64,
    pub stale_replies: u64,
}

/// Correlation registry bridging bus replies to waiting callers.
///
/// Flow:
/// 1. Caller calls `register()` and gets a [`PendingReply`]
/// 2. Caller publishes the request carrying the correlation id
/// 3. The response listener calls `on_reply()` when the reply arrives
/// 4. Caller calls `await_reply()` and gets the outcome or an [`AwaitError`]
pub struct CorrelationRegistry {
    /// Correlation ID to waiter, oldest first
    pending: Mutex<LruCache<CorrelationId, PendingWaiter>>,
    /// Age past which the sweeper evicts an entry
    max_age: Duration,
    /// Called on every eviction
    eviction_hook: Option<EvictionHook>,
    /// Statistics
    stats: Arc<PendingStats>,
}

impl CorrelationRegistry {
    /// Create a registry holding at most `max_entries` waiters, each for at
    /// most `max_age`. A zero `max_entries` is treated as one.
    pub fn new(max_entries: usize, max_age: Duration) -> Self {
        let capacity = NonZeroUsize::new(max_entries).unwrap_or(NonZeroUsize::MIN);
        Self {
            pending: Mutex::new(LruCache::new(capacity)),
            max_age,
            eviction_hook: None,
            stats: Arc::new(PendingStats::default()),
        }
    }

    /// Install a callback run on every eviction.
    pub fn with_eviction_hook(mut self, hook: EvictionHook) -> Self {
        self.eviction_hook = Some(hook);
        self
    }

    /// Register a waiter under a fresh correlation id.
    ///
    /// If the registry is full, the oldest waiter is evicted first.
    pub fn register(&self) -> PendingReply {
        let id = CorrelationId::new();
        let (sender, receiver) = oneshot::channel();

        let mut pending = self.pending.lock();
        let waiter = PendingWaiter {
            sender,
            created_at: Instant::now(),
        };
        PENDING_WAITERS.inc();
        if let Some((old_id, old)) = pending.push(id, waiter) {
            PENDING_WAITERS.dec();
            self.evict(&old_id, old, EvictionReason::Capacity);
        }
        drop(pending);

        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);
        debug!(correlation_id = %id, "Registered pending request");

        PendingReply { id, receiver }
    }

    /// Wait for the outcome of `pending`, at most `timeout`.
    ///
    /// On timeout the entry is removed before the error is returned, so a
    /// late reply finds nothing. If a reply won the race for the lock, its
    /// outcome is returned instead.
    pub async fn await_reply(
        &self,
        pending: PendingReply,
        timeout: Duration,
    ) -> Result<AuthenticationStatus, AwaitError> {
        let PendingReply { id, mut receiver } = pending;

        match tokio::time::timeout(timeout, &mut receiver).await {
            Ok(Ok(settlement)) => Self::into_outcome(id, settlement),
            Ok(Err(_)) => Err(AwaitError::Cancelled(id)),
            Err(_) => {
                if self.take(&id).is_some() {
                    self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
                    warn!(
                        correlation_id = %id,
                        timeout_ms = timeout.as_millis(),
                        "Authorization request timed out"
                    );
                    return Err(AwaitError::Timeout { id, after: timeout });
                }

                // Someone else settled the entry after the deadline fired.
                // Settlement happens under the lock, so the slot is final now.
                match receiver.try_recv() {
                    Ok(settlement) => Self::into_outcome(id, settlement),
                    Err(_) => Err(AwaitError::Cancelled(id)),
                }
            }
        }
    }

    /// Route a reply from the bus to its waiter.
    ///
    /// Replies whose id is not a correlation id issued here, or has no live
    /// waiter, are logged and dropped. Returns `true` if a waiter was settled.
    pub fn on_reply(&self, reply: &AuthenticationResponse) -> bool {
        match CorrelationId::parse(&reply.request_id) {
            Ok(id) => self.complete(id, reply.authentication_status),
            Err(_) => {
                self.record_stale(&reply.request_id);
                false
            }
        }
    }

    /// Settle the waiter for `id` with `status`.
    ///
    /// Returns true if a waiting caller received the outcome, false if there
    /// was no entry or its caller had gone.
    pub fn complete(&self, id: CorrelationId, status: AuthenticationStatus) -> bool {
        let mut pending = self.pending.lock();
        let Some(waiter) = pending.pop(&id) else {
            drop(pending);
            self.record_stale(&id.to_string());
            return false;
        };
        PENDING_WAITERS.dec();

        let response_time = waiter.created_at.elapsed();
        let delivered = waiter.sender.send(Settlement::Reply(status)).is_ok();
        drop(pending);

        if delivered {
            self.stats.total_completed.fetch_add(1, Ordering::Relaxed);
            debug!(
                correlation_id = %id,
                status = %status,
                response_time_ms = response_time.as_millis(),
                "Completed pending request"
            );
        } else {
            // Receiver was dropped (caller abandoned the wait)
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            debug!(correlation_id = %id, "Pending request receiver dropped");
        }
        delivered
    }

    /// Cancel a pending request. A parked caller observes
    /// [`AwaitError::Cancelled`].
    ///
    /// Idempotent with settlement: returns false if the entry is already gone.
    pub fn cancel(&self, id: &CorrelationId) -> bool {
        if self.take(id).is_some() {
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            debug!(correlation_id = %id, "Cancelled pending request");
            true
        } else {
            false
        }
    }

    /// Evict every entry older than the registry's maximum age.
    ///
    /// Returns the number of entries evicted.
    pub fn evict_expired(&self) -> usize {
        let now = Instant::now();
        let mut pending = self.pending.lock();
        let mut evicted = 0;

        while let Some((_, oldest)) = pending.peek_lru() {
            if now.saturating_duration_since(oldest.created_at) < self.max_age {
                break;
            }
            if let Some((id, waiter)) = pending.pop_lru() {
                PENDING_WAITERS.dec();
                self.evict(&id, waiter, EvictionReason::Expired);
                evicted += 1;
            }
        }

        evicted
    }

    /// Get number of currently pending requests
    pub fn pending_count(&self) -> usize {
        self.pending.lock().len()
    }

    /// Check if a correlation ID is pending
    pub fn is_pending(&self, id: &CorrelationId) -> bool {
        self.pending.lock().contains(id)
    }

    /// Maximum number of waiters held at once.
    pub fn capacity(&self) -> usize {
        self.pending.lock().cap().get()
    }

    /// Get statistics
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }

    /// Remove an entry without settling it.
    fn take(&self, id: &CorrelationId) -> Option<PendingWaiter> {
        let mut pending = self.pending.lock();
        let waiter = pending.pop(id);
        if waiter.is_some() {
            PENDING_WAITERS.dec();
        }
        waiter
    }

    /// Settle an already-removed entry as evicted. Called with the lock held.
    fn evict(&self, id: &CorrelationId, waiter: PendingWaiter, reason: EvictionReason) {
        let age = waiter.created_at.elapsed();
        let caller_waiting = waiter
            .sender
            .send(Settlement::Evicted { reason, age })
            .is_ok();

        self.stats.total_evicted.fetch_add(1, Ordering::Relaxed);
        LIVE_EVICTIONS.inc();
        warn!(
            correlation_id = %id,
            reason = %reason,
            age_ms = age.as_millis(),
            caller_waiting,
            "Pending request evicted before a reply arrived"
        );

        if let Some(hook) = &self.eviction_hook {
            hook(*id, reason);
        }
    }

    fn record_stale(&self, request_id: &str) {
        self.stats.total_stale_replies.fetch_add(1, Ordering::Relaxed);
        STALE_REPLIES.inc();
        warn!(
            request_id = request_id,
            "Reply for unknown, settled or expired request id"
        );
    }

    fn into_outcome(
        id: CorrelationId,
        settlement: Settlement,
    ) -> Result<AuthenticationStatus, AwaitError> {
        match settlement {
            Settlement::Reply(status) => Ok(status),
            Settlement::Evicted { reason, age } => Err(AwaitError::Evicted { id, reason, age }),
        }
    }
}

/// Background task evicting entries past the registry's maximum age
pub async fn sweeper_task(registry: Arc<CorrelationRegistry>, interval: Duration) {
    let mut sweep_interval = tokio::time::interval(interval);
    sweep_interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

    loop {
        sweep_interval.tick().await;
        let evicted = registry.evict_expired();
        if evicted > 0 {
            debug!(evicted = evicted, "Swept expired pending requests");
        }
    }
}
