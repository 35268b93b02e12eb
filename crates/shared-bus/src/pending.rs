//! Pending Call Table - correlates replies with in-flight method calls.
//!
//! Every entry is resolved at most once. Whichever of reply, timeout or
//! cancellation removes the entry first wins; anything arriving afterwards is
//! discarded and counted as a late reply.

use crate::correlation::CorrelationId;
use crate::error::BusError;
use crate::message::MethodReply;
use dashmap::DashMap;
use mount_telemetry::metrics::call_outcome;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};
use tokio::sync::oneshot;
use tracing::{debug, warn};

/// Result delivered to the waiting caller.
pub type CallOutcome = Result<MethodReply, BusError>;

/// Milliseconds in `duration`, saturating at `u64::MAX`.
pub(crate) fn saturating_millis(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

/// A call waiting for its reply
struct PendingCall {
    /// Channel to send the outcome
    sender: oneshot::Sender<CallOutcome>,
    /// When the call was dispatched
    created_at: Instant,
    /// Method name (for logging)
    member: String,
    /// Deadline for this call
    timeout: Duration,
}

/// Statistics for the pending call table
#[derive(Debug, Default)]
pub struct PendingStats {
    /// Total calls registered
    pub total_registered: AtomicU64,
    /// Total calls resolved by a reply (or error reply)
    pub total_completed: AtomicU64,
    /// Total calls resolved by their deadline
    pub total_timeouts: AtomicU64,
    /// Total calls abandoned by the caller
    pub total_cancelled: AtomicU64,
    /// Replies that arrived after their call was already resolved
    pub total_late: AtomicU64,
}

/// Pending call table.
///
/// Flow:
/// 1. `call()` registers an entry and gets a oneshot receiver
/// 2. The endpoint receives the call with its `CorrelationId`
/// 3. The endpoint replies; `complete()` removes the entry and wakes the caller
/// 4. Or the deadline fires first and `expire()` removes the entry
#[derive(Default)]
pub struct PendingCallTable {
    pending: DashMap<CorrelationId, PendingCall>,
    stats: PendingStats,
}

impl PendingCallTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a pending call and get a receiver for its outcome.
    pub fn register(
        &self,
        member: &str,
        timeout: Duration,
    ) -> (CorrelationId, oneshot::Receiver<CallOutcome>) {
        let correlation_id = CorrelationId::new();
        let (tx, rx) = oneshot::channel();

        let call = PendingCall {
            sender: tx,
            created_at: Instant::now(),
            member: member.to_string(),
            timeout,
        };

        self.pending.insert(correlation_id, call);
        self.stats.total_registered.fetch_add(1, Ordering::Relaxed);

        debug!(
            correlation_id = %correlation_id,
            member = member,
            timeout_ms = saturating_millis(timeout),
            "Registered pending call"
        );

        (correlation_id, rx)
    }

    /// Resolve a pending call with an outcome.
    ///
    /// Returns true if this was the first resolution, false if the call was
    /// unknown or already resolved (the outcome is discarded).
    pub fn complete(&self, correlation_id: CorrelationId, outcome: CallOutcome) -> bool {
        let Some((_, pending)) = self.pending.remove(&correlation_id) else {
            self.stats.total_late.fetch_add(1, Ordering::Relaxed);
            mount_telemetry::record_bus_call(call_outcome::LATE_REPLY);
            warn!(
                correlation_id = %correlation_id,
                "Discarding reply for unknown or already resolved call"
            );
            return false;
        };

        let response_time = pending.created_at.elapsed();
        self.stats.total_completed.fetch_add(1, Ordering::Relaxed);

        if pending.sender.send(outcome).is_err() {
            // Caller stopped waiting between removal and send
            debug!(
                correlation_id = %correlation_id,
                member = pending.member,
                "Pending call receiver dropped"
            );
            return false;
        }

        debug!(
            correlation_id = %correlation_id,
            member = pending.member,
            response_time_ms = saturating_millis(response_time),
            "Completed pending call"
        );
        true
    }

    /// Resolve a pending call as timed out.
    ///
    /// Returns false if a reply already won the race.
    pub fn expire(&self, correlation_id: CorrelationId) -> bool {
        let Some((_, pending)) = self.pending.remove(&correlation_id) else {
            return false;
        };

        self.stats.total_timeouts.fetch_add(1, Ordering::Relaxed);
        warn!(
            correlation_id = %correlation_id,
            member = pending.member,
            elapsed_ms = saturating_millis(pending.created_at.elapsed()),
            timeout_ms = saturating_millis(pending.timeout),
            "Pending call timed out"
        );
        let _ = pending.sender.send(Err(BusError::Timeout {
            timeout_ms: saturating_millis(pending.timeout),
        }));
        true
    }

    /// Drop a pending call whose caller stopped waiting.
    pub fn cancel(&self, correlation_id: CorrelationId) -> bool {
        if self.pending.remove(&correlation_id).is_some() {
            self.stats.total_cancelled.fetch_add(1, Ordering::Relaxed);
            debug!(correlation_id = %correlation_id, "Cancelled pending call");
            true
        } else {
            false
        }
    }

    /// Number of calls still waiting
    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Check if a correlation ID is pending
    pub fn is_pending(&self, correlation_id: &CorrelationId) -> bool {
        self.pending.contains_key(correlation_id)
    }

    /// Get statistics
    pub fn stats(&self) -> &PendingStats {
        &self.stats
    }
}
