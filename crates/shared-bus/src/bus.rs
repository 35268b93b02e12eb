//! # Message Bus
//!
//! Defines the calling side of the bus and the in-process implementation.

use crate::endpoint::{Endpoint, EndpointKey, EndpointRegistry, IncomingCall};
use crate::error::BusError;
use crate::message::{MethodCall, MethodReply};
use crate::pending::{saturating_millis, PendingCallTable};
use crate::DEFAULT_CHANNEL_CAPACITY;
use async_trait::async_trait;
use mount_telemetry::metrics::call_outcome;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::Instant;
use tracing::{debug, warn};

/// Deadline used when `now + timeout` does not fit in an `Instant`.
const FAR_FUTURE: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Trait for issuing method calls over a bus.
///
/// Implementations must resolve every call exactly once: a reply, an error
/// reply, or a failure (timeout, unknown endpoint, endpoint gone).
#[async_trait]
pub trait MessageBus: Send + Sync {
    /// Send a method call and wait up to `timeout` for its reply.
    async fn call(&self, call: MethodCall, timeout: Duration) -> Result<MethodReply, BusError>;
}

/// In-process bus.
///
/// Endpoints register an inbox per (destination, path); callers are matched
/// with replies through the pending call table. Suitable for single-process
/// deployments and tests; a session-bus connection would implement
/// [`MessageBus`] directly.
pub struct InMemoryBus {
    /// Registered endpoint inboxes.
    endpoints: EndpointRegistry,

    /// Calls waiting for a reply.
    pending: Arc<PendingCallTable>,

    /// Total calls dispatched to an endpoint.
    calls_dispatched: AtomicU64,

    /// Inbox capacity per endpoint.
    capacity: usize,
}

impl InMemoryBus {
    /// Create a bus with the default inbox capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Create a bus with the given inbox capacity per endpoint.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            endpoints: EndpointRegistry::default(),
            pending: Arc::new(PendingCallTable::new()),
            calls_dispatched: AtomicU64::new(0),
            capacity,
        }
    }

    /// Register an endpoint for `destination` + `path`.
    ///
    /// The endpoint stays registered until the returned handle is dropped.
    pub fn register_endpoint(
        &self,
        destination: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<Endpoint, BusError> {
        let key = EndpointKey::new(destination, path);
        let (sender, receiver) = mpsc::channel(self.capacity);

        match self.endpoints.write().entry(key.clone()) {
            Entry::Occupied(_) => {
                return Err(BusError::AddressInUse {
                    destination: key.destination,
                    path: key.path,
                })
            }
            Entry::Vacant(slot) => {
                slot.insert(sender);
            }
        }

        debug!(endpoint = %key, "Endpoint registered");
        Ok(Endpoint::new(key, receiver, Arc::downgrade(&self.endpoints)))
    }

    /// Number of registered endpoints.
    #[must_use]
    pub fn endpoint_count(&self) -> usize {
        self.endpoints.read().len()
    }

    /// Number of calls still waiting for a reply.
    #[must_use]
    pub fn pending_calls(&self) -> usize {
        self.pending.pending_count()
    }

    /// Total calls dispatched to an endpoint.
    #[must_use]
    pub fn calls_dispatched(&self) -> u64 {
        self.calls_dispatched.load(Ordering::Relaxed)
    }

    /// Pending call table (for statistics).
    #[must_use]
    pub fn pending_table(&self) -> &PendingCallTable {
        &self.pending
    }
}

impl Default for InMemoryBus {
    fn default() -> Self {
        Self::new()
    }
}

/// Removes the pending entry if the calling future is dropped mid-flight.
struct PendingGuard<'a> {
    table: &'a PendingCallTable,
    correlation_id: crate::CorrelationId,
}

impl Drop for PendingGuard<'_> {
    fn drop(&mut self) {
        // No-op when the call already resolved
        self.table.cancel(self.correlation_id);
    }
}

#[async_trait]
impl MessageBus for InMemoryBus {
    async fn call(&self, call: MethodCall, timeout: Duration) -> Result<MethodReply, BusError> {
        let key = EndpointKey::new(call.destination.clone(), call.path.clone());

        let inbox = self.endpoints.read().get(&key).cloned();
        let Some(inbox) = inbox else {
            mount_telemetry::record_bus_call(call_outcome::UNKNOWN_ENDPOINT);
            warn!(endpoint = %key, member = %call.member, "No endpoint for call");
            return Err(BusError::ServiceUnknown {
                destination: key.destination,
                path: key.path,
            });
        };

        let now = Instant::now();
        let deadline = now.checked_add(timeout).unwrap_or(now + FAR_FUTURE);
        let (correlation_id, mut rx) = self.pending.register(&call.member, timeout);
        let _guard = PendingGuard {
            table: &self.pending,
            correlation_id,
        };

        debug!(
            correlation_id = %correlation_id,
            endpoint = %key,
            member = %call.member,
            signature = %call.signature(),
            "Dispatching call"
        );

        let incoming = IncomingCall::new(correlation_id, call, self.pending.clone());
        match tokio::time::timeout_at(deadline, inbox.send(incoming)).await {
            Ok(Ok(())) => {
                self.calls_dispatched.fetch_add(1, Ordering::Relaxed);
            }
            // Inbox closed: the returned call is dropped here and resolves as NoReply
            Ok(Err(_closed)) => {}
            Err(_elapsed) => {
                self.pending.expire(correlation_id);
            }
        }

        let outcome = match tokio::time::timeout_at(deadline, &mut rx).await {
            Ok(Ok(outcome)) => outcome,
            Ok(Err(_)) => Err(BusError::NoReply),
            Err(_elapsed) => {
                if self.pending.expire(correlation_id) {
                    Err(BusError::Timeout {
                        timeout_ms: saturating_millis(timeout),
                    })
                } else {
                    // A reply won the race against the deadline
                    rx.try_recv().unwrap_or(Err(BusError::NoReply))
                }
            }
        };

        let label = match &outcome {
            Ok(_) => call_outcome::REPLIED,
            Err(BusError::Remote { .. }) => call_outcome::REMOTE_ERROR,
            Err(BusError::Timeout { .. }) => call_outcome::TIMEOUT,
            Err(_) => call_outcome::NO_REPLY,
        };
        mount_telemetry::record_bus_call(label);

        outcome
    }
}
