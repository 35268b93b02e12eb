//! # Endpoints
//!
//! The receiving side of the bus. An [`Endpoint`] owns an inbox of
//! [`IncomingCall`]s for one (destination, path) pair; each call must be
//! answered at most once, and a call dropped unanswered resolves its caller
//! with [`BusError::NoReply`].

use crate::correlation::CorrelationId;
use crate::error::BusError;
use crate::message::{MethodCall, MethodReply, WireValue};
use crate::pending::{CallOutcome, PendingCallTable};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::pin::Pin;
use std::sync::{Arc, Weak};
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use tokio_stream::Stream;
use tracing::debug;

/// Registry key of an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct EndpointKey {
    pub destination: String,
    pub path: String,
}

impl EndpointKey {
    pub fn new(destination: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            destination: destination.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for EndpointKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.destination, self.path)
    }
}

type EndpointMap = HashMap<EndpointKey, mpsc::Sender<IncomingCall>>;
pub(crate) type EndpointRegistry = Arc<RwLock<EndpointMap>>;

/// A method call delivered to an endpoint, awaiting its reply.
pub struct IncomingCall {
    correlation_id: CorrelationId,
    call: MethodCall,
    /// `None` once answered.
    pending: Option<Arc<PendingCallTable>>,
}

impl IncomingCall {
    pub(crate) fn new(
        correlation_id: CorrelationId,
        call: MethodCall,
        pending: Arc<PendingCallTable>,
    ) -> Self {
        Self {
            correlation_id,
            call,
            pending: Some(pending),
        }
    }

    /// Correlation ID shared with the caller.
    #[must_use]
    pub fn correlation_id(&self) -> CorrelationId {
        self.correlation_id
    }

    /// The call as sent.
    #[must_use]
    pub fn call(&self) -> &MethodCall {
        &self.call
    }

    /// Answer with return values.
    ///
    /// Returns false if the caller already gave up (timeout or cancellation).
    pub fn reply(mut self, args: Vec<WireValue>) -> bool {
        self.resolve(Ok(MethodReply::new(args)))
    }

    /// Answer with a named error.
    pub fn reply_error(mut self, name: impl Into<String>, message: impl Into<String>) -> bool {
        self.resolve(Err(BusError::Remote {
            name: name.into(),
            message: message.into(),
        }))
    }

    fn resolve(&mut self, outcome: CallOutcome) -> bool {
        match self.pending.take() {
            Some(table) => table.complete(self.correlation_id, outcome),
            None => false,
        }
    }
}

impl Drop for IncomingCall {
    fn drop(&mut self) {
        if self.pending.is_some() {
            debug!(
                correlation_id = %self.correlation_id,
                member = %self.call.member,
                "Call dropped without reply"
            );
            self.resolve(Err(BusError::NoReply));
        }
    }
}

impl fmt::Debug for IncomingCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IncomingCall")
            .field("correlation_id", &self.correlation_id)
            .field("member", &self.call.member)
            .field("answered", &self.pending.is_none())
            .finish()
    }
}

/// Inbox for one registered (destination, path).
///
/// When dropped, the endpoint is deregistered and every queued call is
/// resolved with [`BusError::NoReply`].
pub struct Endpoint {
    key: EndpointKey,
    receiver: mpsc::Receiver<IncomingCall>,
    /// Weak: the inbox closes once the bus is dropped.
    registry: Weak<RwLock<EndpointMap>>,
}

impl Endpoint {
    pub(crate) fn new(
        key: EndpointKey,
        receiver: mpsc::Receiver<IncomingCall>,
        registry: Weak<RwLock<EndpointMap>>,
    ) -> Self {
        Self {
            key,
            receiver,
            registry,
        }
    }

    /// Bus address this endpoint answers for.
    #[must_use]
    pub fn destination(&self) -> &str {
        &self.key.destination
    }

    /// Object path this endpoint answers for.
    #[must_use]
    pub fn path(&self) -> &str {
        &self.key.path
    }

    /// Receive the next call.
    ///
    /// Returns `None` only once the bus itself has been dropped.
    pub async fn recv(&mut self) -> Option<IncomingCall> {
        self.receiver.recv().await
    }

    /// Receive a queued call without waiting.
    pub fn try_recv(&mut self) -> Option<IncomingCall> {
        self.receiver.try_recv().ok()
    }
}

impl Drop for Endpoint {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.write().remove(&self.key);
            debug!(endpoint = %self.key, "Endpoint deregistered");
        }
    }
}

impl Stream for Endpoint {
    type Item = IncomingCall;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        self.receiver.poll_recv(cx)
    }
}
