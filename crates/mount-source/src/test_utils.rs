//! Test doubles for the prompt transport and the operation sink.
//!
//! Available to this crate's tests and, with the `test-utils` feature, to
//! downstream crates.

use crate::domain::{MountOperationResult, PasswordSave};
use crate::ipc::AskPasswordReply;
use crate::ports::{OperationReplySink, PromptTransport, TransportError};
use async_trait::async_trait;
use parking_lot::Mutex;
use shared_bus::WireValue;
use std::collections::VecDeque;
use std::time::Duration;

/// Scripted behaviour for one dispatched request.
#[derive(Debug, Clone)]
pub enum ScriptedResponse {
    /// Answer with these reply arguments.
    Reply(Vec<WireValue>),
    /// Fail with this error.
    Fail(TransportError),
    /// Answer after a delay.
    Delayed(Duration, Vec<WireValue>),
    /// Never answer.
    Silent,
}

impl ScriptedResponse {
    /// Answer with an encoded reply.
    #[must_use]
    pub fn reply(reply: &AskPasswordReply) -> Self {
        Self::Reply(reply.to_wire())
    }
}

/// A request as seen by the transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchedRequest {
    pub endpoint_address: String,
    pub object_path: String,
    pub payload: Vec<WireValue>,
    pub timeout: Duration,
}

/// Transport that plays back scripted responses in order.
///
/// Once the script runs out every further request stays silent.
#[derive(Default)]
pub struct ScriptedTransport {
    script: Mutex<VecDeque<ScriptedResponse>>,
    dispatched: Mutex<Vec<DispatchedRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = ScriptedResponse>) -> Self {
        Self {
            script: Mutex::new(script.into_iter().collect()),
            dispatched: Mutex::new(Vec::new()),
        }
    }

    /// Queue another response.
    pub fn push(&self, response: ScriptedResponse) {
        self.script.lock().push_back(response);
    }

    /// Every request dispatched so far.
    pub fn dispatched(&self) -> Vec<DispatchedRequest> {
        self.dispatched.lock().clone()
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatched.lock().len()
    }
}

#[async_trait]
impl PromptTransport for ScriptedTransport {
    async fn dispatch_request(
        &self,
        endpoint_address: &str,
        object_path: &str,
        payload: Vec<WireValue>,
        timeout: Duration,
    ) -> Result<Vec<WireValue>, TransportError> {
        self.dispatched.lock().push(DispatchedRequest {
            endpoint_address: endpoint_address.to_string(),
            object_path: object_path.to_string(),
            payload,
            timeout,
        });

        let next = self.script.lock().pop_front();
        match next {
            Some(ScriptedResponse::Reply(args)) => Ok(args),
            Some(ScriptedResponse::Fail(err)) => Err(err),
            Some(ScriptedResponse::Delayed(delay, args)) => {
                tokio::time::sleep(delay).await;
                Ok(args)
            }
            Some(ScriptedResponse::Silent) | None => std::future::pending().await,
        }
    }
}

/// One call made on a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinkCall {
    Password(String),
    Username(String),
    Domain(String),
    Anonymous(bool),
    PasswordSave(PasswordSave),
    Reply(MountOperationResult),
}

/// Operation sink that records every call in order.
#[derive(Debug, Default)]
pub struct RecordingSink {
    calls: Mutex<Vec<SinkCall>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<SinkCall> {
        self.calls.lock().clone()
    }

    /// Reply codes received, in order.
    pub fn replies(&self) -> Vec<MountOperationResult> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                SinkCall::Reply(code) => Some(*code),
                _ => None,
            })
            .collect()
    }
}

impl OperationReplySink for RecordingSink {
    fn set_password(&self, password: String) {
        self.calls.lock().push(SinkCall::Password(password));
    }

    fn set_username(&self, username: String) {
        self.calls.lock().push(SinkCall::Username(username));
    }

    fn set_domain(&self, domain: String) {
        self.calls.lock().push(SinkCall::Domain(domain));
    }

    fn set_anonymous(&self, anonymous: bool) {
        self.calls.lock().push(SinkCall::Anonymous(anonymous));
    }

    fn set_password_save(&self, save: PasswordSave) {
        self.calls.lock().push(SinkCall::PasswordSave(save));
    }

    fn reply(&self, result: MountOperationResult) {
        self.calls.lock().push(SinkCall::Reply(result));
    }
}
