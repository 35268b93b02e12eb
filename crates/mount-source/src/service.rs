//! # Mount Source Service
//!
//! Asks the prompt handler of one mount for credentials.
//!
//! ## Flow
//!
//! ```text
//! ask_password_async ──spawn──▶ [dummy?] ──yes──▶ NoResponder
//!                                  │ no
//!                                  ▼
//!                     PromptTransport::dispatch_request (deadline)
//!                                  │
//!          ┌───────────────────────┼─────────────────────────┐
//!          ▼                       ▼                         ▼
//!    reply decodes           reply malformed or       transport failed or
//!    handled=true            handled=false            deadline passed
//!          │                       │                         │
//!     PromptResult             Unhandled             PromptResult (aborted)
//! ```
//!
//! Every request completes exactly once, always after `ask_password_async`
//! has returned to its caller.

use crate::config::MountSourceConfig;
use crate::domain::{AskFlags, MountSourceError, PromptRequest, PromptResult, SourceIdentity};
use crate::ipc::{AskPasswordArgs, AskPasswordReply};
use crate::ports::PromptTransport;
use mount_telemetry::metrics::prompt_outcome;
use mount_telemetry::PROMPTS_DISPATCHED;
use shared_bus::WireValue;
use std::fmt;
use std::sync::Arc;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, error, info, warn, Instrument};

/// Completed prompt, waiting to be consumed by [`MountSource::ask_password_finish`].
#[must_use = "pass the result to MountSource::ask_password_finish"]
#[derive(Debug)]
pub struct AskPasswordResult {
    identity: Arc<SourceIdentity>,
    outcome: Result<PromptResult, MountSourceError>,
}

impl AskPasswordResult {
    /// Identity the prompt was sent for.
    pub fn identity(&self) -> &SourceIdentity {
        &self.identity
    }

    /// True if finishing will return a [`PromptResult`].
    pub fn is_ok(&self) -> bool {
        self.outcome.is_ok()
    }
}

/// Delivers a request's outcome to its continuation exactly once.
///
/// If the request task is dropped before completing (runtime shutdown), the
/// continuation still runs, with [`MountSourceError::Cancelled`]. A task
/// dropped before it was released may be dropped on the dispatching caller's
/// stack, so that delivery moves to its own thread.
struct Completion<F: FnOnce(AskPasswordResult) + Send + 'static> {
    identity: Arc<SourceIdentity>,
    callback: Option<F>,
    released: bool,
}

impl<F: FnOnce(AskPasswordResult) + Send + 'static> Completion<F> {
    fn new(identity: Arc<SourceIdentity>, callback: F) -> Self {
        Self {
            identity,
            callback: Some(callback),
            released: false,
        }
    }

    /// Mark the dispatching call as returned.
    fn release(&mut self) {
        self.released = true;
    }

    fn complete(mut self, outcome: Result<PromptResult, MountSourceError>) {
        if let Some(callback) = self.callback.take() {
            callback(self.result(outcome));
        }
    }

    fn result(&self, outcome: Result<PromptResult, MountSourceError>) -> AskPasswordResult {
        AskPasswordResult {
            identity: Arc::clone(&self.identity),
            outcome,
        }
    }
}

impl<F: FnOnce(AskPasswordResult) + Send + 'static> Drop for Completion<F> {
    fn drop(&mut self) {
        let Some(callback) = self.callback.take() else {
            return;
        };

        warn!(endpoint = %self.identity, "Prompt dropped before completion");
        mount_telemetry::record_prompt(prompt_outcome::CANCELLED);
        let result = self.result(Err(MountSourceError::Cancelled));

        if self.released {
            callback(result);
            return;
        }

        let spawned = std::thread::Builder::new()
            .name("mount-source-cancel".to_string())
            .spawn(move || callback(result));
        if let Err(err) = spawned {
            error!(
                endpoint = %self.identity,
                error = %err,
                "Could not deliver cancelled prompt"
            );
        }
    }
}

/// The credential-request bridge for one mount.
///
/// Cloning is cheap: clones share the identity, transport and configuration.
#[derive(Clone)]
pub struct MountSource {
    identity: Arc<SourceIdentity>,
    transport: Arc<dyn PromptTransport>,
    runtime: Handle,
    config: Arc<MountSourceConfig>,
}

impl MountSource {
    /// Create a source whose prompts are answered at `identity`.
    ///
    /// Requests run as tasks on `runtime`.
    pub fn new(identity: SourceIdentity, transport: Arc<dyn PromptTransport>, runtime: Handle) -> Self {
        Self::with_config(identity, transport, runtime, MountSourceConfig::default())
    }

    pub fn with_config(
        identity: SourceIdentity,
        transport: Arc<dyn PromptTransport>,
        runtime: Handle,
        config: MountSourceConfig,
    ) -> Self {
        Self {
            identity: Arc::new(identity),
            transport,
            runtime,
            config: Arc::new(config),
        }
    }

    /// Source with no prompt handler. Every prompt fails with
    /// [`MountSourceError::NoResponder`] without touching the transport.
    pub fn new_dummy(transport: Arc<dyn PromptTransport>, runtime: Handle) -> Self {
        Self::new(SourceIdentity::dummy(), transport, runtime)
    }

    pub fn identity(&self) -> &SourceIdentity {
        &self.identity
    }

    pub fn config(&self) -> &MountSourceConfig {
        &self.config
    }

    /// Encode the identity for inclusion in an outgoing message.
    pub fn to_wire(&self) -> [WireValue; 2] {
        self.identity.to_wire()
    }

    /// Ask for credentials and wait for the answer.
    pub async fn ask_password(
        &self,
        message: Option<&str>,
        default_user: Option<&str>,
        default_domain: Option<&str>,
        flags: AskFlags,
    ) -> Result<PromptResult, MountSourceError> {
        let request = self.build_request(message, default_user, default_domain, flags);
        self.run_request(request).await
    }

    /// Start a prompt; `callback` receives the outcome.
    ///
    /// The callback is never called from within this function, even when the
    /// outcome is known up front or the runtime is gone. It runs exactly once,
    /// on a runtime worker, after this function has returned.
    pub fn ask_password_async<F>(
        &self,
        message: Option<&str>,
        default_user: Option<&str>,
        default_domain: Option<&str>,
        flags: AskFlags,
        callback: F,
    ) where
        F: FnOnce(AskPasswordResult) + Send + 'static,
    {
        let request = self.build_request(message, default_user, default_domain, flags);
        let mut completion = Completion::new(Arc::clone(&self.identity), callback);
        let source = self.clone();
        let (release_tx, release_rx) = oneshot::channel::<()>();

        let span = mount_telemetry::prompt_span!(
            "ask_password",
            endpoint = %self.identity.endpoint_address(),
            object_path = %self.identity.object_path()
        );

        self.runtime.spawn(
            async move {
                // Held until this call has returned
                let _ = release_rx.await;
                completion.release();
                let outcome = source.run_request(request).await;
                completion.complete(outcome);
            }
            .instrument(span),
        );
        let _ = release_tx.send(());
    }

    /// Consume a completed prompt.
    ///
    /// # Panics
    ///
    /// In debug builds, if `result` was produced by a source with another identity.
    pub fn ask_password_finish(
        &self,
        result: AskPasswordResult,
    ) -> Result<PromptResult, MountSourceError> {
        debug_assert_eq!(
            *result.identity, *self.identity,
            "ask_password_finish called with a result from another mount source"
        );
        result.outcome
    }

    fn build_request(
        &self,
        message: Option<&str>,
        default_user: Option<&str>,
        default_domain: Option<&str>,
        flags: AskFlags,
    ) -> PromptRequest {
        PromptRequest::new(
            Arc::clone(&self.identity),
            message,
            default_user,
            default_domain,
            flags,
        )
    }

    async fn run_request(&self, request: PromptRequest) -> Result<PromptResult, MountSourceError> {
        let identity = Arc::clone(&request.identity);

        if identity.is_dummy() {
            debug!("No prompt handler for this mount");
            mount_telemetry::record_prompt(prompt_outcome::NO_RESPONDER);
            return Err(MountSourceError::NoResponder);
        }

        let timeout = self.config.ask_password_timeout;
        let payload = AskPasswordArgs::from(&request).to_wire();

        PROMPTS_DISPATCHED.inc();
        info!(
            endpoint = identity.endpoint_address(),
            object_path = identity.object_path(),
            flags = %request.flags,
            timeout_secs = timeout.as_secs(),
            "Dispatching password prompt"
        );

        let dispatch = self.transport.dispatch_request(
            identity.endpoint_address(),
            identity.object_path(),
            payload,
            timeout,
        );

        let outcome = match tokio::time::timeout(timeout, dispatch).await {
            Ok(Ok(reply)) => decode_reply(&reply),
            Ok(Err(err)) => {
                warn!(
                    endpoint = identity.endpoint_address(),
                    error = %err,
                    "Prompt transport failed, treating as aborted"
                );
                Ok(PromptResult::aborted())
            }
            Err(_elapsed) => {
                warn!(
                    endpoint = identity.endpoint_address(),
                    timeout_secs = timeout.as_secs(),
                    "Prompt deadline passed, treating as aborted"
                );
                Ok(PromptResult::aborted())
            }
        };

        let label = outcome_label(&outcome);
        mount_telemetry::record_prompt(label);
        debug!(
            endpoint = identity.endpoint_address(),
            outcome = label,
            "Prompt completed"
        );

        outcome
    }
}

impl fmt::Debug for MountSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MountSource")
            .field("identity", &self.identity)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

/// Interpret the reply arguments of `askPassword`.
///
/// A reply that does not decode, or that says nobody handled the prompt, is
/// [`MountSourceError::Unhandled`].
pub fn decode_reply(args: &[WireValue]) -> Result<PromptResult, MountSourceError> {
    match AskPasswordReply::from_wire(args) {
        Ok(reply) if reply.handled => Ok(PromptResult::from(reply)),
        Ok(_) => Err(MountSourceError::Unhandled),
        Err(err) => {
            warn!(
                error = %err,
                signature = %shared_bus::signature_of(args),
                "Undecodable askPassword reply"
            );
            Err(MountSourceError::Unhandled)
        }
    }
}

fn outcome_label(outcome: &Result<PromptResult, MountSourceError>) -> &'static str {
    match outcome {
        Ok(result) if result.aborted => prompt_outcome::ABORTED,
        Ok(_) => prompt_outcome::HANDLED,
        Err(MountSourceError::NoResponder) => prompt_outcome::NO_RESPONDER,
        Err(MountSourceError::Cancelled) => prompt_outcome::CANCELLED,
        Err(MountSourceError::Unhandled) => prompt_outcome::UNHANDLED,
    }
}
