//! Shared fixtures for the end-to-end tests and benchmarks.

use async_trait::async_trait;
use mount_source::{
    AskPasswordArgs, AskPasswordHandler, AskPasswordReply, BusTransport, MountSource,
    MountSourceConfig, PasswordPrompter, SourceIdentity,
};
use parking_lot::Mutex;
use shared_bus::InMemoryBus;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::task::JoinHandle;

/// Prompter that answers with scripted replies, in order.
///
/// Declines every prompt once the script runs out.
#[derive(Default)]
pub struct ScriptedPrompter {
    replies: Mutex<VecDeque<AskPasswordReply>>,
    seen: Mutex<Vec<AskPasswordArgs>>,
    delay: Option<Duration>,
}

impl ScriptedPrompter {
    pub fn new(replies: impl IntoIterator<Item = AskPasswordReply>) -> Self {
        Self {
            replies: Mutex::new(replies.into_iter().collect()),
            ..Self::default()
        }
    }

    /// Answer only after `delay`, as a user would.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Prompts shown so far.
    pub fn seen(&self) -> Vec<AskPasswordArgs> {
        self.seen.lock().clone()
    }
}

#[async_trait]
impl PasswordPrompter for ScriptedPrompter {
    async fn ask_password(&self, request: &AskPasswordArgs) -> AskPasswordReply {
        self.seen.lock().push(request.clone());
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        let next = self.replies.lock().pop_front();
        next.unwrap_or_else(AskPasswordReply::unhandled)
    }
}

/// Register an endpoint at `address` + `path` and answer prompts on it with `prompter`.
pub fn spawn_responder(
    bus: &InMemoryBus,
    address: &str,
    path: &str,
    prompter: Arc<ScriptedPrompter>,
) -> JoinHandle<()> {
    let endpoint = bus
        .register_endpoint(address, path)
        .expect("endpoint address free");
    let handler = AskPasswordHandler::new(prompter);
    tokio::spawn(async move { handler.serve(endpoint).await })
}

/// Mount source prompting over `bus`, running on the current runtime.
pub fn bus_source(bus: &Arc<InMemoryBus>, identity: SourceIdentity) -> MountSource {
    bus_source_with_config(bus, identity, MountSourceConfig::default())
}

pub fn bus_source_with_config(
    bus: &Arc<InMemoryBus>,
    identity: SourceIdentity,
    config: MountSourceConfig,
) -> MountSource {
    mount_telemetry::init_test_logging();
    let bus: Arc<InMemoryBus> = Arc::clone(bus);
    let transport = Arc::new(BusTransport::with_config(bus, &config));
    MountSource::with_config(identity, transport, Handle::current(), config)
}
