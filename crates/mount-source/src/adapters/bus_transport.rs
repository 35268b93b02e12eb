//! Prompt transport over a [`MessageBus`].

use crate::config::MountSourceConfig;
use crate::ports::{PromptTransport, TransportError};
use async_trait::async_trait;
use shared_bus::{MessageBus, MethodCall, WireValue};
use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

/// Sends prompts as `askPassword` method calls.
pub struct BusTransport {
    bus: Arc<dyn MessageBus>,
    interface: String,
    method: String,
}

impl BusTransport {
    pub fn new(bus: Arc<dyn MessageBus>) -> Self {
        Self::with_config(bus, &MountSourceConfig::default())
    }

    /// Use the interface and method names from `config`.
    pub fn with_config(bus: Arc<dyn MessageBus>, config: &MountSourceConfig) -> Self {
        Self {
            bus,
            interface: config.interface.clone(),
            method: config.ask_password_method.clone(),
        }
    }
}

#[async_trait]
impl PromptTransport for BusTransport {
    async fn dispatch_request(
        &self,
        endpoint_address: &str,
        object_path: &str,
        payload: Vec<WireValue>,
        timeout: Duration,
    ) -> Result<Vec<WireValue>, TransportError> {
        let call = MethodCall::new(endpoint_address, object_path, &self.interface, &self.method)
            .with_args(payload);

        debug!(
            endpoint = endpoint_address,
            object_path = object_path,
            signature = %call.signature(),
            "Sending prompt over bus"
        );

        let reply = self.bus.call(call, timeout).await?;
        Ok(reply.args)
    }
}
