//! # Responder
//!
//! Serves `askPassword` calls arriving on a bus endpoint by asking a
//! [`PasswordPrompter`] and replying with its answer. This is the side a
//! desktop session runs for each mount operation it exposes.

use crate::config::MountSourceConfig;
use crate::ipc::payloads::{error_names, AskPasswordArgs};
use crate::ports::PasswordPrompter;
use shared_bus::{Endpoint, IncomingCall};
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Answers prompts for one endpoint.
pub struct AskPasswordHandler {
    prompter: Arc<dyn PasswordPrompter>,
    interface: String,
    method: String,
}

impl AskPasswordHandler {
    pub fn new(prompter: Arc<dyn PasswordPrompter>) -> Self {
        Self::with_config(prompter, &MountSourceConfig::default())
    }

    pub fn with_config(prompter: Arc<dyn PasswordPrompter>, config: &MountSourceConfig) -> Self {
        Self {
            prompter,
            interface: config.interface.clone(),
            method: config.ask_password_method.clone(),
        }
    }

    /// Answer calls until the bus goes away.
    ///
    /// Calls are answered one at a time, in arrival order.
    pub async fn serve(&self, mut endpoint: Endpoint) {
        info!(
            endpoint = endpoint.destination(),
            object_path = endpoint.path(),
            "Serving password prompts"
        );

        while let Some(incoming) = endpoint.recv().await {
            self.handle_call(incoming).await;
        }

        debug!(endpoint = endpoint.destination(), "Prompt endpoint closed");
    }

    /// Answer one call. Returns false if the caller was no longer waiting.
    pub async fn handle_call(&self, incoming: IncomingCall) -> bool {
        let correlation_id = incoming.correlation_id();
        let call = incoming.call();

        if call.interface != self.interface || call.member != self.method {
            warn!(
                correlation_id = %correlation_id,
                interface = %call.interface,
                member = %call.member,
                "Rejecting unknown method"
            );
            let message = format!("No such method {}.{}", call.interface, call.member);
            return incoming.reply_error(error_names::UNKNOWN_METHOD, message);
        }

        let args = match AskPasswordArgs::from_wire(&call.args) {
            Ok(args) => args,
            Err(err) => {
                warn!(correlation_id = %correlation_id, error = %err, "Malformed askPassword call");
                return incoming.reply_error(error_names::INVALID_ARGS, err.to_string());
            }
        };

        debug!(
            correlation_id = %correlation_id,
            flags = %args.flags,
            "Prompting user"
        );
        let reply = self.prompter.ask_password(&args).await;

        debug!(
            correlation_id = %correlation_id,
            handled = reply.handled,
            aborted = reply.aborted,
            "Prompt answered"
        );
        let delivered = incoming.reply(reply.to_wire());
        if !delivered {
            warn!(correlation_id = %correlation_id, "Caller gave up before the prompt was answered");
        }
        delivered
    }
}
