//! # Outbound Ports (Driven Ports)
//!
//! - [`PromptTransport`]: carries a prompt to the handler and its reply back
//! - [`PasswordPrompter`]: asks the user, on the responder side
//! - [`OperationReplySink`]: receives the outcome of a prompt made for a mount operation

use crate::domain::{MountOperationResult, PasswordSave};
use crate::ipc::{AskPasswordArgs, AskPasswordReply};
use async_trait::async_trait;
use shared_bus::{BusError, WireValue};
use std::time::Duration;
use thiserror::Error;

/// Why a prompt could not be delivered or answered.
///
/// Every variant completes the prompt as aborted; the distinction only
/// reaches logs.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Prompt handler did not answer within {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    #[error("Prompt handler unreachable: {0}")]
    Unreachable(String),

    #[error("Prompt handler failed with {name}: {message}")]
    Remote { name: String, message: String },
}

impl From<BusError> for TransportError {
    fn from(err: BusError) -> Self {
        match err {
            BusError::Timeout { timeout_ms } => Self::Timeout { timeout_ms },
            BusError::Remote { name, message } => Self::Remote { name, message },
            other => Self::Unreachable(other.to_string()),
        }
    }
}

/// Delivers an `askPassword` request to the handler at `endpoint_address` +
/// `object_path` and returns the raw reply arguments.
///
/// Implementations must give up after `timeout`. The reply is decoded by the
/// caller.
#[async_trait]
pub trait PromptTransport: Send + Sync {
    async fn dispatch_request(
        &self,
        endpoint_address: &str,
        object_path: &str,
        payload: Vec<WireValue>,
        timeout: Duration,
    ) -> Result<Vec<WireValue>, TransportError>;
}

/// Shows a password prompt to the user.
///
/// Return [`AskPasswordReply::unhandled`] to decline the prompt.
#[async_trait]
pub trait PasswordPrompter: Send + Sync {
    async fn ask_password(&self, request: &AskPasswordArgs) -> AskPasswordReply;
}

/// Receiver of a prompt outcome on behalf of a mount operation.
///
/// Setters take ownership of the values; `reply` is called exactly once, after
/// any setters.
pub trait OperationReplySink: Send + Sync {
    fn set_password(&self, password: String);
    fn set_username(&self, username: String);
    fn set_domain(&self, domain: String);
    fn set_anonymous(&self, anonymous: bool);
    fn set_password_save(&self, save: PasswordSave);
    fn reply(&self, result: MountOperationResult);
}
