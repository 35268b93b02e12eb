//! # Mount Source - Credential-Request Bridge
//!
//! A mount backend that needs a password asks the process that started the
//! mount. That process exposes a prompt handler on the bus; this crate sends
//! it an `askPassword` request and turns the reply into a [`PromptResult`].
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          mount-source                           │
//! │                                                                 │
//! │  MountOperation ──ask-password event──┐                         │
//! │        ▲                              ▼                         │
//! │        │ setters + reply        ┌─────────────┐                 │
//! │        └────────────────────────│ MountSource │◀── ask_password_sync
//! │                                 │ (identity)  │◀── ask_password_async
//! │                                 └──────┬──────┘                 │
//! │                                        │ PromptTransport        │
//! └────────────────────────────────────────┼────────────────────────┘
//!                                          ▼
//!                         shared-bus ──▶ AskPasswordHandler ──▶ PasswordPrompter
//! ```
//!
//! ## Outcomes
//!
//! | Situation | Result |
//! |-----------|--------|
//! | Dummy identity (no handler) | `Err(NoResponder)`, nothing is sent |
//! | Reply with `handled = false`, or malformed reply | `Err(Unhandled)` |
//! | User cancelled | `Ok` with `aborted = true` |
//! | No reply within the deadline (30 min), or handler unreachable | `Ok` with `aborted = true` |
//! | Credentials supplied | `Ok` with the credential fields set |
//!
//! ## Layout
//!
//! - **Domain** (`domain/`): identity, request, result, flags, errors
//! - **Ports** (`ports/`): transport, prompter and operation-sink traits
//! - **IPC** (`ipc/`): wire payloads and the responder
//! - **Adapters** (`adapters/`): transport over [`shared_bus::MessageBus`]
//! - **Service** (`service.rs`, `blocking.rs`, `operation.rs`): the three ways to prompt

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod adapters;
pub mod blocking;
pub mod config;
pub mod domain;
pub mod ipc;
pub mod operation;
pub mod ports;
pub mod service;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

// Re-export main types
pub use adapters::BusTransport;
pub use config::{
    MountSourceConfig, ASK_PASSWORD_METHOD, DEFAULT_ASK_PASSWORD_TIMEOUT,
    MOUNT_OPERATION_INTERFACE,
};
pub use domain::{
    AskFlags, MountOperationResult, MountSourceError, PasswordSave, PromptRequest, PromptResult,
    SourceIdentity,
};
pub use ipc::{AskPasswordArgs, AskPasswordHandler, AskPasswordReply};
pub use operation::{complete_operation, AskPasswordEvent, MountOperation};
pub use ports::{OperationReplySink, PasswordPrompter, PromptTransport, TransportError};
pub use service::{decode_reply, AskPasswordResult, MountSource};
