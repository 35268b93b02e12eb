//! # Shared Bus - In-Process Method-Call Bus
//!
//! Carries method calls from callers to registered endpoints and routes each
//! reply back to the caller that is waiting for it.
//!
//! ## Call Flow
//!
//! ```text
//! ┌──────────────┐   call(MethodCall, timeout)   ┌──────────────┐
//! │    Caller    │ ────────────┐                 │   Endpoint   │
//! │              │             ▼                 │ (dest, path) │
//! └──────────────┘      ┌──────────────┐         └──────────────┘
//!        ↑              │ Pending Call │  IncomingCall   │
//!        │              │    Table     │ ───────────────▶│
//!        └──────────────│ (corr. ids)  │◀────────────────┘
//!          outcome      └──────────────┘   reply / error / drop
//! ```
//!
//! ## Guarantees
//!
//! - **Exactly one outcome per call:** reply, error reply, timeout, or no reply
//! - **First resolution wins:** a reply arriving after the deadline is discarded
//! - **No leaked entries:** a caller that stops waiting removes its entry

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod bus;
pub mod correlation;
pub mod endpoint;
pub mod error;
pub mod message;
pub mod pending;

// Re-export main types
pub use bus::{InMemoryBus, MessageBus};
pub use correlation::CorrelationId;
pub use endpoint::{Endpoint, EndpointKey, IncomingCall};
pub use error::{BusError, WireError};
pub use message::{signature_of, ArgReader, MethodCall, MethodReply, WireValue};
pub use pending::{CallOutcome, PendingCallTable, PendingStats};

/// Maximum calls queued per endpoint before callers wait.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;
