//! # Bus Errors

use thiserror::Error;

/// Errors from bus method calls and endpoint registration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BusError {
    /// No endpoint is registered at the destination.
    #[error("No endpoint registered at {destination} {path}")]
    ServiceUnknown { destination: String, path: String },

    /// Another endpoint already owns the destination and path.
    #[error("Endpoint already registered at {destination} {path}")]
    AddressInUse { destination: String, path: String },

    /// No reply arrived before the deadline.
    #[error("Call timed out after {timeout_ms} ms")]
    Timeout { timeout_ms: u64 },

    /// The endpoint dropped the call without replying.
    #[error("Endpoint dropped the call without replying")]
    NoReply,

    /// The endpoint answered with an error reply.
    #[error("Remote error {name}: {message}")]
    Remote { name: String, message: String },
}

/// Errors from positional argument decoding.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum WireError {
    /// Fewer arguments than the signature requires.
    #[error("Missing argument {position}, expected '{expected}'")]
    Missing { position: usize, expected: char },

    /// Argument present but of the wrong type.
    #[error("Argument {position} has type '{found}', expected '{expected}'")]
    TypeMismatch {
        position: usize,
        expected: char,
        found: char,
    },
}
