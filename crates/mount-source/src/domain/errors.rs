//! # Domain Errors
//!
//! Failures a prompt can end in. A cancelled or timed-out prompt is not an
//! error: it completes with an aborted [`crate::PromptResult`].

use thiserror::Error;

/// Errors returned by the ask-password operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MountSourceError {
    /// The source has no prompt handler (dummy identity).
    #[error("Internal error: no prompt handler is associated with this mount")]
    NoResponder,

    /// The handler declined the prompt, or its answer could not be read.
    #[error("Internal error: password prompt was not handled")]
    Unhandled,

    /// The runtime shut down before the prompt completed.
    #[error("Password prompt cancelled before completion")]
    Cancelled,
}
