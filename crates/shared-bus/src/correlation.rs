//! Correlation ID for matching replies to method calls.

use std::fmt;
use uuid::Uuid;

/// Correlation ID assigned to every method call on the bus.
///
/// The reply carries the same ID; the pending-call table uses it to route the
/// reply back to the waiting caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CorrelationId(Uuid);

impl CorrelationId {
    /// Generate a new random correlation ID
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
