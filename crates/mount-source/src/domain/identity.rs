//! # Source Identity
//!
//! Where password prompts for one mount are answered: a bus address and an
//! object path on that address.

use serde::{Deserialize, Serialize};
use shared_bus::{ArgReader, WireError, WireValue};
use std::fmt;

/// Object path used by the dummy identity.
pub const DUMMY_OBJECT_PATH: &str = "/";

/// Immutable address of the prompt handler for one mount.
///
/// An empty `endpoint_address` marks the dummy identity: no handler exists and
/// every prompt fails with [`crate::MountSourceError::NoResponder`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SourceIdentity {
    endpoint_address: String,
    object_path: String,
}

impl SourceIdentity {
    pub fn new(endpoint_address: impl Into<String>, object_path: impl Into<String>) -> Self {
        Self {
            endpoint_address: endpoint_address.into(),
            object_path: object_path.into(),
        }
    }

    /// Identity with no prompt handler behind it.
    #[must_use]
    pub fn dummy() -> Self {
        Self::new("", DUMMY_OBJECT_PATH)
    }

    /// True when no prompt handler can be reached.
    #[must_use]
    pub fn is_dummy(&self) -> bool {
        self.endpoint_address.is_empty()
    }

    #[must_use]
    pub fn endpoint_address(&self) -> &str {
        &self.endpoint_address
    }

    #[must_use]
    pub fn object_path(&self) -> &str {
        &self.object_path
    }

    /// Encode as the two positional values `(s endpoint_address, o object_path)`.
    #[must_use]
    pub fn to_wire(&self) -> [WireValue; 2] {
        [
            WireValue::Str(self.endpoint_address.clone()),
            WireValue::ObjectPath(self.object_path.clone()),
        ]
    }

    /// Decode the two positional values written by [`SourceIdentity::to_wire`].
    ///
    /// The reader is left positioned after the identity, so an identity can be
    /// embedded in a longer argument list.
    pub fn from_wire(reader: &mut ArgReader<'_>) -> Result<Self, WireError> {
        let endpoint_address = reader.read_str()?;
        let object_path = reader.read_object_path()?;
        Ok(Self::new(endpoint_address, object_path))
    }
}

impl Default for SourceIdentity {
    fn default() -> Self {
        Self::dummy()
    }
}

impl fmt::Display for SourceIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_dummy() {
            write!(f, "<no responder>")
        } else {
            write!(f, "{}{}", self.endpoint_address, self.object_path)
        }
    }
}
