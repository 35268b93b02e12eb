//! # Bus Messages
//!
//! Method calls and replies carried by the bus. Arguments are positional,
//! each tagged with a one-character type code:
//!
//! | Code | Variant | Meaning |
//! |------|---------|---------|
//! | `b` | `Bool` | boolean |
//! | `u` | `U32` | unsigned 32-bit integer |
//! | `s` | `Str` | UTF-8 string |
//! | `o` | `ObjectPath` | object path on an endpoint |

use crate::error::WireError;
use serde::{Deserialize, Serialize};

/// One positional argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum WireValue {
    Bool(bool),
    U32(u32),
    Str(String),
    ObjectPath(String),
}

impl WireValue {
    /// Type code of this value.
    #[must_use]
    pub fn type_code(&self) -> char {
        match self {
            Self::Bool(_) => 'b',
            Self::U32(_) => 'u',
            Self::Str(_) => 's',
            Self::ObjectPath(_) => 'o',
        }
    }
}

impl From<bool> for WireValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<u32> for WireValue {
    fn from(value: u32) -> Self {
        Self::U32(value)
    }
}

impl From<&str> for WireValue {
    fn from(value: &str) -> Self {
        Self::Str(value.to_string())
    }
}

impl From<String> for WireValue {
    fn from(value: String) -> Self {
        Self::Str(value)
    }
}

/// Concatenated type codes of an argument list, e.g. `"sssu"`.
#[must_use]
pub fn signature_of(args: &[WireValue]) -> String {
    args.iter().map(WireValue::type_code).collect()
}

/// A method call addressed to an endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodCall {
    /// Bus address of the endpoint owner.
    pub destination: String,
    /// Object path on that owner.
    pub path: String,
    /// Interface the member belongs to.
    pub interface: String,
    /// Method name.
    pub member: String,
    /// Positional arguments.
    pub args: Vec<WireValue>,
}

impl MethodCall {
    /// Create a call with no arguments.
    pub fn new(
        destination: impl Into<String>,
        path: impl Into<String>,
        interface: impl Into<String>,
        member: impl Into<String>,
    ) -> Self {
        Self {
            destination: destination.into(),
            path: path.into(),
            interface: interface.into(),
            member: member.into(),
            args: Vec::new(),
        }
    }

    /// Append arguments.
    #[must_use]
    pub fn with_args(mut self, args: impl IntoIterator<Item = WireValue>) -> Self {
        self.args.extend(args);
        self
    }

    /// Signature of the arguments.
    #[must_use]
    pub fn signature(&self) -> String {
        signature_of(&self.args)
    }
}

/// A successful reply to a method call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodReply {
    /// Positional return values.
    pub args: Vec<WireValue>,
}

impl MethodReply {
    /// Create a reply carrying `args`.
    #[must_use]
    pub fn new(args: Vec<WireValue>) -> Self {
        Self { args }
    }

    /// Reader over the reply arguments.
    #[must_use]
    pub fn reader(&self) -> ArgReader<'_> {
        ArgReader::new(&self.args)
    }
}

/// Positional, type-checked reader over an argument list.
///
/// Trailing arguments beyond the ones read are ignored, so a newer peer may
/// append values without breaking older readers.
pub struct ArgReader<'a> {
    args: &'a [WireValue],
    position: usize,
}

impl<'a> ArgReader<'a> {
    /// Start reading at the first argument.
    #[must_use]
    pub fn new(args: &'a [WireValue]) -> Self {
        Self { args, position: 0 }
    }

    /// Number of arguments not yet read.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.args.len().saturating_sub(self.position)
    }

    fn unexpected(&self, expected: char) -> WireError {
        match self.args.get(self.position) {
            Some(found) => WireError::TypeMismatch {
                position: self.position,
                expected,
                found: found.type_code(),
            },
            None => WireError::Missing {
                position: self.position,
                expected,
            },
        }
    }

    pub fn read_bool(&mut self) -> Result<bool, WireError> {
        match self.args.get(self.position) {
            Some(WireValue::Bool(v)) => {
                self.position += 1;
                Ok(*v)
            }
            _ => Err(self.unexpected('b')),
        }
    }

    pub fn read_u32(&mut self) -> Result<u32, WireError> {
        match self.args.get(self.position) {
            Some(WireValue::U32(v)) => {
                self.position += 1;
                Ok(*v)
            }
            _ => Err(self.unexpected('u')),
        }
    }

    pub fn read_str(&mut self) -> Result<&'a str, WireError> {
        match self.args.get(self.position) {
            Some(WireValue::Str(v)) => {
                self.position += 1;
                Ok(v)
            }
            _ => Err(self.unexpected('s')),
        }
    }

    pub fn read_object_path(&mut self) -> Result<&'a str, WireError> {
        match self.args.get(self.position) {
            Some(WireValue::ObjectPath(v)) => {
                self.position += 1;
                Ok(v)
            }
            _ => Err(self.unexpected('o')),
        }
    }
}
