//! # IPC Payloads
//!
//! Positional argument layouts of `askPassword`:
//!
//! | Direction | Signature | Fields |
//! |-----------|-----------|--------|
//! | request | `sssu` | message, default user, default domain, flags |
//! | reply | `bbsssbu` | handled, aborted, password, username, domain, anonymous, password save |

use crate::domain::{AskFlags, PasswordSave, PromptRequest, PromptResult};
use shared_bus::{ArgReader, WireError, WireValue};
use std::fmt;

/// Error names for replies the responder refuses.
pub mod error_names {
    pub const INVALID_ARGS: &str = "org.freedesktop.DBus.Error.InvalidArgs";
    pub const UNKNOWN_METHOD: &str = "org.freedesktop.DBus.Error.UnknownMethod";
}

pub const ASK_PASSWORD_REQUEST_SIGNATURE: &str = "sssu";
pub const ASK_PASSWORD_REPLY_SIGNATURE: &str = "bbsssbu";

/// Request arguments of `askPassword`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AskPasswordArgs {
    pub message: String,
    pub default_user: String,
    pub default_domain: String,
    pub flags: AskFlags,
}

impl AskPasswordArgs {
    #[must_use]
    pub fn to_wire(&self) -> Vec<WireValue> {
        vec![
            WireValue::Str(self.message.clone()),
            WireValue::Str(self.default_user.clone()),
            WireValue::Str(self.default_domain.clone()),
            WireValue::U32(self.flags.bits()),
        ]
    }

    pub fn from_wire(args: &[WireValue]) -> Result<Self, WireError> {
        let mut reader = ArgReader::new(args);
        Ok(Self {
            message: reader.read_str()?.to_string(),
            default_user: reader.read_str()?.to_string(),
            default_domain: reader.read_str()?.to_string(),
            flags: AskFlags::from_bits(reader.read_u32()?),
        })
    }
}

impl From<&PromptRequest> for AskPasswordArgs {
    fn from(request: &PromptRequest) -> Self {
        Self {
            message: request.message.clone(),
            default_user: request.default_user.clone(),
            default_domain: request.default_domain.clone(),
            flags: request.flags,
        }
    }
}

/// Reply arguments of `askPassword`.
#[derive(Clone, PartialEq, Eq)]
pub struct AskPasswordReply {
    pub handled: bool,
    pub aborted: bool,
    pub password: String,
    pub username: String,
    pub domain: String,
    pub anonymous: bool,
    /// Raw code; see [`PasswordSave::from_code`]
    pub password_save: u32,
}

impl AskPasswordReply {
    /// Reply of a handler that declines the prompt.
    #[must_use]
    pub fn unhandled() -> Self {
        Self {
            handled: false,
            aborted: false,
            password: String::new(),
            username: String::new(),
            domain: String::new(),
            anonymous: false,
            password_save: PasswordSave::Never.code(),
        }
    }

    /// Reply of a user who cancelled the prompt.
    #[must_use]
    pub fn aborted() -> Self {
        Self {
            handled: true,
            aborted: true,
            ..Self::unhandled()
        }
    }

    /// Reply carrying credentials.
    pub fn answered(
        password: impl Into<String>,
        username: impl Into<String>,
        domain: impl Into<String>,
        password_save: PasswordSave,
    ) -> Self {
        Self {
            handled: true,
            aborted: false,
            password: password.into(),
            username: username.into(),
            domain: domain.into(),
            anonymous: false,
            password_save: password_save.code(),
        }
    }

    /// Reply of a user who chose to connect anonymously.
    #[must_use]
    pub fn anonymous() -> Self {
        Self {
            handled: true,
            anonymous: true,
            ..Self::unhandled()
        }
    }

    #[must_use]
    pub fn to_wire(&self) -> Vec<WireValue> {
        vec![
            WireValue::Bool(self.handled),
            WireValue::Bool(self.aborted),
            WireValue::Str(self.password.clone()),
            WireValue::Str(self.username.clone()),
            WireValue::Str(self.domain.clone()),
            WireValue::Bool(self.anonymous),
            WireValue::U32(self.password_save),
        ]
    }

    pub fn from_wire(args: &[WireValue]) -> Result<Self, WireError> {
        let mut reader = ArgReader::new(args);
        Ok(Self {
            handled: reader.read_bool()?,
            aborted: reader.read_bool()?,
            password: reader.read_str()?.to_string(),
            username: reader.read_str()?.to_string(),
            domain: reader.read_str()?.to_string(),
            anonymous: reader.read_bool()?,
            password_save: reader.read_u32()?,
        })
    }
}

impl From<AskPasswordReply> for PromptResult {
    fn from(reply: AskPasswordReply) -> Self {
        Self {
            handled: reply.handled,
            aborted: reply.aborted,
            password: Some(reply.password),
            username: Some(reply.username),
            domain: Some(reply.domain),
            anonymous: reply.anonymous,
            password_save: PasswordSave::from_code(reply.password_save),
        }
    }
}

impl fmt::Debug for AskPasswordReply {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AskPasswordReply")
            .field("handled", &self.handled)
            .field("aborted", &self.aborted)
            .field("password", &"<redacted>")
            .field("username", &self.username)
            .field("domain", &self.domain)
            .field("anonymous", &self.anonymous)
            .field("password_save", &self.password_save)
            .finish()
    }
}
