//! # Domain Entities
//!
//! A password prompt as dispatched to the handler, and the answer that comes
//! back.

use crate::domain::{AskFlags, PasswordSave, SourceIdentity};
use std::fmt;
use std::sync::Arc;

/// One password prompt, ready to dispatch.
///
/// Absent text arguments are normalized to empty strings on construction;
/// the handler never sees a missing field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptRequest {
    pub identity: Arc<SourceIdentity>,
    pub message: String,
    pub default_user: String,
    pub default_domain: String,
    pub flags: AskFlags,
}

impl PromptRequest {
    pub fn new(
        identity: Arc<SourceIdentity>,
        message: Option<&str>,
        default_user: Option<&str>,
        default_domain: Option<&str>,
        flags: AskFlags,
    ) -> Self {
        Self {
            identity,
            message: message.unwrap_or_default().to_string(),
            default_user: default_user.unwrap_or_default().to_string(),
            default_domain: default_domain.unwrap_or_default().to_string(),
            flags,
        }
    }
}

/// Answer to a prompt.
///
/// `handled` is always true on a result returned to callers: an unhandled
/// prompt surfaces as [`crate::MountSourceError::Unhandled`] instead. When
/// `aborted` is set the credential fields carry no meaning.
#[derive(Clone, PartialEq, Eq)]
pub struct PromptResult {
    pub handled: bool,
    pub aborted: bool,
    pub password: Option<String>,
    pub username: Option<String>,
    pub domain: Option<String>,
    pub anonymous: bool,
    pub password_save: PasswordSave,
}

impl PromptResult {
    /// Result for a prompt that could not complete: the user cancelled, the
    /// handler vanished, or the deadline passed.
    #[must_use]
    pub fn aborted() -> Self {
        Self {
            handled: true,
            aborted: true,
            password: None,
            username: None,
            domain: None,
            anonymous: false,
            password_save: PasswordSave::Never,
        }
    }

    /// Result carrying credentials.
    pub fn answered(
        password: impl Into<String>,
        username: impl Into<String>,
        domain: impl Into<String>,
        password_save: PasswordSave,
    ) -> Self {
        Self {
            handled: true,
            aborted: false,
            password: Some(password.into()),
            username: Some(username.into()),
            domain: Some(domain.into()),
            anonymous: false,
            password_save,
        }
    }
}

// Keep credentials out of logs and panic messages.
impl fmt::Debug for PromptResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PromptResult")
            .field("handled", &self.handled)
            .field("aborted", &self.aborted)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("username", &self.username)
            .field("domain", &self.domain)
            .field("anonymous", &self.anonymous)
            .field("password_save", &self.password_save)
            .finish()
    }
}
