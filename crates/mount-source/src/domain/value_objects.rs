//! # Value Objects
//!
//! Flag sets and codes exchanged with the prompt handler. Numeric values are
//! part of the wire contract and must not change.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{BitOr, BitOrAssign};

/// What the prompt should ask for.
///
/// Bits not named here are carried through untouched so a newer handler can
/// see flags this crate does not know about.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AskFlags(u32);

impl AskFlags {
    pub const NEED_PASSWORD: Self = Self(1 << 0);
    pub const NEED_USERNAME: Self = Self(1 << 1);
    pub const NEED_DOMAIN: Self = Self(1 << 2);
    pub const SAVING_SUPPORTED: Self = Self(1 << 3);
    pub const ANONYMOUS_SUPPORTED: Self = Self(1 << 4);

    #[must_use]
    pub const fn empty() -> Self {
        Self(0)
    }

    #[must_use]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    #[must_use]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// True when every bit of `other` is set.
    #[must_use]
    pub const fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for AskFlags {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl BitOrAssign for AskFlags {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl fmt::Display for AskFlags {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        const NAMES: [(AskFlags, &str); 5] = [
            (AskFlags::NEED_PASSWORD, "NEED_PASSWORD"),
            (AskFlags::NEED_USERNAME, "NEED_USERNAME"),
            (AskFlags::NEED_DOMAIN, "NEED_DOMAIN"),
            (AskFlags::SAVING_SUPPORTED, "SAVING_SUPPORTED"),
            (AskFlags::ANONYMOUS_SUPPORTED, "ANONYMOUS_SUPPORTED"),
        ];

        let mut names: Vec<String> = NAMES
            .iter()
            .filter(|(flag, _)| self.contains(*flag))
            .map(|(_, name)| (*name).to_string())
            .collect();

        let known = NAMES.iter().fold(0, |acc, (flag, _)| acc | flag.0);
        let unknown = self.0 & !known;
        if unknown != 0 {
            names.push(format!("{unknown:#x}"));
        }

        if names.is_empty() {
            write!(f, "(none)")
        } else {
            write!(f, "{}", names.join("|"))
        }
    }
}

/// How long the answered password may be remembered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u32)]
pub enum PasswordSave {
    #[default]
    Never = 0,
    ForSession = 1,
    Permanently = 2,
}

impl PasswordSave {
    /// Map a wire code. Unknown codes fall back to [`PasswordSave::Never`].
    #[must_use]
    pub fn from_code(code: u32) -> Self {
        match code {
            1 => Self::ForSession,
            2 => Self::Permanently,
            _ => Self::Never,
        }
    }

    #[must_use]
    pub fn code(self) -> u32 {
        self as u32
    }
}

/// Final outcome reported to a mount operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MountOperationResult {
    /// Credentials were supplied.
    Handled,
    /// The user cancelled, or the prompt could not complete.
    Aborted,
    /// Nobody handled the prompt.
    Unhandled,
}

impl MountOperationResult {
    /// Label used in metrics and logs.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Handled => "handled",
            Self::Aborted => "aborted",
            Self::Unhandled => "unhandled",
        }
    }
}

impl fmt::Display for MountOperationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
