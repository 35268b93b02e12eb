//! Mount source configuration.

use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Interface implemented by prompt handlers.
pub const MOUNT_OPERATION_INTERFACE: &str = "org.gtk.vfs.MountOperation";

/// Prompt method on [`MOUNT_OPERATION_INTERFACE`].
pub const ASK_PASSWORD_METHOD: &str = "askPassword";

/// A human answers the prompt, so the deadline is generous.
pub const DEFAULT_ASK_PASSWORD_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Configuration of a [`crate::MountSource`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MountSourceConfig {
    /// How long a prompt may stay unanswered before it counts as aborted
    pub ask_password_timeout: Duration,

    /// Interface name used on the bus
    pub interface: String,

    /// Method name used on the bus
    pub ask_password_method: String,
}

impl Default for MountSourceConfig {
    fn default() -> Self {
        Self {
            ask_password_timeout: DEFAULT_ASK_PASSWORD_TIMEOUT,
            interface: MOUNT_OPERATION_INTERFACE.to_string(),
            ask_password_method: ASK_PASSWORD_METHOD.to_string(),
        }
    }
}

impl MountSourceConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MS_ASK_PASSWORD_TIMEOUT_SECS`: Prompt deadline in seconds (default: 1800).
    ///   Zero or unparsable values keep the default.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Some(timeout) = env::var("MS_ASK_PASSWORD_TIMEOUT_SECS")
            .ok()
            .and_then(|v| parse_timeout_secs(&v))
        {
            config.ask_password_timeout = timeout;
        }
        config
    }

    /// Override the prompt deadline.
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.ask_password_timeout = timeout;
        self
    }
}

fn parse_timeout_secs(value: &str) -> Option<Duration> {
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => None,
        Ok(secs) => Some(Duration::from_secs(secs)),
    }
}
