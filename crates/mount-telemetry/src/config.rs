//! Telemetry configuration from environment variables.

use std::env;

/// Configuration for logging and metrics.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    /// Service name attached to every log line
    pub service_name: String,

    /// Log level filter (trace, debug, info, warn, error)
    pub log_level: String,

    /// Whether to enable console output (for development)
    pub console_output: bool,

    /// Whether to enable JSON formatted logs
    pub json_logs: bool,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "mount-source".to_string(),
            log_level: "info".to_string(),
            console_output: true,
            json_logs: false,
        }
    }
}

impl TelemetryConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `MS_SERVICE_NAME`: Service name (default: mount-source)
    /// - `MS_LOG_LEVEL` or `RUST_LOG`: Log level (default: info)
    /// - `MS_CONSOLE_OUTPUT`: Enable console output (default: true)
    /// - `MS_JSON_LOGS`: Enable JSON logs (default: false, true under systemd)
    pub fn from_env() -> Self {
        let under_journal = env::var("JOURNAL_STREAM").is_ok();

        Self {
            service_name: env::var("MS_SERVICE_NAME")
                .unwrap_or_else(|_| "mount-source".to_string()),

            log_level: env::var("MS_LOG_LEVEL")
                .or_else(|_| env::var("RUST_LOG"))
                .unwrap_or_else(|_| "info".to_string()),

            console_output: env::var("MS_CONSOLE_OUTPUT")
                .map(|v| parse_flag(&v, true))
                .unwrap_or(true),

            json_logs: env::var("MS_JSON_LOGS")
                .map(|v| parse_flag(&v, false))
                .unwrap_or(under_journal),
        }
    }

    /// Create configuration for a named component (e.g. a prompt agent).
    pub fn for_component(component: &str) -> Self {
        let mut config = Self::from_env();
        config.service_name = format!("mount-source-{}", component);
        config
    }
}

/// Interpret an on/off environment value, falling back to `default` when unrecognized.
fn parse_flag(value: &str, default: bool) -> bool {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => true,
        "0" | "false" | "no" | "off" => false,
        _ => default,
    }
}
