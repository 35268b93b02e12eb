//! # Mount Telemetry
//!
//! Logging and metrics for the mount-source workspace.
//!
//! ## Components
//!
//! - **Logging**: `tracing-subscriber` registry with env filter, pretty or JSON output
//! - **Metrics**: Prometheus counters for prompts and bus calls
//!
//! ## Usage
//!
//! ```rust,ignore
//! use mount_telemetry::{init_telemetry, TelemetryConfig};
//!
//! fn main() {
//!     let config = TelemetryConfig::from_env();
//!     let _guard = init_telemetry(config).expect("Failed to init telemetry");
//! }
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `MS_SERVICE_NAME` | `mount-source` | Service name in logs |
//! | `MS_LOG_LEVEL` | `info` | Log level filter |
//! | `MS_CONSOLE_OUTPUT` | `true` | Emit log lines at all |
//! | `MS_JSON_LOGS` | `false` | JSON formatted log lines |

mod config;
mod logging;
pub mod metrics;

pub use config::TelemetryConfig;
pub use logging::{init_logging, init_test_logging};
pub use metrics::{
    encode_metrics, record_bus_call, record_prompt, register_metrics, MetricsHandle, BUS_CALLS,
    OPERATION_REPLIES, PROMPTS_COMPLETED, PROMPTS_DISPATCHED,
};

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    #[error("Failed to initialize logging: {0}")]
    LoggingInit(String),

    #[error("Failed to initialize Prometheus metrics: {0}")]
    MetricsInit(String),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging and metrics.
///
/// Returns a guard that should be held for the lifetime of the application.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    // Metrics first, so counters bumped during startup are exported
    let metrics_handle = register_metrics()?;

    logging::init_logging(&config)?;

    Ok(TelemetryGuard {
        _metrics: metrics_handle,
        service_name: config.service_name,
    })
}

/// Guard that keeps telemetry active.
pub struct TelemetryGuard {
    _metrics: MetricsHandle,
    service_name: String,
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        tracing::info!(service = %self.service_name, "Shutting down telemetry");
    }
}

/// Span wrapping one prompt round trip.
///
/// # Example
///
/// ```rust,ignore
/// let span = mount_telemetry::prompt_span!("ask_password", endpoint = "svc:1");
/// ```
#[macro_export]
macro_rules! prompt_span {
    ($name:expr, $($field:tt)*) => {
        tracing::info_span!($name, $($field)*)
    };
}
