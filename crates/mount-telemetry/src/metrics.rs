//! Prometheus metrics for the credential-request bridge.
//!
//! All metrics follow the naming convention: `ms_<area>_<metric>_total`

use lazy_static::lazy_static;
use prometheus::{CounterVec, Encoder, IntCounter, Opts, Registry, TextEncoder};
use std::sync::Arc;

use crate::TelemetryError;

/// Label values for `ms_prompts_completed_total`.
pub mod prompt_outcome {
    pub const HANDLED: &str = "handled";
    pub const ABORTED: &str = "aborted";
    pub const UNHANDLED: &str = "unhandled";
    pub const NO_RESPONDER: &str = "no_responder";
    /// The request task was dropped before it completed.
    pub const CANCELLED: &str = "cancelled";
}

/// Label values for `ms_bus_calls_total`.
pub mod call_outcome {
    pub const REPLIED: &str = "replied";
    pub const REMOTE_ERROR: &str = "remote_error";
    pub const TIMEOUT: &str = "timeout";
    pub const NO_REPLY: &str = "no_reply";
    pub const UNKNOWN_ENDPOINT: &str = "unknown_endpoint";
    pub const LATE_REPLY: &str = "late_reply";
}

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // PROMPT METRICS
    // =========================================================================

    /// Prompts that left the process
    pub static ref PROMPTS_DISPATCHED: IntCounter = IntCounter::new(
        "ms_prompts_dispatched_total",
        "Total number of askPassword requests dispatched to a prompt handler"
    ).expect("metric creation failed");

    /// Prompt completions by outcome
    pub static ref PROMPTS_COMPLETED: CounterVec = CounterVec::new(
        Opts::new("ms_prompts_completed_total", "Completed prompts by outcome"),
        &["outcome"]  // handled, aborted, unhandled, no_responder, cancelled
    ).expect("metric creation failed");

    /// Mount operation replies by code
    pub static ref OPERATION_REPLIES: CounterVec = CounterVec::new(
        Opts::new("ms_operation_replies_total", "Mount operation replies by result code"),
        &["code"]
    ).expect("metric creation failed");

    // =========================================================================
    // BUS METRICS
    // =========================================================================

    /// Bus method calls by outcome
    pub static ref BUS_CALLS: CounterVec = CounterVec::new(
        Opts::new("ms_bus_calls_total", "Bus method calls by outcome"),
        &["outcome"]
    ).expect("metric creation failed");
}

/// Handle for the registered metric set
pub struct MetricsHandle {
    _registry: Arc<Registry>,
}

/// Register all metrics with the global registry.
///
/// Fails if called more than once per process.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        Box::new(PROMPTS_DISPATCHED.clone()),
        Box::new(PROMPTS_COMPLETED.clone()),
        Box::new(OPERATION_REPLIES.clone()),
        Box::new(BUS_CALLS.clone()),
    ];

    for metric in metrics {
        REGISTRY
            .register(metric)
            .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    }

    Ok(MetricsHandle {
        _registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all registered metrics as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}

/// Record one prompt completion.
pub fn record_prompt(outcome: &str) {
    PROMPTS_COMPLETED.with_label_values(&[outcome]).inc();
}

/// Record one bus call resolution.
pub fn record_bus_call(outcome: &str) {
    BUS_CALLS.with_label_values(&[outcome]).inc();
}
