//! Prometheus metrics for Harvest-Chain.
//!
//! All metrics follow the naming convention: `hc_<metric>_<unit>`.
//! Counters are incremented by the lifecycle engine after a mutation has been
//! applied; rejected operations are counted by operation name.

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Global metrics registry
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // LEDGER
    // =========================================================================

    /// Total product batches registered
    pub static ref PRODUCTS_CREATED: Counter = Counter::new(
        "hc_products_created_total",
        "Total number of product batches created"
    ).expect("metric creation failed");

    /// Total stage advances, single and batched
    pub static ref STAGE_UPDATES: Counter = Counter::new(
        "hc_stage_updates_total",
        "Total number of applied stage updates"
    ).expect("metric creation failed");

    /// Total custody transfers
    pub static ref TRANSFERS: Counter = Counter::new(
        "hc_transfers_total",
        "Total number of ownership transfers"
    ).expect("metric creation failed");

    /// Total quality assessments appended
    pub static ref QUALITY_RECORDS: Counter = Counter::new(
        "hc_quality_records_total",
        "Total number of quality records appended"
    ).expect("metric creation failed");

    // =========================================================================
    // FAILURES
    // =========================================================================

    /// Operations rejected by validation
    pub static ref OPERATIONS_REJECTED: CounterVec = CounterVec::new(
        Opts::new("hc_operations_rejected_total", "Operations rejected by validation"),
        &["operation"]
    ).expect("metric creation failed");

    /// Post-commit notifications that could not be delivered
    pub static ref NOTIFICATIONS_DROPPED: CounterVec = CounterVec::new(
        Opts::new("hc_notifications_dropped_total", "Notifications dropped after commit"),
        &["channel"]  // channel: registry/events
    ).expect("metric creation failed");

    // =========================================================================
    // LATENCY
    // =========================================================================

    /// Time spent inside the engine per operation
    pub static ref OPERATION_DURATION: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "hc_operation_duration_seconds",
            "Time spent executing lifecycle operations"
        ).buckets(exponential_buckets(0.0001, 2.0, 14).expect("valid buckets")),
        &["operation"]
    ).expect("metric creation failed");
}

/// Handle to the registered metrics. Keeps the registry alive.
#[derive(Clone)]
pub struct MetricsHandle {
    registry: Arc<Registry>,
}

impl MetricsHandle {
    /// Render the current metric values in Prometheus text format.
    pub fn encode(&self) -> Result<String, TelemetryError> {
        encode_registry(&self.registry)
    }
}

/// Register all metrics with the global registry.
///
/// Registering twice is not an error; already registered collectors are
/// skipped.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Ledger
        Box::new(PRODUCTS_CREATED.clone()),
        Box::new(STAGE_UPDATES.clone()),
        Box::new(TRANSFERS.clone()),
        Box::new(QUALITY_RECORDS.clone()),
        // Failures
        Box::new(OPERATIONS_REJECTED.clone()),
        Box::new(NOTIFICATIONS_DROPPED.clone()),
        // Latency
        Box::new(OPERATION_DURATION.clone()),
    ];

    for metric in metrics {
        match REGISTRY.register(metric) {
            Ok(()) | Err(prometheus::Error::AlreadyReg) => {}
            Err(e) => return Err(TelemetryError::MetricsInit(e.to_string())),
        }
    }

    Ok(MetricsHandle {
        registry: Arc::new(REGISTRY.clone()),
    })
}

/// Encode all metrics in the global registry as Prometheus text format.
pub fn encode_metrics() -> Result<String, TelemetryError> {
    encode_registry(&REGISTRY)
}

fn encode_registry(registry: &Registry) -> Result<String, TelemetryError> {
    let encoder = TextEncoder::new();
    let metric_families = registry.gather();
    let mut buffer = Vec::new();
    encoder
        .encode(&metric_families, &mut buffer)
        .map_err(|e| TelemetryError::MetricsInit(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsInit(e.to_string()))
}
