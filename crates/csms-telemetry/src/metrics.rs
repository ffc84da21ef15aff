//! Prometheus metrics for the CSMS services.
//!
//! All metrics follow the naming convention: `csms_<service>_<metric>_<unit>`
//!
//! ## Metric Types
//!
//! - **Counter**: Monotonically increasing value (e.g., authorization_timeouts_total)
//! - **Gauge**: Value that can go up or down (e.g., pending_waiters)
//! - **Histogram**: Distribution of values (e.g., authorization_duration_seconds)

// Metric construction only fails on malformed static names.
#![allow(clippy::expect_used)]

use lazy_static::lazy_static;
use prometheus::{
    exponential_buckets, Counter, CounterVec, Encoder, Gauge, Histogram, HistogramOpts, Opts,
    Registry, TextEncoder,
};
use std::sync::Arc;

use crate::TelemetryError;

lazy_static! {
    /// Metrics registry for the CSMS services
    pub static ref REGISTRY: Registry = Registry::new();

    // =========================================================================
    // TRANSACTION SERVICE
    // =========================================================================

    /// Authorizations finished, by outcome (an outcome literal, `timeout` or `error`)
    pub static ref AUTHORIZATIONS: CounterVec = CounterVec::new(
        Opts::new("csms_transactions_authorizations_total", "Authorization calls by outcome"),
        &["outcome"]
    ).expect("metric creation failed");

    /// Authorizations that gave up waiting for a reply
    pub static ref AUTHORIZATION_TIMEOUTS: Counter = Counter::new(
        "csms_transactions_authorization_timeouts_total",
        "Authorization calls that timed out waiting for a reply"
    ).expect("metric creation failed");

    /// End-to-end authorization latency
    pub static ref AUTHORIZATION_DURATION: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "csms_transactions_authorization_duration_seconds",
            "Time from request publish to settled outcome"
        ).buckets(exponential_buckets(0.001, 2.0, 14).expect("valid buckets"))
    ).expect("metric creation failed");

    /// Requests that could not be handed to the bus
    pub static ref PUBLISH_FAILURES: Counter = Counter::new(
        "csms_transactions_publish_failures_total",
        "Authentication requests that failed to publish"
    ).expect("metric creation failed");

    /// Replies with no live waiter
    pub static ref STALE_REPLIES: Counter = Counter::new(
        "csms_transactions_stale_replies_total",
        "Replies for unknown, settled or expired request ids"
    ).expect("metric creation failed");

    /// Waiters evicted before settlement (capacity or age)
    pub static ref LIVE_EVICTIONS: Counter = Counter::new(
        "csms_transactions_live_evictions_total",
        "Pending waiters evicted before a reply arrived"
    ).expect("metric creation failed");

    /// Waiters currently registered
    pub static ref PENDING_WAITERS: Gauge = Gauge::new(
        "csms_transactions_pending_waiters",
        "Pending authorization waiters"
    ).expect("metric creation failed");

    // =========================================================================
    // AUTHENTICATION SERVICE
    // =========================================================================

    /// Identity check decisions, by status
    pub static ref AUTH_DECISIONS: CounterVec = CounterVec::new(
        Opts::new("csms_authentication_decisions_total", "Identity check decisions by status"),
        &["status"]
    ).expect("metric creation failed");

    /// Bus records that could not be decoded
    pub static ref MALFORMED_MESSAGES: Counter = Counter::new(
        "csms_authentication_malformed_messages_total",
        "Request records dropped because they failed to decode"
    ).expect("metric creation failed");
}

/// Handle to the registry holding the CSMS metrics.
#[derive(Clone)]
pub struct MetricsHandle {
    registry: Arc<Registry>,
}

impl MetricsHandle {
    /// Gather and encode the current metric values.
    ///
    /// # Errors
    ///
    /// Returns `TelemetryError::MetricsInit` if encoding fails.
    pub fn encode(&self) -> Result<String, TelemetryError> {
        encode_registry(&self.registry)
    }
}

/// Register all metrics with [`REGISTRY`].
///
/// Safe to call more than once; already registered collectors are skipped.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if a collector is rejected for any
/// reason other than being registered already.
pub fn register_metrics() -> Result<MetricsHandle, TelemetryError> {
    let metrics: Vec<Box<dyn prometheus::core::Collector>> = vec![
        // Transactions
        Box::new(AUTHORIZATIONS.clone()),
        Box::new(AUTHORIZATION_TIMEOUTS.clone()),
        Box::new(AUTHORIZATION_DURATION.clone()),
        Box::new(PUBLISH_FAILURES.clone()),
        Box::new(STALE_REPLIES.clone()),
        Box::new(LIVE_EVICTIONS.clone()),
        Box::new(PENDING_WAITERS.clone()),
        // Authentication
        Box::new(AUTH_DECISIONS.clone()),
        Box::new(MALFORMED_MESSAGES.clone()),
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

/// Encode all metrics as Prometheus text format.
///
/// # Errors
///
/// Returns `TelemetryError::MetricsInit` if encoding fails.
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

/// Timer guard for automatic histogram observation.
pub struct HistogramTimer {
    histogram: Histogram,
    start: std::time::Instant,
}

impl HistogramTimer {
    /// Start a new timer for the given histogram.
    pub fn new(histogram: &Histogram) -> Self {
        Self {
            histogram: histogram.clone(),
            start: std::time::Instant::now(),
        }
    }
}

impl Drop for HistogramTimer {
    fn drop(&mut self) {
        let duration = self.start.elapsed().as_secs_f64();
        self.histogram.observe(duration);
    }
}
