// Copyright (c) 2025 Erick Bourgeois, firestoned
// SPDX-License-Identifier: MIT

//! Prometheus metrics for zonesync.
//!
//! All metrics carry the `zonesync_` prefix and live in one registry.
//!
//! # Metrics Categories
//!
//! - **Apply Metrics** - Outcomes and duration of zone apply calls
//! - **Change Metrics** - RRsets sent to the control API by changetype
//! - **Auto-PTR Metrics** - PTR writes and reverse zone creation
//! - **Error Metrics** - Failures by category
//!
//! # Example
//!
//! ```rust,no_run
//! use zonesync::metrics::{gather_metrics, record_apply};
//!
//! record_apply("ok", std::time::Duration::from_millis(40));
//! println!("{}", gather_metrics().unwrap());
//! ```

use prometheus::{
    Counter, CounterVec, Encoder, HistogramOpts, HistogramVec, Opts, Registry, TextEncoder,
};
use std::sync::LazyLock;
use std::time::Duration;

// ============================================================================
// Metric Name Constants
// ============================================================================

/// Namespace prefix for all zonesync metrics
const METRICS_NAMESPACE: &str = "zonesync";

// ============================================================================
// Global Metrics Registry
// ============================================================================

/// Global Prometheus metrics registry
pub static METRICS_REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

// ============================================================================
// Apply Metrics
// ============================================================================

/// Total number of apply calls by outcome
///
/// Labels:
/// - `outcome`: `ok`, `noop`, or the error kind (`remote_api`, `conflict`, ...)
pub static APPLY_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_applies_total"),
        "Total number of zone apply calls by outcome",
    );
    let counter = CounterVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Duration of apply calls in seconds
pub static APPLY_DURATION_SECONDS: LazyLock<HistogramVec> = LazyLock::new(|| {
    let opts = HistogramOpts::new(
        format!("{METRICS_NAMESPACE}_apply_duration_seconds"),
        "Duration of zone apply calls in seconds",
    )
    .buckets(vec![0.001, 0.01, 0.1, 0.5, 1.0, 2.0, 5.0, 10.0, 30.0]);
    let histogram = HistogramVec::new(opts, &["outcome"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(histogram.clone()))
        .unwrap();
    histogram
});

// ============================================================================
// Change Metrics
// ============================================================================

/// Total number of RRsets sent to the control API
///
/// Labels:
/// - `changetype`: `REPLACE` or `DELETE`
pub static RRSETS_PATCHED_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_rrsets_patched_total"),
        "Total number of RRsets sent to the control API by changetype",
    );
    let counter = CounterVec::new(opts, &["changetype"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Auto-PTR Metrics
// ============================================================================

/// Total number of PTR operations
///
/// Labels:
/// - `operation`: `add` or `delete`
pub static PTR_OPERATIONS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_ptr_operations_total"),
        "Total number of automatic PTR operations",
    );
    let counter = CounterVec::new(opts, &["operation"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of reverse zones created
pub static REVERSE_ZONES_CREATED_TOTAL: LazyLock<Counter> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_reverse_zones_created_total"),
        "Total number of reverse zones created by auto-PTR",
    );
    let counter = Counter::with_opts(opts).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Error Metrics
// ============================================================================

/// Total number of errors by category
///
/// Labels:
/// - `error_type`: Category of error (`remote_api`, `auto_ptr`, `history`, ...)
pub static ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_errors_total"),
        "Total number of errors by category",
    );
    let counter = CounterVec::new(opts, &["error_type"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

/// Total number of failed control API requests
///
/// Labels:
/// - `category`: `connection`, `http_status`, `embedded` or `decode`
/// - `reason`: HTTP reason code (`ApiUnprocessable`, ...) or the category
pub static API_ERRORS_TOTAL: LazyLock<CounterVec> = LazyLock::new(|| {
    let opts = Opts::new(
        format!("{METRICS_NAMESPACE}_api_errors_total"),
        "Total number of failed control API requests",
    );
    let counter = CounterVec::new(opts, &["category", "reason"]).unwrap();
    METRICS_REGISTRY
        .register(Box::new(counter.clone()))
        .unwrap();
    counter
});

// ============================================================================
// Helper Functions
// ============================================================================

/// Record the outcome of an apply call
///
/// # Arguments
/// * `outcome` - `ok`, `noop` or an error kind
/// * `duration` - Wall time of the call
pub fn record_apply(outcome: &str, duration: Duration) {
    APPLY_TOTAL.with_label_values(&[outcome]).inc();
    APPLY_DURATION_SECONDS
        .with_label_values(&[outcome])
        .observe(duration.as_secs_f64());
}

/// Record RRsets sent in one batch
#[allow(clippy::cast_precision_loss)]
pub fn record_rrsets_patched(changetype: &str, count: usize) {
    RRSETS_PATCHED_TOTAL
        .with_label_values(&[changetype])
        .inc_by(count as f64);
}

/// Record PTR operations
#[allow(clippy::cast_precision_loss)]
pub fn record_ptr_operations(operation: &str, count: usize) {
    PTR_OPERATIONS_TOTAL
        .with_label_values(&[operation])
        .inc_by(count as f64);
}

/// Record creation of a reverse zone
pub fn record_reverse_zone_created() {
    REVERSE_ZONES_CREATED_TOTAL.inc();
}

/// Record an error
///
/// # Arguments
/// * `error_type` - Category of error
pub fn record_error(error_type: &str) {
    ERRORS_TOTAL.with_label_values(&[error_type]).inc();
}

/// Record a failed control API request
pub fn record_api_error(category: &str, reason: &str) {
    API_ERRORS_TOTAL
        .with_label_values(&[category, reason])
        .inc();
}

/// Gather and encode all metrics in Prometheus text format
///
/// # Errors
/// Returns error if encoding fails
pub fn gather_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = METRICS_REGISTRY.gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(format!("UTF-8 error: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_apply() {
        record_apply("test_outcome", Duration::from_millis(500));

        let counter = APPLY_TOTAL.with_label_values(&["test_outcome"]);
        assert!(counter.get() > 0.0);

        let histogram = APPLY_DURATION_SECONDS.with_label_values(&["test_outcome"]);
        assert!(histogram.get_sample_count() > 0);
    }

    #[test]
    fn test_record_rrsets_patched_adds_count() {
        let before = RRSETS_PATCHED_TOTAL.with_label_values(&["TEST"]).get();
        record_rrsets_patched("TEST", 3);
        let after = RRSETS_PATCHED_TOTAL.with_label_values(&["TEST"]).get();
        assert!(after - before >= 3.0);
    }

    #[test]
    fn test_record_api_error() {
        let before = API_ERRORS_TOTAL
            .with_label_values(&["test_category", "TestReason"])
            .get();
        record_api_error("test_category", "TestReason");
        let after = API_ERRORS_TOTAL
            .with_label_values(&["test_category", "TestReason"])
            .get();
        assert!(after - before >= 1.0);
    }

    #[test]
    fn test_gather_metrics() {
        record_error("gather_test");

        let metrics_text = gather_metrics().expect("gathering metrics should succeed");
        assert!(metrics_text.contains("zonesync_errors_total"));
    }
}
