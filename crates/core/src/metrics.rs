//! Prometheus metrics for core components.
//!
//! This module provides metrics for:
//! - Orchestrator (submissions, terminal results, processing duration)
//! - Modality processors (per-item outcomes)
//! - External collaborators (request counts by service and status)

use once_cell::sync::Lazy;
use prometheus::{Histogram, HistogramOpts, IntCounter, IntCounterVec, Opts};

/// Submissions registered with the orchestrator.
pub static SUBMISSIONS_RECEIVED: Lazy<IntCounter> = Lazy::new(|| {
    IntCounter::new(
        "intake_submissions_received_total",
        "Total submissions registered",
    )
    .unwrap()
});

/// Submissions by terminal result.
pub static SUBMISSIONS_TOTAL: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "intake_submissions_total",
            "Total submissions reaching a terminal state",
        ),
        &["result"], // "completed", "error", "cancelled"
    )
    .unwrap()
});

/// Per-modality item outcomes.
pub static MODALITY_ITEMS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new("intake_modality_items_total", "Total modality items processed"),
        &["modality", "result"], // modality: "image", "audio", "document"
    )
    .unwrap()
});

/// Wall-clock processing duration from dispatch to aggregation.
pub static PROCESSING_DURATION: Lazy<Histogram> = Lazy::new(|| {
    Histogram::with_opts(
        HistogramOpts::new(
            "intake_processing_duration_seconds",
            "Duration of submission processing",
        )
        .buckets(vec![0.01, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0, 30.0]),
    )
    .unwrap()
});

/// Collaborator requests by service and status.
pub static COLLABORATOR_REQUESTS: Lazy<IntCounterVec> = Lazy::new(|| {
    IntCounterVec::new(
        Opts::new(
            "intake_collaborator_requests_total",
            "Total external collaborator requests",
        ),
        &["service", "status"], // service: "vision", "ocr", "speech", "document_parser"
    )
    .unwrap()
});

/// Get all core metrics for registration in a registry.
pub fn all_metrics() -> Vec<Box<dyn prometheus::core::Collector>> {
    vec![
        Box::new(SUBMISSIONS_RECEIVED.clone()),
        Box::new(SUBMISSIONS_TOTAL.clone()),
        Box::new(MODALITY_ITEMS.clone()),
        Box::new(PROCESSING_DURATION.clone()),
        Box::new(COLLABORATOR_REQUESTS.clone()),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_metrics_register_cleanly() {
        let registry = prometheus::Registry::new();
        for metric in all_metrics() {
            registry.register(metric).unwrap();
        }
    }
}
