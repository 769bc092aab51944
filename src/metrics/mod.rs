// Private module declaration
mod server;

use prometheus::{
    Histogram, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry,
};

// Re-export for public API
pub use server::start_metrics_server;

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - Order RPCs (outcome, latency)
// - Orders and line items written
// - Catalog batch lookups (calls, ids per call)
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

pub const OUTCOME_OK: &str = "ok";

/// Central metrics registry for the order service
pub struct Metrics {
    registry: Registry,

    // RPC Metrics
    pub requests_total: IntCounterVec,
    pub request_duration: HistogramVec,

    // Write Metrics
    pub orders_created: IntCounter,
    pub line_items_created: IntCounter,

    // Catalog Metrics
    pub catalog_lookups: IntCounterVec,
    pub catalog_lookup_ids: Histogram,
}

impl Metrics {
    pub fn new() -> prometheus::Result<Self> {
        let registry = Registry::new();

        // RPC Metrics
        let requests_total = IntCounterVec::new(
            Opts::new("order_requests_total", "Order RPCs by method and outcome"),
            &["method", "outcome"],
        )?;
        registry.register(Box::new(requests_total.clone()))?;

        let request_duration = HistogramVec::new(
            HistogramOpts::new("order_request_duration_seconds", "Order RPC latency")
                .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0]),
            &["method"],
        )?;
        registry.register(Box::new(request_duration.clone()))?;

        // Write Metrics
        let orders_created = IntCounter::new("orders_created_total", "Orders persisted")?;
        registry.register(Box::new(orders_created.clone()))?;

        let line_items_created = IntCounter::new("order_line_items_total", "Order line items persisted")?;
        registry.register(Box::new(line_items_created.clone()))?;

        // Catalog Metrics
        let catalog_lookups = IntCounterVec::new(
            Opts::new("catalog_lookups_total", "Batched catalog lookups by calling method"),
            &["method"],
        )?;
        registry.register(Box::new(catalog_lookups.clone()))?;

        let catalog_lookup_ids = Histogram::with_opts(
            HistogramOpts::new("catalog_lookup_ids", "Product ids requested per catalog lookup")
                .buckets(vec![1.0, 2.0, 5.0, 10.0, 25.0, 50.0, 100.0, 250.0]),
        )?;
        registry.register(Box::new(catalog_lookup_ids.clone()))?;

        Ok(Self {
            registry,
            requests_total,
            request_duration,
            orders_created,
            line_items_created,
            catalog_lookups,
            catalog_lookup_ids,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Helper to record a finished RPC
    pub fn record_request(&self, method: &str, outcome: &str, duration_secs: f64) {
        self.requests_total.with_label_values(&[method, outcome]).inc();
        self.request_duration.with_label_values(&[method]).observe(duration_secs);
    }

    /// Helper to record a persisted order
    pub fn record_order_created(&self, line_items: usize) {
        self.orders_created.inc();
        self.line_items_created.inc_by(line_items as u64);
    }

    /// Helper to record one batched catalog call
    pub fn record_catalog_lookup(&self, method: &str, id_count: usize) {
        self.catalog_lookups.with_label_values(&[method]).inc();
        self.catalog_lookup_ids.observe(id_count as f64);
    }
}
