// Private module declaration
mod server;

use prometheus::{Encoder, IntCounter, IntCounterVec, Opts, Registry, TextEncoder};

// Re-export for public API
pub use server::{health_handler, metrics_handler};

// ============================================================================
// Metrics Module - Prometheus metrics for observability
// ============================================================================
//
// Provides metrics for:
// - HTTP traffic (per route pattern and status)
// - Stock movements caused by cart/order line changes
// - Order lifecycle (creation, status transitions, checkouts)
//
// All metrics are registered with Prometheus and can be scraped via /metrics
// ============================================================================

pub struct Metrics {
    registry: Registry,

    // HTTP Metrics
    pub http_requests_total: IntCounterVec,

    // Inventory Metrics
    pub stock_adjustments_total: IntCounterVec,
    pub stock_units_moved_total: IntCounterVec,

    // Order Metrics
    pub orders_created_total: IntCounter,
    pub order_status_transitions_total: IntCounterVec,
    pub checkouts_total: IntCounter,
}

impl Metrics {
    pub fn new() -> anyhow::Result<Self> {
        let registry = Registry::new();

        // HTTP Metrics
        let http_requests_total = IntCounterVec::new(
            Opts::new("http_requests_total", "Total HTTP requests served"),
            &["route", "status"],
        )?;
        registry.register(Box::new(http_requests_total.clone()))?;

        // Inventory Metrics
        let stock_adjustments_total = IntCounterVec::new(
            Opts::new("stock_adjustments_total", "Variation stock writes caused by line changes"),
            &["direction"],
        )?;
        registry.register(Box::new(stock_adjustments_total.clone()))?;

        let stock_units_moved_total = IntCounterVec::new(
            Opts::new("stock_units_moved_total", "Units reserved or released"),
            &["direction"],
        )?;
        registry.register(Box::new(stock_units_moved_total.clone()))?;

        // Order Metrics
        let orders_created_total = IntCounter::new("orders_created_total", "Total orders created")?;
        registry.register(Box::new(orders_created_total.clone()))?;

        let order_status_transitions_total = IntCounterVec::new(
            Opts::new("order_status_transitions_total", "Order status transitions"),
            &["from_status", "to_status"],
        )?;
        registry.register(Box::new(order_status_transitions_total.clone()))?;

        let checkouts_total = IntCounter::new("checkouts_total", "Carts converted into orders")?;
        registry.register(Box::new(checkouts_total.clone()))?;

        Ok(Self {
            registry,
            http_requests_total,
            stock_adjustments_total,
            stock_units_moved_total,
            orders_created_total,
            order_status_transitions_total,
            checkouts_total,
        })
    }

    /// Get the Prometheus registry for exposing metrics via HTTP
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Render every registered metric in the text exposition format
    pub fn render(&self) -> anyhow::Result<String> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        Ok(String::from_utf8(buffer)?)
    }

    pub fn record_request(&self, route: &str, status: u16) {
        let status = status.to_string();
        self.http_requests_total
            .with_label_values(&[route, status.as_str()])
            .inc();
    }

    /// Helper to record a stock write; `direction` is "reserve" or "release"
    pub fn record_stock_adjustment(&self, direction: &str, units: i32) {
        self.stock_adjustments_total.with_label_values(&[direction]).inc();
        self.stock_units_moved_total
            .with_label_values(&[direction])
            .inc_by(u64::from(units.unsigned_abs()));
    }

    pub fn record_status_transition(&self, from_status: &str, to_status: &str) {
        self.order_status_transitions_total
            .with_label_values(&[from_status, to_status])
            .inc();
    }
}
