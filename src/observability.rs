use std::net::SocketAddr;

use crate::model::BedEvent;

// ── RED metrics (request-driven) ────────────────────────────────

/// Counter: total mutations dispatched. Labels: op, status.
pub const OPS_TOTAL: &str = "bedboard_ops_total";

/// Histogram: mutation latency in seconds (dispatch through refresh). Labels: op.
pub const OP_DURATION_SECONDS: &str = "bedboard_op_duration_seconds";

/// Counter: local precondition failures that blocked a dispatch. Labels: op.
pub const PRECONDITION_FAILURES_TOTAL: &str = "bedboard_precondition_failures_total";

/// Counter: full cache refreshes.
pub const REFRESHES_TOTAL: &str = "bedboard_refreshes_total";

/// Histogram: refresh latency in seconds.
pub const REFRESH_DURATION_SECONDS: &str = "bedboard_refresh_duration_seconds";

// ── USE metrics (occupancy state) ───────────────────────────────

/// Gauge: beds in inventory.
pub const BEDS_TOTAL: &str = "bedboard_beds_total";

/// Gauge: occupied beds.
pub const BEDS_OCCUPIED: &str = "bedboard_beds_occupied";

/// Gauge: available beds.
pub const BEDS_AVAILABLE: &str = "bedboard_beds_available";

/// Counter: candidate rows dropped for lacking a member ID or for an ID
/// already occupying a bed.
pub const CANDIDATES_FILTERED_TOTAL: &str = "bedboard_candidates_filtered_total";

/// Install Prometheus metrics exporter on the given port. No-op if port is None.
pub fn init(port: Option<u16>) {
    let Some(port) = port else { return };
    let addr: SocketAddr = ([0, 0, 0, 0], port).into();
    metrics_exporter_prometheus::PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .expect("failed to install Prometheus metrics exporter");
    tracing::info!("metrics endpoint: http://0.0.0.0:{port}/metrics");
}

/// Map an event to a short label for metrics and logs.
pub fn event_label(event: &BedEvent) -> &'static str {
    match event {
        BedEvent::Allocated { .. } => "allocate",
        BedEvent::Discharged { .. } => "discharge",
        BedEvent::DischargeDateUpdated { .. } => "update_discharge",
    }
}
