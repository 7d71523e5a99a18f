//! Prometheus metrics for the tournament server.
//!
//! Metrics are exposed in Prometheus text format when an exporter address is
//! configured; otherwise every recording call is a no-op.
//!
//! # Example Usage
//!
//! ```rust,no_run
//! use sl_server::metrics;
//! use std::net::SocketAddr;
//!
//! let addr: SocketAddr = "127.0.0.1:9090".parse().unwrap();
//! metrics::init_metrics(addr).unwrap();
//!
//! metrics::commands_total("advance_round", "ok");
//! metrics::pairing_duration_ms(3.2);
//! ```

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Initialize Prometheus metrics exporter.
///
/// Metrics will be available at `http://<addr>/metrics`.
pub fn init_metrics(addr: SocketAddr) -> Result<(), String> {
    PrometheusBuilder::new()
        .with_http_listener(addr)
        .install()
        .map_err(|e| format!("Failed to install Prometheus exporter: {}", e))
}

// ============================================================================
// Command Metrics
// ============================================================================

/// Count a tournament command by name and outcome label
pub fn commands_total(command: &str, outcome: &str) {
    metrics::counter!("tournament_commands_total",
        "command" => command.to_string(),
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record command duration in milliseconds
pub fn command_duration_ms(command: &str, duration_ms: f64) {
    metrics::histogram!("tournament_command_duration_ms",
        "command" => command.to_string()
    )
    .record(duration_ms);
}

// ============================================================================
// Engine Metrics
// ============================================================================

/// Record the time spent pairing one round
pub fn pairing_duration_ms(duration_ms: f64) {
    metrics::histogram!("round_pairing_duration_ms").record(duration_ms);
}

/// Set the number of stored tournaments
pub fn tournaments_stored(count: usize) {
    metrics::gauge!("tournaments_stored").set(count as f64);
}
