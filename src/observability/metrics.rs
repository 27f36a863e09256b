//! Metrics collection and exposition.
//!
//! # Metrics
//! - `api_requests_total` (counter): requests by method (standard methods, else
//!   `other`), resolution outcome, status
//! - `api_request_duration_seconds` (histogram): latency distribution
//! - `api_route_reloads_total` (counter): route map rebuilds by result
//!
//! Recording is a no-op until a recorder is installed.

use std::net::SocketAddr;
use std::time::Instant;

use metrics_exporter_prometheus::PrometheusBuilder;

/// Install the Prometheus recorder and its scrape endpoint.
pub fn init_metrics(addr: SocketAddr) {
    match PrometheusBuilder::new().with_http_listener(addr).install() {
        Ok(()) => tracing::info!(address = %addr, "Metrics endpoint listening"),
        Err(e) => tracing::error!(error = %e, "Failed to install metrics exporter"),
    }
}

/// Bounded `method` label: extension methods share one series.
pub fn method_label(method: &str) -> &'static str {
    match method {
        "GET" => "GET",
        "HEAD" => "HEAD",
        "POST" => "POST",
        "PUT" => "PUT",
        "PATCH" => "PATCH",
        "DELETE" => "DELETE",
        "OPTIONS" => "OPTIONS",
        _ => "other",
    }
}

pub fn record_request(method: &str, outcome: &'static str, status: u16, start: Instant) {
    let method = method_label(method);
    metrics::counter!(
        "api_requests_total",
        "method" => method,
        "outcome" => outcome,
        "status" => status.to_string()
    )
    .increment(1);
    metrics::histogram!(
        "api_request_duration_seconds",
        "method" => method,
        "outcome" => outcome
    )
    .record(start.elapsed().as_secs_f64());
}

pub fn record_reload(success: bool) {
    let result = if success { "ok" } else { "rejected" };
    metrics::counter!("api_route_reloads_total", "result" => result).increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_label_is_bounded() {
        assert_eq!(method_label("GET"), "GET");
        assert_eq!(method_label("DELETE"), "DELETE");
        assert_eq!(method_label("PROPFIND"), "other");
        assert_eq!(method_label("X-RANDOM-1234"), "other");
        assert_eq!(method_label("get"), "other");
    }

    #[test]
    fn test_record_without_recorder() {
        record_request("BREW", "not_found", 404, Instant::now());
        record_reload(false);
    }
}
