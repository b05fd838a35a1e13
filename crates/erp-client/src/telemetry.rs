//! Metrics recording
//!
//! Emits counters through the `metrics` facade:
//!
//! - `erp_client_requests_total` (counter): labels `status`, `method`
//! - `erp_client_transport_errors_total` (counter): label `error_type`
//! - `erp_client_token_refresh_total` (counter): label `outcome`
//! - `erp_client_session_expired_total` (counter)
//!
//! This crate installs no recorder; without one every call is a no-op.
//! Exposition belongs to the embedding application.

/// Record a completed request attempt with its response status.
pub fn record_request(status: u16, method: &str) {
    metrics::counter!(
        "erp_client_requests_total",
        "status" => status.to_string(),
        "method" => method.to_string()
    )
    .increment(1);
}

/// Record a request that never produced a response.
pub fn record_transport_error(error_type: &str) {
    metrics::counter!(
        "erp_client_transport_errors_total",
        "error_type" => error_type.to_string()
    )
    .increment(1);
}

/// Record a settled token-refresh exchange.
pub fn record_refresh(outcome: &str) {
    metrics::counter!(
        "erp_client_token_refresh_total",
        "outcome" => outcome.to_string()
    )
    .increment(1);
}

/// Record a session termination.
pub fn record_session_expired() {
    metrics::counter!("erp_client_session_expired_total").increment(1);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_functions_do_not_panic_without_recorder() {
        // When no recorder is installed, metrics calls are no-ops.
        record_request(200, "GET");
        record_request(401, "POST");
        record_transport_error("timeout");
        record_refresh("success");
        record_refresh("failure");
        record_session_expired();
    }
}
