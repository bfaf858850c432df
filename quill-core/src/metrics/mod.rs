//! Request metrics
//!
//! Recorded through the `metrics` facade. Without an installed recorder
//! every call is a no-op; the library never installs one itself.

use metrics::{counter, describe_counter, describe_histogram, histogram, Unit};
use std::time::Instant;

pub const REQUESTS_TOTAL: &str = "api.requests.total";
pub const REQUESTS_FAILED: &str = "api.requests.failed";
pub const REQUEST_DURATION: &str = "api.request.duration_ms";

/// Initialize metrics with descriptions
pub fn init_metrics() {
    describe_counter!(REQUESTS_TOTAL, "Total API requests, by operation");
    describe_counter!(REQUESTS_FAILED, "API requests that did not return 2xx, by operation");
    describe_histogram!(
        REQUEST_DURATION,
        Unit::Milliseconds,
        "API request duration in milliseconds, by operation"
    );
}

/// Count one settled request for `operation`
pub fn record_request(operation: &'static str, success: bool) {
    counter!(REQUESTS_TOTAL, "operation" => operation).increment(1);
    if !success {
        counter!(REQUESTS_FAILED, "operation" => operation).increment(1);
    }
}

/// Timer for measuring request duration
pub struct Timer {
    operation: &'static str,
    start: Instant,
}

impl Timer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            operation,
            start: Instant::now(),
        }
    }

    /// Stop the timer and record the duration
    pub fn stop(self) {
        let elapsed = self.start.elapsed();
        histogram!(REQUEST_DURATION, "operation" => self.operation)
            .record(elapsed.as_secs_f64() * 1000.0);
    }
}
