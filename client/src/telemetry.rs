//! Request counters. Compiled to no-ops without the `telemetry` feature.

#[cfg(feature = "telemetry")]
pub(crate) fn record_request(kind: &'static str, path: &str, ok: bool) {
    metrics::counter!(
        "hbdm_requests_total",
        "kind" => kind,
        "path" => path.to_string(),
        "outcome" => if ok { "ok" } else { "error" }
    )
    .increment(1);
}

#[cfg(not(feature = "telemetry"))]
pub(crate) fn record_request(_kind: &'static str, _path: &str, _ok: bool) {}

#[cfg(feature = "telemetry")]
pub(crate) fn record_latency(kind: &'static str, elapsed: std::time::Duration) {
    metrics::histogram!("hbdm_request_seconds", "kind" => kind).record(elapsed.as_secs_f64());
}

#[cfg(not(feature = "telemetry"))]
pub(crate) fn record_latency(_kind: &'static str, _elapsed: std::time::Duration) {}
