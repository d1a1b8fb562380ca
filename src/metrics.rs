use std::sync::Arc;

use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

/// Global handle for rendering Prometheus metrics
static METRICS_HANDLE: std::sync::OnceLock<Arc<PrometheusHandle>> = std::sync::OnceLock::new();

/// Install the Prometheus recorder as the global metrics recorder
pub fn init() -> Result<(), Box<dyn std::error::Error>> {
    let recorder = PrometheusBuilder::new().build_recorder();
    let handle = recorder.handle();

    // Store the handle before installing, install consumes the recorder
    METRICS_HANDLE
        .set(Arc::new(handle))
        .map_err(|_| "Metrics handle already initialized")?;

    metrics::set_boxed_recorder(Box::new(recorder))
        .map_err(|e| format!("Failed to set global recorder: {}", e))?;

    log::debug!("Metrics recorder installed");
    Ok(())
}

/// Get the Prometheus handle for rendering metrics
pub fn get_handle() -> Option<Arc<PrometheusHandle>> {
    METRICS_HANDLE.get().cloned()
}

/// Render the current metrics in the Prometheus text format
pub fn render() -> Option<String> {
    get_handle().map(|handle| handle.render())
}

/// Dump a snapshot at debug level, typically once on shutdown
pub fn log_snapshot() {
    if let Some(snapshot) = render() {
        log::debug!("Final metrics:\n{}", snapshot);
    }
}
