use lazy_static::lazy_static;
use prometheus::{
    register_histogram_vec, register_int_counter_vec, Encoder, HistogramVec, IntCounterVec,
    TextEncoder,
};

use crate::storage::StoreResult;

lazy_static! {
    // HTTP Metrics
    pub static ref HTTP_REQUESTS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "http_requests_total",
        "Total number of HTTP requests",
        &["method", "path", "status"]
    )
    .unwrap();

    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds",
        &["method", "path"],
        vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5, 5.0, 10.0]
    )
    .unwrap();

    // Storage Metrics (MongoDB / Redis)
    pub static ref STORE_OPERATIONS_TOTAL: IntCounterVec = register_int_counter_vec!(
        "store_operations_total",
        "Total number of storage operations",
        &["store", "operation", "status"]
    )
    .unwrap();

    pub static ref STORE_OPERATION_DURATION_SECONDS: HistogramVec = register_histogram_vec!(
        "store_operation_duration_seconds",
        "Storage operation duration in seconds",
        &["store", "operation"],
        vec![0.0005, 0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]
    )
    .unwrap();

    // Business Metrics
    pub static ref QUIZZES_CREATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "quizzes_created_total",
        "Total number of quizzes created",
        &["source"]
    )
    .unwrap();

    pub static ref TIPS_CREATED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "tips_created_total",
        "Total number of tips created",
        &["source"]
    )
    .unwrap();

    pub static ref ANSWERS_CHECKED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "answers_checked_total",
        "Total number of answers checked",
        &["mode", "correct"]
    )
    .unwrap();

    pub static ref RANDOM_PLAY_FINISHED_TOTAL: IntCounterVec = register_int_counter_vec!(
        "random_play_finished_total",
        "Random play rounds that ended, by reason",
        &["reason"]
    )
    .unwrap();
}

/// Renders all metrics in Prometheus text format
pub fn render_metrics() -> Result<String, prometheus::Error> {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();
    encoder.encode(&metric_families, &mut buffer)?;
    String::from_utf8(buffer)
        .map_err(|e| prometheus::Error::Msg(format!("Failed to convert metrics to UTF-8: {}", e)))
}

/// Helper: track a storage operation with metrics
pub async fn track_store_operation<F, T>(store: &str, operation: &str, future: F) -> StoreResult<T>
where
    F: std::future::Future<Output = StoreResult<T>>,
{
    let start = std::time::Instant::now();
    let result = future.await;
    let duration = start.elapsed().as_secs_f64();

    let status = if result.is_ok() { "success" } else { "error" };

    STORE_OPERATIONS_TOTAL
        .with_label_values(&[store, operation, status])
        .inc();

    STORE_OPERATION_DURATION_SECONDS
        .with_label_values(&[store, operation])
        .observe(duration);

    result
}

pub fn record_answer_checked(mode: &str, correct: bool) {
    let correct_label = if correct { "true" } else { "false" };
    ANSWERS_CHECKED_TOTAL
        .with_label_values(&[mode, correct_label])
        .inc();
}
