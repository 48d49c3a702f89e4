//! Observability infrastructure for the difficulty estimator
//!
//! Provides:
//! - Prometheus metrics (prediction latency, per-class counts, rejections, model info)
//! - Structured JSON logging with tracing

use crate::models::{DifficultyClass, Prediction};
use crate::predictor::ModelMetadata;
use prometheus::{
    register_gauge_vec, register_histogram, register_int_counter, register_int_counter_vec,
    register_int_gauge, GaugeVec, Histogram, IntCounter, IntCounterVec, IntGauge,
};
use std::sync::OnceLock;
use tracing::{info, warn};

/// Histogram buckets for latency measurements (in seconds)
const LATENCY_BUCKETS: &[f64] = &[
    0.0001, 0.0005, 0.001, 0.0025, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0,
];

/// Global metrics instance (registered once)
static GLOBAL_METRICS: OnceLock<DifficultyMetricsInner> = OnceLock::new();

struct DifficultyMetricsInner {
    prediction_latency_seconds: Histogram,
    predictions_total: IntCounterVec,
    rejected_requests: IntCounter,
    prediction_errors: IntCounter,
    model_info: GaugeVec,
    model_samples: IntGauge,
}

impl DifficultyMetricsInner {
    fn new() -> Self {
        Self {
            prediction_latency_seconds: register_histogram!(
                "difficulty_prediction_latency_seconds",
                "Time spent extracting features and running both forests",
                LATENCY_BUCKETS.to_vec()
            )
            .expect("Failed to register prediction_latency_seconds"),

            predictions_total: register_int_counter_vec!(
                "difficulty_predictions_total",
                "Predictions served, by predicted class",
                &["class"]
            )
            .expect("Failed to register predictions_total"),

            rejected_requests: register_int_counter!(
                "difficulty_rejected_requests_total",
                "Requests rejected for missing descriptions"
            )
            .expect("Failed to register rejected_requests"),

            prediction_errors: register_int_counter!(
                "difficulty_prediction_errors_total",
                "Predictions that failed after validation"
            )
            .expect("Failed to register prediction_errors"),

            model_info: register_gauge_vec!(
                "difficulty_model_info",
                "Information about the currently loaded model",
                &["recipe", "trained_at"]
            )
            .expect("Failed to register model_info"),

            model_samples: register_int_gauge!(
                "difficulty_model_training_samples",
                "Number of samples the loaded model was trained on"
            )
            .expect("Failed to register model_training_samples"),
        }
    }
}

/// Handle to the process-wide metrics; clones share the same counters
#[derive(Clone)]
pub struct DifficultyMetrics {
    _private: (),
}

impl Default for DifficultyMetrics {
    fn default() -> Self {
        Self::new()
    }
}

impl DifficultyMetrics {
    pub fn new() -> Self {
        GLOBAL_METRICS.get_or_init(DifficultyMetricsInner::new);
        Self { _private: () }
    }

    fn inner(&self) -> &DifficultyMetricsInner {
        GLOBAL_METRICS.get().expect("Metrics not initialized")
    }

    pub fn observe_prediction_latency(&self, duration_secs: f64) {
        self.inner().prediction_latency_seconds.observe(duration_secs);
    }

    pub fn inc_prediction(&self, class: DifficultyClass) {
        self.inner()
            .predictions_total
            .with_label_values(&[class.as_str()])
            .inc();
    }

    pub fn inc_rejected(&self) {
        self.inner().rejected_requests.inc();
    }

    pub fn inc_prediction_errors(&self) {
        self.inner().prediction_errors.inc();
    }

    /// Replace the model info series with the given model
    pub fn set_model(&self, metadata: &ModelMetadata) {
        let inner = self.inner();
        let trained_at = metadata.trained_at.to_string();
        inner.model_info.reset();
        inner
            .model_info
            .with_label_values(&[metadata.recipe.id(), trained_at.as_str()])
            .set(1.0);
        inner.model_samples.set(metadata.samples as i64);
    }

    pub fn predictions_for(&self, class: DifficultyClass) -> u64 {
        self.inner()
            .predictions_total
            .with_label_values(&[class.as_str()])
            .get()
    }

    pub fn rejected_count(&self) -> u64 {
        self.inner().rejected_requests.get()
    }
}

/// Structured logger for service and training events
#[derive(Clone)]
pub struct StructuredLogger {
    component: String,
}

impl StructuredLogger {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
        }
    }

    pub fn log_startup(&self, version: &str, recipe: &str) {
        info!(
            event = "service_started",
            component = %self.component,
            version = %version,
            recipe = %recipe,
            "Difficulty estimator started"
        );
    }

    pub fn log_model_loaded(&self, path: &str, metadata: &ModelMetadata) {
        info!(
            event = "model_loaded",
            component = %self.component,
            path = %path,
            recipe = %metadata.recipe,
            samples = metadata.samples,
            trained_at = metadata.trained_at,
            "Model loaded"
        );
    }

    pub fn log_prediction(&self, prediction: &Prediction, elapsed_us: u128) {
        info!(
            event = "prediction_served",
            component = %self.component,
            problem_class = %prediction.problem_class,
            problem_score = prediction.problem_score,
            text_length = prediction.diagnostics.text_length,
            math_count = prediction.diagnostics.math_count,
            elapsed_us = elapsed_us,
            "Prediction served"
        );
    }

    pub fn log_rejected(&self, missing: &[&str]) {
        warn!(
            event = "request_rejected",
            component = %self.component,
            missing = ?missing,
            "Rejected request with missing descriptions"
        );
    }

    pub fn log_training_complete(&self, metadata: &ModelMetadata, path: &str) {
        info!(
            event = "training_complete",
            component = %self.component,
            recipe = %metadata.recipe,
            samples = metadata.samples,
            easy = metadata.class_counts[0],
            medium = metadata.class_counts[1],
            hard = metadata.class_counts[2],
            path = %path,
            "Model trained and saved"
        );
    }

    pub fn log_shutdown(&self, reason: &str) {
        info!(
            event = "service_shutdown",
            component = %self.component,
            reason = %reason,
            "Difficulty estimator shutting down"
        );
    }
}
