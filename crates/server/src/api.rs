//! HTTP API: prediction, health and Prometheus metrics

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use difficulty_lib::{
    DifficultyMetrics, ModelMetadata, PredictError, PredictionRequest, Predictor,
    StructuredLogger,
};
use prometheus::{Encoder, TextEncoder};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Instant;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing::{error, info};

/// Shared application state
pub struct AppState {
    pub predictor: Predictor,
    pub metadata: ModelMetadata,
    pub metrics: DifficultyMetrics,
    pub logger: StructuredLogger,
}

impl AppState {
    pub fn new(predictor: Predictor, metadata: ModelMetadata) -> Self {
        let metrics = DifficultyMetrics::new();
        metrics.set_model(&metadata);
        Self {
            predictor,
            metadata,
            metrics,
            logger: StructuredLogger::new("server"),
        }
    }
}

#[derive(Debug, Serialize)]
struct ModelSummary {
    recipe: String,
    trained_at: i64,
    samples: usize,
}

#[derive(Debug, Serialize)]
struct HealthResponse {
    status: &'static str,
    model: ModelSummary,
    total_inferences: u64,
}

/// Errors surfaced to HTTP clients
pub enum ApiError {
    MissingDescriptions(Vec<&'static str>),
    Internal(String),
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::MissingInput { fields } => Self::MissingDescriptions(fields),
            other => Self::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingDescriptions(missing) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": "Missing descriptions", "missing": missing })),
            )
                .into_response(),
            Self::Internal(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": message })),
            )
                .into_response(),
        }
    }
}

async fn predict(
    State(state): State<Arc<AppState>>,
    Json(request): Json<PredictionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let start = Instant::now();
    match state.predictor.predict(&request) {
        Ok(prediction) => {
            let elapsed = start.elapsed();
            state.metrics.observe_prediction_latency(elapsed.as_secs_f64());
            state.metrics.inc_prediction(prediction.problem_class);
            state.logger.log_prediction(&prediction, elapsed.as_micros());
            Ok(Json(prediction))
        }
        Err(PredictError::MissingInput { fields }) => {
            state.metrics.inc_rejected();
            state.logger.log_rejected(&fields);
            Err(ApiError::MissingDescriptions(fields))
        }
        Err(err) => {
            state.metrics.inc_prediction_errors();
            error!(error = %err, "Prediction failed");
            Err(err.into())
        }
    }
}

async fn healthz(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(HealthResponse {
        status: "healthy",
        model: ModelSummary {
            recipe: state.metadata.recipe.id().to_string(),
            trained_at: state.metadata.trained_at,
            samples: state.metadata.samples,
        },
        total_inferences: state.predictor.stats().total_inferences,
    })
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    let encoder = TextEncoder::new();
    let metric_families = prometheus::gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        return (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response();
    }

    (
        StatusCode::OK,
        [("content-type", "text/plain; charset=utf-8")],
        buffer,
    )
        .into_response()
}

/// Create the API router
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/predict", post(predict))
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Start the API server; returns once a shutdown signal arrives
pub async fn serve(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let app = create_router(state.clone());

    info!(addr = %addr, "Starting API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    state.logger.log_shutdown("ctrl-c received");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Failed to listen for shutdown signal");
    }
}
