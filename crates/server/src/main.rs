//! Difficulty server - serves predictions from a trained model
//!
//! Loads one model artifact at startup and answers `/predict` requests
//! until interrupted. A missing or mismatched model is fatal.

use anyhow::{Context, Result};
use difficulty_lib::{store, Predictor, StructuredLogger};
use difficulty_server::{api, config::ServerConfig};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // JSON logs, filtered by RUST_LOG
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer().json())
        .init();

    let config = ServerConfig::load().context("failed to load server configuration")?;
    info!(
        model_path = %config.model_path.display(),
        recipe = %config.recipe,
        "Server configured"
    );

    let logger = StructuredLogger::new("server");
    logger.log_startup(SERVER_VERSION, config.recipe.id());

    let model = store::load(&config.model_path).with_context(|| {
        format!(
            "failed to load model from {}; train one with `cpd train` first",
            config.model_path.display()
        )
    })?;
    let metadata = model.metadata().clone();
    logger.log_model_loaded(&config.model_path.display().to_string(), &metadata);

    let predictor = Predictor::with_expected_recipe(Arc::new(model), config.recipe)
        .context("loaded model cannot serve the configured recipe")?;

    let state = Arc::new(api::AppState::new(predictor, metadata));
    api::serve(&config.bind_addr(), state).await
}
