//! Difficulty prediction engine

mod inference;
mod output;

pub use inference::{ModelMetadata, TrainedModel};
pub use output::{decode_class, format_prediction, round_score};

use crate::error::PredictError;
use crate::features::{FeatureExtractor, FeatureRecipe};
use crate::models::{FeatureVector, Prediction, PredictionRequest, ProblemSample};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};

/// Inference slower than this is logged as a warning
const MAX_INFERENCE_MS: u128 = 50;

/// Read-only inference over a feature vector
pub trait DifficultyModel: Send + Sync {
    /// Recipe the model's training features were built with
    fn recipe(&self) -> FeatureRecipe;

    /// Raw class index as produced by the classifier
    fn classify(&self, features: &FeatureVector) -> f64;

    /// Raw (unrounded) difficulty score
    fn score(&self, features: &FeatureVector) -> f64;
}

/// Serves predictions from one loaded model
pub struct Predictor {
    model: Arc<dyn DifficultyModel>,
    extractor: FeatureExtractor,
    inference_count: AtomicU64,
    slow_inference_count: AtomicU64,
}

impl Predictor {
    /// Predict with whatever recipe the model was trained with
    pub fn new(model: Arc<dyn DifficultyModel>) -> Self {
        let extractor = FeatureExtractor::new(model.recipe());
        Self {
            model,
            extractor,
            inference_count: AtomicU64::new(0),
            slow_inference_count: AtomicU64::new(0),
        }
    }

    /// Refuse a model whose recipe differs from the one the caller serves
    pub fn with_expected_recipe(
        model: Arc<dyn DifficultyModel>,
        expected: FeatureRecipe,
    ) -> Result<Self, PredictError> {
        let trained = model.recipe();
        if trained != expected {
            return Err(PredictError::RecipeMismatch { trained, expected });
        }
        Ok(Self::new(model))
    }

    pub fn recipe(&self) -> FeatureRecipe {
        self.extractor.recipe()
    }

    /// Validate a request, extract features and run both forests
    pub fn predict(&self, request: &PredictionRequest) -> Result<Prediction, PredictError> {
        let sample = validate_request(request)?;
        let start = Instant::now();

        let (features, diagnostics) = self.extractor.extract_sample(&sample);
        let raw_class = self.model.classify(&features);
        let raw_score = self.model.score(&features);

        let elapsed = start.elapsed();
        self.inference_count.fetch_add(1, Ordering::Relaxed);
        if elapsed.as_millis() > MAX_INFERENCE_MS {
            self.slow_inference_count.fetch_add(1, Ordering::Relaxed);
            warn!(elapsed_ms = elapsed.as_millis(), "Inference exceeded {}ms target", MAX_INFERENCE_MS);
        } else {
            debug!(elapsed_us = elapsed.as_micros(), "Inference completed");
        }

        format_prediction(raw_class, raw_score, diagnostics)
    }

    /// Convenience wrapper for the three text fields
    pub fn predict_text(
        &self,
        description: &str,
        input_description: &str,
        output_description: &str,
    ) -> Result<Prediction, PredictError> {
        self.predict(&PredictionRequest::new(
            description,
            input_description,
            output_description,
        ))
    }

    pub fn stats(&self) -> InferenceStats {
        InferenceStats {
            total_inferences: self.inference_count.load(Ordering::Relaxed),
            slow_inferences: self.slow_inference_count.load(Ordering::Relaxed),
        }
    }
}

/// Inference statistics
#[derive(Debug, Clone, PartialEq)]
pub struct InferenceStats {
    pub total_inferences: u64,
    pub slow_inferences: u64,
}

fn validate_request(request: &PredictionRequest) -> Result<ProblemSample, PredictError> {
    let fields = [
        ("description", &request.description),
        ("input_description", &request.input_description),
        ("output_description", &request.output_description),
    ];
    let missing: Vec<&'static str> = fields
        .iter()
        .filter(|(_, value)| value.as_deref().map_or(true, |v| v.trim().is_empty()))
        .map(|(name, _)| *name)
        .collect();
    if !missing.is_empty() {
        return Err(PredictError::MissingInput { fields: missing });
    }

    let text = |value: &Option<String>| value.clone().unwrap_or_default();
    Ok(ProblemSample {
        description: text(&request.description),
        input_description: text(&request.input_description),
        output_description: text(&request.output_description),
        tags: request.tags.clone(),
        solved_count: request.solved_count,
        rating: None,
    })
}
