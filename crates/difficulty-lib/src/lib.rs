//! Difficulty estimation library for competitive-programming problems
//!
//! This crate provides the core functionality for:
//! - Feature extraction from problem statements
//! - Random-forest training and inference
//! - Model artifact persistence
//! - Training data sources
//! - Observability

pub mod dataset;
pub mod error;
pub mod features;
pub mod forest;
pub mod models;
pub mod observability;
pub mod predictor;
pub mod store;
pub mod trainer;

pub use error::{DatasetError, ModelStoreError, PredictError, TrainError};
pub use features::{FeatureExtractor, FeatureRecipe};
pub use models::*;
pub use observability::{DifficultyMetrics, StructuredLogger};
pub use predictor::{DifficultyModel, ModelMetadata, Predictor, TrainedModel};
pub use trainer::{run_probes, ProbeResult, Trainer, TrainingConfig, SANITY_PROBES};
