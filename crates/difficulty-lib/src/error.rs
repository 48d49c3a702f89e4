//! Error types shared across the library

use crate::features::FeatureRecipe;
use crate::forest::ForestError;
use std::path::PathBuf;
use thiserror::Error;

/// Problems with the samples handed to the trainer or a dataset loader
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("training set is empty")]
    Empty,

    #[error("sample {index} is missing a usable {field} label")]
    MissingLabel { index: usize, field: &'static str },

    #[error("row {row}: {message}")]
    InvalidRow { row: usize, message: String },

    #[error("failed to read dataset {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse archive JSON")]
    Json(#[from] serde_json::Error),

    #[error("failed to parse CSV dataset")]
    Csv(#[from] csv::Error),
}

/// Failures loading or saving a model artifact
#[derive(Debug, Error)]
pub enum ModelStoreError {
    #[error("no trained model found at {0:?}")]
    NotFound(PathBuf),

    #[error("I/O error on model artifact {path:?}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("model artifact checksum mismatch: header says {expected}, body hashes to {actual}")]
    ChecksumMismatch { expected: String, actual: String },

    #[error("unsupported model format version {0}")]
    UnsupportedVersion(u32),

    #[error("corrupt model artifact: {0}")]
    Corrupt(String),

    #[error("failed to (de)serialize model artifact")]
    Serde(#[from] serde_json::Error),
}

/// Failures at prediction time
#[derive(Debug, Error)]
pub enum PredictError {
    #[error("missing required fields: {}", fields.join(", "))]
    MissingInput { fields: Vec<&'static str> },

    #[error("model was trained with recipe {trained} but the predictor expects {expected}")]
    RecipeMismatch {
        trained: FeatureRecipe,
        expected: FeatureRecipe,
    },

    #[error("classifier returned out-of-range class index {0}")]
    InvalidClass(f64),
}

impl PredictError {
    /// True for errors caused by the caller's request rather than the model
    pub fn is_client_error(&self) -> bool {
        matches!(self, PredictError::MissingInput { .. })
    }
}

/// Failures during a training run
#[derive(Debug, Error)]
pub enum TrainError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),

    #[error("forest training failed")]
    Forest(#[from] ForestError),

    #[error("trained model failed validation: {0}")]
    InvalidModel(String),
}
