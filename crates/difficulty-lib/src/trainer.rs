//! Batch training of the classifier/regressor pair

use crate::error::{DatasetError, TrainError};
use crate::features::{FeatureExtractor, FeatureRecipe};
use crate::forest::{ForestConfig, RandomForest};
use crate::models::{DifficultyClass, LabeledSample};
use crate::predictor::{decode_class, round_score, DifficultyModel, ModelMetadata, TrainedModel};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info};

/// Sanity probes run against a freshly trained model: (statement, expected)
pub const SANITY_PROBES: &[(&str, &str)] = &[
    ("add two numbers", "Easy"),
    ("Dijkstra minimum path", "Medium/Hard"),
    ("Sort the array", "Easy/Medium"),
];

/// Outcome of one sanity probe
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProbeResult {
    pub statement: &'static str,
    pub expected: &'static str,
    pub predicted: Option<DifficultyClass>,
    pub score: i64,
}

impl ProbeResult {
    /// Whether the predicted class is one of the expected alternatives
    pub fn passed(&self) -> bool {
        self.predicted
            .map_or(false, |class| self.expected.split('/').any(|e| e == class.as_str()))
    }
}

/// Run the statement-only probes against a model
pub fn run_probes(model: &TrainedModel) -> Vec<ProbeResult> {
    let extractor = FeatureExtractor::new(model.recipe());
    SANITY_PROBES
        .iter()
        .map(|&(statement, expected)| {
            let (features, _) = extractor.extract(statement, "", "");
            let result = ProbeResult {
                statement,
                expected,
                predicted: decode_class(model.classify(&features)).ok(),
                score: round_score(model.score(&features)),
            };
            debug!(statement, predicted = ?result.predicted, score = result.score, "Probe");
            result
        })
        .collect()
}

/// Everything that shapes a training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    pub recipe: FeatureRecipe,
    pub classifier: ForestConfig,
    pub regressor: ForestConfig,
}

impl TrainingConfig {
    /// Text recipe with 200 trees of depth 20
    pub fn statement_defaults() -> Self {
        let forest = ForestConfig::default();
        Self {
            recipe: FeatureRecipe::TextDiversity,
            classifier: forest.clone(),
            regressor: forest,
        }
    }

    /// Solved-count recipe with 300 trees of depth 25
    pub fn archive_defaults() -> Self {
        let forest = ForestConfig {
            n_estimators: 300,
            max_depth: 25,
            ..Default::default()
        };
        Self {
            recipe: FeatureRecipe::SolvedCount,
            classifier: forest.clone(),
            regressor: forest,
        }
    }

    /// Override tree count and depth on both forests
    pub fn with_forest_size(mut self, n_estimators: usize, max_depth: usize) -> Self {
        for forest in [&mut self.classifier, &mut self.regressor] {
            forest.n_estimators = n_estimators;
            forest.max_depth = max_depth;
        }
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.classifier.seed = seed;
        self.regressor.seed = seed;
        self
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self::statement_defaults()
    }
}

/// One-shot trainer; every run produces a fresh model
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn train(&self, samples: &[LabeledSample]) -> Result<TrainedModel, TrainError> {
        validate_samples(samples)?;
        let start = Instant::now();
        let extractor = FeatureExtractor::new(self.config.recipe);

        let rows: Vec<Vec<f64>> = samples
            .iter()
            .map(|s| extractor.extract_sample(&s.problem).0.to_array().to_vec())
            .collect();
        let labels: Vec<usize> = samples.iter().map(|s| s.class.index()).collect();
        let scores: Vec<f64> = samples.iter().map(|s| s.score).collect();

        let mut class_counts = [0usize; 3];
        for &label in &labels {
            class_counts[label] += 1;
        }

        info!(
            samples = samples.len(),
            easy = class_counts[0],
            medium = class_counts[1],
            hard = class_counts[2],
            recipe = %self.config.recipe,
            "Starting training"
        );

        let classifier = RandomForest::fit_classifier(
            &self.config.classifier,
            &rows,
            &labels,
            DifficultyClass::ALL.len(),
        )?;
        info!(
            trees = classifier.n_trees(),
            elapsed_ms = start.elapsed().as_millis(),
            "Classifier trained"
        );

        let regressor = RandomForest::fit_regressor(&self.config.regressor, &rows, &scores)?;
        info!(
            trees = regressor.n_trees(),
            elapsed_ms = start.elapsed().as_millis(),
            "Regressor trained"
        );

        let metadata = ModelMetadata::new(
            self.config.recipe,
            samples.len(),
            class_counts,
            self.config.classifier.clone(),
            self.config.regressor.clone(),
        );
        let model = TrainedModel::new(metadata, classifier, regressor)
            .map_err(TrainError::InvalidModel)?;
        debug!(elapsed_ms = start.elapsed().as_millis(), "Training finished");
        Ok(model)
    }
}

fn validate_samples(samples: &[LabeledSample]) -> Result<(), DatasetError> {
    if samples.is_empty() {
        return Err(DatasetError::Empty);
    }
    if let Some(index) = samples.iter().position(|s| !s.score.is_finite()) {
        return Err(DatasetError::MissingLabel {
            index,
            field: "score",
        });
    }
    Ok(())
}
