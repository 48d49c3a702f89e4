//! Forest-backed difficulty model
//!
//! Pairs the classification and regression forests with the metadata that
//! says how their inputs were built.

use super::DifficultyModel;
use crate::features::{FeatureRecipe, TIER_NAMES};
use crate::forest::{Estimator, ForestConfig, RandomForest, Task};
use crate::models::{DifficultyClass, FeatureVector, NUM_FEATURES};
use serde::{Deserialize, Serialize};

/// Describes how a model was produced
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetadata {
    pub recipe: FeatureRecipe,
    pub indicators: Vec<String>,
    pub samples: usize,
    /// Per-class sample counts, indexed by class index
    pub class_counts: [usize; 3],
    pub trained_at: i64,
    pub classifier_config: ForestConfig,
    pub regressor_config: ForestConfig,
}

impl ModelMetadata {
    pub fn new(
        recipe: FeatureRecipe,
        samples: usize,
        class_counts: [usize; 3],
        classifier_config: ForestConfig,
        regressor_config: ForestConfig,
    ) -> Self {
        Self {
            recipe,
            indicators: TIER_NAMES.iter().map(|s| s.to_string()).collect(),
            samples,
            class_counts,
            trained_at: chrono::Utc::now().timestamp(),
            classifier_config,
            regressor_config,
        }
    }
}

/// Classifier + regressor pair plus metadata. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    metadata: ModelMetadata,
    classifier: RandomForest,
    regressor: RandomForest,
}

impl TrainedModel {
    /// Assemble a model, checking both forests fit the feature layout
    pub fn new(
        metadata: ModelMetadata,
        classifier: RandomForest,
        regressor: RandomForest,
    ) -> Result<Self, String> {
        let model = Self {
            metadata,
            classifier,
            regressor,
        };
        model.check()?;
        Ok(model)
    }

    /// Structural checks shared by construction and artifact loading
    pub(crate) fn check(&self) -> Result<(), String> {
        match self.classifier.task() {
            Task::Classification { n_classes } if n_classes == DifficultyClass::ALL.len() => {}
            other => return Err(format!("classifier forest has task {:?}", other)),
        }
        if self.regressor.task() != Task::Regression {
            return Err(format!(
                "regressor forest has task {:?}",
                self.regressor.task()
            ));
        }
        for (name, forest) in [("classifier", &self.classifier), ("regressor", &self.regressor)] {
            if forest.n_features() != NUM_FEATURES {
                return Err(format!(
                    "{} expects {} features, recipe produces {}",
                    name,
                    forest.n_features(),
                    NUM_FEATURES
                ));
            }
            if forest.n_trees() == 0 {
                return Err(format!("{} has no trees", name));
            }
            for (i, tree) in forest.trees().iter().enumerate() {
                tree.validate(forest.n_features())
                    .map_err(|e| format!("{} tree {}: {}", name, i, e))?;
            }
        }
        Ok(())
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn classifier(&self) -> &RandomForest {
        &self.classifier
    }

    pub fn regressor(&self) -> &RandomForest {
        &self.regressor
    }
}

impl DifficultyModel for TrainedModel {
    fn recipe(&self) -> FeatureRecipe {
        self.metadata.recipe
    }

    fn classify(&self, features: &FeatureVector) -> f64 {
        self.classifier.predict_row(&features.to_array())
    }

    fn score(&self, features: &FeatureVector) -> f64 {
        self.regressor.predict_row(&features.to_array())
    }
}
