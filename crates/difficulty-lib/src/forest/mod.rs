//! Random-forest estimators
//!
//! Bagged CART trees with per-split feature subsampling. Classification
//! forests vote (majority over class indices), regression forests average.
//! Everything is seeded so identical inputs and configuration give identical
//! forests.

mod tree;

pub use tree::{DecisionTree, Node};

use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tree::TreeBuilder;

/// A trained model that maps one feature row to one value
pub trait Estimator: Send + Sync {
    fn predict_row(&self, row: &[f64]) -> f64;

    fn predict(&self, rows: &[Vec<f64>]) -> Vec<f64> {
        rows.iter().map(|row| self.predict_row(row)).collect()
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum ForestError {
    #[error("cannot fit a forest on zero rows")]
    NoRows,

    #[error("{rows} rows but {targets} targets")]
    LengthMismatch { rows: usize, targets: usize },

    #[error("row {row} has {found} features, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },

    #[error("target {0} is not finite")]
    NonFiniteTarget(usize),

    #[error("class label {label} at row {row} is outside 0..{n_classes}")]
    InvalidClass {
        row: usize,
        label: usize,
        n_classes: usize,
    },
}

/// What the forest's leaves hold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Task {
    Classification { n_classes: usize },
    Regression,
}

/// Forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub max_depth: usize,
    pub min_samples_split: usize,
    /// Fraction of features considered at each split (0, 1]
    pub max_features: f64,
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_estimators: 200,
            max_depth: 20,
            min_samples_split: 2,
            max_features: 1.0,
            seed: 42,
        }
    }
}

impl ForestConfig {
    fn features_per_split(&self, n_features: usize) -> usize {
        let k = (self.max_features * n_features as f64).round() as usize;
        k.clamp(1, n_features.max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    task: Task,
    n_features: usize,
    trees: Vec<DecisionTree>,
}

impl RandomForest {
    /// Fit a classifier on integer class labels in `0..n_classes`
    pub fn fit_classifier(
        config: &ForestConfig,
        rows: &[Vec<f64>],
        labels: &[usize],
        n_classes: usize,
    ) -> Result<Self, ForestError> {
        if let Some((row, &label)) = labels.iter().enumerate().find(|(_, &l)| l >= n_classes) {
            return Err(ForestError::InvalidClass {
                row,
                label,
                n_classes,
            });
        }
        let targets: Vec<f64> = labels.iter().map(|&l| l as f64).collect();
        Self::fit(config, rows, &targets, Task::Classification { n_classes })
    }

    /// Fit a regressor on real-valued targets
    pub fn fit_regressor(
        config: &ForestConfig,
        rows: &[Vec<f64>],
        targets: &[f64],
    ) -> Result<Self, ForestError> {
        Self::fit(config, rows, targets, Task::Regression)
    }

    fn fit(
        config: &ForestConfig,
        rows: &[Vec<f64>],
        targets: &[f64],
        task: Task,
    ) -> Result<Self, ForestError> {
        validate(rows, targets)?;
        let n = rows.len();
        let n_features = rows[0].len();
        let per_split = config.features_per_split(n_features);
        let mut rng = StdRng::seed_from_u64(config.seed);

        let builder = TreeBuilder {
            rows,
            targets,
            task,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split.max(2),
        };

        let mut trees = Vec::with_capacity(config.n_estimators);
        for _ in 0..config.n_estimators.max(1) {
            let bootstrap: Vec<usize> = (0..n).map(|_| rng.gen_range(0..n)).collect();
            let tree = builder.build(bootstrap, || {
                if per_split == n_features {
                    (0..n_features).collect()
                } else {
                    let mut picked = sample(&mut rng, n_features, per_split).into_vec();
                    picked.sort_unstable();
                    picked
                }
            });
            trees.push(tree);
        }

        Ok(Self {
            task,
            n_features,
            trees,
        })
    }

    pub fn task(&self) -> Task {
        self.task
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    pub fn trees(&self) -> &[DecisionTree] {
        &self.trees
    }
}

impl Estimator for RandomForest {
    fn predict_row(&self, row: &[f64]) -> f64 {
        match self.task {
            Task::Classification { n_classes } => {
                let mut votes = vec![0usize; n_classes];
                for tree in &self.trees {
                    let class = tree.predict(row) as usize;
                    if class < n_classes {
                        votes[class] += 1;
                    }
                }
                let mut best = 0;
                for (class, &count) in votes.iter().enumerate() {
                    if count > votes[best] {
                        best = class;
                    }
                }
                best as f64
            }
            Task::Regression => {
                if self.trees.is_empty() {
                    return 0.0;
                }
                let total: f64 = self.trees.iter().map(|t| t.predict(row)).sum();
                total / self.trees.len() as f64
            }
        }
    }
}

fn validate(rows: &[Vec<f64>], targets: &[f64]) -> Result<(), ForestError> {
    if rows.is_empty() {
        return Err(ForestError::NoRows);
    }
    if rows.len() != targets.len() {
        return Err(ForestError::LengthMismatch {
            rows: rows.len(),
            targets: targets.len(),
        });
    }
    let expected = rows[0].len();
    if let Some((row, r)) = rows.iter().enumerate().find(|(_, r)| r.len() != expected) {
        return Err(ForestError::RaggedRow {
            row,
            expected,
            found: r.len(),
        });
    }
    if let Some(i) = targets.iter().position(|t| !t.is_finite()) {
        return Err(ForestError::NonFiniteTarget(i));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_config() -> ForestConfig {
        ForestConfig {
            n_estimators: 15,
            max_depth: 6,
            ..Default::default()
        }
    }

    fn two_clusters() -> (Vec<Vec<f64>>, Vec<usize>, Vec<f64>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        let mut scores = Vec::new();
        for i in 0..30 {
            let jitter = i as f64 * 0.01;
            rows.push(vec![1.0 + jitter, 0.0]);
            labels.push(0);
            scores.push(800.0);
            rows.push(vec![5.0 + jitter, 1.0]);
            labels.push(2);
            scores.push(2400.0);
        }
        (rows, labels, scores)
    }

    #[test]
    fn test_classifier_votes_majority() {
        let (rows, labels, _) = two_clusters();
        let forest = RandomForest::fit_classifier(&small_config(), &rows, &labels, 3).unwrap();
        assert_eq!(forest.n_trees(), 15);
        assert_eq!(forest.predict_row(&[1.1, 0.0]), 0.0);
        assert_eq!(forest.predict_row(&[5.2, 1.0]), 2.0);
    }

    #[test]
    fn test_regressor_averages() {
        let (rows, _, scores) = two_clusters();
        let forest = RandomForest::fit_regressor(&small_config(), &rows, &scores).unwrap();
        assert!((forest.predict_row(&[1.1, 0.0]) - 800.0).abs() < 1e-9);
        assert!((forest.predict_row(&[5.2, 1.0]) - 2400.0).abs() < 1e-9);
    }

    #[test]
    fn test_same_seed_same_forest() {
        let (rows, labels, _) = two_clusters();
        let config = ForestConfig {
            max_features: 0.5,
            ..small_config()
        };
        let a = RandomForest::fit_classifier(&config, &rows, &labels, 3).unwrap();
        let b = RandomForest::fit_classifier(&config, &rows, &labels, 3).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_serde_preserves_predictions() {
        let (rows, _, scores) = two_clusters();
        let forest = RandomForest::fit_regressor(&small_config(), &rows, &scores).unwrap();
        let json = serde_json::to_string(&forest).unwrap();
        let restored: RandomForest = serde_json::from_str(&json).unwrap();
        assert_eq!(forest.predict(&rows), restored.predict(&rows));
    }

    #[test]
    fn test_rejects_bad_input() {
        let config = small_config();
        assert_eq!(
            RandomForest::fit_regressor(&config, &[], &[]),
            Err(ForestError::NoRows)
        );
        assert_eq!(
            RandomForest::fit_regressor(&config, &[vec![1.0]], &[1.0, 2.0]),
            Err(ForestError::LengthMismatch {
                rows: 1,
                targets: 2
            })
        );
        assert_eq!(
            RandomForest::fit_regressor(&config, &[vec![1.0], vec![1.0, 2.0]], &[1.0, 2.0]),
            Err(ForestError::RaggedRow {
                row: 1,
                expected: 1,
                found: 2
            })
        );
        assert_eq!(
            RandomForest::fit_regressor(&config, &[vec![1.0]], &[f64::NAN]),
            Err(ForestError::NonFiniteTarget(0))
        );
        assert!(matches!(
            RandomForest::fit_classifier(&config, &[vec![1.0]], &[3], 3),
            Err(ForestError::InvalidClass { label: 3, .. })
        ));
    }
}
