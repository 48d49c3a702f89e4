//! CART decision tree used as the forest's base learner

use super::Task;
use serde::{Deserialize, Serialize};

/// Minimum impurity improvement for a split to be kept
const MIN_GAIN: f64 = 1e-12;

/// Tree node stored in a flat arena; children are indices into it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

impl DecisionTree {
    /// Follow splits from the root until a leaf is reached
    pub fn predict(&self, row: &[f64]) -> f64 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    let v = row.get(*feature).copied().unwrap_or(0.0);
                    idx = if v <= *threshold { *left } else { *right };
                }
            }
        }
    }

    /// Check the arena is walkable: non-empty, every split reads a known
    /// feature and points strictly forward to nodes that exist
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        for (idx, node) in self.nodes.iter().enumerate() {
            if let Node::Split {
                feature,
                left,
                right,
                ..
            } = node
            {
                if *feature >= n_features {
                    return Err(format!(
                        "node {} splits on feature {} of {}",
                        idx, feature, n_features
                    ));
                }
                for child in [*left, *right] {
                    if child <= idx || child >= self.nodes.len() {
                        return Err(format!(
                            "node {} points to child {} outside {}..{}",
                            idx,
                            child,
                            idx + 1,
                            self.nodes.len()
                        ));
                    }
                }
            }
        }
        Ok(())
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize) -> usize {
            match &nodes[idx] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => 1 + walk(nodes, *left).max(walk(nodes, *right)),
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }
}

/// Grows one tree over a subset of row indices
pub(super) struct TreeBuilder<'a> {
    pub rows: &'a [Vec<f64>],
    pub targets: &'a [f64],
    pub task: Task,
    pub max_depth: usize,
    pub min_samples_split: usize,
}

struct SplitCandidate {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

impl TreeBuilder<'_> {
    /// `features_for_node` is asked for the candidate feature list at every node
    pub fn build(
        &self,
        indices: Vec<usize>,
        mut features_for_node: impl FnMut() -> Vec<usize>,
    ) -> DecisionTree {
        let mut nodes = Vec::new();
        self.grow(&mut nodes, indices, 0, &mut features_for_node);
        DecisionTree { nodes }
    }

    fn grow(
        &self,
        nodes: &mut Vec<Node>,
        indices: Vec<usize>,
        depth: usize,
        features_for_node: &mut impl FnMut() -> Vec<usize>,
    ) -> usize {
        let id = nodes.len();
        nodes.push(Node::Leaf {
            value: self.leaf_value(&indices),
        });

        let parent_impurity = self.impurity(&indices);
        if depth >= self.max_depth
            || indices.len() < self.min_samples_split
            || parent_impurity <= MIN_GAIN
        {
            return id;
        }

        let Some(split) = self.best_split(&indices, &features_for_node()) else {
            return id;
        };
        if split.impurity >= parent_impurity - MIN_GAIN {
            return id;
        }

        let (left_idx, right_idx): (Vec<usize>, Vec<usize>) = indices
            .into_iter()
            .partition(|&i| self.rows[i][split.feature] <= split.threshold);
        if left_idx.is_empty() || right_idx.is_empty() {
            return id;
        }

        let left = self.grow(nodes, left_idx, depth + 1, features_for_node);
        let right = self.grow(nodes, right_idx, depth + 1, features_for_node);
        nodes[id] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        id
    }

    fn leaf_value(&self, indices: &[usize]) -> f64 {
        match self.task {
            Task::Classification { n_classes } => {
                let counts = self.class_counts(indices, n_classes);
                let mut best = 0;
                for (class, &count) in counts.iter().enumerate() {
                    if count > counts[best] {
                        best = class;
                    }
                }
                best as f64
            }
            Task::Regression => {
                if indices.is_empty() {
                    return 0.0;
                }
                indices.iter().map(|&i| self.targets[i]).sum::<f64>() / indices.len() as f64
            }
        }
    }

    /// Total (not mean) impurity: n * gini, or sum of squared errors
    fn impurity(&self, indices: &[usize]) -> f64 {
        match self.task {
            Task::Classification { n_classes } => {
                let counts = self.class_counts(indices, n_classes);
                weighted_gini(&counts, indices.len())
            }
            Task::Regression => {
                let (sum, sum_sq) = indices.iter().fold((0.0, 0.0), |(s, sq), &i| {
                    let y = self.targets[i];
                    (s + y, sq + y * y)
                });
                sse(sum, sum_sq, indices.len())
            }
        }
    }

    fn class_counts(&self, indices: &[usize], n_classes: usize) -> Vec<usize> {
        let mut counts = vec![0usize; n_classes];
        for &i in indices {
            let class = self.targets[i] as usize;
            if class < n_classes {
                counts[class] += 1;
            }
        }
        counts
    }

    fn best_split(&self, indices: &[usize], features: &[usize]) -> Option<SplitCandidate> {
        let mut best: Option<SplitCandidate> = None;
        let mut sorted = indices.to_vec();

        for &feature in features {
            sorted.sort_by(|&a, &b| self.rows[a][feature].total_cmp(&self.rows[b][feature]));
            let candidate = match self.task {
                Task::Classification { n_classes } => {
                    self.sweep_classification(&sorted, feature, n_classes)
                }
                Task::Regression => self.sweep_regression(&sorted, feature),
            };
            if let Some(c) = candidate {
                if best.as_ref().map_or(true, |b| c.impurity < b.impurity) {
                    best = Some(c);
                }
            }
        }
        best
    }

    fn sweep_classification(
        &self,
        sorted: &[usize],
        feature: usize,
        n_classes: usize,
    ) -> Option<SplitCandidate> {
        let n = sorted.len();
        let mut right = self.class_counts(sorted, n_classes);
        let mut left = vec![0usize; n_classes];
        let mut best: Option<SplitCandidate> = None;

        for pos in 0..n.saturating_sub(1) {
            let class = self.targets[sorted[pos]] as usize;
            if class < n_classes {
                left[class] += 1;
                right[class] -= 1;
            }
            let here = self.rows[sorted[pos]][feature];
            let next = self.rows[sorted[pos + 1]][feature];
            if here == next {
                continue;
            }
            let impurity = weighted_gini(&left, pos + 1) + weighted_gini(&right, n - pos - 1);
            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: midpoint(here, next),
                    impurity,
                });
            }
        }
        best
    }

    fn sweep_regression(&self, sorted: &[usize], feature: usize) -> Option<SplitCandidate> {
        let n = sorted.len();
        let (total, total_sq) = sorted.iter().fold((0.0, 0.0), |(s, sq), &i| {
            let y = self.targets[i];
            (s + y, sq + y * y)
        });
        let (mut left_sum, mut left_sq) = (0.0, 0.0);
        let mut best: Option<SplitCandidate> = None;

        for pos in 0..n.saturating_sub(1) {
            let y = self.targets[sorted[pos]];
            left_sum += y;
            left_sq += y * y;
            let here = self.rows[sorted[pos]][feature];
            let next = self.rows[sorted[pos + 1]][feature];
            if here == next {
                continue;
            }
            let left_n = pos + 1;
            let impurity = sse(left_sum, left_sq, left_n)
                + sse(total - left_sum, total_sq - left_sq, n - left_n);
            if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                best = Some(SplitCandidate {
                    feature,
                    threshold: midpoint(here, next),
                    impurity,
                });
            }
        }
        best
    }
}

fn weighted_gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let total = n as f64;
    let sum_sq: f64 = counts.iter().map(|&c| (c as f64 / total).powi(2)).sum();
    total * (1.0 - sum_sq)
}

fn sse(sum: f64, sum_sq: f64, n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    (sum_sq - sum * sum / n as f64).max(0.0)
}

fn midpoint(a: f64, b: f64) -> f64 {
    let mid = a + (b - a) / 2.0;
    // guard against rounding landing on the upper value
    if mid >= b {
        a
    } else {
        mid
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn build(rows: &[Vec<f64>], targets: &[f64], task: Task, max_depth: usize) -> DecisionTree {
        let builder = TreeBuilder {
            rows,
            targets,
            task,
            max_depth,
            min_samples_split: 2,
        };
        let n_features = rows[0].len();
        builder.build((0..rows.len()).collect(), || (0..n_features).collect())
    }

    #[test]
    fn test_classification_separates_on_informative_feature() {
        let rows = vec![
            vec![0.0, 5.0],
            vec![0.1, 1.0],
            vec![0.2, 3.0],
            vec![1.0, 4.0],
            vec![1.1, 2.0],
            vec![1.2, 5.0],
        ];
        let targets = vec![0.0, 0.0, 0.0, 2.0, 2.0, 2.0];
        let tree = build(&rows, &targets, Task::Classification { n_classes: 3 }, 5);

        assert_eq!(tree.depth(), 1);
        assert_eq!(tree.predict(&[0.05, 9.0]), 0.0);
        assert_eq!(tree.predict(&[1.5, 0.0]), 2.0);
    }

    #[test]
    fn test_xor_has_no_single_useful_split() {
        let rows = vec![
            vec![0.0, 0.0],
            vec![1.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 1.0],
        ];
        let targets = vec![0.0, 1.0, 1.0, 0.0];
        let tree = build(&rows, &targets, Task::Classification { n_classes: 2 }, 5);
        // no single split reduces gini on xor, so the root stays a leaf
        assert_eq!(tree.n_nodes(), 1);
    }

    #[test]
    fn test_regression_leaf_means() {
        let rows = vec![vec![1.0], vec![2.0], vec![10.0], vec![11.0]];
        let targets = vec![100.0, 110.0, 500.0, 520.0];
        let tree = build(&rows, &targets, Task::Regression, 1);

        assert_eq!(tree.predict(&[0.0]), 105.0);
        assert_eq!(tree.predict(&[20.0]), 510.0);
    }

    #[test]
    fn test_max_depth_zero_is_single_leaf() {
        let rows = vec![vec![1.0], vec![2.0], vec![3.0]];
        let targets = vec![1.0, 2.0, 6.0];
        let tree = build(&rows, &targets, Task::Regression, 0);
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict(&[2.0]), 3.0);
    }

    #[test]
    fn test_constant_features_yield_leaf() {
        let rows = vec![vec![1.0], vec![1.0], vec![1.0]];
        let targets = vec![0.0, 1.0, 1.0];
        let tree = build(&rows, &targets, Task::Classification { n_classes: 2 }, 10);
        assert_eq!(tree.n_nodes(), 1);
        assert_eq!(tree.predict(&[1.0]), 1.0);
    }

    #[test]
    fn test_validate_accepts_grown_tree() {
        let rows = vec![vec![0.0, 5.0], vec![0.1, 1.0], vec![1.0, 4.0], vec![1.1, 2.0]];
        let targets = vec![0.0, 0.0, 2.0, 2.0];
        let tree = build(&rows, &targets, Task::Classification { n_classes: 3 }, 5);
        assert!(tree.n_nodes() > 1);
        assert_eq!(tree.validate(2), Ok(()));
        assert!(tree.validate(0).is_err());
    }

    #[test]
    fn test_validate_rejects_broken_arenas() {
        let split = |left, right| Node::Split {
            feature: 0,
            threshold: 0.5,
            left,
            right,
        };
        let leaf = Node::Leaf { value: 1.0 };

        let empty = DecisionTree { nodes: vec![] };
        assert!(empty.validate(1).is_err());

        let dangling = DecisionTree {
            nodes: vec![split(1, 999), leaf.clone()],
        };
        assert!(dangling.validate(1).is_err());

        let cycle = DecisionTree {
            nodes: vec![split(1, 2), split(0, 2), leaf.clone()],
        };
        assert!(cycle.validate(1).is_err());

        let ok = DecisionTree {
            nodes: vec![split(1, 2), leaf.clone(), leaf],
        };
        assert_eq!(ok.validate(1), Ok(()));
    }

    #[test]
    fn test_midpoint_stays_below_upper() {
        assert_eq!(midpoint(1.0, 3.0), 2.0);
        let a = 1.0f64;
        let b = f64::from_bits(a.to_bits() + 1);
        assert!(midpoint(a, b) < b);
    }
}
