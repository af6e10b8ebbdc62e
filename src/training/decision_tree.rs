//! Decision tree classifier
//!
//! Labels are class codes `0..n_classes`. Splits are found by sorting each
//! candidate feature once per node and sweeping class counts, so a node costs
//! O(n log n) per feature.

use crate::error::{CreditScoreError, Result};
use ndarray::{Array1, Array2, ArrayView1};
use rand::seq::index::sample;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Decision tree node
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TreeNode {
    /// Leaf node with the majority class
    Leaf {
        class: usize,
        n_samples: usize,
    },
    /// Internal node with split
    Split {
        feature_idx: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
        n_samples: usize,
        impurity: f64,
    },
}

/// Gini impurity of a node holding `counts` over `n` samples
fn gini(counts: &[usize], n: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let n = n as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / n;
            p * p
        })
        .sum::<f64>()
}

/// Decision tree classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    /// Tree root
    root: Option<TreeNode>,
    /// Maximum depth
    pub max_depth: Option<usize>,
    /// Number of features sampled at each split (None = all)
    pub max_features: Option<usize>,
    /// Seed for feature sampling
    pub random_state: u64,
    n_features: usize,
    n_classes: usize,
    feature_importances: Option<Array1<f64>>,
}

impl Default for DecisionTree {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-fit state threaded through the recursion
struct BuildContext<'a> {
    x: &'a Array2<f64>,
    y: &'a [usize],
    importances: Vec<f64>,
    rng: ChaCha8Rng,
}

impl DecisionTree {
    pub fn new() -> Self {
        Self {
            root: None,
            max_depth: None,
            max_features: None,
            random_state: 0,
            n_features: 0,
            n_classes: 0,
            feature_importances: None,
        }
    }

    /// Set maximum depth
    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    /// Set number of features considered per split
    pub fn with_max_features(mut self, max_features: usize) -> Self {
        self.max_features = Some(max_features.max(1));
        self
    }

    /// Set feature sampling seed
    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    /// Fit the tree. `y` must hold non-negative integer class codes.
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<&mut Self> {
        let n_samples = x.nrows();
        if n_samples != y.len() {
            return Err(CreditScoreError::ShapeError {
                expected: format!("y length = {}", n_samples),
                actual: format!("y length = {}", y.len()),
            });
        }
        if n_samples == 0 {
            return Err(CreditScoreError::EmptyDataset("cannot fit a tree on zero samples".to_string()));
        }

        let labels = class_codes(y)?;
        self.n_features = x.ncols();
        self.n_classes = labels.iter().copied().max().map_or(0, |m| m + 1);

        let mut ctx = BuildContext {
            x,
            y: &labels,
            importances: vec![0.0; self.n_features],
            rng: ChaCha8Rng::seed_from_u64(self.random_state),
        };

        let indices: Vec<usize> = (0..n_samples).collect();
        let root = self.build_tree(&mut ctx, &indices, 0);
        self.root = Some(root);

        let mut importances = ctx.importances;
        let total: f64 = importances.iter().sum();
        if total > 0.0 {
            for imp in &mut importances {
                *imp /= total;
            }
        }
        self.feature_importances = Some(Array1::from_vec(importances));

        Ok(self)
    }

    fn class_counts(&self, y: &[usize], indices: &[usize]) -> Vec<usize> {
        let mut counts = vec![0usize; self.n_classes];
        for &i in indices {
            counts[y[i]] += 1;
        }
        counts
    }

    fn build_tree(&self, ctx: &mut BuildContext<'_>, indices: &[usize], depth: usize) -> TreeNode {
        let n_samples = indices.len();
        let counts = self.class_counts(ctx.y, indices);
        let leaf = TreeNode::Leaf {
            class: majority_class(&counts),
            n_samples,
        };

        let is_pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let should_stop = n_samples < 2
            || self.max_depth.map_or(false, |d| depth >= d)
            || is_pure;
        if should_stop {
            return leaf;
        }

        let Some((feature_idx, threshold, gain)) = self.find_best_split(ctx, indices, &counts) else {
            return leaf;
        };

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| ctx.x[[i, feature_idx]] <= threshold);

        ctx.importances[feature_idx] += n_samples as f64 * gain;
        let impurity = gini(&counts, n_samples);

        let left = Box::new(self.build_tree(ctx, &left_indices, depth + 1));
        let right = Box::new(self.build_tree(ctx, &right_indices, depth + 1));

        TreeNode::Split {
            feature_idx,
            threshold,
            left,
            right,
            n_samples,
            impurity,
        }
    }

    fn find_best_split(
        &self,
        ctx: &mut BuildContext<'_>,
        indices: &[usize],
        parent_counts: &[usize],
    ) -> Option<(usize, f64, f64)> {
        let n = indices.len();
        let candidates: Vec<usize> = match self.max_features {
            Some(k) if k < self.n_features => sample(&mut ctx.rng, self.n_features, k).into_vec(),
            _ => (0..self.n_features).collect(),
        };

        let parent_impurity = gini(parent_counts, n);
        let mut best: Option<(usize, f64, f64)> = None;
        let mut best_gain = 0.0f64;
        let mut sorted = indices.to_vec();

        for feature_idx in candidates {
            let x = ctx.x;
            sorted.sort_by(|&a, &b| x[[a, feature_idx]].total_cmp(&x[[b, feature_idx]]));

            let mut left = vec![0usize; self.n_classes];
            let mut right = parent_counts.to_vec();

            for pos in 0..n - 1 {
                let idx = sorted[pos];
                let class = ctx.y[idx];
                left[class] += 1;
                right[class] -= 1;

                let value = x[[idx, feature_idx]];
                let next = x[[sorted[pos + 1], feature_idx]];
                if value >= next {
                    continue;
                }

                let left_n = pos + 1;
                let right_n = n - left_n;
                let weighted = (left_n as f64 * gini(&left, left_n)
                    + right_n as f64 * gini(&right, right_n))
                    / n as f64;
                let gain = parent_impurity - weighted;
                if gain > best_gain {
                    best_gain = gain;
                    best = Some((feature_idx, (value + next) / 2.0, gain));
                }
            }
        }

        best
    }

    /// Predict class codes
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let root = self.root.as_ref().ok_or(CreditScoreError::ModelNotFitted)?;
        if x.ncols() != self.n_features {
            return Err(CreditScoreError::ShapeError {
                expected: format!("{} features", self.n_features),
                actual: format!("{} features", x.ncols()),
            });
        }

        Ok(x.rows()
            .into_iter()
            .map(|row| Self::predict_sample(root, row) as f64)
            .collect())
    }

    fn predict_sample(node: &TreeNode, sample: ArrayView1<f64>) -> usize {
        match node {
            TreeNode::Leaf { class, .. } => *class,
            TreeNode::Split { feature_idx, threshold, left, right, .. } => {
                if sample[*feature_idx] <= *threshold {
                    Self::predict_sample(left, sample)
                } else {
                    Self::predict_sample(right, sample)
                }
            }
        }
    }

    /// Get feature importances
    pub fn feature_importances(&self) -> Option<&Array1<f64>> {
        self.feature_importances.as_ref()
    }
}

/// Convert float labels into class codes, rejecting anything that is not a
/// non-negative integer.
pub(crate) fn class_codes(y: &Array1<f64>) -> Result<Vec<usize>> {
    y.iter()
        .map(|&v| {
            if v.is_finite() && v >= 0.0 && v.fract() == 0.0 {
                Ok(v as usize)
            } else {
                Err(CreditScoreError::TrainingError(format!("Invalid class label: {v}")))
            }
        })
        .collect()
}

/// Index of the largest count; the lowest class wins ties.
pub(crate) fn majority_class<T: PartialOrd + Copy>(counts: &[T]) -> usize {
    let mut best = 0;
    for (class, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = class;
        }
    }
    best
}
