//! K-Nearest Neighbors classifier
//!
//! Stores the training set and answers by a vote among the `k` closest rows.

use ndarray::{Array1, Array2, ArrayView1, ArrayView2};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

use super::decision_tree::{class_codes, majority_class};
use crate::error::{CreditScoreError, Result};

/// K-Nearest Neighbors Classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNNClassifier {
    /// Number of neighbors consulted per query
    pub n_neighbors: usize,
    x_train: Option<Array2<f64>>,
    y_train: Vec<usize>,
    n_classes: usize,
}

impl KNNClassifier {
    /// Create an unfitted classifier consulting `k` neighbors
    pub fn with_k(k: usize) -> Self {
        Self {
            n_neighbors: k,
            x_train: None,
            y_train: Vec::new(),
            n_classes: 0,
        }
    }

    /// Fit the classifier (stores training data)
    pub fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        if x.nrows() != y.len() {
            return Err(CreditScoreError::ShapeError {
                expected: format!("y length = {}", x.nrows()),
                actual: format!("y length = {}", y.len()),
            });
        }
        if x.nrows() == 0 {
            return Err(CreditScoreError::EmptyDataset("cannot fit KNN on zero samples".to_string()));
        }
        if self.n_neighbors == 0 {
            return Err(CreditScoreError::TrainingError("n_neighbors must be at least 1".to_string()));
        }

        self.y_train = class_codes(y)?;
        self.n_classes = self.y_train.iter().copied().max().map_or(0, |m| m + 1);
        self.x_train = Some(x.clone());
        Ok(())
    }

    /// Predict class codes (parallelized over query rows)
    ///
    /// When `k` exceeds the training size every training row votes. Ties go to
    /// the lowest class code.
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let votes = self.class_votes(x)?;
        Ok(votes.into_iter().map(|v| majority_class(&v) as f64).collect())
    }

    /// Number of features seen during fit
    pub fn n_features(&self) -> usize {
        self.x_train.as_ref().map_or(0, |x| x.ncols())
    }

    fn class_votes(&self, x: &Array2<f64>) -> Result<Vec<Vec<usize>>> {
        let x_train = self.x_train.as_ref().ok_or(CreditScoreError::ModelNotFitted)?;
        if x.ncols() != x_train.ncols() {
            return Err(CreditScoreError::ShapeError {
                expected: format!("{} features", x_train.ncols()),
                actual: format!("{} features", x.ncols()),
            });
        }

        let k = self.n_neighbors.min(x_train.nrows());
        Ok((0..x.nrows())
            .into_par_iter()
            .map(|i| {
                let mut votes = vec![0usize; self.n_classes];
                for label in find_k_nearest(x.row(i), x_train.view(), &self.y_train, k) {
                    votes[label] += 1;
                }
                votes
            })
            .collect())
    }
}

/// Max-heap entry ordered by distance, then by training row index so equal
/// distances resolve the same way on every run.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Neighbor {
    dist: f64,
    row: usize,
    label: usize,
}

impl Eq for Neighbor {}

impl PartialOrd for Neighbor {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Neighbor {
    fn cmp(&self, other: &Self) -> Ordering {
        self.dist
            .total_cmp(&other.dist)
            .then_with(|| self.row.cmp(&other.row))
    }
}

/// Labels of the `k` nearest training rows
fn find_k_nearest(
    query: ArrayView1<f64>,
    x_train: ArrayView2<f64>,
    y_train: &[usize],
    k: usize,
) -> Vec<usize> {
    let mut heap: BinaryHeap<Neighbor> = BinaryHeap::with_capacity(k + 1);

    for (row, train_row) in x_train.rows().into_iter().enumerate() {
        let candidate = Neighbor {
            dist: euclidean_distance(query, train_row),
            row,
            label: y_train[row],
        };
        if heap.len() < k {
            heap.push(candidate);
        } else if let Some(worst) = heap.peek() {
            if candidate < *worst {
                heap.pop();
                heap.push(candidate);
            }
        }
    }

    heap.into_iter().map(|n| n.label).collect()
}

fn euclidean_distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(ai, bi)| {
            let d = ai - bi;
            d * d
        })
        .sum::<f64>()
        .sqrt()
}
