//! Training configuration

use serde::{Deserialize, Serialize};

/// Settings for one training run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Target column name
    pub target_column: String,
    /// Identifier columns removed before training
    pub drop_columns: Vec<String>,
    /// Held-out fraction
    pub test_size: f64,
    /// Seed for the split and the forest
    pub random_state: u64,
    /// Trees in the random forest
    pub n_estimators: usize,
    /// Maximum tree depth (None = grow until pure)
    pub max_depth: Option<usize>,
    /// Neighbors consulted by KNN
    pub n_neighbors: usize,
    /// Features listed in the training report
    pub top_features: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            target_column: "score_credito".to_string(),
            drop_columns: vec!["id_cliente".to_string(), "mes".to_string()],
            test_size: 0.3,
            random_state: 42,
            n_estimators: 100,
            max_depth: None,
            n_neighbors: 5,
            top_features: 5,
        }
    }
}

impl TrainingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target_column = target.into();
        self
    }

    pub fn with_drop_columns(mut self, columns: Vec<String>) -> Self {
        self.drop_columns = columns;
        self
    }

    pub fn with_test_size(mut self, test_size: f64) -> Self {
        self.test_size = test_size;
        self
    }

    pub fn with_random_state(mut self, seed: u64) -> Self {
        self.random_state = seed;
        self
    }

    pub fn with_n_estimators(mut self, n: usize) -> Self {
        self.n_estimators = n;
        self
    }

    pub fn with_max_depth(mut self, depth: usize) -> Self {
        self.max_depth = Some(depth);
        self
    }

    pub fn with_n_neighbors(mut self, k: usize) -> Self {
        self.n_neighbors = k;
        self
    }
}
