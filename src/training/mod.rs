//! Model training module
//!
//! Provides the offline training flow:
//! - Decision trees and Random Forests
//! - K-Nearest Neighbors
//! - Seeded train/test split and accuracy evaluation
//! - Selection of the better classifier for serving

mod config;
mod engine;
mod metrics;
mod split;
pub mod decision_tree;
pub mod knn;
pub mod random_forest;

pub use config::TrainingConfig;
pub use engine::{
    select_classifier, ClassifierKind, CreditClassifier, TrainEngine, TrainingOutcome,
    TrainingReport,
};
pub use metrics::{accuracy, top_features, FeatureImportance};
pub use split::{train_test_split, DatasetSplit};
pub use decision_tree::{DecisionTree, TreeNode};
pub use knn::KNNClassifier;
pub use random_forest::RandomForest;
