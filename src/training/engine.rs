//! Training engine: preprocess, split, fit both candidates, keep the better one

use crate::error::{CreditScoreError, Result};
use crate::export::ArtifactBundle;
use crate::preprocessing::prepare_dataset;
use super::config::TrainingConfig;
use super::knn::KNNClassifier;
use super::metrics::{accuracy, top_features, FeatureImportance};
use super::random_forest::RandomForest;
use super::split::train_test_split;
use ndarray::{Array1, Array2};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Instant;
use tracing::{info, warn};

/// Which algorithm a trained classifier is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassifierKind {
    RandomForest,
    KNearestNeighbors,
}

impl fmt::Display for ClassifierKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassifierKind::RandomForest => write!(f, "random_forest"),
            ClassifierKind::KNearestNeighbors => write!(f, "knn"),
        }
    }
}

/// The persisted classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum CreditClassifier {
    RandomForest(RandomForest),
    KNearestNeighbors(KNNClassifier),
}

impl CreditClassifier {
    pub fn kind(&self) -> ClassifierKind {
        match self {
            CreditClassifier::RandomForest(_) => ClassifierKind::RandomForest,
            CreditClassifier::KNearestNeighbors(_) => ClassifierKind::KNearestNeighbors,
        }
    }

    /// Predict class codes for each row of `x`
    pub fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        match self {
            CreditClassifier::RandomForest(m) => m.predict(x),
            CreditClassifier::KNearestNeighbors(m) => m.predict(x),
        }
    }

    /// Width of the feature vector the classifier was fit on
    pub fn n_features(&self) -> usize {
        match self {
            CreditClassifier::RandomForest(m) => m.n_features(),
            CreditClassifier::KNearestNeighbors(m) => m.n_features(),
        }
    }
}

/// Pick the candidate with the higher test accuracy; the forest wins a tie.
pub fn select_classifier(forest_accuracy: f64, knn_accuracy: f64) -> ClassifierKind {
    if forest_accuracy >= knn_accuracy {
        ClassifierKind::RandomForest
    } else {
        ClassifierKind::KNearestNeighbors
    }
}

/// Summary of a training run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub run_id: String,
    pub n_samples: usize,
    pub n_train: usize,
    pub n_test: usize,
    pub n_features: usize,
    pub forest_accuracy: f64,
    pub knn_accuracy: f64,
    pub selected: ClassifierKind,
    /// Most important features according to the forest
    pub top_features: Vec<FeatureImportance>,
    pub classes: Vec<String>,
    pub training_time_secs: f64,
}

/// Artifacts plus report from one run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    pub bundle: ArtifactBundle,
    pub report: TrainingReport,
}

/// Main training engine
#[derive(Debug, Clone)]
pub struct TrainEngine {
    config: TrainingConfig,
}

impl TrainEngine {
    /// Create a new training engine
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    /// Run the full training flow over a raw customer frame
    pub fn train(&self, df: &DataFrame) -> Result<TrainingOutcome> {
        let start = Instant::now();
        let prepared = prepare_dataset(df, &self.config.target_column, &self.config.drop_columns)?;
        let split = train_test_split(
            &prepared.x,
            &prepared.y,
            self.config.test_size,
            self.config.random_state,
        )?;

        info!(
            train = split.x_train.nrows(),
            test = split.x_test.nrows(),
            "Training random forest ({} trees)",
            self.config.n_estimators
        );
        let mut forest = RandomForest::new(self.config.n_estimators)
            .with_random_state(self.config.random_state);
        if let Some(depth) = self.config.max_depth {
            forest = forest.with_max_depth(depth);
        }
        forest.fit(&split.x_train, &split.y_train)?;
        let forest_accuracy = accuracy(&split.y_test, &forest.predict(&split.x_test)?);
        info!(accuracy = forest_accuracy, "Random forest evaluated");

        info!(k = self.config.n_neighbors, "Training KNN");
        let mut knn = KNNClassifier::with_k(self.config.n_neighbors);
        knn.fit(&split.x_train, &split.y_train)?;
        let knn_accuracy = accuracy(&split.y_test, &knn.predict(&split.x_test)?);
        info!(accuracy = knn_accuracy, "KNN evaluated");

        let top = match forest.feature_importances() {
            Some(importances) => top_features(&prepared.feature_names, importances, self.config.top_features),
            None => {
                warn!("Random forest produced no feature importances");
                Vec::new()
            }
        };

        let selected = select_classifier(forest_accuracy, knn_accuracy);
        info!(%selected, "Selected final classifier");
        let classifier = match selected {
            ClassifierKind::RandomForest => CreditClassifier::RandomForest(forest),
            ClassifierKind::KNearestNeighbors => CreditClassifier::KNearestNeighbors(knn),
        };

        if classifier.n_features() != prepared.feature_names.len() {
            return Err(CreditScoreError::TrainingError(format!(
                "classifier expects {} features but manifest lists {}",
                classifier.n_features(),
                prepared.feature_names.len()
            )));
        }

        let classes = prepared.target_encoder.classes().to_vec();
        let bundle = ArtifactBundle::new(
            classifier,
            prepared.encoders,
            prepared.target_encoder,
            prepared.feature_names,
        );

        let report = TrainingReport {
            run_id: bundle.header.run_id.clone(),
            n_samples: prepared.x.nrows(),
            n_train: split.x_train.nrows(),
            n_test: split.x_test.nrows(),
            n_features: prepared.x.ncols(),
            forest_accuracy,
            knn_accuracy,
            selected,
            top_features: top,
            classes,
            training_time_secs: start.elapsed().as_secs_f64(),
        };

        Ok(TrainingOutcome { bundle, report })
    }
}
