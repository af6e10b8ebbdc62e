//! Evaluation helpers

use ndarray::Array1;
use serde::{Deserialize, Serialize};

/// Fraction of positions where prediction equals truth; 0.0 for empty input
pub fn accuracy(y_true: &Array1<f64>, y_pred: &Array1<f64>) -> f64 {
    let n = y_true.len().min(y_pred.len());
    if n == 0 {
        return 0.0;
    }
    let correct = y_true
        .iter()
        .zip(y_pred.iter())
        .filter(|(t, p)| (*t - *p).abs() < 1e-9)
        .count();
    correct as f64 / n as f64
}

/// A named feature importance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// The `k` most important features, descending. Equal scores keep column order.
pub fn top_features(names: &[String], importances: &Array1<f64>, k: usize) -> Vec<FeatureImportance> {
    let mut pairs: Vec<FeatureImportance> = names
        .iter()
        .zip(importances.iter())
        .map(|(name, &importance)| FeatureImportance {
            feature: name.clone(),
            importance,
        })
        .collect();
    pairs.sort_by(|a, b| b.importance.total_cmp(&a.importance));
    pairs.truncate(k);
    pairs
}
