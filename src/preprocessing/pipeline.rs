//! Training-time preprocessing: column dropping, imputation and encoding

use crate::error::{CreditScoreError, Result};
use super::encoder::{FieldEncoders, LabelEncoder};
use super::imputer::{impute_column, ImputedColumn};
use ndarray::{Array1, Array2};
use polars::prelude::*;
use tracing::{debug, info};

/// Numeric training data plus the fitted encoders that produced it
#[derive(Debug, Clone)]
pub struct PreparedDataset {
    /// Feature column names, in matrix column order
    pub feature_names: Vec<String>,
    /// Feature matrix (rows x features)
    pub x: Array2<f64>,
    /// Encoded target
    pub y: Array1<f64>,
    /// One encoder per categorical feature column
    pub encoders: FieldEncoders,
    /// Encoder for the target column
    pub target_encoder: LabelEncoder,
}

impl PreparedDataset {
    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }
}

/// Clean and encode a raw customer frame.
///
/// Columns named in `drop_columns` are removed when present. Every remaining
/// column is imputed; text features get a fitted [`LabelEncoder`] each, and
/// the target column gets its own encoder. Feature order follows the frame.
pub fn prepare_dataset(
    df: &DataFrame,
    target_column: &str,
    drop_columns: &[String],
) -> Result<PreparedDataset> {
    if df.height() == 0 {
        return Err(CreditScoreError::EmptyDataset(
            "customer table has no rows".to_string(),
        ));
    }

    let target_series = df
        .column(target_column)
        .map_err(|_| CreditScoreError::FeatureNotFound(target_column.to_string()))?
        .as_materialized_series();

    let target_values = match impute_column(target_series)? {
        ImputedColumn::Categorical(values) => values,
        ImputedColumn::Numeric(values) => values.iter().map(|v| v.to_string()).collect(),
    };
    let (target_encoder, target_codes) = LabelEncoder::fit_transform(&target_values)?;

    let mut feature_names = Vec::new();
    let mut feature_columns: Vec<Vec<f64>> = Vec::new();
    let mut encoders = FieldEncoders::new();

    for column in df.get_columns() {
        let name = column.name().as_str();
        if name == target_column || drop_columns.iter().any(|d| d == name) {
            continue;
        }

        let values = match impute_column(column.as_materialized_series())? {
            ImputedColumn::Numeric(values) => values,
            ImputedColumn::Categorical(values) => {
                let (encoder, codes) = LabelEncoder::fit_transform(&values)?;
                debug!(column = %name, classes = encoder.n_classes(), "Fitted categorical encoder");
                encoders.insert(name.to_string(), encoder);
                codes.into_iter().map(|c| c as f64).collect()
            }
        };

        feature_names.push(name.to_string());
        feature_columns.push(values);
    }

    if feature_names.is_empty() {
        return Err(CreditScoreError::DataError(
            "no feature columns left after dropping identifiers and target".to_string(),
        ));
    }

    let n_rows = df.height();
    let x = Array2::from_shape_fn((n_rows, feature_columns.len()), |(r, c)| feature_columns[c][r]);
    let y: Array1<f64> = target_codes.into_iter().map(|c| c as f64).collect();

    info!(
        rows = n_rows,
        features = feature_names.len(),
        categorical = encoders.len(),
        classes = target_encoder.n_classes(),
        "Dataset prepared"
    );

    Ok(PreparedDataset {
        feature_names,
        x,
        y,
        encoders,
        target_encoder,
    })
}
