//! Single-record scoring against a loaded artifact bundle

use super::record::{CustomerRecord, FieldValue};
use crate::error::{CreditScoreError, Result};
use crate::export::{ArtifactBundle, ArtifactHeader};
use crate::preprocessing::{FieldEncoders, LabelEncoder};
use crate::training::{ClassifierKind, CreditClassifier};
use ndarray::{Array1, Array2, Axis};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// A record after categorical fields were replaced by their codes
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedRecord {
    values: BTreeMap<&'static str, f64>,
}

impl EncodedRecord {
    pub fn get(&self, name: &str) -> Option<f64> {
        self.values.get(name).copied()
    }

    /// Values laid out in `order`. Fields not named in `order` are dropped.
    pub fn to_feature_vector(&self, order: &[String]) -> Result<Array1<f64>> {
        order
            .iter()
            .map(|name| {
                self.get(name)
                    .ok_or_else(|| CreditScoreError::FeatureNotFound(name.clone()))
            })
            .collect()
    }
}

/// Classifier plus the encoders and manifest it was trained with
#[derive(Debug, Clone)]
pub struct CreditModel {
    header: ArtifactHeader,
    classifier: CreditClassifier,
    encoders: FieldEncoders,
    target_encoder: LabelEncoder,
    feature_names: Vec<String>,
}

impl CreditModel {
    /// Wrap a bundle, checking it can score a [`CustomerRecord`]
    pub fn from_bundle(bundle: ArtifactBundle) -> Result<Self> {
        for name in &bundle.feature_names {
            if !CustomerRecord::FIELD_NAMES.contains(&name.as_str()) {
                return Err(CreditScoreError::ArtifactError(format!(
                    "model feature '{name}' is not a customer record field"
                )));
            }
            let has_encoder = bundle.encoders.contains_key(name);
            if CustomerRecord::is_categorical(name) != has_encoder {
                return Err(CreditScoreError::ArtifactError(format!(
                    "feature '{name}' was {} at training time but is {} in the request schema",
                    if has_encoder { "categorical" } else { "numeric" },
                    if has_encoder { "numeric" } else { "categorical" },
                )));
            }
        }

        Ok(Self {
            header: bundle.header,
            classifier: bundle.classifier,
            encoders: bundle.encoders,
            target_encoder: bundle.target_encoder,
            feature_names: bundle.feature_names,
        })
    }

    /// Load and validate the artifacts in `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        Self::from_bundle(ArtifactBundle::load(dir)?)
    }

    pub fn run_id(&self) -> &str {
        &self.header.run_id
    }

    pub fn header(&self) -> &ArtifactHeader {
        &self.header
    }

    pub fn kind(&self) -> ClassifierKind {
        self.classifier.kind()
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    pub fn classes(&self) -> &[String] {
        self.target_encoder.classes()
    }

    /// Replace categorical values with their codes; unseen values get code 0.
    ///
    /// Text fields without a fitted encoder are left out, which only matters
    /// if the manifest asks for them.
    pub fn encode(&self, record: &CustomerRecord) -> EncodedRecord {
        let mut values = BTreeMap::new();

        for name in CustomerRecord::FIELD_NAMES {
            let Some(value) = record.field(name) else { continue };
            match value {
                FieldValue::Number(v) => {
                    values.insert(name, v);
                }
                FieldValue::Category(category) => {
                    let Some(encoder) = self.encoders.get(name) else { continue };
                    let code = match encoder.transform(category) {
                        Some(code) => code,
                        None => {
                            debug!(field = name, value = category, "Unseen category, using fallback code");
                            encoder.transform_or_fallback(category)
                        }
                    };
                    values.insert(name, code as f64);
                }
            }
        }

        EncodedRecord { values }
    }

    /// Score one record and return its credit label
    pub fn predict(&self, record: &CustomerRecord) -> Result<String> {
        let encoded = self.encode(record);
        let features = encoded.to_feature_vector(&self.feature_names)?;
        let x: Array2<f64> = features.insert_axis(Axis(0));

        let prediction = self.classifier.predict(&x)?;
        let code = prediction
            .get(0)
            .copied()
            .ok_or_else(|| CreditScoreError::InferenceError("classifier returned no prediction".to_string()))?;
        if !(code.is_finite() && code >= 0.0) {
            return Err(CreditScoreError::InferenceError(format!("invalid class code {code}")));
        }

        let label = self.target_encoder.inverse_transform(code as usize)?;
        Ok(label.to_string())
    }
}
