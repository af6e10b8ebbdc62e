//! On-disk model artifacts
//!
//! A training run persists four files into the models directory:
//!
//! | file                   | content                          | format  |
//! |------------------------|----------------------------------|---------|
//! | `model.bin`            | selected classifier              | bincode |
//! | `encoders.json`        | per-field label encoders         | JSON    |
//! | `target_encoder.json`  | target label encoder             | JSON    |
//! | `model_features.json`  | ordered feature manifest         | JSON    |
//!
//! Every file wraps its payload in an envelope carrying the same run id, so a
//! directory holding files from two different runs is rejected on load.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{CreditScoreError, Result};
use crate::preprocessing::{FieldEncoders, LabelEncoder};
use crate::training::CreditClassifier;

/// Bumped whenever a payload layout changes
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

pub const MODEL_FILE: &str = "model.bin";
pub const ENCODERS_FILE: &str = "encoders.json";
pub const TARGET_ENCODER_FILE: &str = "target_encoder.json";
pub const FEATURES_FILE: &str = "model_features.json";

/// Identity shared by all four files of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactHeader {
    pub format_version: u32,
    pub run_id: String,
    pub trained_at: DateTime<Utc>,
}

impl ArtifactHeader {
    fn new_run() -> Self {
        Self {
            format_version: ARTIFACT_FORMAT_VERSION,
            run_id: Uuid::new_v4().to_string(),
            trained_at: Utc::now(),
        }
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    header: &'a ArtifactHeader,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    header: ArtifactHeader,
    payload: T,
}

/// Everything the prediction service needs from a training run
#[derive(Debug, Clone)]
pub struct ArtifactBundle {
    pub header: ArtifactHeader,
    pub classifier: CreditClassifier,
    pub encoders: FieldEncoders,
    pub target_encoder: LabelEncoder,
    pub feature_names: Vec<String>,
}

#[derive(Clone, Copy)]
enum Format {
    Binary,
    Json,
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

/// Best effort; files already renamed are gone from their staged path.
fn remove_staged(staged: &[PathBuf]) {
    for path in staged {
        let _ = fs::remove_file(path);
    }
}

fn write_envelope<T: Serialize>(path: &Path, header: &ArtifactHeader, payload: &T, format: Format) -> Result<()> {
    let envelope = EnvelopeRef { header, payload };
    let file = File::create(path).map_err(|e| {
        CreditScoreError::ArtifactError(format!("Failed to create {}: {}", path.display(), e))
    })?;
    let mut writer = BufWriter::new(file);
    match format {
        Format::Binary => bincode::serialize_into(&mut writer, &envelope)?,
        Format::Json => serde_json::to_writer_pretty(&mut writer, &envelope)?,
    }
    writer.flush()?;
    Ok(())
}

fn read_envelope<T: DeserializeOwned>(path: &Path, format: Format) -> Result<Envelope<T>> {
    let file = File::open(path).map_err(|e| {
        CreditScoreError::ArtifactError(format!("Failed to open {}: {}", path.display(), e))
    })?;
    let reader = BufReader::new(file);
    let envelope = match format {
        Format::Binary => bincode::deserialize_from(reader)?,
        Format::Json => serde_json::from_reader(reader)?,
    };
    Ok(envelope)
}

impl ArtifactBundle {
    /// Bundle the outputs of a fresh run under a new run id
    pub fn new(
        classifier: CreditClassifier,
        encoders: FieldEncoders,
        target_encoder: LabelEncoder,
        feature_names: Vec<String>,
    ) -> Self {
        Self {
            header: ArtifactHeader::new_run(),
            classifier,
            encoders,
            target_encoder,
            feature_names,
        }
    }

    /// Write all four files into `dir`.
    ///
    /// Files are staged under a `.tmp` suffix and renamed into place only
    /// after every one of them was written.
    pub fn save(&self, dir: &Path) -> Result<()> {
        fs::create_dir_all(dir)?;

        let targets = [
            dir.join(MODEL_FILE),
            dir.join(ENCODERS_FILE),
            dir.join(TARGET_ENCODER_FILE),
            dir.join(FEATURES_FILE),
        ];
        let staged: Vec<PathBuf> = targets.iter().map(|p| staging_path(p)).collect();

        let written = write_envelope(&staged[0], &self.header, &self.classifier, Format::Binary)
            .and_then(|_| write_envelope(&staged[1], &self.header, &self.encoders, Format::Json))
            .and_then(|_| write_envelope(&staged[2], &self.header, &self.target_encoder, Format::Json))
            .and_then(|_| write_envelope(&staged[3], &self.header, &self.feature_names, Format::Json));

        if let Err(e) = written {
            remove_staged(&staged);
            return Err(e);
        }

        for (from, to) in staged.iter().zip(targets.iter()) {
            if let Err(e) = fs::rename(from, to) {
                remove_staged(&staged);
                return Err(CreditScoreError::ArtifactError(format!(
                    "Failed to move {} into place: {}",
                    to.display(),
                    e
                )));
            }
            debug!(path = %to.display(), "Artifact written");
        }

        info!(
            dir = %dir.display(),
            run_id = %self.header.run_id,
            classifier = %self.classifier.kind(),
            "Artifacts saved"
        );
        Ok(())
    }

    /// Read and cross-check all four files from `dir`
    pub fn load(dir: &Path) -> Result<Self> {
        let model: Envelope<CreditClassifier> = read_envelope(&dir.join(MODEL_FILE), Format::Binary)?;
        let encoders: Envelope<FieldEncoders> = read_envelope(&dir.join(ENCODERS_FILE), Format::Json)?;
        let target: Envelope<LabelEncoder> = read_envelope(&dir.join(TARGET_ENCODER_FILE), Format::Json)?;
        let features: Envelope<Vec<String>> = read_envelope(&dir.join(FEATURES_FILE), Format::Json)?;

        let header = model.header;
        for (file, other) in [
            (ENCODERS_FILE, &encoders.header),
            (TARGET_ENCODER_FILE, &target.header),
            (FEATURES_FILE, &features.header),
        ] {
            if other.run_id != header.run_id {
                return Err(CreditScoreError::ArtifactError(format!(
                    "{} belongs to run {} but {} belongs to run {}",
                    file, other.run_id, MODEL_FILE, header.run_id
                )));
            }
        }
        if header.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(CreditScoreError::ArtifactError(format!(
                "unsupported artifact format version {} (expected {})",
                header.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }

        let bundle = Self {
            header,
            classifier: model.payload,
            encoders: encoders.payload,
            target_encoder: target.payload,
            feature_names: features.payload,
        };
        bundle.validate()?;
        Ok(bundle)
    }

    fn validate(&self) -> Result<()> {
        if self.feature_names.is_empty() {
            return Err(CreditScoreError::ArtifactError("feature manifest is empty".to_string()));
        }
        if self.classifier.n_features() != self.feature_names.len() {
            return Err(CreditScoreError::ArtifactError(format!(
                "classifier expects {} features but manifest lists {}",
                self.classifier.n_features(),
                self.feature_names.len()
            )));
        }
        if let Some(field) = self.encoders.keys().find(|k| !self.feature_names.contains(k)) {
            return Err(CreditScoreError::ArtifactError(format!(
                "encoder for '{field}' has no entry in the feature manifest"
            )));
        }
        Ok(())
    }
}
