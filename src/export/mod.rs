//! Model export module
//!
//! Persists a training run as a set of versioned artifact files and reads
//! them back for serving.

mod artifacts;

pub use artifacts::{
    ArtifactBundle, ArtifactHeader, ARTIFACT_FORMAT_VERSION, ENCODERS_FILE, FEATURES_FILE,
    MODEL_FILE, TARGET_ENCODER_FILE,
};
