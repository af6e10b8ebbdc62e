//! Data preprocessing module
//!
//! Provides the cleaning steps shared by training and serving:
//! - Missing value imputation (column mean, "Unknown" placeholder)
//! - Label encoding of categorical columns with an unknown-value fallback
//! - Conversion of a raw customer frame into a numeric training matrix

mod encoder;
mod imputer;
mod pipeline;

pub use encoder::{FieldEncoders, LabelEncoder, UNKNOWN_CODE};
pub use imputer::{impute_column, ImputedColumn, UNKNOWN_CATEGORY};
pub use pipeline::{prepare_dataset, PreparedDataset};
