//! Inference module
//!
//! Turns a [`CustomerRecord`] into a credit label using the artifacts of a
//! training run. Unseen categories fall back to code 0 and the feature
//! vector always follows the persisted manifest order.

mod engine;
mod record;

pub use engine::{CreditModel, EncodedRecord};
pub use record::{CustomerRecord, FieldValue};
