//! Label encoding for categorical columns

use crate::error::{CreditScoreError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Code substituted for a category absent from the fitted vocabulary
pub const UNKNOWN_CODE: usize = 0;

/// Per-field encoders keyed by column name
pub type FieldEncoders = BTreeMap<String, LabelEncoder>;

/// Label encoder (ordinal)
///
/// Classes are kept sorted, so a value's code is its position in the sorted
/// vocabulary. Immutable once fit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelEncoder {
    classes: Vec<String>,
}

impl LabelEncoder {
    /// Fit the encoder on the distinct values of `values`
    pub fn fit<I, S>(values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let classes: BTreeSet<String> = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect();

        if classes.is_empty() {
            return Err(CreditScoreError::DataError(
                "Cannot fit a label encoder on an empty column".to_string(),
            ));
        }

        Ok(Self {
            classes: classes.into_iter().collect(),
        })
    }

    /// Fit and return codes for the same values
    pub fn fit_transform(values: &[String]) -> Result<(Self, Vec<usize>)> {
        let encoder = Self::fit(values)?;
        let codes = encoder.transform_all(values)?;
        Ok((encoder, codes))
    }

    /// Known classes in code order
    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    /// Number of known classes
    pub fn n_classes(&self) -> usize {
        self.classes.len()
    }

    /// Whether `value` is part of the fitted vocabulary
    pub fn contains(&self, value: &str) -> bool {
        self.transform(value).is_some()
    }

    /// Code of a known value
    pub fn transform(&self, value: &str) -> Option<usize> {
        self.classes
            .binary_search_by(|class| class.as_str().cmp(value))
            .ok()
    }

    /// Code of `value`, or [`UNKNOWN_CODE`] for an unseen value
    pub fn transform_or_fallback(&self, value: &str) -> usize {
        self.transform(value).unwrap_or(UNKNOWN_CODE)
    }

    /// Codes for values that must all be known
    pub fn transform_all(&self, values: &[String]) -> Result<Vec<usize>> {
        values
            .iter()
            .map(|v| {
                self.transform(v).ok_or_else(|| {
                    CreditScoreError::DataError(format!("Value not in encoder vocabulary: {v}"))
                })
            })
            .collect()
    }

    /// Class label for a code
    pub fn inverse_transform(&self, code: usize) -> Result<&str> {
        self.classes
            .get(code)
            .map(String::as_str)
            .ok_or(CreditScoreError::UnknownClass(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn labels(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_classes_are_sorted_and_unique() {
        let encoder = LabelEncoder::fit(["Standard", "Poor", "Good", "Poor"]).unwrap();
        assert_eq!(encoder.classes(), &["Good", "Poor", "Standard"]);
        assert_eq!(encoder.n_classes(), 3);
    }

    #[test]
    fn test_fit_transform_codes() {
        let (encoder, codes) =
            LabelEncoder::fit_transform(&labels(&["Medico", "Advogado", "Medico"])).unwrap();
        assert_eq!(codes, vec![1, 0, 1]);
        assert!(encoder.contains("Advogado"));
    }

    #[test]
    fn test_inverse_of_transform_is_identity() {
        let encoder = LabelEncoder::fit(["Good", "Poor", "Standard"]).unwrap();
        for label in ["Good", "Poor", "Standard"] {
            let code = encoder.transform(label).unwrap();
            assert_eq!(encoder.inverse_transform(code).unwrap(), label);
        }
    }

    #[test]
    fn test_unseen_value_falls_back_to_zero() {
        let encoder = LabelEncoder::fit(["Advogado", "Engenheiro"]).unwrap();
        assert_eq!(encoder.transform("Astronauta"), None);
        assert_eq!(encoder.transform_or_fallback("Astronauta"), UNKNOWN_CODE);
        assert_eq!(encoder.transform_or_fallback("Engenheiro"), 1);
    }

    #[test]
    fn test_inverse_out_of_range() {
        let encoder = LabelEncoder::fit(["Good"]).unwrap();
        assert!(matches!(
            encoder.inverse_transform(5),
            Err(CreditScoreError::UnknownClass(5))
        ));
    }

    #[test]
    fn test_fit_empty_fails() {
        let empty: Vec<String> = Vec::new();
        assert!(LabelEncoder::fit(empty).is_err());
    }

    #[test]
    fn test_transform_all_rejects_unknown() {
        let encoder = LabelEncoder::fit(["a", "b"]).unwrap();
        assert!(encoder.transform_all(&labels(&["a", "c"])).is_err());
    }
}
