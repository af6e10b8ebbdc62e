//! Missing value imputation
//!
//! Numeric columns are filled with their mean over the full column; text
//! columns with a fixed placeholder category. Both run before any encoder is
//! fit, so encoders never see a missing value.

use crate::error::Result;
use polars::prelude::*;

/// Placeholder category for missing text values
pub const UNKNOWN_CATEGORY: &str = "Unknown";

/// A column after imputation
#[derive(Debug, Clone, PartialEq)]
pub enum ImputedColumn {
    Numeric(Vec<f64>),
    Categorical(Vec<String>),
}

impl ImputedColumn {
    pub fn len(&self) -> usize {
        match self {
            ImputedColumn::Numeric(v) => v.len(),
            ImputedColumn::Categorical(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Impute a single column, choosing the policy from its dtype.
///
/// A numeric column with no values at all is filled with 0.0.
pub fn impute_column(series: &Series) -> Result<ImputedColumn> {
    if matches!(series.dtype(), DataType::String) {
        let values = series
            .str()?
            .into_iter()
            .map(|v| v.unwrap_or(UNKNOWN_CATEGORY).to_string())
            .collect();
        return Ok(ImputedColumn::Categorical(values));
    }

    let cast = series.cast(&DataType::Float64)?;
    let ca = cast.f64()?;
    let mean = ca.mean().unwrap_or(0.0);
    let values = ca.into_iter().map(|v| v.unwrap_or(mean)).collect();
    Ok(ImputedColumn::Numeric(values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_mean_fill() {
        let series = Series::new("salario_anual".into(), &[Some(10.0), None, Some(20.0)]);
        let imputed = impute_column(&series).unwrap();
        assert_eq!(imputed, ImputedColumn::Numeric(vec![10.0, 15.0, 20.0]));
    }

    #[test]
    fn test_integer_column_is_numeric() {
        let series = Series::new("num_contas".into(), &[Some(1i64), Some(3), None]);
        let imputed = impute_column(&series).unwrap();
        assert_eq!(imputed, ImputedColumn::Numeric(vec![1.0, 3.0, 2.0]));
    }

    #[test]
    fn test_text_placeholder_fill() {
        let series = Series::new("profissao".into(), &[Some("Engenheiro"), None]);
        let imputed = impute_column(&series).unwrap();
        assert_eq!(
            imputed,
            ImputedColumn::Categorical(vec!["Engenheiro".to_string(), UNKNOWN_CATEGORY.to_string()])
        );
    }

    #[test]
    fn test_all_null_numeric_fills_zero() {
        let series = Series::new("divida_total".into(), &[None::<f64>, None]);
        let imputed = impute_column(&series).unwrap();
        assert_eq!(imputed, ImputedColumn::Numeric(vec![0.0, 0.0]));
    }
}
