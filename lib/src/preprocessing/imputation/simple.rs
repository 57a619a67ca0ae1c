//! Simple Imputer.
//!
//! Completes missing numeric values with a per-column statistic learned at
//! training time. Absent values and NaN are both treated as missing.
//!
//! # Example
//! ```ignore
//! use immo_price::preprocessing::{FittedSimpleImputer, ImputeStrategy, SimpleImputerParams};
//!
//! let imputer = FittedSimpleImputer::from_params(SimpleImputerParams {
//!     strategy: ImputeStrategy::Mean,
//!     columns: vec!["total_area_sqm".into()],
//!     statistics: vec![145.0],
//! })?;
//! let imputed = imputer.impute(&validated.numeric)?;
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, PredictionError};
use crate::preprocessing::traits::FittedStep;

/// Strategy the statistics were computed with.
///
/// Informational at inference time; the stored statistics are applied as-is.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImputeStrategy {
    /// Mean of each column.
    #[default]
    Mean,
    /// Median of each column.
    Median,
    /// Most frequent value of each column.
    MostFrequent,
    /// A constant fill value.
    Constant(f64),
}

/// Serializable parameters for a fitted SimpleImputer.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SimpleImputerParams {
    /// Strategy used for imputation.
    #[serde(default)]
    pub strategy: ImputeStrategy,
    /// Numeric columns, in schema order.
    pub columns: Vec<String>,
    /// Fill value for each column.
    pub statistics: Vec<f64>,
}

/// Fitted SimpleImputer ready for inference.
#[derive(Clone, Debug)]
pub struct FittedSimpleImputer {
    strategy: ImputeStrategy,
    columns: Vec<String>,
    statistics: Vec<f64>,
}

impl FittedSimpleImputer {
    /// Get the imputation statistics (fill values) for each column.
    pub fn statistics(&self) -> &[f64] {
        &self.statistics
    }

    pub fn strategy(&self) -> &ImputeStrategy {
        &self.strategy
    }

    /// Fill value for `column`, if it is one of the imputer's columns.
    pub fn fill_value(&self, column: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == column)
            .map(|i| self.statistics[i])
    }

    /// Replace every absent value with the learned statistic for its column.
    ///
    /// Present values pass through unchanged. Every imputer column must be a
    /// key of `values`.
    pub fn impute(
        &self,
        values: &HashMap<String, Option<f64>>,
    ) -> Result<HashMap<String, f64>, PredictionError> {
        let mut imputed = HashMap::with_capacity(self.columns.len());
        let mut filled = 0usize;

        for (column, &statistic) in self.columns.iter().zip(&self.statistics) {
            let value = values
                .get(column)
                .ok_or_else(|| PredictionError::MissingFeature(column.clone()))?;
            let value = match value {
                Some(v) if !v.is_nan() => *v,
                _ => {
                    filled += 1;
                    statistic
                }
            };
            imputed.insert(column.clone(), value);
        }

        tracing::debug!(filled, columns = self.columns.len(), "imputed numeric columns");
        Ok(imputed)
    }
}

impl FittedStep for FittedSimpleImputer {
    type Params = SimpleImputerParams;

    fn extract_params(&self) -> Self::Params {
        SimpleImputerParams {
            strategy: self.strategy.clone(),
            columns: self.columns.clone(),
            statistics: self.statistics.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidParameters {
            component: "imputer",
            reason,
        };

        if params.columns.len() != params.statistics.len() {
            return Err(invalid(format!(
                "{} columns but {} statistics",
                params.columns.len(),
                params.statistics.len()
            )));
        }

        let mut seen = HashSet::with_capacity(params.columns.len());
        for (column, statistic) in params.columns.iter().zip(&params.statistics) {
            if !seen.insert(column.as_str()) {
                return Err(invalid(format!("column `{column}` listed twice")));
            }
            if !statistic.is_finite() {
                return Err(invalid(format!(
                    "statistic for `{column}` is not finite ({statistic})"
                )));
            }
        }

        if let ImputeStrategy::Constant(value) = params.strategy {
            if !value.is_finite() {
                return Err(invalid(format!("constant fill value {value} is not finite")));
            }
        }

        Ok(Self {
            strategy: params.strategy,
            columns: params.columns,
            statistics: params.statistics,
        })
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    fn n_features_out(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn imputer() -> FittedSimpleImputer {
        FittedSimpleImputer::from_params(SimpleImputerParams {
            strategy: ImputeStrategy::Mean,
            columns: vec!["total_area_sqm".into(), "nbr_bedrooms".into()],
            statistics: vec![145.0, 2.5],
        })
        .unwrap()
    }

    fn input(area: Option<f64>, bedrooms: Option<f64>) -> HashMap<String, Option<f64>> {
        HashMap::from([
            ("total_area_sqm".to_string(), area),
            ("nbr_bedrooms".to_string(), bedrooms),
        ])
    }

    #[test]
    fn test_absent_value_gets_learned_statistic() {
        let imputed = imputer().impute(&input(None, Some(3.0))).unwrap();
        assert_eq!(imputed["total_area_sqm"], 145.0);
        assert_eq!(imputed["nbr_bedrooms"], 3.0);
    }

    #[test]
    fn test_nan_is_treated_as_missing() {
        let imputed = imputer().impute(&input(Some(f64::NAN), None)).unwrap();
        assert_eq!(imputed["total_area_sqm"], 145.0);
        assert_eq!(imputed["nbr_bedrooms"], 2.5);
    }

    #[test]
    fn test_present_values_pass_through() {
        let imputed = imputer().impute(&input(Some(0.0), Some(-1.0))).unwrap();
        assert_eq!(imputed["total_area_sqm"], 0.0);
        assert_eq!(imputed["nbr_bedrooms"], -1.0);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let values = HashMap::from([("total_area_sqm".to_string(), Some(100.0))]);
        let err = imputer().impute(&values).unwrap_err();
        assert!(matches!(err, PredictionError::MissingFeature(c) if c == "nbr_bedrooms"));
    }

    #[test]
    fn test_fill_value() {
        let imputer = imputer();
        assert_eq!(imputer.fill_value("nbr_bedrooms"), Some(2.5));
        assert_eq!(imputer.fill_value("garden_sqm"), None);
        assert_eq!(imputer.n_features_in(), 2);
        assert_eq!(imputer.n_features_out(), 2);
    }

    #[test]
    fn test_from_params_rejects_length_mismatch() {
        let result = FittedSimpleImputer::from_params(SimpleImputerParams {
            strategy: ImputeStrategy::Mean,
            columns: vec!["a".into(), "b".into()],
            statistics: vec![1.0],
        });
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidParameters {
                component: "imputer",
                ..
            })
        ));
    }

    #[test]
    fn test_from_params_rejects_non_finite_statistic() {
        let result = FittedSimpleImputer::from_params(SimpleImputerParams {
            strategy: ImputeStrategy::Median,
            columns: vec!["a".into()],
            statistics: vec![f64::INFINITY],
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let imputer = imputer();
        let path = std::env::temp_dir().join("immo_price_imputer.bin");
        imputer.save_to_file(&path).unwrap();
        let loaded = FittedSimpleImputer::load_from_file(&path).unwrap();
        assert_eq!(loaded.statistics(), imputer.statistics());
        assert_eq!(loaded.columns(), imputer.columns());
        std::fs::remove_file(&path).ok();
    }
}
