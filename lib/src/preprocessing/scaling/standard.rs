//! Standard Scaler (Z-score normalization).
//!
//! Rescales imputed numeric columns with the statistics of the training set:
//! ```text
//! z = (x - u) / s
//! ```
//! where `u` is the training mean and `s` the training standard deviation of
//! the column. Constant columns are stored with `s = 1`.
//!
//! # Example
//! ```ignore
//! use immo_price::preprocessing::{FittedStandardScaler, FittedStep, StandardScalerParams};
//!
//! let scaler = FittedStandardScaler::from_params(StandardScalerParams {
//!     columns: vec!["total_area_sqm".into()],
//!     mean: vec![145.0],
//!     std: vec![60.0],
//! })?;
//! let scaled = scaler.transform(&imputed)?;
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, PredictionError};
use crate::preprocessing::traits::FittedStep;

/// Serializable parameters for a fitted StandardScaler.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StandardScalerParams {
    /// Numeric columns, in schema order.
    pub columns: Vec<String>,
    /// Mean of each column (zeros when the scaler was fitted without centering).
    pub mean: Vec<f64>,
    /// Standard deviation of each column (ones when fitted without scaling).
    pub std: Vec<f64>,
}

/// Fitted StandardScaler ready for inference.
#[derive(Clone, Debug)]
pub struct FittedStandardScaler {
    columns: Vec<String>,
    mean: Vec<f64>,
    std: Vec<f64>,
}

impl FittedStandardScaler {
    /// Get the mean values for each column.
    pub fn mean(&self) -> &[f64] {
        &self.mean
    }

    /// Get the standard deviation values for each column.
    pub fn std(&self) -> &[f64] {
        &self.std
    }

    /// Standardise every scaler column of `values`.
    ///
    /// Keys the scaler does not know pass through unchanged.
    pub fn transform(
        &self,
        values: &HashMap<String, f64>,
    ) -> Result<HashMap<String, f64>, PredictionError> {
        let mut scaled = values.clone();
        for ((column, &mean), &std) in self.columns.iter().zip(&self.mean).zip(&self.std) {
            let value = scaled
                .get_mut(column)
                .ok_or_else(|| PredictionError::MissingFeature(column.clone()))?;
            *value = (*value - mean) / std;
        }
        Ok(scaled)
    }
}

impl FittedStep for FittedStandardScaler {
    type Params = StandardScalerParams;

    fn extract_params(&self) -> Self::Params {
        StandardScalerParams {
            columns: self.columns.clone(),
            mean: self.mean.clone(),
            std: self.std.clone(),
        }
    }

    fn from_params(params: Self::Params) -> Result<Self, ConfigurationError> {
        let invalid = |reason: String| ConfigurationError::InvalidParameters {
            component: "scaler",
            reason,
        };

        if params.mean.len() != params.columns.len() || params.std.len() != params.columns.len() {
            return Err(invalid(format!(
                "{} columns but {} means and {} standard deviations",
                params.columns.len(),
                params.mean.len(),
                params.std.len()
            )));
        }

        let mut seen = HashSet::with_capacity(params.columns.len());
        for ((column, mean), std) in params.columns.iter().zip(&params.mean).zip(&params.std) {
            if !seen.insert(column.as_str()) {
                return Err(invalid(format!("column `{column}` listed twice")));
            }
            if !mean.is_finite() {
                return Err(invalid(format!("mean for `{column}` is not finite ({mean})")));
            }
            if !std.is_finite() || *std <= 0.0 {
                return Err(invalid(format!(
                    "standard deviation for `{column}` must be finite and positive ({std})"
                )));
            }
        }

        Ok(Self {
            columns: params.columns,
            mean: params.mean,
            std: params.std,
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

    fn scaler() -> FittedStandardScaler {
        FittedStandardScaler::from_params(StandardScalerParams {
            columns: vec!["total_area_sqm".into(), "nbr_bedrooms".into()],
            mean: vec![145.0, 3.0],
            std: vec![50.0, 1.0],
        })
        .unwrap()
    }

    #[test]
    fn test_standard_scaler_transform() {
        let values = HashMap::from([
            ("total_area_sqm".to_string(), 245.0),
            ("nbr_bedrooms".to_string(), 2.0),
            ("fl_garden".to_string(), 1.0),
        ]);
        let scaled = scaler().transform(&values).unwrap();
        assert_eq!(scaled["total_area_sqm"], 2.0);
        assert_eq!(scaled["nbr_bedrooms"], -1.0);
        assert_eq!(scaled["fl_garden"], 1.0);
    }

    #[test]
    fn test_missing_column_is_reported() {
        let values = HashMap::from([("total_area_sqm".to_string(), 100.0)]);
        let err = scaler().transform(&values).unwrap_err();
        assert!(matches!(err, PredictionError::MissingFeature(c) if c == "nbr_bedrooms"));
    }

    #[test]
    fn test_from_params_rejects_zero_std() {
        let result = FittedStandardScaler::from_params(StandardScalerParams {
            columns: vec!["a".into()],
            mean: vec![1.0],
            std: vec![0.0],
        });
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidParameters {
                component: "scaler",
                ..
            })
        ));
    }

    #[test]
    fn test_from_params_rejects_length_mismatch() {
        let result = FittedStandardScaler::from_params(StandardScalerParams {
            columns: vec!["a".into(), "b".into()],
            mean: vec![1.0, 2.0],
            std: vec![1.0],
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_save_and_load() {
        let scaler = scaler();
        let path = std::env::temp_dir().join("immo_price_scaler.json");
        scaler.save_to_file(&path).unwrap();
        let loaded = FittedStandardScaler::load_from_file(&path).unwrap();
        assert_eq!(loaded.mean(), scaler.mean());
        assert_eq!(loaded.std(), scaler.std());
        assert_eq!(loaded.columns(), scaler.columns());
        std::fs::remove_file(&path).ok();
    }
}
