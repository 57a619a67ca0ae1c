//! Linear regression inference: `y = w · x + b`.
//!
//! Fitted models only; weights come from the training job as [`LinearParams`].

use ndarray::{Array1, ArrayView1};
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::model::PriceModel;

pub(crate) const NAME: &str = "linear";

/// Serializable weights and bias of a linear model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LinearParams {
    pub weights: Vec<f64>,
    pub bias: f64,
}

/// A fitted linear model.
#[derive(Clone, Debug)]
pub struct LinearModel {
    weights: Array1<f64>,
    bias: f64,
}

impl LinearModel {
    /// Build from learned parameters, rejecting empty or non-finite weights.
    pub fn from_params(params: LinearParams) -> Result<Self, ConfigurationError> {
        if params.weights.is_empty() {
            return Err(ConfigurationError::InvalidParameters {
                component: NAME,
                reason: "no weights".to_string(),
            });
        }
        if let Some(i) = params.weights.iter().position(|w| !w.is_finite()) {
            return Err(ConfigurationError::InvalidParameters {
                component: NAME,
                reason: format!("weight {i} is not finite"),
            });
        }
        if !params.bias.is_finite() {
            return Err(ConfigurationError::InvalidParameters {
                component: NAME,
                reason: "bias is not finite".to_string(),
            });
        }
        Ok(Self {
            weights: Array1::from_vec(params.weights),
            bias: params.bias,
        })
    }

    pub fn extract_params(&self) -> LinearParams {
        LinearParams {
            weights: self.weights.to_vec(),
            bias: self.bias,
        }
    }

    pub fn weights(&self) -> ArrayView1<'_, f64> {
        self.weights.view()
    }

    pub fn bias(&self) -> f64 {
        self.bias
    }
}

impl PriceModel for LinearModel {
    fn name(&self) -> &'static str {
        NAME
    }

    fn n_features_in(&self) -> usize {
        self.weights.len()
    }

    fn predict_unchecked(&self, x: ArrayView1<'_, f64>) -> f64 {
        self.weights.dot(&x) + self.bias
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::FeatureVector;

    #[test]
    fn test_predict_dot_plus_bias() {
        let model = LinearModel::from_params(LinearParams {
            weights: vec![2.0, -1.0, 0.5],
            bias: 10.0,
        })
        .unwrap();

        let x = FeatureVector::from(vec![3.0, 4.0, 2.0]);
        // 6 - 4 + 1 + 10
        assert_eq!(model.predict(&x).unwrap(), 13.0);
        assert_eq!(model.n_features_in(), 3);
    }

    #[test]
    fn test_extract_params_round_trip() {
        let params = LinearParams {
            weights: vec![1.5, 2.5],
            bias: -3.0,
        };
        let model = LinearModel::from_params(params.clone()).unwrap();
        assert_eq!(model.extract_params(), params);
        assert_eq!(model.bias(), -3.0);
    }

    #[test]
    fn test_rejects_empty_weights() {
        let result = LinearModel::from_params(LinearParams {
            weights: vec![],
            bias: 0.0,
        });
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_nan_weight() {
        let result = LinearModel::from_params(LinearParams {
            weights: vec![1.0, f64::NAN],
            bias: 0.0,
        });
        assert!(matches!(
            result,
            Err(ConfigurationError::InvalidParameters { component: "linear", .. })
        ));
    }
}
