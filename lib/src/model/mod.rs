//! Price models.
//!
//! Every model implements one contract, [`PriceModel`]: a fixed-width numeric
//! vector in, one scalar estimate out. The width and finiteness checks live in
//! the provided [`PriceModel::predict`]; concrete models only implement
//! [`PriceModel::predict_unchecked`].
//!
//! # Overview
//!
//! - [`LinearModel`]: `w · x + b`
//! - [`GradientBoostingModel`]: `base_score + Σ tree(x)`
//! - [`RandomForestModel`]: mean of tree outputs
//! - [`VotingModel`]: mean of member model outputs
//!
//! Learned parameters travel as [`ModelParams`], which is what an artifact stores.

use std::fmt;
use std::sync::Arc;

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::{ConfigurationError, ModelError};
use crate::preprocessing::FeatureVector;

pub mod ensemble;
pub mod linear;
pub mod tree;

pub use ensemble::VotingModel;
pub use linear::{LinearModel, LinearParams};
pub use tree::{GradientBoostingModel, RandomForestModel, RegressionTree, TreeNode};

/// A fitted regression function over a fixed-width feature vector.
pub trait PriceModel: Send + Sync + fmt::Debug {
    /// Short model kind, used in logs and errors.
    fn name(&self) -> &'static str;

    /// Input width the model was trained on.
    fn n_features_in(&self) -> usize;

    /// Raw forward pass. `x.len() == self.n_features_in()` is guaranteed by the caller.
    fn predict_unchecked(&self, x: ArrayView1<'_, f64>) -> f64;

    /// Predict one estimate, refusing vectors of the wrong width.
    fn predict(&self, x: &FeatureVector) -> Result<f64, ModelError> {
        if x.len() != self.n_features_in() {
            return Err(ModelError::InputWidth {
                model: self.name(),
                expected: self.n_features_in(),
                got: x.len(),
            });
        }
        let value = self.predict_unchecked(x.view());
        if !value.is_finite() {
            return Err(ModelError::NonFinite {
                model: self.name(),
                value,
            });
        }
        Ok(value)
    }
}

/// Serializable parameters of any supported model.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelParams {
    Linear(LinearParams),
    GradientBoosting {
        base_score: f64,
        n_features: usize,
        trees: Vec<RegressionTree>,
    },
    RandomForest {
        n_features: usize,
        trees: Vec<RegressionTree>,
    },
    Voting {
        members: Vec<ModelParams>,
    },
}

impl ModelParams {
    /// Kind name of the model these parameters build.
    pub fn kind(&self) -> &'static str {
        match self {
            ModelParams::Linear(_) => linear::NAME,
            ModelParams::GradientBoosting { .. } => tree::GRADIENT_BOOSTING,
            ModelParams::RandomForest { .. } => tree::RANDOM_FOREST,
            ModelParams::Voting { .. } => ensemble::NAME,
        }
    }

    /// Validate and build the model.
    pub fn build(&self) -> Result<Arc<dyn PriceModel>, ConfigurationError> {
        let model: Arc<dyn PriceModel> = match self {
            ModelParams::Linear(params) => Arc::new(LinearModel::from_params(params.clone())?),
            ModelParams::GradientBoosting {
                base_score,
                n_features,
                trees,
            } => Arc::new(GradientBoostingModel::new(
                *base_score,
                *n_features,
                trees.clone(),
            )?),
            ModelParams::RandomForest { n_features, trees } => {
                Arc::new(RandomForestModel::new(*n_features, trees.clone())?)
            }
            ModelParams::Voting { members } => {
                let members = members
                    .iter()
                    .map(ModelParams::build)
                    .collect::<Result<Vec<_>, _>>()?;
                Arc::new(VotingModel::new(members)?)
            }
        };
        Ok(model)
    }
}
