//! Voting ensemble: the unweighted mean of its members' estimates.
//!
//! All members read the same feature vector, so they must agree on the input
//! width. Members may themselves be ensembles.

use std::sync::Arc;

use ndarray::ArrayView1;

use crate::error::ConfigurationError;
use crate::model::PriceModel;

pub(crate) const NAME: &str = "voting";

#[derive(Clone, Debug)]
pub struct VotingModel {
    members: Vec<Arc<dyn PriceModel>>,
    n_features: usize,
}

impl VotingModel {
    pub fn new(members: Vec<Arc<dyn PriceModel>>) -> Result<Self, ConfigurationError> {
        let Some(first) = members.first() else {
            return Err(ConfigurationError::InvalidParameters {
                component: NAME,
                reason: "ensemble has no members".to_string(),
            });
        };
        let n_features = first.n_features_in();

        if let Some((i, member)) = members
            .iter()
            .enumerate()
            .find(|(_, m)| m.n_features_in() != n_features)
        {
            return Err(ConfigurationError::InvalidParameters {
                component: NAME,
                reason: format!(
                    "member {i} ({}) expects {} features, member 0 expects {n_features}",
                    member.name(),
                    member.n_features_in()
                ),
            });
        }

        Ok(Self {
            members,
            n_features,
        })
    }

    pub fn members(&self) -> &[Arc<dyn PriceModel>] {
        &self.members
    }
}

impl PriceModel for VotingModel {
    fn name(&self) -> &'static str {
        NAME
    }

    fn n_features_in(&self) -> usize {
        self.n_features
    }

    fn predict_unchecked(&self, x: ArrayView1<'_, f64>) -> f64 {
        let total: f64 = self.members.iter().map(|m| m.predict_unchecked(x)).sum();
        total / self.members.len() as f64
    }
}
