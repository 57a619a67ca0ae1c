//! Regression trees and the tree ensembles built from them.
//!
//! A tree is a flat node array with the root at index 0. Split nodes send a
//! sample left when `x[feature] < threshold` and right otherwise (NaN goes
//! right). Children always sit after their parent, so traversal terminates.

use ndarray::ArrayView1;
use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::model::PriceModel;

pub(crate) const GRADIENT_BOOSTING: &str = "gradient_boosting";
pub(crate) const RANDOM_FOREST: &str = "random_forest";

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TreeNode {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        value: f64,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RegressionTree {
    pub nodes: Vec<TreeNode>,
}

impl RegressionTree {
    /// A constant tree.
    pub fn leaf(value: f64) -> Self {
        Self {
            nodes: vec![TreeNode::Leaf { value }],
        }
    }

    /// A single split with two leaves.
    pub fn stump(feature: usize, threshold: f64, left: f64, right: f64) -> Self {
        Self {
            nodes: vec![
                TreeNode::Split {
                    feature,
                    threshold,
                    left: 1,
                    right: 2,
                },
                TreeNode::Leaf { value: left },
                TreeNode::Leaf { value: right },
            ],
        }
    }

    pub fn n_nodes(&self) -> usize {
        self.nodes.len()
    }

    /// Check structure against an input width of `n_features`.
    pub fn validate(&self, n_features: usize) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("tree has no nodes".to_string());
        }
        let n = self.nodes.len();
        for (i, node) in self.nodes.iter().enumerate() {
            match *node {
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    if feature >= n_features {
                        return Err(format!(
                            "node {i} splits on feature {feature}, input has {n_features}"
                        ));
                    }
                    if !threshold.is_finite() {
                        return Err(format!("node {i} has a non-finite threshold"));
                    }
                    for child in [left, right] {
                        if child <= i || child >= n {
                            return Err(format!("node {i} has invalid child index {child}"));
                        }
                    }
                }
                TreeNode::Leaf { value } => {
                    if !value.is_finite() {
                        return Err(format!("leaf {i} has a non-finite value"));
                    }
                }
            }
        }
        Ok(())
    }

    /// Walk from the root to a leaf. The tree must have passed [`RegressionTree::validate`].
    pub fn predict(&self, x: ArrayView1<'_, f64>) -> f64 {
        let mut idx = 0;
        loop {
            match self.nodes[idx] {
                TreeNode::Leaf { value } => return value,
                TreeNode::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    idx = if x[feature] < threshold { left } else { right };
                }
            }
        }
    }
}

fn validate_trees(
    component: &'static str,
    n_features: usize,
    trees: &[RegressionTree],
) -> Result<(), ConfigurationError> {
    if n_features == 0 {
        return Err(ConfigurationError::InvalidParameters {
            component,
            reason: "input width is zero".to_string(),
        });
    }
    for (t, tree) in trees.iter().enumerate() {
        tree.validate(n_features)
            .map_err(|reason| ConfigurationError::InvalidParameters {
                component,
                reason: format!("tree {t}: {reason}"),
            })?;
    }
    Ok(())
}

/// Boosted trees: `base_score + Σ tree(x)`.
#[derive(Clone, Debug)]
pub struct GradientBoostingModel {
    base_score: f64,
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl GradientBoostingModel {
    pub fn new(
        base_score: f64,
        n_features: usize,
        trees: Vec<RegressionTree>,
    ) -> Result<Self, ConfigurationError> {
        if !base_score.is_finite() {
            return Err(ConfigurationError::InvalidParameters {
                component: GRADIENT_BOOSTING,
                reason: "base score is not finite".to_string(),
            });
        }
        validate_trees(GRADIENT_BOOSTING, n_features, &trees)?;
        Ok(Self {
            base_score,
            n_features,
            trees,
        })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl PriceModel for GradientBoostingModel {
    fn name(&self) -> &'static str {
        GRADIENT_BOOSTING
    }

    fn n_features_in(&self) -> usize {
        self.n_features
    }

    fn predict_unchecked(&self, x: ArrayView1<'_, f64>) -> f64 {
        self.base_score + self.trees.iter().map(|t| t.predict(x)).sum::<f64>()
    }
}

/// Bagged trees: mean of tree outputs.
#[derive(Clone, Debug)]
pub struct RandomForestModel {
    n_features: usize,
    trees: Vec<RegressionTree>,
}

impl RandomForestModel {
    pub fn new(n_features: usize, trees: Vec<RegressionTree>) -> Result<Self, ConfigurationError> {
        if trees.is_empty() {
            return Err(ConfigurationError::InvalidParameters {
                component: RANDOM_FOREST,
                reason: "forest has no trees".to_string(),
            });
        }
        validate_trees(RANDOM_FOREST, n_features, &trees)?;
        Ok(Self { n_features, trees })
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

impl PriceModel for RandomForestModel {
    fn name(&self) -> &'static str {
        RANDOM_FOREST
    }

    fn n_features_in(&self) -> usize {
        self.n_features
    }

    fn predict_unchecked(&self, x: ArrayView1<'_, f64>) -> f64 {
        let total: f64 = self.trees.iter().map(|t| t.predict(x)).sum();
        total / self.trees.len() as f64
    }
}
