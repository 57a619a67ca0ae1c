//! # immo_price
//!
//! Feature encoding and inference pipeline for real-estate price estimates.
//!
//! A training job produces an [`ArtifactBundle`]: the feature schema, a fitted
//! imputer, a fitted one-hot encoder and a price model. At startup the bundle is
//! cross-checked once and becomes a read-only [`LoadedArtifact`]. Each request
//! then flows through a single [`PredictionService`]:
//!
//! ```text
//! attributes -> validate -> impute -> encode -> assemble -> predict -> format range
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use immo_price::{FileArtifactStore, PredictionService, ResponseVariant, ServiceConfig};
//!
//! let store = FileArtifactStore::new("artifact.bin");
//! let service = PredictionService::from_store(&store, ServiceConfig::default())?;
//!
//! let attributes = serde_json::from_str(request_body)?;
//! let response = service.respond(&attributes, ResponseVariant::Ranged)?;
//! // {"price_range": {"lower_bound": 285000, "upper_bound": 315000}}
//! ```
//!
//! ## Module Structure
//!
//! - `schema`: the three feature groups and their order
//! - `attributes`: request payload and its validation
//! - `preprocessing`: imputer, one-hot encoder, feature assembler
//! - `model`: the `PriceModel` contract and concrete models
//! - `range`: spread policies and price range formatting
//! - `artifact`: artifact bundle, load-time checks, artifact store
//! - `lookup`: zip code to location resolution
//! - `service`: the per-request pipeline
//! - `batch`: CSV batch prediction
//! - `serialization`: bincode and JSON parameter persistence

pub mod artifact;
pub mod attributes;
pub mod batch;
pub mod error;
pub mod lookup;

/// Price models behind one inference contract.
pub mod model;

/// Learned preprocessing steps and feature assembly.
pub mod preprocessing;

pub mod range;
pub mod schema;

/// Parameter persistence in bincode and JSON.
pub mod serialization;

pub mod service;

#[cfg(any(test, feature = "test-fixtures"))]
pub mod fixtures;

pub use artifact::{ArtifactBundle, ArtifactStore, FileArtifactStore, LoadedArtifact};
pub use attributes::{AttributeValue, PropertyAttributes, ValidatedAttributes};
pub use error::{
    BatchError, ConfigurationError, ErrorClass, LookupError, ModelError, PredictionError,
    PredictionFailure, ValidationError,
};
pub use lookup::{Location, LookupService, ZipCodeTable};
pub use model::{ModelParams, PriceModel};
pub use range::{format_range, PriceRange, SpreadPolicy};
pub use schema::{FeatureGroup, FeatureSchema};
pub use service::{
    PredictionOutcome, PredictionResponse, PredictionService, ResponseVariant, ServiceConfig,
    Stage,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{LinearParams, RegressionTree, TreeNode};

    #[test]
    fn test_json_artifact_serves_end_to_end() {
        let path = std::env::temp_dir().join("immo_price_e2e_artifact.json");
        fixtures::bundle().save(&path).unwrap();

        let store = FileArtifactStore::new(&path);
        let service = PredictionService::from_store(
            &store,
            ServiceConfig {
                spread: SpreadPolicy::AbsoluteOffset(10_000.0),
            },
        )
        .unwrap();
        std::fs::remove_file(&path).ok();

        let response = service
            .respond(&fixtures::request(), ResponseVariant::Ranged)
            .unwrap();
        assert_eq!(
            response,
            PredictionResponse::Ranged {
                price_range: PriceRange {
                    lower_bound: 360_000,
                    upper_bound: 380_000
                }
            }
        );
    }

    #[test]
    fn test_voting_artifact_averages_members() {
        let mut bundle = fixtures::bundle();
        let linear = bundle.model.clone();
        // total_area_sqm at position 4
        let boosted = ModelParams::GradientBoosting {
            base_score: 200_000.0,
            n_features: fixtures::WIDTH,
            trees: vec![
                RegressionTree::stump(4, 100.0, -50_000.0, 50_000.0),
                RegressionTree {
                    nodes: vec![
                        TreeNode::Split {
                            feature: 10,
                            threshold: 0.5,
                            left: 1,
                            right: 2,
                        },
                        TreeNode::Leaf { value: 0.0 },
                        TreeNode::Leaf { value: 40_000.0 },
                    ],
                },
            ],
        };
        bundle.model = ModelParams::Voting {
            members: vec![linear, boosted],
        };

        let service =
            PredictionService::new(bundle.into_loaded().unwrap(), ServiceConfig::default())
                .unwrap();
        let outcome = service.predict(&fixtures::request()).unwrap();
        // (370000 + 250000) / 2
        assert_eq!(outcome.estimate, 310_000.0);
        assert_eq!(outcome.range.lower_bound, 294_500);
        assert_eq!(outcome.range.upper_bound, 325_500);
    }

    #[test]
    fn test_member_width_mismatch_refuses_to_load() {
        let mut bundle = fixtures::bundle();
        bundle.model = ModelParams::Voting {
            members: vec![
                fixtures::model_params(),
                ModelParams::Linear(LinearParams {
                    weights: vec![1.0; 3],
                    bias: 0.0,
                }),
            ],
        };
        assert!(matches!(
            bundle.into_loaded(),
            Err(ConfigurationError::InvalidParameters {
                component: "voting",
                ..
            })
        ));
    }
}
