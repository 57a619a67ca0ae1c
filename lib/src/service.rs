//! Prediction service: one request, start to finish.
//!
//! ```text
//! Received -> SchemaValidated -> Imputed -> Encoded -> Assembled
//!          -> Predicted -> Formatted -> Responded
//! ```
//!
//! Any stage may fail; the resulting [`PredictionFailure`] carries the last
//! stage that completed. The service holds only the read-only
//! [`LoadedArtifact`] and an optional [`LookupService`], so one instance is
//! shared by all concurrent requests.

use std::borrow::Cow;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::artifact::{ArtifactStore, LoadedArtifact};
use crate::attributes::PropertyAttributes;
use crate::error::{ConfigurationError, ModelError, PredictionError, PredictionFailure};
use crate::lookup::{self, LookupService};
use crate::preprocessing::{FeatureVector, UnknownCategory};
use crate::range::{format_range, is_representable, PriceRange, SpreadPolicy};

/// Pipeline stage of a single request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    Received,
    SchemaValidated,
    Imputed,
    Encoded,
    Assembled,
    Predicted,
    Formatted,
    Responded,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Received => "received",
            Stage::SchemaValidated => "schema_validated",
            Stage::Imputed => "imputed",
            Stage::Encoded => "encoded",
            Stage::Assembled => "assembled",
            Stage::Predicted => "predicted",
            Stage::Formatted => "formatted",
            Stage::Responded => "responded",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Runtime configuration of the service.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ServiceConfig {
    #[serde(default)]
    pub spread: SpreadPolicy,
}

/// Which response shape a caller receives.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ResponseVariant {
    /// End users: a rounded price range.
    Ranged,
    /// Trusted callers: the raw estimate.
    Plain,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum PredictionResponse {
    Ranged { price_range: PriceRange },
    Plain { prediction: f64 },
}

/// Feature vector for one request plus the categories that were zero-encoded.
#[derive(Clone, Debug, PartialEq)]
pub struct Features {
    pub vector: FeatureVector,
    pub unknown_categories: Vec<UnknownCategory>,
}

/// Everything computed for one request.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictionOutcome {
    pub estimate: f64,
    pub range: PriceRange,
    pub unknown_categories: Vec<UnknownCategory>,
}

impl PredictionOutcome {
    pub fn into_response(self, variant: ResponseVariant) -> PredictionResponse {
        match variant {
            ResponseVariant::Ranged => PredictionResponse::Ranged {
                price_range: self.range,
            },
            ResponseVariant::Plain => PredictionResponse::Plain {
                prediction: self.estimate,
            },
        }
    }
}

#[derive(Clone)]
pub struct PredictionService {
    artifact: Arc<LoadedArtifact>,
    lookup: Option<Arc<dyn LookupService>>,
    config: ServiceConfig,
}

impl fmt::Debug for PredictionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PredictionService")
            .field("width", &self.artifact.width())
            .field("model", &self.artifact.model().name())
            .field("lookup", &self.lookup.is_some())
            .field("config", &self.config)
            .finish()
    }
}

impl PredictionService {
    pub fn new(
        artifact: LoadedArtifact,
        config: ServiceConfig,
    ) -> Result<Self, ConfigurationError> {
        config.spread.validate()?;
        Ok(Self {
            artifact: Arc::new(artifact),
            lookup: None,
            config,
        })
    }

    /// Load the artifact from `store`. This is the startup barrier: nothing is
    /// servable until it returns `Ok`.
    pub fn from_store(
        store: &dyn ArtifactStore,
        config: ServiceConfig,
    ) -> Result<Self, ConfigurationError> {
        Self::new(store.load()?, config)
    }

    /// Resolve zip codes through `lookup` before validation.
    pub fn with_lookup(mut self, lookup: Arc<dyn LookupService>) -> Self {
        self.lookup = Some(lookup);
        self
    }

    pub fn artifact(&self) -> &LoadedArtifact {
        &self.artifact
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Run the pipeline up to and including assembly.
    pub fn features(&self, attributes: &PropertyAttributes) -> Result<Features, PredictionFailure> {
        let attributes = self.enrich(attributes)?;

        let validated = self
            .artifact
            .schema()
            .validate_attributes(&attributes)
            .map_err(|e| PredictionFailure::new(Stage::Received, e))?;
        tracing::debug!(stage = %Stage::SchemaValidated, "request validated");

        let imputed = self
            .artifact
            .imputer()
            .impute(&validated.numeric)
            .map_err(|e| PredictionFailure::new(Stage::SchemaValidated, e))?;
        let imputed = match self.artifact.scaler() {
            Some(scaler) => scaler
                .transform(&imputed)
                .map_err(|e| PredictionFailure::new(Stage::SchemaValidated, e))?,
            None => imputed,
        };
        tracing::debug!(stage = %Stage::Imputed, "numeric columns imputed");

        let encoded = self
            .artifact
            .encoder()
            .encode(&validated.categorical)
            .map_err(|e| PredictionFailure::new(Stage::Imputed, e))?;
        tracing::debug!(
            stage = %Stage::Encoded,
            unknown = encoded.unknown.len(),
            "categorical columns encoded"
        );

        let vector = self
            .artifact
            .assembler()
            .assemble(&imputed, &validated.flags, &encoded.blocks)
            .map_err(|e| PredictionFailure::new(Stage::Encoded, e))?;
        tracing::debug!(
            stage = %Stage::Assembled,
            width = vector.len(),
            "feature vector assembled"
        );

        Ok(Features {
            vector,
            unknown_categories: encoded.unknown,
        })
    }

    /// Run the full pipeline and format the estimate with the configured spread.
    pub fn predict(
        &self,
        attributes: &PropertyAttributes,
    ) -> Result<PredictionOutcome, PredictionFailure> {
        let features = self.features(attributes)?;

        let model = self.artifact.model();
        let estimate = match model.predict(&features.vector) {
            Ok(estimate) => estimate,
            Err(ModelError::NonFinite { value, .. }) => {
                tracing::warn!(model = model.name(), value, "model produced a non-finite estimate");
                return Err(PredictionFailure::new(
                    Stage::Assembled,
                    PredictionError::EstimateOutOfRange { value },
                ));
            }
            Err(e) => {
                tracing::error!(model = model.name(), error = %e, "model invocation failed");
                return Err(PredictionFailure::new(
                    Stage::Assembled,
                    PredictionError::ModelInvocation(e),
                ));
            }
        };
        tracing::debug!(stage = %Stage::Predicted, estimate, "estimate computed");

        if !is_representable(estimate) {
            tracing::warn!(estimate, "estimate outside the representable price range");
            return Err(PredictionFailure::new(
                Stage::Predicted,
                PredictionError::EstimateOutOfRange { value: estimate },
            ));
        }

        let range = format_range(estimate, &self.config.spread);
        tracing::debug!(
            stage = %Stage::Formatted,
            lower_bound = range.lower_bound,
            upper_bound = range.upper_bound,
            "range formatted"
        );

        Ok(PredictionOutcome {
            estimate,
            range,
            unknown_categories: features.unknown_categories,
        })
    }

    /// Predict and shape the response for `variant`.
    pub fn respond(
        &self,
        attributes: &PropertyAttributes,
        variant: ResponseVariant,
    ) -> Result<PredictionResponse, PredictionFailure> {
        let response = self.predict(attributes)?.into_response(variant);
        tracing::debug!(stage = %Stage::Responded, ?variant, "response ready");
        Ok(response)
    }

    fn enrich<'a>(
        &self,
        attributes: &'a PropertyAttributes,
    ) -> Result<Cow<'a, PropertyAttributes>, PredictionFailure> {
        let Some(lookup) = &self.lookup else {
            return Ok(Cow::Borrowed(attributes));
        };
        let mut enriched = attributes.clone();
        lookup::enrich(&mut enriched, lookup.as_ref())
            .map_err(|e| PredictionFailure::new(Stage::Received, e))?;
        Ok(Cow::Owned(enriched))
    }
}
