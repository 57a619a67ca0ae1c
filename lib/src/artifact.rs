//! Artifact bundle and its load-time consistency checks.
//!
//! An [`ArtifactBundle`] is the persisted output of a training run. Turning it
//! into a [`LoadedArtifact`] validates every component on its own and then
//! cross-checks them: the imputer must cover exactly the numeric columns, the
//! encoder exactly the categorical columns, both in schema order (as must the
//! optional scaler, which covers the numeric columns), and the
//! assembled width must equal the model's input width. A bundle that fails any
//! check never becomes servable.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;
use crate::model::{ModelParams, PriceModel};
use crate::preprocessing::{
    FeatureAssembler, FittedOneHotEncoder, FittedSimpleImputer, FittedStandardScaler, FittedStep,
    OneHotEncoderParams, SimpleImputerParams, StandardScalerParams,
};
use crate::schema::{FeatureGroup, FeatureSchema};
use crate::serialization::SerializableParams;

/// Everything a training run hands over to inference.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArtifactBundle {
    pub schema: FeatureSchema,
    pub imputer: SimpleImputerParams,
    pub encoder: OneHotEncoderParams,
    pub model: ModelParams,
    /// Output feature names recorded at training time, if any.
    #[serde(default)]
    pub feature_names: Option<Vec<String>>,
    /// Standardisation applied to numeric columns after imputation.
    #[serde(default)]
    pub scaler: Option<StandardScalerParams>,
}

impl ArtifactBundle {
    /// Write to `path`; `.json` paths are written as JSON, others as bincode.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigurationError> {
        self.write_file(path)
    }

    /// Read from `path` without validating. See [`ArtifactBundle::into_loaded`].
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        Self::read_file(path)
    }

    pub fn into_loaded(self) -> Result<LoadedArtifact, ConfigurationError> {
        LoadedArtifact::from_bundle(self)
    }
}

/// Validated, read-only state shared by every request.
#[derive(Clone, Debug)]
pub struct LoadedArtifact {
    schema: FeatureSchema,
    imputer: FittedSimpleImputer,
    encoder: FittedOneHotEncoder,
    scaler: Option<FittedStandardScaler>,
    assembler: FeatureAssembler,
    model: Arc<dyn PriceModel>,
}

impl LoadedArtifact {
    pub fn from_bundle(bundle: ArtifactBundle) -> Result<Self, ConfigurationError> {
        bundle.schema.validate()?;
        let imputer = FittedSimpleImputer::from_params(bundle.imputer)?;
        let encoder = FittedOneHotEncoder::from_params(bundle.encoder)?;
        let model = bundle.model.build()?;
        let mut loaded = Self::with_model(bundle.schema, imputer, encoder, model)?;
        if let Some(params) = bundle.scaler {
            loaded = loaded.with_scaler(FittedStandardScaler::from_params(params)?)?;
        }

        if let Some(names) = bundle.feature_names {
            check_feature_names(loaded.assembler.feature_names(), &names)?;
        }

        Ok(loaded)
    }

    /// Assemble from already fitted components, e.g. a model not stored in a bundle.
    pub fn with_model(
        schema: FeatureSchema,
        imputer: FittedSimpleImputer,
        encoder: FittedOneHotEncoder,
        model: Arc<dyn PriceModel>,
    ) -> Result<Self, ConfigurationError> {
        schema.validate()?;

        check_columns(
            "imputer",
            FeatureGroup::Numeric,
            schema.numeric(),
            imputer.columns(),
            ConfigurationError::MissingStatistic,
        )?;
        check_columns(
            "encoder",
            FeatureGroup::Categorical,
            schema.categorical(),
            encoder.columns(),
            ConfigurationError::MissingVocabulary,
        )?;

        let assembler = FeatureAssembler::new(&schema, &encoder);
        if assembler.width() != model.n_features_in() {
            return Err(ConfigurationError::WidthMismatch {
                schema_width: assembler.width(),
                model_width: model.n_features_in(),
            });
        }

        tracing::info!(
            numeric = schema.numeric().len(),
            flags = schema.flags().len(),
            categorical = schema.categorical().len(),
            width = assembler.width(),
            model = model.name(),
            "artifact loaded"
        );

        Ok(Self {
            schema,
            imputer,
            encoder,
            scaler: None,
            assembler,
            model,
        })
    }

    /// Skip every cross-check. For exercising pipeline stages in isolation.
    #[cfg(test)]
    pub(crate) fn from_parts_unchecked(
        schema: FeatureSchema,
        imputer: FittedSimpleImputer,
        encoder: FittedOneHotEncoder,
        model: Arc<dyn PriceModel>,
    ) -> Self {
        let assembler = FeatureAssembler::new(&schema, &encoder);
        Self {
            schema,
            imputer,
            encoder,
            scaler: None,
            assembler,
            model,
        }
    }

    /// Standardise numeric columns with `scaler` between imputation and assembly.
    pub fn with_scaler(mut self, scaler: FittedStandardScaler) -> Result<Self, ConfigurationError> {
        check_columns(
            "scaler",
            FeatureGroup::Numeric,
            self.schema.numeric(),
            scaler.columns(),
            ConfigurationError::MissingScale,
        )?;
        tracing::info!(columns = scaler.n_features_in(), "numeric scaler loaded");
        self.scaler = Some(scaler);
        Ok(self)
    }

    pub fn schema(&self) -> &FeatureSchema {
        &self.schema
    }

    pub fn imputer(&self) -> &FittedSimpleImputer {
        &self.imputer
    }

    pub fn encoder(&self) -> &FittedOneHotEncoder {
        &self.encoder
    }

    pub fn scaler(&self) -> Option<&FittedStandardScaler> {
        self.scaler.as_ref()
    }

    pub fn assembler(&self) -> &FeatureAssembler {
        &self.assembler
    }

    pub fn model(&self) -> &Arc<dyn PriceModel> {
        &self.model
    }

    /// Feature vector width the model consumes.
    pub fn width(&self) -> usize {
        self.assembler.width()
    }

    pub fn feature_names(&self) -> &[String] {
        self.assembler.feature_names()
    }
}

/// `got` must name exactly the `expected` columns, in the same order.
fn check_columns(
    component: &'static str,
    group: FeatureGroup,
    expected: &[String],
    got: &[String],
    missing: fn(String) -> ConfigurationError,
) -> Result<(), ConfigurationError> {
    if let Some(column) = got.iter().find(|c| !expected.contains(c)) {
        return Err(ConfigurationError::UnknownColumn {
            component,
            column: column.clone(),
            group: group.as_str(),
        });
    }
    if let Some(column) = expected.iter().find(|c| !got.contains(c)) {
        return Err(missing(column.clone()));
    }
    if expected != got {
        return Err(ConfigurationError::ColumnOrderMismatch {
            group: group.as_str(),
            expected: expected.to_vec(),
            got: got.to_vec(),
        });
    }
    Ok(())
}

fn check_feature_names(derived: &[String], stored: &[String]) -> Result<(), ConfigurationError> {
    if derived.len() != stored.len() {
        return Err(ConfigurationError::FeatureNameCount {
            expected: derived.len(),
            got: stored.len(),
        });
    }
    if let Some((position, (expected, got))) = derived
        .iter()
        .zip(stored)
        .enumerate()
        .find(|(_, (a, b))| a != b)
    {
        return Err(ConfigurationError::FeatureNameMismatch {
            position,
            expected: expected.clone(),
            got: got.clone(),
        });
    }
    Ok(())
}

/// Source of the artifact served by the process.
pub trait ArtifactStore {
    fn load(&self) -> Result<LoadedArtifact, ConfigurationError>;
}

/// Artifact bundle stored in a single file.
#[derive(Clone, Debug)]
pub struct FileArtifactStore {
    path: PathBuf,
}

impl FileArtifactStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ArtifactStore for FileArtifactStore {
    fn load(&self) -> Result<LoadedArtifact, ConfigurationError> {
        tracing::info!(path = %self.path.display(), "loading artifact");
        ArtifactBundle::load(&self.path)?.into_loaded()
    }
}
