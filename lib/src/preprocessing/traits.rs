//! Core trait for fitted preprocessing steps.
//!
//! Steps are fitted elsewhere (by the training job) and arrive here as plain
//! parameter structs. [`FittedStep::from_params`] is the only way to build one,
//! so every loaded step has passed its own consistency checks.

use std::path::Path;

use crate::error::ConfigurationError;
use crate::serialization::SerializableParams;

/// A learned, read-only preprocessing step.
///
/// # Guarantees
/// - `extract_params()` + `from_params()` is a round-trip.
/// - `save_to_file` / `load_from_file` go through the same validation as `from_params`.
pub trait FittedStep: Sized {
    /// Serializable representation of learned parameters.
    type Params: SerializableParams;

    /// Extract learned parameters as a serializable representation.
    fn extract_params(&self) -> Self::Params;

    /// Reconstruct a fitted step from parameters, validating them.
    fn from_params(params: Self::Params) -> Result<Self, ConfigurationError>;

    /// Columns this step consumes, in order.
    fn columns(&self) -> &[String];

    /// Number of input columns.
    fn n_features_in(&self) -> usize {
        self.columns().len()
    }

    /// Number of values this step contributes to the feature vector.
    fn n_features_out(&self) -> usize;

    /// Save the fitted step to a file. `.json` paths are written as JSON.
    fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigurationError> {
        self.extract_params().write_file(path)
    }

    /// Load a fitted step from a file written by [`FittedStep::save_to_file`].
    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigurationError> {
        let params = Self::Params::read_file(path)?;
        Self::from_params(params)
    }
}
