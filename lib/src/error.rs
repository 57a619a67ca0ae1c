//! Error types for artifact loading and request handling.
//!
//! The taxonomy follows the lifecycle of the service:
//! - [`ConfigurationError`]: fatal, raised while loading the artifact. No request
//!   is ever served while one of these holds.
//! - [`ValidationError`]: per-request, the payload is missing fields or carries the
//!   wrong basic type.
//! - [`LookupError`]: per-request, the zip code cannot be resolved.
//! - [`ModelError`]: per-request shape mismatch reaching the price model.
//! - [`PredictionError`]: the union seen by callers of the prediction service.

use std::fmt;

use thiserror::Error;

use crate::service::Stage;

/// Fatal error raised while loading or cross-checking artifact components.
#[derive(Debug, Error)]
pub enum ConfigurationError {
    /// A column name appears in more than one feature group.
    #[error("column `{column}` is declared in both the {first} and {second} groups")]
    OverlappingGroups {
        column: String,
        first: &'static str,
        second: &'static str,
    },
    /// A column name appears twice within one group.
    #[error("column `{column}` is declared twice in the {group} group")]
    DuplicateColumn { column: String, group: &'static str },
    /// An empty column name was declared.
    #[error("empty column name in the {group} group")]
    EmptyColumnName { group: &'static str },
    /// The imputer has no fill statistic for a declared numeric column.
    #[error("imputer has no statistic for numeric column `{0}`")]
    MissingStatistic(String),
    /// The scaler has no mean and deviation for a declared numeric column.
    #[error("scaler has no statistics for numeric column `{0}`")]
    MissingScale(String),
    /// The encoder has no vocabulary for a declared categorical column.
    #[error("encoder has no vocabulary for categorical column `{0}`")]
    MissingVocabulary(String),
    /// A learned component references a column the schema does not declare.
    #[error("{component} references column `{column}` which is not in the {group} group")]
    UnknownColumn {
        component: &'static str,
        column: String,
        group: &'static str,
    },
    /// Same column set, different order than the one used at training time.
    #[error("{group} column order differs from training: expected {expected:?}, got {got:?}")]
    ColumnOrderMismatch {
        group: &'static str,
        expected: Vec<String>,
        got: Vec<String>,
    },
    /// A vocabulary is empty or lists a category twice.
    #[error("invalid vocabulary for column `{column}`: {reason}")]
    InvalidVocabulary { column: String, reason: String },
    /// Learned parameters are internally inconsistent.
    #[error("invalid {component} parameters: {reason}")]
    InvalidParameters {
        component: &'static str,
        reason: String,
    },
    /// Assembled width disagrees with what the model expects.
    #[error("feature width mismatch: schema yields {schema_width} features, model expects {model_width}")]
    WidthMismatch {
        schema_width: usize,
        model_width: usize,
    },
    /// Stored feature names disagree with the schema-derived ones.
    #[error("feature name mismatch at position {position}: expected `{expected}`, got `{got}`")]
    FeatureNameMismatch {
        position: usize,
        expected: String,
        got: String,
    },
    /// Stored feature name list has the wrong length.
    #[error("artifact lists {got} feature names, schema yields {expected}")]
    FeatureNameCount { expected: usize, got: usize },
    /// Malformed spread policy.
    #[error("invalid spread policy: {0}")]
    InvalidSpreadPolicy(String),
    /// Artifact file could not be read or written.
    #[error("artifact I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// Artifact bytes could not be decoded.
    #[error("artifact serialization error: {0}")]
    Serialization(String),
}

impl From<bincode::Error> for ConfigurationError {
    fn from(err: bincode::Error) -> Self {
        ConfigurationError::Serialization(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigurationError {
    fn from(err: serde_json::Error) -> Self {
        ConfigurationError::Serialization(err.to_string())
    }
}

/// What is wrong with a single request field.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldProblem {
    /// The field is declared by the schema but absent from the payload.
    Missing,
    /// A number or `null` was expected.
    ExpectedNumber,
    /// `0`, `1`, `true` or `false` was expected.
    ExpectedFlag,
    /// A string was expected.
    ExpectedText,
}

impl fmt::Display for FieldProblem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FieldProblem::Missing => write!(f, "missing"),
            FieldProblem::ExpectedNumber => write!(f, "expected a number or null"),
            FieldProblem::ExpectedFlag => write!(f, "expected 0 or 1"),
            FieldProblem::ExpectedText => write!(f, "expected a string"),
        }
    }
}

/// A single offending request field.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldIssue {
    pub field: String,
    pub problem: FieldProblem,
}

/// The request payload does not satisfy the schema.
///
/// Lists every offending field, in schema order, not only the first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationError {
    issues: Vec<FieldIssue>,
}

impl ValidationError {
    pub(crate) fn new(issues: Vec<FieldIssue>) -> Self {
        Self { issues }
    }

    /// All offending fields.
    pub fn issues(&self) -> &[FieldIssue] {
        &self.issues
    }

    /// Names of the fields that are absent from the payload.
    pub fn missing_fields(&self) -> Vec<&str> {
        self.issues
            .iter()
            .filter(|issue| issue.problem == FieldProblem::Missing)
            .map(|issue| issue.field.as_str())
            .collect()
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid request: ")?;
        for (i, issue) in self.issues.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "`{}` {}", issue.field, issue.problem)?;
        }
        Ok(())
    }
}

impl std::error::Error for ValidationError {}

/// The location of a property could not be resolved.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("unresolvable location: unknown zip code {0}")]
    UnknownZipCode(u32),
    #[error("unresolvable location: `{0}` is not a valid zip code")]
    InvalidZipCode(String),
    #[error("zip code table I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip code table is malformed: {0}")]
    Csv(#[from] csv::Error),
}

/// The price model refused its input or produced an unusable output.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    #[error("{model} model expects {expected} features, got {got}")]
    InputWidth {
        model: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("{model} model produced a non-finite estimate ({value})")]
    NonFinite { model: &'static str, value: f64 },
}

/// Per-request failure of the prediction pipeline.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Lookup(#[from] LookupError),
    /// A declared column did not reach a pipeline stage.
    #[error("missing feature `{0}`")]
    MissingFeature(String),
    /// Raised only when the encoder is configured to reject unknown categories.
    #[error("unknown category `{value}` for column `{column}`")]
    UnknownCategory { column: String, value: String },
    #[error("shape mismatch in {context}: expected {expected}, got {got}")]
    ShapeMismatch {
        context: &'static str,
        expected: usize,
        got: usize,
    },
    #[error("model invocation failed: {0}")]
    ModelInvocation(#[from] ModelError),
    /// Extreme inputs drove the estimate past what a price range can show.
    #[error("estimate {value} is outside the representable price range")]
    EstimateOutOfRange { value: f64 },
}

/// Coarse classification used to pick a transport status.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ErrorClass {
    /// The caller sent something the pipeline cannot use.
    Client,
    /// The loaded artifact and the pipeline disagree; a deployment bug.
    Internal,
}

impl PredictionError {
    pub fn class(&self) -> ErrorClass {
        match self {
            PredictionError::Validation(_)
            | PredictionError::Lookup(_)
            | PredictionError::UnknownCategory { .. }
            | PredictionError::EstimateOutOfRange { .. } => ErrorClass::Client,
            PredictionError::MissingFeature(_)
            | PredictionError::ShapeMismatch { .. }
            | PredictionError::ModelInvocation(_) => ErrorClass::Internal,
        }
    }
}

/// Terminal `Failed` state of a request: the error plus the last stage that completed.
#[derive(Debug, Error)]
#[error("{error}")]
pub struct PredictionFailure {
    pub stage: Stage,
    #[source]
    pub error: PredictionError,
}

impl PredictionFailure {
    pub fn new(stage: Stage, error: impl Into<PredictionError>) -> Self {
        Self {
            stage,
            error: error.into(),
        }
    }
}

/// Failure of a whole batch run. Per-row failures are reported in the output instead.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("batch input has no header row")]
    MissingHeader,
    #[error("batch CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("batch I/O error: {0}")]
    Io(#[from] std::io::Error),
}
