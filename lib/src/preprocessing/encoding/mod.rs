//! Categorical feature encoding.
//!
//! ## OneHotEncoder
//! Maps each categorical value to an indicator block over its column's vocabulary.
//!
//! ```ignore
//! // vocabulary ["A", "B", "C"]
//! // "B"       -> [0, 1, 0]
//! // "unknown" -> [0, 0, 0]   (HandleUnknown::Ignore)
//! ```

mod one_hot;

pub use one_hot::{
    EncodedCategories, FittedOneHotEncoder, OneHotBlock, OneHotEncoderParams, UnknownCategory,
};

/// Strategy for handling unknown categories during encoding.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HandleUnknown {
    /// Fail the request when an unknown category is encountered.
    Error,
    /// Encode unknown categories as an all-zero block.
    #[default]
    Ignore,
}
