//! Learned preprocessing steps and feature assembly.
//!
//! Every step is fitted by the training job and loaded here through
//! [`FittedStep::from_params`]. At inference time the steps are read-only.
//!
//! # Available Steps
//!
//! ## Imputation
//! - [`FittedSimpleImputer`]: fill absent numeric values with a learned statistic
//!
//! ## Scaling
//! - [`FittedStandardScaler`]: optional standardisation of the imputed numeric columns
//!
//! ## Encoding
//! - [`FittedOneHotEncoder`]: categorical value to indicator block
//!
//! ## Assembly
//! - [`FeatureAssembler`]: `numeric ++ flags ++ one-hot` into one [`FeatureVector`]

pub mod assembler;
pub mod encoding;
pub mod imputation;
pub mod scaling;
pub mod traits;

pub use assembler::{expected_width, FeatureAssembler, FeatureVector};
pub use encoding::{
    EncodedCategories, FittedOneHotEncoder, HandleUnknown, OneHotBlock, OneHotEncoderParams,
    UnknownCategory,
};
pub use imputation::{FittedSimpleImputer, ImputeStrategy, SimpleImputerParams};
pub use scaling::{FittedStandardScaler, StandardScalerParams};
pub use traits::FittedStep;
