//! Scaling of imputed numeric columns.
//!
//! | Step | Description |
//! |------|-------------|
//! | [`FittedStandardScaler`] | `(x - mean) / std` with training statistics |

pub mod standard;

pub use standard::{FittedStandardScaler, StandardScalerParams};
