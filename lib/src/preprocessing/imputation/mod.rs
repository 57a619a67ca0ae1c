//! Imputation of missing numeric values.
//!
//! | Step | Description |
//! |------|-------------|
//! | [`FittedSimpleImputer`] | Fill with a per-column statistic learned at training time |

pub mod simple;

pub use simple::{FittedSimpleImputer, ImputeStrategy, SimpleImputerParams};
