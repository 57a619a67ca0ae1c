//! Turning a point estimate into a displayable price range.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigurationError;

/// Rule converting an estimate into lower and upper bounds.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpreadPolicy {
    /// `estimate ± amount`.
    AbsoluteOffset(f64),
    /// `estimate × (1 ± fraction)`.
    Percentage(f64),
}

impl Default for SpreadPolicy {
    fn default() -> Self {
        SpreadPolicy::Percentage(0.05)
    }
}

/// Largest estimate magnitude with an exact whole-unit representation (2^53).
pub const MAX_ESTIMATE: f64 = 9_007_199_254_740_992.0;

/// Whether `estimate` can be turned into a [`PriceRange`] without loss.
pub fn is_representable(estimate: f64) -> bool {
    estimate.is_finite() && estimate.abs() <= MAX_ESTIMATE
}

impl SpreadPolicy {
    /// Offsets must lie in `[0, MAX_ESTIMATE]`; fractions must lie in `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        match *self {
            SpreadPolicy::AbsoluteOffset(amount)
                if !amount.is_finite() || !(0.0..=MAX_ESTIMATE).contains(&amount) =>
            {
                Err(ConfigurationError::InvalidSpreadPolicy(format!(
                    "absolute offset must lie in [0, {MAX_ESTIMATE}], got {amount}"
                )))
            }
            SpreadPolicy::Percentage(fraction)
                if !fraction.is_finite() || !(0.0..=1.0).contains(&fraction) =>
            {
                Err(ConfigurationError::InvalidSpreadPolicy(format!(
                    "percentage must be a fraction between 0 and 1, got {fraction}"
                )))
            }
            _ => Ok(()),
        }
    }

    fn raw_bounds(&self, estimate: f64) -> (f64, f64) {
        match *self {
            SpreadPolicy::AbsoluteOffset(amount) => (estimate - amount, estimate + amount),
            SpreadPolicy::Percentage(fraction) => {
                (estimate * (1.0 - fraction), estimate * (1.0 + fraction))
            }
        }
    }
}

impl fmt::Display for SpreadPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SpreadPolicy::AbsoluteOffset(amount) => write!(f, "absolute:{amount}"),
            SpreadPolicy::Percentage(fraction) => write!(f, "percentage:{fraction}"),
        }
    }
}

/// Parses `percentage:<fraction>` or `absolute:<amount>`.
impl FromStr for SpreadPolicy {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (kind, value) = s.trim().split_once(':').ok_or_else(|| {
            ConfigurationError::InvalidSpreadPolicy(format!(
                "expected `percentage:<fraction>` or `absolute:<amount>`, got `{s}`"
            ))
        })?;
        let number: f64 = value.trim().parse().map_err(|_| {
            ConfigurationError::InvalidSpreadPolicy(format!("`{value}` is not a number"))
        })?;
        let policy = match kind.trim().to_ascii_lowercase().as_str() {
            "percentage" | "percent" | "pct" => SpreadPolicy::Percentage(number),
            "absolute" | "absolute_offset" | "offset" => SpreadPolicy::AbsoluteOffset(number),
            other => {
                return Err(ConfigurationError::InvalidSpreadPolicy(format!(
                    "unknown spread kind `{other}`"
                )))
            }
        };
        policy.validate()?;
        Ok(policy)
    }
}

/// Whole-currency bounds shown to end users.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceRange {
    pub lower_bound: u64,
    pub upper_bound: u64,
}

// Callers keep `|value| <= 2 * MAX_ESTIMATE`, where whole numbers are exact.
fn to_currency(value: f64) -> u64 {
    value.max(0.0) as u64
}

/// Apply `policy` to `estimate` and round both bounds to whole units.
///
/// The lower bound is clamped at zero. Rounding never moves a bound past the
/// estimate: `lower_bound <= floor(estimate)` and `upper_bound >= ceil(estimate)`.
/// `estimate` must satisfy [`is_representable`] and `policy` must be valid.
pub fn format_range(estimate: f64, policy: &SpreadPolicy) -> PriceRange {
    let (lower, upper) = policy.raw_bounds(estimate);
    let lower_bound = to_currency(lower.round().min(estimate.floor()));
    let upper_bound = to_currency(upper.round().max(estimate.ceil())).max(lower_bound);
    PriceRange {
        lower_bound,
        upper_bound,
    }
}
