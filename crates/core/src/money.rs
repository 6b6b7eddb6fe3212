//! Decimal money helpers: rounding to cents and `$` formatting.

use std::fmt;
use std::str::FromStr;

use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Number of decimal places every emitted price carries.
pub const PRICE_SCALE: u32 = 2;

/// Largest price a table may carry: one trillion.
///
/// Every rule multiplier is below 2, so nothing at or under this bound can
/// overflow `Decimal` while a product is being priced.
pub fn max_price() -> Decimal {
    Decimal::new(1_000_000_000_000, 0)
}

/// How a price is rounded to cents when it lands exactly on a half cent.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RoundingMode {
    /// Banker's rounding: `2.665 -> 2.66`, `2.675 -> 2.68`.
    #[default]
    HalfEven,
    /// Commercial rounding: `2.665 -> 2.67`.
    HalfUp,
}

impl RoundingMode {
    fn strategy(self) -> RoundingStrategy {
        match self {
            RoundingMode::HalfEven => RoundingStrategy::MidpointNearestEven,
            RoundingMode::HalfUp => RoundingStrategy::MidpointAwayFromZero,
        }
    }
}

impl fmt::Display for RoundingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RoundingMode::HalfEven => write!(f, "half-even"),
            RoundingMode::HalfUp => write!(f, "half-up"),
        }
    }
}

impl FromStr for RoundingMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "half-even" | "bankers" => Ok(RoundingMode::HalfEven),
            "half-up" => Ok(RoundingMode::HalfUp),
            other => Err(ConfigError::UnknownRounding(other.to_string())),
        }
    }
}

/// Round a price to cents, always leaving exactly [`PRICE_SCALE`] places.
pub fn round_price(value: Decimal, mode: RoundingMode) -> Decimal {
    let mut rounded = value.round_dp_with_strategy(PRICE_SCALE, mode.strategy());
    rounded.rescale(PRICE_SCALE);
    rounded
}

/// Round up to the next whole cent. Used for lower bounds, which must not
/// be undercut by the final rounding step.
pub fn ceil_to_cent(value: Decimal) -> Decimal {
    let mut rounded =
        value.round_dp_with_strategy(PRICE_SCALE, RoundingStrategy::ToPositiveInfinity);
    rounded.rescale(PRICE_SCALE);
    rounded
}

/// Render a price as a currency string, e.g. `$19.99`.
///
/// Callers pass already-rounded prices; values with more places are
/// rounded half-even so the output always has two decimals.
pub fn format_currency(value: Decimal) -> String {
    format!("${}", round_price(value, RoundingMode::HalfEven))
}
