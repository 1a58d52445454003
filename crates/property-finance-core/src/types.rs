use rust_decimal::{Decimal, RoundingStrategy};
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PropertyFinanceError;
use crate::PropertyFinanceResult;

/// All monetary values. Wraps Decimal to prevent accidental f64 usage.
pub type Money = Decimal;

/// Per-period rates expressed as decimals (0.0029 = 0.29%).
pub type Rate = Decimal;

/// User-facing rates expressed as percentages (3.5 = 3.5%).
pub type Percent = Decimal;

/// Year counts or fractional years (payback period)
pub type Years = Decimal;

/// Standard computation output envelope
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationOutput<T: Serialize> {
    pub result: T,
    pub methodology: String,
    pub assumptions: serde_json::Value,
    pub warnings: Vec<String>,
    pub metadata: ComputationMetadata,
}

/// Metadata for every computation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComputationMetadata {
    pub version: String,
    pub computation_time_us: u64,
    pub precision: String,
}

/// Helper to wrap computation results with metadata
pub fn with_metadata<T: Serialize>(
    methodology: &str,
    assumptions: &impl Serialize,
    warnings: Vec<String>,
    elapsed_us: u64,
    result: T,
) -> ComputationOutput<T> {
    ComputationOutput {
        result,
        methodology: methodology.to_string(),
        assumptions: serde_json::to_value(assumptions).unwrap_or_default(),
        warnings,
        metadata: ComputationMetadata {
            version: env!("CARGO_PKG_VERSION").to_string(),
            computation_time_us: elapsed_us,
            precision: "rust_decimal_128bit".to_string(),
        },
    }
}

/// Convert a percentage (3.5) into a decimal rate (0.035).
pub fn pct_to_rate(pct: Percent) -> Rate {
    pct / Decimal::ONE_HUNDRED
}

/// Round a currency amount to whole units, halves away from zero.
pub fn round_to_unit(amount: Money) -> Money {
    let rounded = amount.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    if rounded.is_zero() {
        Decimal::ZERO
    } else {
        rounded
    }
}

/// Division that saturates at the `Decimal` range instead of panicking.
/// A zero divisor saturates in the direction of the dividend.
pub fn saturating_div(numerator: Decimal, denominator: Decimal) -> Decimal {
    numerator.checked_div(denominator).unwrap_or_else(|| {
        if numerator.is_zero() {
            Decimal::ZERO
        } else if numerator.is_sign_negative() != denominator.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

// ---------------------------------------------------------------------------
// Input limits
// ---------------------------------------------------------------------------

/// Largest amount accepted for any single money input.
pub const MAX_AMOUNT: Money = dec!(1000000000000000);

/// Upper bound for interest, growth, inflation and discount rates.
pub const MAX_ANNUAL_RATE_PCT: Percent = dec!(100);

pub const MAX_TERM_YEARS: u32 = 50;

/// Longest projection, schedule or IRR horizon.
pub const MAX_HORIZON_YEARS: u32 = 100;

pub(crate) fn validate_amount(field: &str, amount: Money) -> PropertyFinanceResult<()> {
    if amount < Decimal::ZERO {
        return Err(PropertyFinanceError::invalid(field, "Amount cannot be negative"));
    }
    if amount > MAX_AMOUNT {
        return Err(PropertyFinanceError::invalid(
            field,
            format!("Amount cannot exceed {MAX_AMOUNT}"),
        ));
    }
    Ok(())
}

pub(crate) fn validate_horizon(field: &str, years: u32) -> PropertyFinanceResult<()> {
    if years == 0 {
        return Err(PropertyFinanceError::invalid(field, "Horizon must be at least 1 year"));
    }
    if years > MAX_HORIZON_YEARS {
        return Err(PropertyFinanceError::invalid(
            field,
            format!("Horizon cannot exceed {MAX_HORIZON_YEARS} years"),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_saturating_div_never_panics() {
        assert_eq!(saturating_div(dec!(10), dec!(4)), dec!(2.5));
        assert_eq!(saturating_div(dec!(10), Decimal::ZERO), Decimal::MAX);
        assert_eq!(saturating_div(dec!(-10), Decimal::ZERO), Decimal::MIN);
        assert_eq!(saturating_div(Decimal::MAX, dec!(0.001)), Decimal::MAX);
        assert_eq!(saturating_div(Decimal::MAX, dec!(-0.001)), Decimal::MIN);
        assert_eq!(saturating_div(Decimal::ZERO, Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_limits_reject_out_of_range_inputs() {
        assert!(validate_amount("price", MAX_AMOUNT).is_ok());
        assert!(validate_amount("price", MAX_AMOUNT + Decimal::ONE).is_err());
        assert!(validate_amount("price", dec!(-1)).is_err());
        assert!(validate_horizon("years", MAX_HORIZON_YEARS).is_ok());
        assert!(validate_horizon("years", MAX_HORIZON_YEARS + 1).is_err());
        assert!(validate_horizon("years", 0).is_err());
    }
}
