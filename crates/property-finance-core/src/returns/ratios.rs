//! Single-year return ratios. Zero denominators produce 0 rather than an
//! error; an unprofitable year has no payback period.

use rust_decimal::Decimal;

use crate::types::{saturating_div, Money, Percent, Years};

fn percent_of(numerator: Money, denominator: Money) -> Percent {
    if denominator.is_zero() {
        Decimal::ZERO
    } else {
        saturating_div(numerator, denominator).saturating_mul(Decimal::ONE_HUNDRED)
    }
}

/// Annual rent over total acquisition cost.
pub fn gross_yield(annual_rent: Money, total_acquisition_cost: Money) -> Percent {
    percent_of(annual_rent, total_acquisition_cost)
}

/// Annual rent net of operating expenses over total acquisition cost.
pub fn net_yield(annual_rent: Money, annual_expenses: Money, total_acquisition_cost: Money) -> Percent {
    percent_of(annual_rent.saturating_sub(annual_expenses), total_acquisition_cost)
}

/// Year-1 net cash flow over equity invested.
pub fn roi(net_cash_flow: Money, equity: Money) -> Percent {
    percent_of(net_cash_flow, equity)
}

/// Rent net of expenses and financing cost over equity invested.
pub fn roce(
    annual_rent: Money,
    annual_expenses: Money,
    annual_mortgage_payment: Money,
    equity: Money,
) -> Percent {
    percent_of(
        annual_rent
            .saturating_sub(annual_expenses)
            .saturating_sub(annual_mortgage_payment),
        equity,
    )
}

/// Years of year-1 cash flow needed to recover the equity. `None` when the
/// investment never pays back.
pub fn payback_years(equity: Money, net_cash_flow: Money) -> Option<Years> {
    if net_cash_flow > Decimal::ZERO {
        Some(saturating_div(equity, net_cash_flow))
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_yields() {
        assert_eq!(gross_yield(dec!(14400), dec!(240000)), dec!(6));
        assert_eq!(net_yield(dec!(14400), dec!(2400), dec!(240000)), dec!(5));
    }

    #[test]
    fn test_zero_equity_is_not_a_division_error() {
        assert_eq!(roi(dec!(3600), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(roce(dec!(14400), dec!(2000), dec!(9000), Decimal::ZERO), Decimal::ZERO);
        assert_eq!(gross_yield(dec!(14400), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_roi_and_roce_on_equity() {
        assert_eq!(roi(dec!(5000), dec!(50000)), dec!(10));
        assert_eq!(roce(dec!(14400), dec!(2400), dec!(7000), dec!(50000)), dec!(10));
    }

    #[test]
    fn test_payback() {
        assert_eq!(payback_years(dec!(50000), dec!(5000)), Some(dec!(10)));
        assert_eq!(payback_years(dec!(50000), Decimal::ZERO), None);
        assert_eq!(payback_years(dec!(50000), dec!(-1200)), None);
    }

    #[test]
    fn test_tiny_denominators_saturate() {
        assert_eq!(roi(Decimal::MAX, dec!(0.0001)), Decimal::MAX);
        assert_eq!(payback_years(Decimal::MAX, dec!(0.0001)), Some(Decimal::MAX));
    }
}
