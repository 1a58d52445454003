use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::error::PropertyFinanceError;
use crate::types::{saturating_div, Money, Rate};
use crate::PropertyFinanceResult;

/// `base^periods` by repeated multiplication, saturating at `Decimal::MAX`.
pub fn compound(base: Decimal, periods: u32) -> Decimal {
    let mut result = Decimal::ONE;
    for _ in 0..periods {
        result = result.saturating_mul(base);
    }
    result
}

/// Net Present Value of a series of cash flows. Index 0 is undiscounted.
pub fn npv(rate: Rate, cash_flows: &[Money]) -> PropertyFinanceResult<Money> {
    if rate <= dec!(-1) {
        return Err(PropertyFinanceError::invalid(
            "rate",
            "Discount rate must be greater than -100%",
        ));
    }
    checked_discounted_sum(rate, cash_flows).ok_or_else(|| {
        PropertyFinanceError::invalid(
            "cash_flows",
            "Discounted cash flows exceed the representable range",
        )
    })
}

/// NPV without the domain check, or `None` when discounting leaves the
/// `Decimal` range (deeply negative rates over long series).
pub(crate) fn checked_discounted_sum(rate: Rate, cash_flows: &[Money]) -> Option<Money> {
    let one_plus_r = Decimal::ONE.checked_add(rate)?;
    let mut result = Decimal::ZERO;
    let mut discount = Decimal::ONE;

    for (t, cf) in cash_flows.iter().enumerate() {
        if t > 0 {
            discount = discount.checked_mul(one_plus_r)?;
        }
        result = result.checked_add(cf.checked_div(discount)?)?;
    }

    Some(result)
}

/// Present value of `periods` equal payments made at the end of each period.
pub fn present_value_of_annuity(payment: Money, rate: Rate, periods: u32) -> Money {
    if rate.is_zero() {
        return payment.saturating_mul(Decimal::from(periods));
    }

    let one_plus_r = Decimal::ONE.saturating_add(rate);
    let mut discount = Decimal::ONE;
    let mut total = Decimal::ZERO;
    for _ in 0..periods {
        discount = discount.saturating_mul(one_plus_r);
        total = total.saturating_add(saturating_div(payment, discount));
    }
    total
}
