use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PropertyFinanceError;
use crate::time_value::compound;
use crate::types::{
    pct_to_rate, round_to_unit, saturating_div, validate_amount, validate_horizon, with_metadata,
    ComputationOutput, Money, Percent, Rate, MAX_ANNUAL_RATE_PCT, MAX_TERM_YEARS,
};
use crate::PropertyFinanceResult;

const MONTHS_PER_YEAR: u32 = 12;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One completed year of an amortization schedule. Amounts are rounded to
/// whole currency units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationRow {
    pub year: u32,
    /// Twelve monthly payments
    pub annual_payment: Money,
    /// Interest portion paid during the year
    pub annual_interest: Money,
    /// Principal repaid during the year
    pub annual_principal: Money,
    /// Outstanding balance after the year's last payment
    pub remaining_balance: Money,
}

/// Input for a fixed-rate annuity mortgage.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageInput {
    /// Amount borrowed (total acquisition cost minus equity)
    pub financed_amount: Money,
    /// Nominal annual rate as a percentage (3.5 = 3.5%)
    pub annual_rate_pct: Percent,
    /// Loan term in years
    pub term_years: u32,
    /// Years of schedule to emit (defaults to the full term)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub schedule_years: Option<u32>,
}

/// Mortgage payment and amortization schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MortgageOutput {
    pub monthly_payment: Money,
    pub annual_payment: Money,
    pub monthly_rate: Rate,
    pub number_of_payments: u32,
    /// Sum of all payments over the full term
    pub total_paid: Money,
    /// Interest cost over the full term
    pub total_interest: Money,
    pub schedule: Vec<AmortizationRow>,
}

// ---------------------------------------------------------------------------
// Pure engine
// ---------------------------------------------------------------------------

/// Fixed monthly payment of a French (annuity) loan:
/// `P * r * (1+r)^n / ((1+r)^n - 1)`.
///
/// No financing (`financed <= 0`) or no payments yields 0. A zero rate falls
/// back to straight division of the principal. Out-of-range inputs saturate
/// instead of overflowing.
pub fn compute_monthly_payment(financed: Money, monthly_rate: Rate, number_of_payments: u32) -> Money {
    if financed <= Decimal::ZERO || number_of_payments == 0 {
        return Decimal::ZERO;
    }

    if monthly_rate.is_zero() {
        return financed / Decimal::from(number_of_payments);
    }

    let factor = compound(Decimal::ONE.saturating_add(monthly_rate), number_of_payments);
    let denominator = factor.saturating_sub(Decimal::ONE);
    if denominator.is_zero() {
        return financed / Decimal::from(number_of_payments);
    }

    financed
        .saturating_mul(monthly_rate)
        .saturating_mul(saturating_div(factor, denominator))
}

/// Lazy yearly amortization schedule.
///
/// Each value is a fresh simulation from the original principal, so cloning
/// or rebuilding it restarts the schedule.
#[derive(Debug, Clone)]
pub struct AmortizationSchedule {
    balance: Money,
    monthly_rate: Rate,
    payment: Money,
    year: u32,
    last_year: u32,
}

impl AmortizationSchedule {
    pub fn new(
        financed: Money,
        monthly_rate: Rate,
        payment: Money,
        term_years: u32,
        horizon_years: u32,
    ) -> Self {
        Self {
            balance: financed,
            monthly_rate,
            payment,
            year: 0,
            last_year: term_years.min(horizon_years),
        }
    }
}

impl Iterator for AmortizationSchedule {
    type Item = AmortizationRow;

    fn next(&mut self) -> Option<AmortizationRow> {
        if self.year >= self.last_year {
            return None;
        }

        let mut interest_paid = Decimal::ZERO;
        let mut principal_paid = Decimal::ZERO;
        for _ in 0..MONTHS_PER_YEAR {
            let interest = self.balance.saturating_mul(self.monthly_rate);
            let principal = self.payment.saturating_sub(interest);
            self.balance = self.balance.saturating_sub(principal);
            interest_paid = interest_paid.saturating_add(interest);
            principal_paid = principal_paid.saturating_add(principal);
        }
        self.year += 1;

        Some(AmortizationRow {
            year: self.year,
            annual_payment: round_to_unit(self.payment.saturating_mul(Decimal::from(MONTHS_PER_YEAR))),
            annual_interest: round_to_unit(interest_paid),
            annual_principal: round_to_unit(principal_paid),
            remaining_balance: round_to_unit(self.balance),
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.last_year - self.year) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for AmortizationSchedule {}

/// Month-by-month amortization aggregated into one row per completed year,
/// up to `min(horizon_years, term_years)` rows.
pub fn build_amortization_schedule(
    financed: Money,
    monthly_rate: Rate,
    payment: Money,
    term_years: u32,
    horizon_years: u32,
) -> Vec<AmortizationRow> {
    AmortizationSchedule::new(financed, monthly_rate, payment, term_years, horizon_years).collect()
}

// ---------------------------------------------------------------------------
// Boundary
// ---------------------------------------------------------------------------

/// Compute the monthly payment and yearly schedule of a fixed-rate mortgage.
pub fn compute_mortgage(
    input: &MortgageInput,
) -> PropertyFinanceResult<ComputationOutput<MortgageOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_mortgage_input(input, &mut warnings)?;

    let output = mortgage_terms(
        input.financed_amount,
        input.annual_rate_pct,
        input.term_years,
        input.schedule_years.unwrap_or(input.term_years),
    );

    if input.financed_amount.is_zero() {
        warnings.push("Nothing is financed — the purchase is fully paid with equity".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "French (annuity) amortization, monthly compounding",
        input,
        warnings,
        elapsed,
        output,
    ))
}

/// Shared by `compute_mortgage` and the property analysis; inputs must
/// already be validated.
pub(crate) fn mortgage_terms(
    financed: Money,
    annual_rate_pct: Percent,
    term_years: u32,
    schedule_years: u32,
) -> MortgageOutput {
    let monthly_rate = pct_to_rate(annual_rate_pct) / Decimal::from(MONTHS_PER_YEAR);
    let number_of_payments = term_years.saturating_mul(MONTHS_PER_YEAR);
    let monthly_payment = compute_monthly_payment(financed, monthly_rate, number_of_payments);
    let total_paid = monthly_payment.saturating_mul(Decimal::from(number_of_payments));

    let schedule = if financed > Decimal::ZERO {
        build_amortization_schedule(financed, monthly_rate, monthly_payment, term_years, schedule_years)
    } else {
        Vec::new()
    };

    MortgageOutput {
        monthly_payment,
        annual_payment: monthly_payment.saturating_mul(Decimal::from(MONTHS_PER_YEAR)),
        monthly_rate,
        number_of_payments,
        total_paid,
        total_interest: total_paid
            .saturating_sub(financed.max(Decimal::ZERO))
            .max(Decimal::ZERO),
        schedule,
    }
}

pub(crate) fn validate_loan_terms(
    annual_rate_pct: Percent,
    term_years: u32,
    warnings: &mut Vec<String>,
) -> PropertyFinanceResult<()> {
    if term_years == 0 {
        return Err(PropertyFinanceError::invalid(
            "term_years",
            "Mortgage term must be at least 1 year",
        ));
    }
    if term_years > MAX_TERM_YEARS {
        return Err(PropertyFinanceError::invalid(
            "term_years",
            format!("Mortgage term cannot exceed {MAX_TERM_YEARS} years"),
        ));
    }
    if annual_rate_pct < Decimal::ZERO {
        return Err(PropertyFinanceError::invalid(
            "annual_rate_pct",
            "Interest rate cannot be negative",
        ));
    }
    if annual_rate_pct > MAX_ANNUAL_RATE_PCT {
        return Err(PropertyFinanceError::invalid(
            "annual_rate_pct",
            format!("Interest rate cannot exceed {MAX_ANNUAL_RATE_PCT}%"),
        ));
    }

    if !(5..=40).contains(&term_years) {
        warnings.push(format!(
            "Mortgage term of {term_years} years is outside the usual 5–40 year range"
        ));
    }
    if annual_rate_pct > dec!(15) {
        warnings.push(format!(
            "Interest rate of {annual_rate_pct}% is unusually high for a residential mortgage"
        ));
    }
    Ok(())
}

fn validate_mortgage_input(
    input: &MortgageInput,
    warnings: &mut Vec<String>,
) -> PropertyFinanceResult<()> {
    validate_amount("financed_amount", input.financed_amount)?;
    if let Some(years) = input.schedule_years {
        validate_horizon("schedule_years", years)?;
    }
    validate_loan_terms(input.annual_rate_pct, input.term_years, warnings)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
