use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PropertyFinanceError;
use crate::types::{
    pct_to_rate, saturating_div, validate_amount, validate_horizon, with_metadata,
    ComputationOutput, Money, Percent, Rate, MAX_ANNUAL_RATE_PCT,
};
use crate::PropertyFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One simulated year of rental operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CashFlowYear {
    pub year: u32,
    pub gross_annual_rent: Money,
    pub adjusted_annual_expenses: Money,
    pub annual_mortgage_payment: Money,
    /// Rent minus expenses minus mortgage payment
    pub net_cash_flow: Money,
    /// (Rent - expenses) / total acquisition cost, in percent
    pub net_yield_pct: Percent,
}

/// Input for a multi-year rental cash-flow projection.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowProjectionInput {
    /// Monthly rent in year 1
    pub initial_monthly_rent: Money,
    /// Annual operating expenses in year 1
    pub initial_annual_expenses: Money,
    /// Twelve mortgage payments; held constant over the horizon
    pub annual_mortgage_payment: Money,
    /// Annual rent growth, percent
    pub rent_growth_pct: Percent,
    /// Annual expense inflation, percent
    pub expense_inflation_pct: Percent,
    /// Purchase price plus acquisition costs (yield denominator)
    pub total_acquisition_cost: Money,
    pub horizon_years: u32,
}

/// Projected years plus running totals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CashFlowProjectionOutput {
    pub years: Vec<CashFlowYear>,
    pub total_net_cash_flow: Money,
    /// First year whose net cash flow is negative, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub first_negative_year: Option<u32>,
}

// ---------------------------------------------------------------------------
// Pure engine
// ---------------------------------------------------------------------------

/// Lazy yearly projection. Rent and expenses start from their year-1 values
/// and compound only after each year has been emitted. Amounts saturate at
/// the `Decimal` range.
#[derive(Debug, Clone)]
pub struct CashFlowProjection {
    monthly_rent: Money,
    annual_expenses: Money,
    annual_mortgage_payment: Money,
    rent_growth: Rate,
    expense_inflation: Rate,
    total_acquisition_cost: Money,
    year: u32,
    horizon_years: u32,
}

impl CashFlowProjection {
    pub fn new(
        initial_monthly_rent: Money,
        initial_annual_expenses: Money,
        annual_mortgage_payment: Money,
        rent_growth_pct: Percent,
        expense_inflation_pct: Percent,
        total_acquisition_cost: Money,
        horizon_years: u32,
    ) -> Self {
        Self {
            monthly_rent: initial_monthly_rent,
            annual_expenses: initial_annual_expenses,
            annual_mortgage_payment,
            rent_growth: pct_to_rate(rent_growth_pct),
            expense_inflation: pct_to_rate(expense_inflation_pct),
            total_acquisition_cost,
            year: 0,
            horizon_years,
        }
    }

    pub fn from_input(input: &CashFlowProjectionInput) -> Self {
        Self::new(
            input.initial_monthly_rent,
            input.initial_annual_expenses,
            input.annual_mortgage_payment,
            input.rent_growth_pct,
            input.expense_inflation_pct,
            input.total_acquisition_cost,
            input.horizon_years,
        )
    }
}

impl Iterator for CashFlowProjection {
    type Item = CashFlowYear;

    fn next(&mut self) -> Option<CashFlowYear> {
        if self.year >= self.horizon_years {
            return None;
        }
        self.year += 1;

        let gross_annual_rent = self.monthly_rent.saturating_mul(Decimal::from(12));
        let operating_income = gross_annual_rent.saturating_sub(self.annual_expenses);
        let net_yield_pct = if self.total_acquisition_cost.is_zero() {
            Decimal::ZERO
        } else {
            saturating_div(operating_income, self.total_acquisition_cost)
                .saturating_mul(Decimal::ONE_HUNDRED)
        };

        let row = CashFlowYear {
            year: self.year,
            gross_annual_rent,
            adjusted_annual_expenses: self.annual_expenses,
            annual_mortgage_payment: self.annual_mortgage_payment,
            net_cash_flow: operating_income.saturating_sub(self.annual_mortgage_payment),
            net_yield_pct,
        };

        self.monthly_rent = self
            .monthly_rent
            .saturating_mul(Decimal::ONE.saturating_add(self.rent_growth));
        self.annual_expenses = self
            .annual_expenses
            .saturating_mul(Decimal::ONE.saturating_add(self.expense_inflation));

        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.horizon_years - self.year) as usize;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CashFlowProjection {}

/// Project yearly cash flows over `horizon_years`.
pub fn project_cash_flows(
    initial_monthly_rent: Money,
    initial_annual_expenses: Money,
    annual_mortgage_payment: Money,
    rent_growth_pct: Percent,
    expense_inflation_pct: Percent,
    total_acquisition_cost: Money,
    horizon_years: u32,
) -> Vec<CashFlowYear> {
    CashFlowProjection::new(
        initial_monthly_rent,
        initial_annual_expenses,
        annual_mortgage_payment,
        rent_growth_pct,
        expense_inflation_pct,
        total_acquisition_cost,
        horizon_years,
    )
    .collect()
}

/// Running total of net cash flow, one entry per projected year.
pub fn cumulative_cash_flow(years: &[CashFlowYear]) -> Vec<Money> {
    years
        .iter()
        .scan(Decimal::ZERO, |acc, y| {
            *acc = acc.saturating_add(y.net_cash_flow);
            Some(*acc)
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Boundary
// ---------------------------------------------------------------------------

/// Validate inputs and project rental cash flows.
pub fn project_property_cash_flows(
    input: &CashFlowProjectionInput,
) -> PropertyFinanceResult<ComputationOutput<CashFlowProjectionOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_projection_input(input, &mut warnings)?;

    let years: Vec<CashFlowYear> = CashFlowProjection::from_input(input).collect();
    let total_net_cash_flow = years
        .iter()
        .fold(Decimal::ZERO, |acc, y| acc.saturating_add(y.net_cash_flow));
    let first_negative_year = years
        .iter()
        .find(|y| y.net_cash_flow < Decimal::ZERO)
        .map(|y| y.year);

    if let Some(year) = first_negative_year {
        warnings.push(format!("Net cash flow turns negative in year {year}"));
    }

    let output = CashFlowProjectionOutput {
        years,
        total_net_cash_flow,
        first_negative_year,
    };

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Rental cash-flow projection (compounded rent growth and expense inflation, constant mortgage payment)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

pub(crate) fn validate_growth(field: &str, pct: Percent) -> PropertyFinanceResult<()> {
    if pct <= -Decimal::ONE_HUNDRED {
        return Err(PropertyFinanceError::invalid(
            field,
            "Annual change must be greater than -100%",
        ));
    }
    if pct > MAX_ANNUAL_RATE_PCT {
        return Err(PropertyFinanceError::invalid(
            field,
            format!("Annual change cannot exceed {MAX_ANNUAL_RATE_PCT}%"),
        ));
    }
    Ok(())
}

fn validate_projection_input(
    input: &CashFlowProjectionInput,
    warnings: &mut Vec<String>,
) -> PropertyFinanceResult<()> {
    validate_horizon("horizon_years", input.horizon_years)?;
    for (field, value) in [
        ("initial_monthly_rent", input.initial_monthly_rent),
        ("initial_annual_expenses", input.initial_annual_expenses),
        ("annual_mortgage_payment", input.annual_mortgage_payment),
        ("total_acquisition_cost", input.total_acquisition_cost),
    ] {
        validate_amount(field, value)?;
    }
    validate_growth("rent_growth_pct", input.rent_growth_pct)?;
    validate_growth("expense_inflation_pct", input.expense_inflation_pct)?;

    if input.total_acquisition_cost.is_zero() {
        warnings.push("Total acquisition cost is zero — net yield reported as 0".into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
