use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PropertyFinanceError;
use crate::returns::irr::{irr_warnings, solve_irr, validate_irr_series};
use crate::returns::ratios;
use crate::types::{validate_amount, with_metadata, ComputationOutput, Money, Percent, Years};
use crate::PropertyFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Year-1 figures plus an optional multi-year series for the IRR.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReturnMetricsInput {
    /// Cash put into the purchase by the investor
    pub equity: Money,
    /// Purchase price plus acquisition costs
    pub total_acquisition_cost: Money,
    /// Year-1 gross rent (12 months)
    pub annual_rent: Money,
    /// Year-1 operating expenses
    pub annual_expenses: Money,
    /// Twelve mortgage payments
    pub annual_mortgage_payment: Money,
    /// `[-equity, cf_1, ..., cf_N]`; IRR is skipped when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_flows: Option<Vec<Money>>,
}

/// Summary profitability figures. Ratios are percentages.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnMetrics {
    pub gross_yield: Percent,
    pub net_yield: Percent,
    pub roi: Percent,
    pub roce: Percent,
    /// `None` when the year-1 cash flow never recovers the equity
    pub payback_years: Option<Years>,
    pub irr: Option<Percent>,
    pub annual_net_cash_flow: Money,
    pub monthly_net_cash_flow: Money,
}

// ---------------------------------------------------------------------------
// Pure engine
// ---------------------------------------------------------------------------

/// Year-1 ratios. The IRR slot is left empty for the caller to fill.
pub fn year_one_metrics(
    equity: Money,
    total_acquisition_cost: Money,
    annual_rent: Money,
    annual_expenses: Money,
    annual_mortgage_payment: Money,
) -> ReturnMetrics {
    let annual_net_cash_flow = annual_rent
        .saturating_sub(annual_expenses)
        .saturating_sub(annual_mortgage_payment);

    ReturnMetrics {
        gross_yield: ratios::gross_yield(annual_rent, total_acquisition_cost),
        net_yield: ratios::net_yield(annual_rent, annual_expenses, total_acquisition_cost),
        roi: ratios::roi(annual_net_cash_flow, equity),
        roce: ratios::roce(annual_rent, annual_expenses, annual_mortgage_payment, equity),
        payback_years: ratios::payback_years(equity, annual_net_cash_flow),
        irr: None,
        annual_net_cash_flow,
        monthly_net_cash_flow: annual_net_cash_flow / Decimal::from(12),
    }
}

// ---------------------------------------------------------------------------
// Boundary
// ---------------------------------------------------------------------------

/// Yields, ROI, ROCE, payback and (when a series is given) IRR.
pub fn compute_return_metrics(
    input: &ReturnMetricsInput,
) -> PropertyFinanceResult<ComputationOutput<ReturnMetrics>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    validate_metrics_input(input, &mut warnings)?;

    let mut metrics = year_one_metrics(
        input.equity,
        input.total_acquisition_cost,
        input.annual_rent,
        input.annual_expenses,
        input.annual_mortgage_payment,
    );

    if let Some(flows) = &input.cash_flows {
        if flows.len() < 2 {
            return Err(PropertyFinanceError::InsufficientData(
                "IRR requires at least 2 cash flows".into(),
            ));
        }
        validate_irr_series(flows)?;
        let solution = solve_irr(flows);
        irr_warnings(flows, &solution, &mut warnings);
        metrics.irr = Some(solution.irr_pct);
    }

    if metrics.payback_years.is_none() {
        warnings.push("Year-1 net cash flow is not positive — equity is not recoverable".into());
    }

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "Rental return metrics (gross/net yield, ROI, ROCE, payback, IRR)",
        input,
        warnings,
        elapsed,
        metrics,
    ))
}

fn validate_metrics_input(
    input: &ReturnMetricsInput,
    warnings: &mut Vec<String>,
) -> PropertyFinanceResult<()> {
    for (field, value) in [
        ("equity", input.equity),
        ("total_acquisition_cost", input.total_acquisition_cost),
        ("annual_rent", input.annual_rent),
        ("annual_expenses", input.annual_expenses),
        ("annual_mortgage_payment", input.annual_mortgage_payment),
    ] {
        validate_amount(field, value)?;
    }

    if input.equity.is_zero() {
        warnings.push("Equity is zero — ROI and ROCE reported as 0".into());
    }
    if input.total_acquisition_cost.is_zero() {
        warnings.push("Total acquisition cost is zero — yields reported as 0".into());
    }
    if input.equity > input.total_acquisition_cost {
        warnings.push("Equity exceeds the total acquisition cost".into());
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
