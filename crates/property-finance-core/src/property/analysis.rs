use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PropertyFinanceError;
use crate::mortgage::amortization::{mortgage_terms, validate_loan_terms, MortgageOutput};
use crate::projection::cash_flow::{
    cumulative_cash_flow, project_cash_flows, validate_growth, CashFlowYear,
};
use crate::property::financials::{ExpenseShare, PropertyFinancials};
use crate::returns::irr::{irr_cash_flow_series, irr_warnings, solve_irr, IrrSolution};
use crate::returns::metrics::{year_one_metrics, ReturnMetrics};
use crate::returns::ratios;
use crate::time_value::npv;
use crate::types::{pct_to_rate, validate_horizon, with_metadata, ComputationOutput, Money, Percent};
use crate::PropertyFinanceResult;

const DEFAULT_EQUITY_SHARE: Decimal = dec!(0.20);
const DEFAULT_ANNUAL_RATE_PCT: Decimal = dec!(3.5);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// User-adjustable assumptions. Every field has a default so a bare
/// property is enough to run an analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Cash contributed; defaults to 20% of the total acquisition cost
    #[serde(skip_serializing_if = "Option::is_none")]
    pub equity: Option<Money>,
    pub term_years: u32,
    /// Nominal annual mortgage rate; defaults to the reference rate, then 3.5%
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_rate_pct: Option<Percent>,
    pub expense_inflation_pct: Percent,
    pub rent_growth_pct: Percent,
    /// Rate used for the NPV of the investment's cash flows
    pub discount_rate_pct: Percent,
    /// Years shown in the profitability evolution
    pub projection_years: u32,
    /// Years of cash flow fed to the IRR
    pub irr_horizon_years: u32,
    /// Years of amortization schedule returned
    pub schedule_years: u32,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        Self {
            equity: None,
            term_years: 30,
            annual_rate_pct: None,
            expense_inflation_pct: dec!(2.0),
            rent_growth_pct: dec!(2.0),
            discount_rate_pct: dec!(5.0),
            projection_years: 10,
            irr_horizon_years: 30,
            schedule_years: 5,
        }
    }
}

/// A property plus the simulation to run on it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyAnalysisInput {
    pub property: PropertyFinancials,
    #[serde(default)]
    pub simulation: SimulationParameters,
    /// Market reference rate (Euribor), used when no mortgage rate is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference_rate_pct: Option<Percent>,
}

/// Where the mortgage rate came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RateSource {
    Simulation,
    ReferenceRate,
    Default,
}

/// Investment, cash flow and return for one way of paying for the property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancingScenario {
    pub investment: Money,
    pub annual_cash_flow: Money,
    pub roi: Percent,
    pub net_yield: Percent,
}

/// Leveraged purchase against an all-cash purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FinancingComparison {
    pub financed: FinancingScenario,
    pub unfinanced: FinancingScenario,
}

/// Everything the investment dashboard shows for one property.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PropertyAnalysisOutput {
    pub total_acquisition_cost: Money,
    pub equity: Money,
    pub financed_amount: Money,
    pub annual_rate_pct: Percent,
    pub rate_source: RateSource,
    pub mortgage: MortgageOutput,
    pub metrics: ReturnMetrics,
    pub irr: IrrSolution,
    /// NPV of `[-equity, cf_1..cf_N]` at the simulation's discount rate
    pub npv_at_discount_rate: Money,
    /// First year in which cumulative cash flow has repaid the equity
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cumulative_payback_year: Option<u32>,
    pub evolution: Vec<CashFlowYear>,
    pub financing_comparison: FinancingComparison,
    pub expense_breakdown: Vec<ExpenseShare>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Run the full investment analysis for a property: mortgage, schedule,
/// profitability evolution, year-1 ratios, IRR, NPV and the financing
/// comparison.
pub fn analyze_property(
    input: &PropertyAnalysisInput,
) -> PropertyFinanceResult<ComputationOutput<PropertyAnalysisOutput>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();
    let property = &input.property;
    let sim = &input.simulation;

    property.validate(&mut warnings)?;

    let total_acquisition_cost = property.total_acquisition_cost();
    let equity = resolve_equity(sim.equity, total_acquisition_cost)?;
    let (annual_rate_pct, rate_source) = resolve_rate(sim.annual_rate_pct, input.reference_rate_pct);
    validate_simulation(sim, annual_rate_pct, &mut warnings)?;

    let financed_amount = total_acquisition_cost - equity;
    if equity.is_zero() {
        warnings.push("Equity is zero — ROI and ROCE reported as 0".into());
    }
    if financed_amount.is_zero() {
        warnings.push("Nothing is financed — the purchase is fully paid with equity".into());
    }
    tracing::debug!(
        %total_acquisition_cost,
        %equity,
        %financed_amount,
        %annual_rate_pct,
        ?rate_source,
        "resolved purchase financing"
    );

    // --- Mortgage ---
    let mortgage = mortgage_terms(
        financed_amount,
        annual_rate_pct,
        sim.term_years,
        sim.schedule_years,
    );
    let annual_payment = mortgage.annual_payment;

    // --- Year-1 ratios ---
    let annual_rent = property.annual_rent();
    let annual_expenses = property.annual_expenses();
    let mut metrics = year_one_metrics(
        equity,
        total_acquisition_cost,
        annual_rent,
        annual_expenses,
        annual_payment,
    );
    if metrics.payback_years.is_none() {
        warnings.push("Year-1 net cash flow is not positive — equity is not recoverable".into());
    }

    // --- Projections ---
    let project = |years: u32| {
        project_cash_flows(
            property.monthly_rent(),
            annual_expenses,
            annual_payment,
            sim.rent_growth_pct,
            sim.expense_inflation_pct,
            total_acquisition_cost,
            years,
        )
    };
    let evolution = project(sim.projection_years);
    let irr_years = project(sim.irr_horizon_years);
    tracing::debug!(
        evolution_years = evolution.len(),
        irr_years = irr_years.len(),
        "projected cash flows"
    );

    // --- IRR / NPV ---
    let series = irr_cash_flow_series(equity, &irr_years);
    let irr = solve_irr(&series);
    irr_warnings(&series, &irr, &mut warnings);
    metrics.irr = Some(irr.irr_pct);
    let npv_at_discount_rate = npv(pct_to_rate(sim.discount_rate_pct), &series)?;

    let cumulative_payback_year = cumulative_cash_flow(&irr_years)
        .iter()
        .position(|total| *total >= equity && *total > Decimal::ZERO)
        .map(|idx| idx as u32 + 1);

    // --- Comparison and breakdown ---
    let financing_comparison = compare_financing(
        &metrics,
        equity,
        total_acquisition_cost,
        annual_rent,
        annual_expenses,
    );
    let expense_breakdown = property.expense_breakdown(annual_payment);

    let output = PropertyAnalysisOutput {
        total_acquisition_cost,
        equity,
        financed_amount,
        annual_rate_pct,
        rate_source,
        mortgage,
        metrics,
        irr,
        npv_at_discount_rate,
        cumulative_payback_year,
        evolution,
        financing_comparison,
        expense_breakdown,
    };

    let elapsed = start.elapsed().as_micros() as u64;
    tracing::debug!(elapsed_us = elapsed, warnings = warnings.len(), "property analysis done");

    Ok(with_metadata(
        "Rental property investment analysis (annuity mortgage, compounded projection, bisection IRR)",
        input,
        warnings,
        elapsed,
        output,
    ))
}

// ---------------------------------------------------------------------------
// Default resolution
// ---------------------------------------------------------------------------

fn resolve_equity(equity: Option<Money>, total_acquisition_cost: Money) -> PropertyFinanceResult<Money> {
    let equity = equity.unwrap_or(total_acquisition_cost * DEFAULT_EQUITY_SHARE);
    if equity < Decimal::ZERO {
        return Err(PropertyFinanceError::invalid("equity", "Equity cannot be negative"));
    }
    if equity > total_acquisition_cost {
        return Err(PropertyFinanceError::invalid(
            "equity",
            format!("Equity cannot exceed the total acquisition cost of {total_acquisition_cost}"),
        ));
    }
    Ok(equity)
}

fn resolve_rate(annual_rate_pct: Option<Percent>, reference_rate_pct: Option<Percent>) -> (Percent, RateSource) {
    match (annual_rate_pct, reference_rate_pct) {
        (Some(rate), _) => (rate, RateSource::Simulation),
        (None, Some(reference)) => (reference, RateSource::ReferenceRate),
        (None, None) => (DEFAULT_ANNUAL_RATE_PCT, RateSource::Default),
    }
}

fn validate_simulation(
    sim: &SimulationParameters,
    annual_rate_pct: Percent,
    warnings: &mut Vec<String>,
) -> PropertyFinanceResult<()> {
    validate_loan_terms(annual_rate_pct, sim.term_years, warnings)?;
    validate_growth("rent_growth_pct", sim.rent_growth_pct)?;
    validate_growth("expense_inflation_pct", sim.expense_inflation_pct)?;
    validate_growth("discount_rate_pct", sim.discount_rate_pct)?;

    for (field, years) in [
        ("projection_years", sim.projection_years),
        ("irr_horizon_years", sim.irr_horizon_years),
        ("schedule_years", sim.schedule_years),
    ] {
        validate_horizon(field, years)?;
    }
    Ok(())
}

fn compare_financing(
    metrics: &ReturnMetrics,
    equity: Money,
    total_acquisition_cost: Money,
    annual_rent: Money,
    annual_expenses: Money,
) -> FinancingComparison {
    let unlevered_cash_flow = annual_rent.saturating_sub(annual_expenses);
    FinancingComparison {
        financed: FinancingScenario {
            investment: equity,
            annual_cash_flow: metrics.annual_net_cash_flow,
            roi: metrics.roi,
            net_yield: metrics.net_yield,
        },
        unfinanced: FinancingScenario {
            investment: total_acquisition_cost,
            annual_cash_flow: unlevered_cash_flow,
            roi: ratios::roi(unlevered_cash_flow, total_acquisition_cost),
            net_yield: metrics.net_yield,
        },
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::property::financials::{AcquisitionCosts, AnnualExpenseLines};
    use rust_decimal_macros::dec;

    fn sample_input() -> PropertyAnalysisInput {
        PropertyAnalysisInput {
            property: PropertyFinancials {
                name: "Test flat".into(),
                purchase_price: dec!(250000),
                is_new_construction: false,
                acquisition_costs: AcquisitionCosts::default(),
                monthly_rent: Some(dec!(1200)),
                expenses: AnnualExpenseLines::default(),
            },
            simulation: SimulationParameters {
                equity: Some(dec!(50000)),
                annual_rate_pct: Some(dec!(3.5)),
                ..Default::default()
            },
            reference_rate_pct: None,
        }
    }

    #[test]
    fn test_reference_scenario() {
        let out = analyze_property(&sample_input()).unwrap();
        let r = &out.result;
        assert_eq!(r.financed_amount, dec!(200000));
        assert!((r.mortgage.monthly_payment - dec!(898.09)).abs() < dec!(0.01));
        assert!((r.metrics.annual_net_cash_flow - dec!(3622.93)).abs() < dec!(0.01));
        assert_eq!(r.mortgage.schedule.len(), 5);
        assert_eq!(r.evolution.len(), 10);
        assert!(r.irr.converged);
    }

    #[test]
    fn test_default_equity_is_twenty_percent() {
        let mut input = sample_input();
        input.simulation.equity = None;
        let out = analyze_property(&input).unwrap();
        assert_eq!(out.result.equity, dec!(50000));
    }

    #[test]
    fn test_rate_resolution_order() {
        let mut input = sample_input();
        input.simulation.annual_rate_pct = None;
        input.reference_rate_pct = Some(dec!(2.6));
        let out = analyze_property(&input).unwrap();
        assert_eq!(out.result.annual_rate_pct, dec!(2.6));
        assert_eq!(out.result.rate_source, RateSource::ReferenceRate);

        input.reference_rate_pct = None;
        let out = analyze_property(&input).unwrap();
        assert_eq!(out.result.annual_rate_pct, dec!(3.5));
        assert_eq!(out.result.rate_source, RateSource::Default);
    }

    #[test]
    fn test_equity_above_total_cost_rejected() {
        let mut input = sample_input();
        input.simulation.equity = Some(dec!(300000));
        assert!(analyze_property(&input).is_err());
    }

    #[test]
    fn test_all_cash_purchase() {
        let mut input = sample_input();
        input.simulation.equity = Some(dec!(250000));
        let out = analyze_property(&input).unwrap();
        let r = &out.result;
        assert_eq!(r.mortgage.monthly_payment, Decimal::ZERO);
        assert!(r.mortgage.schedule.is_empty());
        assert_eq!(r.financing_comparison.financed, FinancingScenario {
            investment: dec!(250000),
            annual_cash_flow: dec!(14400),
            roi: dec!(5.76),
            net_yield: dec!(5.76),
        });
        assert_eq!(r.financing_comparison.financed.roi, r.financing_comparison.unfinanced.roi);
    }

    #[test]
    fn test_unprofitable_property_warns_and_has_no_payback() {
        let mut input = sample_input();
        input.property.monthly_rent = Some(dec!(700));
        let out = analyze_property(&input).unwrap();
        assert_eq!(out.result.metrics.payback_years, None);
        assert!(out.warnings.iter().any(|w| w.contains("not recoverable")));
    }

    #[test]
    fn test_zero_horizon_rejected() {
        let mut input = sample_input();
        input.simulation.irr_horizon_years = 0;
        assert!(analyze_property(&input).is_err());
    }
}
