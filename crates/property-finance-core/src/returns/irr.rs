use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use crate::error::PropertyFinanceError;
use crate::projection::cash_flow::CashFlowYear;
use crate::time_value::checked_discounted_sum;
use crate::types::{
    pct_to_rate, with_metadata, ComputationOutput, Money, Percent, MAX_AMOUNT, MAX_HORIZON_YEARS,
};
use crate::PropertyFinanceResult;

const MAX_IRR_ITERATIONS: u32 = 100;
const NPV_TOLERANCE: Decimal = dec!(0.01);
const LOWER_BOUND_PCT: Decimal = dec!(-50);
const UPPER_BOUND_PCT: Decimal = dec!(50);

/// Initial outlay plus one flow per year of the longest horizon.
pub const MAX_IRR_CASH_FLOWS: usize = MAX_HORIZON_YEARS as usize + 1;

/// Outcome of the bisection search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IrrSolution {
    /// Last midpoint evaluated, in percent
    pub irr_pct: Percent,
    pub iterations: u32,
    /// NPV at `irr_pct`
    pub npv_residual: Money,
    /// Whether |NPV| dropped below the tolerance
    pub converged: bool,
}

impl IrrSolution {
    /// Strict view: a solution that never reached the tolerance is an error.
    pub fn into_result(self) -> PropertyFinanceResult<Percent> {
        if self.converged {
            Ok(self.irr_pct)
        } else {
            Err(PropertyFinanceError::ConvergenceFailure {
                function: "IRR".into(),
                iterations: self.iterations,
                last_delta: self.npv_residual,
            })
        }
    }
}

/// Input for a standalone IRR calculation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IrrInput {
    /// Index 0 is the (negative) initial investment, then yearly net flows
    pub cash_flows: Vec<Money>,
}

/// Bisection IRR over [-50%, +50%].
///
/// Assumes a conventional series (one sign change, outflow first): NPV above
/// zero means the root lies at a higher rate. Stops after 100 halvings or once
/// |NPV| < 0.01 and returns the last midpoint either way. A rate at which
/// discounting overflows moves the search upward and records `Decimal::MAX`
/// as the residual.
pub fn solve_irr(cash_flows: &[Money]) -> IrrSolution {
    let mut low = LOWER_BOUND_PCT;
    let mut high = UPPER_BOUND_PCT;
    let mut mid = Decimal::ZERO;
    let mut npv = Decimal::ZERO;
    let mut iterations = 0;
    let mut converged = false;

    while iterations < MAX_IRR_ITERATIONS {
        iterations += 1;
        mid = (low + high) / Decimal::TWO;
        let Some(value) = checked_discounted_sum(pct_to_rate(mid), cash_flows) else {
            npv = Decimal::MAX;
            low = mid;
            continue;
        };
        npv = value;

        if npv.abs() < NPV_TOLERANCE {
            converged = true;
            break;
        }

        if npv > Decimal::ZERO {
            low = mid;
        } else {
            high = mid;
        }
    }

    IrrSolution {
        irr_pct: mid,
        iterations,
        npv_residual: npv,
        converged,
    }
}

/// Number of sign changes in a series, ignoring zero flows.
pub fn sign_changes(cash_flows: &[Money]) -> usize {
    cash_flows
        .iter()
        .filter(|cf| !cf.is_zero())
        .map(|cf| cf.is_sign_positive())
        .collect::<Vec<_>>()
        .windows(2)
        .filter(|pair| pair[0] != pair[1])
        .count()
}

/// `[-equity, cf_1, ..., cf_N]` from a projection.
pub fn irr_cash_flow_series(equity: Money, years: &[CashFlowYear]) -> Vec<Money> {
    std::iter::once(-equity)
        .chain(years.iter().map(|y| y.net_cash_flow))
        .collect()
}

/// Solve the IRR of a cash-flow series and report how well it converged.
pub fn calculate_irr(input: &IrrInput) -> PropertyFinanceResult<ComputationOutput<IrrSolution>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.cash_flows.len() < 2 {
        return Err(PropertyFinanceError::InsufficientData(
            "IRR requires at least 2 cash flows".into(),
        ));
    }
    validate_irr_series(&input.cash_flows)?;

    let solution = solve_irr(&input.cash_flows);
    irr_warnings(&input.cash_flows, &solution, &mut warnings);

    let elapsed = start.elapsed().as_micros() as u64;

    Ok(with_metadata(
        "IRR by bisection over [-50%, 50%], 100 iterations, NPV tolerance 0.01",
        input,
        warnings,
        elapsed,
        solution,
    ))
}

/// Length and magnitude limits for a series handed to the solver.
pub(crate) fn validate_irr_series(cash_flows: &[Money]) -> PropertyFinanceResult<()> {
    if cash_flows.len() > MAX_IRR_CASH_FLOWS {
        return Err(PropertyFinanceError::invalid(
            "cash_flows",
            format!("IRR accepts at most {MAX_IRR_CASH_FLOWS} cash flows"),
        ));
    }
    if cash_flows.iter().any(|cf| cf.abs() > MAX_AMOUNT) {
        return Err(PropertyFinanceError::invalid(
            "cash_flows",
            format!("Cash flows cannot exceed {MAX_AMOUNT} in magnitude"),
        ));
    }
    Ok(())
}

pub(crate) fn irr_warnings(cash_flows: &[Money], solution: &IrrSolution, warnings: &mut Vec<String>) {
    let changes = sign_changes(cash_flows);
    if changes != 1 {
        warnings.push(format!(
            "Cash-flow series has {changes} sign changes; bisection IRR assumes exactly one"
        ));
    }
    if !solution.converged {
        tracing::warn!(
            irr_pct = %solution.irr_pct,
            npv_residual = %solution.npv_residual,
            "IRR bisection did not reach tolerance"
        );
        warnings.push(format!(
            "IRR did not converge after {} iterations (NPV residual {:.2}); best estimate returned",
            solution.iterations, solution.npv_residual
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::prelude::ToPrimitive;
    use rust_decimal_macros::dec;

    /// Independent f64 root of NPV for a level annuity after an outlay.
    fn annuity_root(outlay: f64, payment: f64, years: i32) -> f64 {
        let npv = |r: f64| -outlay + payment * (1.0 - (1.0 + r).powi(-years)) / r;
        let (mut lo, mut hi) = (1e-6, 1.0);
        for _ in 0..200 {
            let mid = (lo + hi) / 2.0;
            if npv(mid) > 0.0 {
                lo = mid;
            } else {
                hi = mid;
            }
        }
        (lo + hi) / 2.0 * 100.0
    }

    #[test]
    fn test_irr_simple_case() {
        // Invest 100, receive 110 in 1 year => IRR = 10%
        let solution = solve_irr(&[dec!(-100), dec!(110)]);
        assert!(solution.converged);
        assert!((solution.irr_pct - dec!(10)).abs() < dec!(0.02));
    }

    #[test]
    fn test_irr_level_annuity_matches_analytic_root() {
        let mut flows = vec![dec!(-100000)];
        flows.extend(std::iter::repeat(dec!(12000)).take(30));
        let solution = solve_irr(&flows);
        let expected = annuity_root(100000.0, 12000.0, 30);
        let got = solution.irr_pct.to_f64().unwrap();
        assert!(solution.converged);
        assert!((got - expected).abs() < 0.1, "got {got}, expected {expected}");
    }

    #[test]
    fn test_negative_irr() {
        // Only 80 back on 100 over two years
        let solution = solve_irr(&[dec!(-100), dec!(40), dec!(40)]);
        assert!(solution.converged);
        assert!(solution.irr_pct < Decimal::ZERO);
    }

    #[test]
    fn test_root_outside_bracket_is_best_effort() {
        // True IRR is 200%, above the search bracket
        let solution = solve_irr(&[dec!(-100), dec!(300)]);
        assert!(!solution.converged);
        assert_eq!(solution.iterations, 100);
        assert!(solution.irr_pct > dec!(49.99));
        assert!(solution.clone().into_result().is_err());
    }

    #[test]
    fn test_overflowing_rates_are_skipped() {
        let mut flows = vec![dec!(-100000)];
        flows.extend(std::iter::repeat(dec!(-1000)).take(120));
        let solution = solve_irr(&flows);
        assert!(!solution.converged);
        assert_eq!(solution.iterations, 100);
        assert!(solution.irr_pct > LOWER_BOUND_PCT && solution.irr_pct < UPPER_BOUND_PCT);
    }

    #[test]
    fn test_sign_changes() {
        assert_eq!(sign_changes(&[dec!(-100), dec!(10), dec!(0), dec!(120)]), 1);
        assert_eq!(sign_changes(&[dec!(-100), dec!(230), dec!(-132)]), 2);
        assert_eq!(sign_changes(&[dec!(10), dec!(10)]), 0);
    }

    #[test]
    fn test_series_starts_with_equity_outlay() {
        let years = crate::projection::cash_flow::project_cash_flows(
            dec!(1000),
            dec!(1000),
            dec!(6000),
            dec!(0),
            dec!(0),
            dec!(200000),
            3,
        );
        let series = irr_cash_flow_series(dec!(40000), &years);
        assert_eq!(series, vec![dec!(-40000), dec!(5000), dec!(5000), dec!(5000)]);
    }

    #[test]
    fn test_calculate_irr_warns_on_unconventional_series() {
        let input = IrrInput {
            cash_flows: vec![dec!(100), dec!(100)],
        };
        let out = calculate_irr(&input).unwrap();
        assert!(!out.result.converged);
        assert_eq!(out.warnings.len(), 2);
    }

    #[test]
    fn test_calculate_irr_requires_two_flows() {
        let input = IrrInput {
            cash_flows: vec![dec!(-100)],
        };
        assert!(calculate_irr(&input).is_err());
    }

    #[test]
    fn test_calculate_irr_rejects_oversized_series() {
        let too_long = IrrInput {
            cash_flows: vec![dec!(-1000); MAX_IRR_CASH_FLOWS + 1],
        };
        assert!(matches!(
            calculate_irr(&too_long),
            Err(PropertyFinanceError::InvalidInput { ref field, .. }) if field == "cash_flows"
        ));

        let too_large = IrrInput {
            cash_flows: vec![-MAX_AMOUNT * dec!(10), dec!(100)],
        };
        assert!(calculate_irr(&too_large).is_err());
    }
}
