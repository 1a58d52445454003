use pretty_assertions::assert_eq;
use property_finance_core::property::analysis::{
    analyze_property, PropertyAnalysisInput, RateSource, SimulationParameters,
};
use property_finance_core::property::financials::{
    AcquisitionCosts, AnnualExpenseLines, ExpenseCategory, PropertyFinancials,
};
use property_finance_core::PropertyFinanceError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

// ===========================================================================
// Fixtures
// ===========================================================================

const SECOND_HAND_FLAT: &str = r#"{
    "property": {
        "name": "Piso Calle Alcalá",
        "purchase_price": 200000,
        "acquisition_costs": {
            "transfer_tax": 20000,
            "notary": 1000,
            "registry": 500,
            "agency_commission": 3500
        },
        "monthly_rent": 1100,
        "expenses": {
            "community_fees": 600,
            "maintenance": 500,
            "home_insurance": 200,
            "mortgage_life_insurance": 150,
            "property_tax": 400
        }
    },
    "simulation": {
        "annual_rate_pct": 3.0
    }
}"#;

fn second_hand_flat() -> PropertyAnalysisInput {
    serde_json::from_str(SECOND_HAND_FLAT).unwrap()
}

// ===========================================================================
// End-to-end analysis
// ===========================================================================

#[test]
fn test_json_input_fills_simulation_defaults() {
    let input = second_hand_flat();
    assert_eq!(
        input.simulation,
        SimulationParameters {
            annual_rate_pct: Some(dec!(3.0)),
            ..Default::default()
        }
    );
    assert_eq!(input.property.expenses.vacancy_allowance, None);
    assert!(!input.property.is_new_construction);
}

#[test]
fn test_second_hand_flat_analysis() {
    let out = analyze_property(&second_hand_flat()).unwrap();
    let r = &out.result;

    assert_eq!(r.total_acquisition_cost, dec!(225000));
    assert_eq!(r.equity, dec!(45000));
    assert_eq!(r.financed_amount, dec!(180000));
    assert_eq!(r.rate_source, RateSource::Simulation);

    // 180k at 3% over 30 years ≈ 758.89/month
    assert!((r.mortgage.monthly_payment - dec!(758.89)).abs() < dec!(0.01));
    assert_eq!(r.mortgage.schedule.len(), 5);

    let m = &r.metrics;
    assert!((m.gross_yield - dec!(5.8667)).abs() < dec!(0.001));
    assert!((m.net_yield - dec!(5.0444)).abs() < dec!(0.001));
    assert!((m.annual_net_cash_flow - dec!(2243.35)).abs() < dec!(0.01));
    assert!((m.roi - dec!(4.985)).abs() < dec!(0.001));
    assert_eq!(m.roi, m.roce);

    // 30-year IRR with 2% growth on rent and expenses ≈ 9.26%
    assert!(r.irr.converged);
    assert!((r.irr.irr_pct - dec!(9.26)).abs() < dec!(0.02), "got {}", r.irr.irr_pct);
    assert_eq!(m.irr, Some(r.irr.irr_pct));

    // NPV at the default 5% discount rate
    assert!((r.npv_at_discount_rate - dec!(34779.24)).abs() < dec!(1));
    assert_eq!(r.cumulative_payback_year, Some(13));

    assert_eq!(r.evolution.len(), 10);
    assert_eq!(r.evolution[0].gross_annual_rent, dec!(13200));
    assert!(out.warnings.is_empty(), "unexpected warnings: {:?}", out.warnings);
}

#[test]
fn test_schedule_matches_evolution_payment() {
    let out = analyze_property(&second_hand_flat()).unwrap();
    let r = &out.result;
    assert!(r
        .evolution
        .iter()
        .all(|y| y.annual_mortgage_payment == r.mortgage.annual_payment));
    assert!(r
        .mortgage
        .schedule
        .windows(2)
        .all(|pair| pair[1].remaining_balance < pair[0].remaining_balance));
}

#[test]
fn test_expense_breakdown_shares() {
    let out = analyze_property(&second_hand_flat()).unwrap();
    let breakdown = &out.result.expense_breakdown;

    let categories: Vec<ExpenseCategory> = breakdown.iter().map(|s| s.category).collect();
    assert_eq!(
        categories,
        vec![
            ExpenseCategory::Mortgage,
            ExpenseCategory::Community,
            ExpenseCategory::Maintenance,
            ExpenseCategory::Insurance,
            ExpenseCategory::PropertyTax,
        ]
    );
    assert_eq!(breakdown[3].amount, dec!(350));
    assert!((breakdown[0].share_pct - dec!(83.115)).abs() < dec!(0.01));

    let total: Decimal = breakdown.iter().map(|s| s.share_pct).sum();
    assert!((total - dec!(100)).abs() < dec!(0.0001));
}

#[test]
fn test_leverage_raises_cash_on_cash_return() {
    let mut input = second_hand_flat();
    input.simulation.annual_rate_pct = Some(dec!(1.5));
    let out = analyze_property(&input).unwrap();
    let cmp = &out.result.financing_comparison;

    assert_eq!(cmp.financed.investment, dec!(45000));
    assert_eq!(cmp.unfinanced.investment, dec!(225000));
    assert_eq!(cmp.unfinanced.annual_cash_flow, dec!(11350));
    assert_eq!(cmp.financed.net_yield, cmp.unfinanced.net_yield);
    assert!(cmp.financed.roi > cmp.unfinanced.roi);
}

#[test]
fn test_new_construction_uses_vat() {
    let mut input = second_hand_flat();
    input.property.is_new_construction = true;
    input.property.acquisition_costs.vat = Some(dec!(20000));
    input.property.acquisition_costs.transfer_tax = Some(dec!(14000));
    let out = analyze_property(&input).unwrap();
    assert_eq!(out.result.total_acquisition_cost, dec!(225000));
    assert!(out.warnings.iter().any(|w| w.contains("transfer tax ignored")));
}

#[test]
fn test_reference_rate_used_when_no_rate_given() {
    let mut input = second_hand_flat();
    input.simulation.annual_rate_pct = None;
    input.reference_rate_pct = Some(dec!(3.0));
    let out = analyze_property(&input).unwrap();
    assert_eq!(out.result.rate_source, RateSource::ReferenceRate);
    assert!((out.result.mortgage.monthly_payment - dec!(758.89)).abs() < dec!(0.01));
}

// ===========================================================================
// Edge cases
// ===========================================================================

#[test]
fn test_missing_rent_is_warned_not_rejected() {
    let mut input = second_hand_flat();
    input.property.monthly_rent = None;
    let out = analyze_property(&input).unwrap();
    assert_eq!(out.result.metrics.gross_yield, Decimal::ZERO);
    assert_eq!(out.result.metrics.payback_years, None);
    assert_eq!(out.result.cumulative_payback_year, None);
    assert!(out.warnings.iter().any(|w| w.contains("No monthly rent")));
}

#[test]
fn test_zero_equity_fully_financed() {
    let mut input = second_hand_flat();
    input.simulation.equity = Some(Decimal::ZERO);
    let out = analyze_property(&input).unwrap();
    assert_eq!(out.result.financed_amount, dec!(225000));
    assert_eq!(out.result.metrics.roi, Decimal::ZERO);
    assert!(out.warnings.iter().any(|w| w.contains("Equity is zero")));
}

#[test]
fn test_invalid_purchase_price() {
    let input = PropertyAnalysisInput {
        property: PropertyFinancials {
            name: String::new(),
            purchase_price: Decimal::ZERO,
            is_new_construction: false,
            acquisition_costs: AcquisitionCosts::default(),
            monthly_rent: Some(dec!(900)),
            expenses: AnnualExpenseLines::default(),
        },
        simulation: SimulationParameters::default(),
        reference_rate_pct: None,
    };
    match analyze_property(&input) {
        Err(PropertyFinanceError::InvalidInput { field, .. }) => assert_eq!(field, "purchase_price"),
        other => panic!("expected invalid purchase price, got {other:?}"),
    }
}

#[test]
fn test_negative_cost_line_names_the_field() {
    let mut input = second_hand_flat();
    input.property.expenses.maintenance = Some(dec!(-10));
    match analyze_property(&input) {
        Err(PropertyFinanceError::InvalidInput { field, .. }) => {
            assert_eq!(field, "expenses.maintenance")
        }
        other => panic!("expected invalid expense line, got {other:?}"),
    }
}

#[test]
fn test_output_serializes_with_metadata() {
    let out = analyze_property(&second_hand_flat()).unwrap();
    let json = serde_json::to_value(&out).unwrap();
    assert!(json["result"]["mortgage"]["schedule"].is_array());
    assert!(json["result"]["irr"]["converged"].as_bool().unwrap());
    assert_eq!(json["assumptions"]["property"]["name"], "Piso Calle Alcalá");
    assert!(json["metadata"]["version"].is_string());
}

// ===========================================================================
// Estimates
// ===========================================================================

#[cfg(feature = "estimates")]
mod estimates {
    use super::*;
    use pretty_assertions::assert_eq;
    use property_finance_core::estimates::{
        apply_rent_estimate, PurchaseExpenseEstimate, ReferenceRate,
    };

    #[test]
    fn test_estimates_complete_a_bare_listing() {
        let mut input = PropertyAnalysisInput {
            property: PropertyFinancials {
                name: "Listing".into(),
                purchase_price: dec!(200000),
                is_new_construction: false,
                acquisition_costs: AcquisitionCosts::default(),
                monthly_rent: None,
                expenses: AnnualExpenseLines::default(),
            },
            simulation: SimulationParameters::default(),
            reference_rate_pct: None,
        };

        let expenses: PurchaseExpenseEstimate = serde_json::from_str(
            r#"{"ITP": 20000, "Notaría": 1000, "Registro": 500, "Comisión agencia": 3500}"#,
        )
        .unwrap();
        let unknown = expenses.apply_to(&mut input.property.acquisition_costs).unwrap();
        assert!(unknown.is_empty());

        ReferenceRate { euribor_pct: dec!(3.0) }.apply_to(&mut input);
        apply_rent_estimate(&mut input.property, "1.000 - 1.200 €/mes").unwrap();

        let out = analyze_property(&input).unwrap();
        assert_eq!(out.result.total_acquisition_cost, dec!(225000));
        assert_eq!(out.result.rate_source, RateSource::ReferenceRate);
        assert!((out.result.metrics.gross_yield - dec!(5.8667)).abs() < dec!(0.001));
    }
}

// ===========================================================================
// Extreme inputs
// ===========================================================================

fn rejected_field(input: &PropertyAnalysisInput) -> String {
    match analyze_property(input) {
        Err(PropertyFinanceError::InvalidInput { field, .. }) => field,
        other => panic!("expected invalid input, got {other:?}"),
    }
}

#[test]
fn test_oversized_simulation_rejected() {
    let mut input = second_hand_flat();
    input.simulation.irr_horizon_years = 500;
    assert_eq!(rejected_field(&input), "irr_horizon_years");

    let mut input = second_hand_flat();
    input.simulation.annual_rate_pct = Some(dec!(250));
    assert_eq!(rejected_field(&input), "annual_rate_pct");

    let mut input = second_hand_flat();
    input.simulation.term_years = 75;
    assert_eq!(rejected_field(&input), "term_years");

    let mut input = second_hand_flat();
    input.simulation.discount_rate_pct = dec!(1000);
    assert_eq!(rejected_field(&input), "discount_rate_pct");
}

#[test]
fn test_oversized_purchase_price_rejected() {
    let mut input = second_hand_flat();
    input.property.purchase_price = dec!(10000000000000000000);
    assert_eq!(rejected_field(&input), "purchase_price");
}
