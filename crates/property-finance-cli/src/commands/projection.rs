use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use property_finance_core::projection::cash_flow::{self, CashFlowProjectionInput};

use crate::input;

/// Arguments for the yearly rental cash-flow projection
#[derive(Args)]
pub struct ProjectArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Year-1 monthly rent
    #[arg(long)]
    pub monthly_rent: Option<Decimal>,

    /// Year-1 operating expenses (community, maintenance, insurance, IBI, vacancy)
    #[arg(long, default_value = "0")]
    pub annual_expenses: Decimal,

    /// Twelve mortgage payments, constant over the horizon
    #[arg(long, default_value = "0")]
    pub annual_mortgage_payment: Decimal,

    /// Annual rent growth in percent
    #[arg(long, default_value = "2", allow_hyphen_values = true)]
    pub rent_growth: Decimal,

    /// Annual expense inflation in percent
    #[arg(long, default_value = "2", allow_hyphen_values = true)]
    pub inflation: Decimal,

    /// Purchase price plus acquisition costs, for the net yield
    #[arg(long)]
    pub total_cost: Option<Decimal>,

    /// Number of years to project
    #[arg(long, default_value = "10")]
    pub years: u32,
}

pub fn run_project(args: ProjectArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let projection_input: CashFlowProjectionInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let monthly_rent = args
            .monthly_rent
            .ok_or("--monthly-rent is required (or provide --input)")?;
        let total_cost = args
            .total_cost
            .ok_or("--total-cost is required (or provide --input)")?;

        CashFlowProjectionInput {
            initial_monthly_rent: monthly_rent,
            initial_annual_expenses: args.annual_expenses,
            annual_mortgage_payment: args.annual_mortgage_payment,
            rent_growth_pct: args.rent_growth,
            expense_inflation_pct: args.inflation,
            total_acquisition_cost: total_cost,
            horizon_years: args.years,
        }
    };

    let result = cash_flow::project_property_cash_flows(&projection_input)?;
    Ok(serde_json::to_value(result)?)
}
