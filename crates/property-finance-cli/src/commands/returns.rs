use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use property_finance_core::returns::irr::{self, IrrInput};
use property_finance_core::returns::metrics::{self, ReturnMetricsInput};

use crate::input;

/// Arguments for year-1 return metrics
#[derive(Args)]
pub struct ReturnsArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Cash put into the purchase
    #[arg(long)]
    pub equity: Option<Decimal>,

    /// Purchase price plus acquisition costs
    #[arg(long)]
    pub total_cost: Option<Decimal>,

    /// Year-1 gross rent (12 months)
    #[arg(long)]
    pub annual_rent: Option<Decimal>,

    /// Year-1 operating expenses
    #[arg(long, default_value = "0")]
    pub annual_expenses: Decimal,

    /// Twelve mortgage payments
    #[arg(long, default_value = "0")]
    pub annual_mortgage_payment: Decimal,

    /// Cash flows for the IRR (comma-separated, e.g. "-50000,5000,5000")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,
}

pub fn run_returns(args: ReturnsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let returns_input: ReturnMetricsInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let equity = args.equity.ok_or("--equity is required (or provide --input)")?;
        let total_cost = args
            .total_cost
            .ok_or("--total-cost is required (or provide --input)")?;
        let annual_rent = args
            .annual_rent
            .ok_or("--annual-rent is required (or provide --input)")?;

        ReturnMetricsInput {
            equity,
            total_acquisition_cost: total_cost,
            annual_rent,
            annual_expenses: args.annual_expenses,
            annual_mortgage_payment: args.annual_mortgage_payment,
            cash_flows: args.cash_flows,
        }
    };

    let result = metrics::compute_return_metrics(&returns_input)?;
    Ok(serde_json::to_value(result)?)
}

/// Arguments for a standalone IRR
#[derive(Args)]
pub struct IrrArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Cash flows, outlay first (comma-separated, e.g. "-100000,12000,12000")
    #[arg(long, value_delimiter = ',', allow_hyphen_values = true)]
    pub cash_flows: Option<Vec<Decimal>>,

    /// Fail instead of returning a best estimate when bisection does not converge
    #[arg(long)]
    pub strict: bool,
}

pub fn run_irr(args: IrrArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let irr_input: IrrInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let cash_flows = args
            .cash_flows
            .ok_or("--cash-flows is required (or provide --input)")?;
        IrrInput { cash_flows }
    };

    let result = irr::calculate_irr(&irr_input)?;
    if args.strict {
        result.result.clone().into_result()?;
    }
    Ok(serde_json::to_value(result)?)
}
