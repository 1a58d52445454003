use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use property_finance_core::mortgage::amortization::{self, MortgageInput};

use crate::input;

/// Arguments for the mortgage payment and amortization schedule
#[derive(Args)]
pub struct MortgageArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub financed_amount: Option<Decimal>,

    /// Nominal annual interest rate in percent (e.g. 3.5)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Loan term in years
    #[arg(long, default_value = "30")]
    pub term_years: u32,

    /// Years of schedule to return (defaults to the full term)
    #[arg(long)]
    pub schedule_years: Option<u32>,
}

pub fn run_mortgage(args: MortgageArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let mortgage_input: MortgageInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin()? {
        data
    } else {
        let financed_amount = args
            .financed_amount
            .ok_or("--financed-amount is required (or provide --input)")?;
        let annual_rate_pct = args.rate.ok_or("--rate is required (or provide --input)")?;

        MortgageInput {
            financed_amount,
            annual_rate_pct,
            term_years: args.term_years,
            schedule_years: args.schedule_years,
        }
    };

    let result = amortization::compute_mortgage(&mortgage_input)?;
    Ok(serde_json::to_value(result)?)
}
