use clap::Args;
use serde_json::{json, Value};

use property_finance_core::estimates;

/// Arguments for reading a rent range
#[derive(Args)]
pub struct RentRangeArgs {
    /// Free-text rent range, e.g. "900 - 1.100 €/mes"
    pub text: String,
}

pub fn run_rent_range(args: RentRangeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let monthly_rent = estimates::parse_rent_range(&args.text)?;
    Ok(json!({
        "result": {
            "monthly_rent": monthly_rent,
            "source": args.text,
        },
        "methodology": "Midpoint of the first two amounts in the range",
    }))
}
