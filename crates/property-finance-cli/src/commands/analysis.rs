use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use property_finance_core::estimates::{self, PurchaseExpenseEstimate, ReferenceRate};
use property_finance_core::property::analysis::{
    self, PropertyAnalysisInput, SimulationParameters,
};
use property_finance_core::property::financials::{
    AcquisitionCosts, AnnualExpenseLines, PropertyFinancials,
};

use crate::input;

/// Arguments for the full property investment analysis
#[derive(Args)]
pub struct AnalyzeArgs {
    /// Path to JSON input file (overrides the property flags)
    #[arg(long)]
    pub input: Option<String>,

    /// YAML or JSON file with default simulation parameters
    #[arg(long)]
    pub config: Option<String>,

    /// Purchase price
    #[arg(long)]
    pub price: Option<Decimal>,

    /// Monthly rent
    #[arg(long)]
    pub rent: Option<Decimal>,

    /// Property is new construction (pays VAT instead of transfer tax)
    #[arg(long)]
    pub new_construction: bool,

    /// Equity contributed (defaults to 20% of the total acquisition cost)
    #[arg(long)]
    pub equity: Option<Decimal>,

    /// Nominal annual mortgage rate in percent
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Mortgage term in years
    #[arg(long)]
    pub term_years: Option<u32>,

    /// Euribor in percent, used when no mortgage rate is given
    #[arg(long, allow_hyphen_values = true)]
    pub euribor: Option<Decimal>,

    /// Rent range used when no rent is known (e.g. "900 - 1.100 €/mes")
    #[arg(long)]
    pub rent_range: Option<String>,

    /// JSON file of estimated purchase expenses keyed by label
    #[arg(long)]
    pub expenses_estimate: Option<String>,
}

pub fn run_analyze(args: AnalyzeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let defaults: SimulationParameters = match args.config {
        Some(ref path) => input::file::read_structured(path)?,
        None => SimulationParameters::default(),
    };

    let mut analysis_input: PropertyAnalysisInput = if let Some(ref path) = args.input {
        let raw: Value = input::file::read_json(path)?;
        with_simulation_defaults(raw, &defaults)?
    } else if let Some(raw) = input::stdin::read_stdin::<Value>()? {
        with_simulation_defaults(raw, &defaults)?
    } else {
        let price = args
            .price
            .ok_or("--price is required (or provide --input)")?;

        PropertyAnalysisInput {
            property: PropertyFinancials {
                name: String::new(),
                purchase_price: price,
                is_new_construction: args.new_construction,
                acquisition_costs: AcquisitionCosts::default(),
                monthly_rent: args.rent,
                expenses: AnnualExpenseLines::default(),
            },
            simulation: defaults,
            reference_rate_pct: None,
        }
    };

    // Flags win over file and config values
    if args.equity.is_some() {
        analysis_input.simulation.equity = args.equity;
    }
    if args.rate.is_some() {
        analysis_input.simulation.annual_rate_pct = args.rate;
    }
    if let Some(term) = args.term_years {
        analysis_input.simulation.term_years = term;
    }

    let mut extra_warnings = Vec::new();
    if let Some(euribor_pct) = args.euribor {
        ReferenceRate { euribor_pct }.apply_to(&mut analysis_input);
    }
    if let Some(ref range) = args.rent_range {
        let rent = estimates::apply_rent_estimate(&mut analysis_input.property, range)?;
        tracing::info!(%rent, "monthly rent resolved from rent range");
    }
    if let Some(ref path) = args.expenses_estimate {
        let estimate: PurchaseExpenseEstimate = input::file::read_json(path)?;
        let unknown = estimate.apply_to(&mut analysis_input.property.acquisition_costs)?;
        for label in unknown {
            tracing::warn!(%label, "purchase expense estimate label not recognised");
            extra_warnings.push(format!("Purchase expense '{label}' not recognised and ignored"));
        }
    }

    let mut result = analysis::analyze_property(&analysis_input)?;
    result.warnings.extend(extra_warnings);
    Ok(serde_json::to_value(result)?)
}

/// Overlay the input's `simulation` object on the configured defaults so
/// only the fields it names are overridden.
fn with_simulation_defaults(
    mut raw: Value,
    defaults: &SimulationParameters,
) -> Result<PropertyAnalysisInput, Box<dyn std::error::Error>> {
    let mut simulation = serde_json::to_value(defaults)?;
    if let (Some(base), Some(Value::Object(overrides))) =
        (simulation.as_object_mut(), raw.get("simulation"))
    {
        for (key, value) in overrides {
            base.insert(key.clone(), value.clone());
        }
    }
    if let Value::Object(ref mut map) = raw {
        map.insert("simulation".into(), simulation);
    }
    Ok(serde_json::from_value(raw)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_input_simulation_overrides_config() {
        let defaults = SimulationParameters {
            term_years: 25,
            rent_growth_pct: Decimal::ONE,
            ..Default::default()
        };
        let raw = json!({
            "property": { "purchase_price": 150000, "monthly_rent": 800 },
            "simulation": { "term_years": 20 }
        });
        let input = with_simulation_defaults(raw, &defaults).unwrap();
        assert_eq!(input.simulation.term_years, 20);
        assert_eq!(input.simulation.rent_growth_pct, Decimal::ONE);
    }

    #[test]
    fn test_config_applies_without_simulation_block() {
        let defaults = SimulationParameters {
            schedule_years: 10,
            ..Default::default()
        };
        let raw = json!({ "property": { "purchase_price": 150000 } });
        let input = with_simulation_defaults(raw, &defaults).unwrap();
        assert_eq!(input.simulation, defaults);
    }
}
