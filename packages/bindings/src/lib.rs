use napi::Result as NapiResult;
use napi_derive::napi;
use serde::de::DeserializeOwned;
use serde::Serialize;

use property_finance_core::{estimates, mortgage, projection, property, returns};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

/// Parse the JSON argument, run `f`, and serialise its output.
fn call_json<I, O, E>(input_json: &str, f: impl FnOnce(&I) -> Result<O, E>) -> NapiResult<String>
where
    I: DeserializeOwned,
    O: Serialize,
    E: std::fmt::Display,
{
    let input: I = serde_json::from_str(input_json).map_err(to_napi_error)?;
    let output = f(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Mortgage
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_mortgage(input_json: String) -> NapiResult<String> {
    call_json(&input_json, mortgage::amortization::compute_mortgage)
}

// ---------------------------------------------------------------------------
// Cash-flow projection
// ---------------------------------------------------------------------------

#[napi]
pub fn project_cash_flows(input_json: String) -> NapiResult<String> {
    call_json(&input_json, projection::cash_flow::project_property_cash_flows)
}

// ---------------------------------------------------------------------------
// Returns
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_return_metrics(input_json: String) -> NapiResult<String> {
    call_json(&input_json, returns::metrics::compute_return_metrics)
}

#[napi]
pub fn solve_irr(input_json: String) -> NapiResult<String> {
    call_json(&input_json, returns::irr::calculate_irr)
}

// ---------------------------------------------------------------------------
// Property analysis
// ---------------------------------------------------------------------------

#[napi]
pub fn analyze_property(input_json: String) -> NapiResult<String> {
    call_json(&input_json, property::analysis::analyze_property)
}

/// Midpoint of a free-text rent range, as a decimal string.
#[napi]
pub fn parse_rent_range(text: String) -> NapiResult<String> {
    estimates::parse_rent_range(&text)
        .map(|rent| rent.to_string())
        .map_err(to_napi_error)
}
