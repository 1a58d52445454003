//! Adapters for externally sourced estimates: itemised purchase expenses,
//! free-text rent ranges and the market reference rate.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::PropertyFinanceError;
use crate::property::analysis::PropertyAnalysisInput;
use crate::property::financials::{AcquisitionCosts, PropertyFinancials};
use crate::types::{Money, Percent};
use crate::PropertyFinanceResult;

/// Purchase expenses keyed by free-form label, e.g. `{"notaria": 850}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PurchaseExpenseEstimate(pub BTreeMap<String, Money>);

/// Market reference rate for new mortgages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceRate {
    pub euribor_pct: Percent,
}

fn normalize_label(label: &str) -> String {
    label
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| match c {
            'á' => 'a',
            'é' => 'e',
            'í' => 'i',
            'ó' => 'o',
            'ú' => 'u',
            ' ' | '-' => '_',
            other => other,
        })
        .collect()
}

fn cost_slot<'a>(costs: &'a mut AcquisitionCosts, label: &str) -> Option<&'a mut Option<Money>> {
    let slot = match label {
        "itp" | "transfer_tax" | "impuesto_transmisiones_patrimoniales" => &mut costs.transfer_tax,
        "iva" | "vat" => &mut costs.vat,
        "notary" | "notaria" | "notaria_compra" => &mut costs.notary,
        "registry" | "registro" | "registro_compra" => &mut costs.registry,
        "agency_commission" | "comision_agencia" => &mut costs.agency_commission,
        "mortgage_arrangement_fee" | "gestoria" | "gestoria_hipoteca" => {
            &mut costs.mortgage_arrangement_fee
        }
        "appraisal" | "tasacion" => &mut costs.appraisal,
        "opening_commission" | "comision_apertura" => &mut costs.opening_commission,
        _ => return None,
    };
    Some(slot)
}

impl PurchaseExpenseEstimate {
    /// Fill the cost lines the user left empty. Lines already set are kept.
    /// Returns the labels that matched no known cost line.
    pub fn apply_to(&self, costs: &mut AcquisitionCosts) -> PropertyFinanceResult<Vec<String>> {
        let mut unknown = Vec::new();
        for (label, value) in &self.0 {
            if *value < Decimal::ZERO {
                return Err(PropertyFinanceError::InvalidEstimate(format!(
                    "purchase expense '{label}' is negative ({value})"
                )));
            }
            match cost_slot(costs, &normalize_label(label)) {
                Some(slot) if slot.is_none() => *slot = Some(*value),
                Some(_) => {}
                None => unknown.push(label.clone()),
            }
        }
        if !unknown.is_empty() {
            tracing::debug!(?unknown, "ignored unrecognised purchase expense labels");
        }
        Ok(unknown)
    }
}

impl ReferenceRate {
    /// Offer the reference rate as the default mortgage rate.
    pub fn apply_to(&self, input: &mut PropertyAnalysisInput) {
        if input.reference_rate_pct.is_none() {
            input.reference_rate_pct = Some(self.euribor_pct);
        }
    }
}

/// Read one amount written with either `.` or `,` as separators. A separator
/// followed by exactly three digits groups thousands; otherwise the last
/// separator is the decimal point.
fn parse_amount(token: &str) -> Option<Money> {
    let token = token.trim_matches(|c| c == '.' || c == ',');
    if token.is_empty() {
        return None;
    }

    let parts: Vec<&str> = token.split(['.', ',']).collect();
    if parts.len() == 1 {
        return token.parse().ok();
    }

    let separators: Vec<char> = token.chars().filter(|c| *c == '.' || *c == ',').collect();
    let single_kind = separators.iter().all(|c| *c == separators[0]);
    let grouped = parts[1..].iter().all(|p| p.len() == 3);

    let normalized = if single_kind && grouped {
        parts.concat()
    } else {
        let (last, head) = parts.split_last()?;
        format!("{}.{}", head.concat(), last)
    };
    normalized.parse().ok()
}

/// Midpoint of a rent range such as `"900 - 1.100 €/mes"`. A single figure
/// is returned as-is.
pub fn parse_rent_range(text: &str) -> PropertyFinanceResult<Money> {
    let amounts: Vec<Money> = text
        .split(|c: char| !(c.is_ascii_digit() || c == '.' || c == ','))
        .filter_map(parse_amount)
        .collect();

    match amounts.as_slice() {
        [] => Err(PropertyFinanceError::InvalidEstimate(format!(
            "no amount found in rent range '{text}'"
        ))),
        [single] => Ok(*single),
        [low, high, ..] => Ok(low.saturating_add(*high) / Decimal::TWO),
    }
}

/// Use a rent range as the monthly rent when none was recorded.
pub fn apply_rent_estimate(property: &mut PropertyFinancials, range: &str) -> PropertyFinanceResult<Money> {
    let estimate = parse_rent_range(range)?;
    Ok(*property.monthly_rent.get_or_insert(estimate))
}
