use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::PropertyFinanceError;
use crate::types::{saturating_div, validate_amount, Money, Percent};
use crate::PropertyFinanceResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One-off costs paid on top of the purchase price. Missing lines count as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AcquisitionCosts {
    /// Transfer tax (ITP), second-hand property only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transfer_tax: Option<Money>,
    /// VAT (IVA), new construction only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vat: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notary: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agency_commission: Option<Money>,
    /// Mortgage arrangement (gestoría) fee
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mortgage_arrangement_fee: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub appraisal: Option<Money>,
    /// Bank opening commission on the mortgage
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_commission: Option<Money>,
}

/// Recurring yearly running costs. Missing lines count as 0.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnualExpenseLines {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub community_fees: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub maintenance: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home_insurance: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mortgage_life_insurance: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub non_payment_insurance: Option<Money>,
    /// Municipal property tax (IBI)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property_tax: Option<Money>,
    /// Budgeted rent lost to empty periods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vacancy_allowance: Option<Money>,
}

/// Static economics of a single property.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyFinancials {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub purchase_price: Money,
    /// New construction pays VAT instead of transfer tax
    #[serde(default)]
    pub is_new_construction: bool,
    #[serde(default)]
    pub acquisition_costs: AcquisitionCosts,
    /// Current or estimated monthly rent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub monthly_rent: Option<Money>,
    #[serde(default)]
    pub expenses: AnnualExpenseLines,
}

/// Where a year's outgoings go.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpenseCategory {
    Mortgage,
    Community,
    Maintenance,
    Insurance,
    PropertyTax,
    Vacancy,
}

/// One slice of the yearly outgoings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseShare {
    pub category: ExpenseCategory,
    pub amount: Money,
    /// Share of total outgoings, percent
    pub share_pct: Percent,
}

// ---------------------------------------------------------------------------
// Default resolution
// ---------------------------------------------------------------------------

fn amount(line: Option<Money>) -> Money {
    line.unwrap_or(Decimal::ZERO)
}

impl AcquisitionCosts {
    /// Applicable cost lines by label. Transfer tax and VAT are mutually
    /// exclusive on `is_new_construction`.
    pub fn lines(&self, is_new_construction: bool) -> Vec<(&'static str, Money)> {
        let tax = if is_new_construction {
            ("vat", amount(self.vat))
        } else {
            ("transfer_tax", amount(self.transfer_tax))
        };
        vec![
            tax,
            ("notary", amount(self.notary)),
            ("registry", amount(self.registry)),
            ("agency_commission", amount(self.agency_commission)),
            ("mortgage_arrangement_fee", amount(self.mortgage_arrangement_fee)),
            ("appraisal", amount(self.appraisal)),
            ("opening_commission", amount(self.opening_commission)),
        ]
    }

    pub fn total(&self, is_new_construction: bool) -> Money {
        self.lines(is_new_construction)
            .iter()
            .fold(Decimal::ZERO, |acc, (_, v)| acc.saturating_add(*v))
    }

    fn all_lines(&self) -> [(&'static str, Option<Money>); 8] {
        [
            ("transfer_tax", self.transfer_tax),
            ("vat", self.vat),
            ("notary", self.notary),
            ("registry", self.registry),
            ("agency_commission", self.agency_commission),
            ("mortgage_arrangement_fee", self.mortgage_arrangement_fee),
            ("appraisal", self.appraisal),
            ("opening_commission", self.opening_commission),
        ]
    }
}

impl AnnualExpenseLines {
    pub fn insurance_total(&self) -> Money {
        amount(self.home_insurance)
            .saturating_add(amount(self.mortgage_life_insurance))
            .saturating_add(amount(self.non_payment_insurance))
    }

    pub fn annual_total(&self) -> Money {
        amount(self.community_fees)
            .saturating_add(amount(self.maintenance))
            .saturating_add(self.insurance_total())
            .saturating_add(amount(self.property_tax))
            .saturating_add(amount(self.vacancy_allowance))
    }

    fn all_lines(&self) -> [(&'static str, Option<Money>); 7] {
        [
            ("community_fees", self.community_fees),
            ("maintenance", self.maintenance),
            ("home_insurance", self.home_insurance),
            ("mortgage_life_insurance", self.mortgage_life_insurance),
            ("non_payment_insurance", self.non_payment_insurance),
            ("property_tax", self.property_tax),
            ("vacancy_allowance", self.vacancy_allowance),
        ]
    }
}

impl PropertyFinancials {
    /// Purchase price plus every applicable acquisition cost.
    pub fn total_acquisition_cost(&self) -> Money {
        self.purchase_price
            .saturating_add(self.acquisition_costs.total(self.is_new_construction))
    }

    pub fn monthly_rent(&self) -> Money {
        amount(self.monthly_rent)
    }

    pub fn annual_rent(&self) -> Money {
        self.monthly_rent().saturating_mul(Decimal::from(12))
    }

    pub fn annual_expenses(&self) -> Money {
        self.expenses.annual_total()
    }

    /// Yearly outgoings by category, including the mortgage. Empty
    /// categories are omitted.
    pub fn expense_breakdown(&self, annual_mortgage_payment: Money) -> Vec<ExpenseShare> {
        let e = &self.expenses;
        let slices = [
            (ExpenseCategory::Mortgage, annual_mortgage_payment),
            (ExpenseCategory::Community, amount(e.community_fees)),
            (ExpenseCategory::Maintenance, amount(e.maintenance)),
            (ExpenseCategory::Insurance, e.insurance_total()),
            (ExpenseCategory::PropertyTax, amount(e.property_tax)),
            (ExpenseCategory::Vacancy, amount(e.vacancy_allowance)),
        ];
        let total: Money = slices
            .iter()
            .map(|(_, v)| *v)
            .filter(|v| *v > Decimal::ZERO)
            .fold(Decimal::ZERO, Decimal::saturating_add);

        slices
            .into_iter()
            .filter(|(_, v)| *v > Decimal::ZERO)
            .map(|(category, amount)| ExpenseShare {
                category,
                amount,
                share_pct: saturating_div(amount, total).saturating_mul(Decimal::ONE_HUNDRED),
            })
            .collect()
    }

    /// Reject values no property can have; note the merely odd ones.
    pub fn validate(&self, warnings: &mut Vec<String>) -> PropertyFinanceResult<()> {
        if self.purchase_price <= Decimal::ZERO {
            return Err(PropertyFinanceError::invalid(
                "purchase_price",
                "Purchase price must be positive",
            ));
        }
        validate_amount("purchase_price", self.purchase_price)?;

        let lines = self
            .acquisition_costs
            .all_lines()
            .into_iter()
            .map(|(label, v)| (label, v, "acquisition_costs"))
            .chain(
                self.expenses
                    .all_lines()
                    .into_iter()
                    .map(|(label, v)| (label, v, "expenses")),
            );
        for (label, value, group) in lines {
            if let Some(v) = value {
                validate_amount(&format!("{group}.{label}"), v)?;
            }
        }

        match self.monthly_rent {
            Some(rent) => validate_amount("monthly_rent", rent)?,
            None => warnings.push("No monthly rent recorded — rental income treated as 0".into()),
        }

        let costs = &self.acquisition_costs;
        if costs.transfer_tax.is_some() && costs.vat.is_some() {
            let ignored = if self.is_new_construction {
                "transfer tax"
            } else {
                "VAT"
            };
            warnings.push(format!(
                "Both transfer tax and VAT supplied — {ignored} ignored for this property"
            ));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
