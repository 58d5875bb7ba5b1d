use std::collections::BTreeMap;

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffResult {
    pub months: u32,
    pub total_interest: f64,
    pub total_payments: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentDetail {
    pub month: u32,
    pub balance: f64,
    pub interest_payment: f64,
    pub principal_payment: f64,
    pub total_interest: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoffComparison {
    pub standard: PayoffResult,
    pub accelerated: PayoffResult,
    pub interest_saved: f64,
    pub months_saved: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvestmentResult {
    pub gross_return: f64,
    pub profit: f64,
    pub taxes: f64,
    pub net_return: f64,
    pub total_invested: f64,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Payoff,
    Invest,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StrategyComparison {
    pub interest_saved: f64,
    pub investment: InvestmentResult,
    pub net_benefit: f64,
    pub recommendation: Strategy,
}

/// Which of the linked target fields the user last edited.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum TargetSource {
    Direct(f64),
    MonthlyExpenses(f64),
    YearlyExpenses(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetLinkage {
    pub target: f64,
    pub monthly_expenses: f64,
    pub yearly_expenses: f64,
}

/// Coast FIRE inputs with rates as decimal fractions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoastInputs {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_savings: f64,
    pub target: f64,
    pub annual_return: f64,
    pub inflation_rate: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CoastSummary {
    pub years_to_retirement: u32,
    pub real_return: f64,
    pub nominal_target: f64,
    pub future_value: f64,
    pub coast_fire_number: f64,
    pub is_ready: bool,
    pub additional_savings_needed: f64,
    pub age_at_readiness: ReadinessAge,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(tag = "status", content = "age", rename_all = "kebab-case")]
pub enum ReadinessAge {
    At(u32),
    Unreachable,
    /// No savings to grow from.
    Undefined,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: BTreeMap<&'static str, String>,
}

impl ValidationResult {
    pub fn from_errors(errors: BTreeMap<&'static str, String>) -> Self {
        Self {
            is_valid: errors.is_empty(),
            errors,
        }
    }

    pub fn error(&self, field: &str) -> Option<&str> {
        self.errors.get(field).map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dataset {
    pub label: String,
    pub data: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ChartSeries {
    pub labels: Vec<String>,
    pub datasets: Vec<Dataset>,
}

impl ChartSeries {
    pub fn is_aligned(&self) -> bool {
        self.datasets
            .iter()
            .all(|dataset| dataset.data.len() == self.labels.len())
    }
}
