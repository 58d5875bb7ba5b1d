use std::collections::BTreeMap;

use super::amortization::MAX_PAYOFF_MONTHS;
use super::types::ValidationResult;

pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 100;
pub const MAX_RATE_PERCENT: f64 = 30.0;
pub const MAX_INFLATION_PERCENT: f64 = 20.0;
pub const MAX_TERM_YEARS: u32 = MAX_PAYOFF_MONTHS / 12;

/// Coast FIRE form fields as entered, rates in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CoastForm {
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_savings: f64,
    pub target: f64,
    pub annual_return_percent: f64,
    pub inflation_percent: f64,
    pub withdrawal_rate_percent: f64,
}

/// Mortgage form fields as entered, rates in percent.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MortgageForm {
    pub principal: f64,
    pub annual_rate_percent: f64,
    pub monthly_payment: f64,
    pub term_years: u32,
    pub extra_monthly_payment: f64,
    pub lump_sum: f64,
    pub investment_return_percent: f64,
    pub tax_rate_percent: f64,
}

pub fn check_age(label: &str, age: u32) -> Option<String> {
    if !(MIN_AGE..=MAX_AGE).contains(&age) {
        return Some(format!("{label} must be between {MIN_AGE} and {MAX_AGE}"));
    }
    None
}

pub fn check_non_negative(label: &str, value: f64) -> Option<String> {
    if !value.is_finite() {
        return Some(format!("{label} must be a number"));
    }
    if value < 0.0 {
        return Some(format!("{label} cannot be negative"));
    }
    None
}

pub fn check_positive(label: &str, value: f64) -> Option<String> {
    if !value.is_finite() {
        return Some(format!("{label} must be a number"));
    }
    if value <= 0.0 {
        return Some(format!("{label} must be greater than 0"));
    }
    None
}

pub fn check_range(label: &str, value: f64, min: f64, max: f64) -> Option<String> {
    if !value.is_finite() {
        return Some(format!("{label} must be a number"));
    }
    if value < min || value > max {
        return Some(format!("{label} must be between {min}% and {max}%"));
    }
    None
}

pub fn check_term_years(term_years: u32) -> Option<String> {
    if !(1..=MAX_TERM_YEARS).contains(&term_years) {
        return Some(format!("Loan term must be between 1 and {MAX_TERM_YEARS} years"));
    }
    None
}

pub fn check_retirement_after_current(current_age: u32, retirement_age: u32) -> Option<String> {
    if retirement_age <= current_age {
        return Some("Retirement age must be greater than current age".to_string());
    }
    None
}

/// Messages for the same field are joined in check order.
fn collect<const N: usize>(checks: [(&'static str, Option<String>); N]) -> ValidationResult {
    let mut errors: BTreeMap<&'static str, String> = BTreeMap::new();
    for (field, message) in checks {
        let Some(message) = message else { continue };
        errors
            .entry(field)
            .and_modify(|existing| {
                existing.push_str("; ");
                existing.push_str(&message);
            })
            .or_insert(message);
    }
    ValidationResult::from_errors(errors)
}

pub fn validate_coast_form(form: &CoastForm) -> ValidationResult {
    collect([
        ("currentAge", check_age("Current age", form.current_age)),
        ("retirementAge", check_age("Retirement age", form.retirement_age)),
        (
            "retirementAge",
            check_retirement_after_current(form.current_age, form.retirement_age),
        ),
        (
            "currentSavings",
            check_non_negative("Current savings", form.current_savings),
        ),
        ("target", check_positive("Retirement target", form.target)),
        (
            "annualReturn",
            check_range(
                "Expected annual return",
                form.annual_return_percent,
                0.0,
                MAX_RATE_PERCENT,
            ),
        ),
        (
            "inflationRate",
            check_range(
                "Inflation rate",
                form.inflation_percent,
                0.0,
                MAX_INFLATION_PERCENT,
            ),
        ),
        (
            "withdrawalRate",
            check_range(
                "Withdrawal rate",
                form.withdrawal_rate_percent,
                0.1,
                100.0,
            ),
        ),
    ])
}

pub fn validate_mortgage_form(form: &MortgageForm) -> ValidationResult {
    let lump_sum_within_principal = if form.lump_sum.is_finite()
        && form.principal.is_finite()
        && form.lump_sum > form.principal
    {
        Some("Lump sum cannot exceed the loan balance".to_string())
    } else {
        None
    };

    let first_month_interest = form.principal * form.annual_rate_percent / 100.0 / 12.0;
    let payment_covers_interest = if first_month_interest.is_finite()
        && form.monthly_payment.is_finite()
        && form.monthly_payment > 0.0
        && form.monthly_payment <= first_month_interest
    {
        Some(format!(
            "Monthly payment must exceed the first month's interest of {first_month_interest:.2}"
        ))
    } else {
        None
    };

    collect([
        ("principal", check_positive("Loan balance", form.principal)),
        (
            "interestRate",
            check_range(
                "Interest rate",
                form.annual_rate_percent,
                0.0,
                MAX_RATE_PERCENT,
            ),
        ),
        (
            "monthlyPayment",
            check_positive("Monthly payment", form.monthly_payment),
        ),
        ("monthlyPayment", payment_covers_interest),
        ("termYears", check_term_years(form.term_years)),
        (
            "extraPayment",
            check_non_negative("Extra monthly payment", form.extra_monthly_payment),
        ),
        ("lumpSum", check_non_negative("Lump sum", form.lump_sum)),
        ("lumpSum", lump_sum_within_principal),
        (
            "investmentReturn",
            check_range(
                "Investment return",
                form.investment_return_percent,
                0.0,
                MAX_RATE_PERCENT,
            ),
        ),
        (
            "taxRate",
            check_range("Capital gains tax rate", form.tax_rate_percent, 0.0, 100.0),
        ),
    ])
}
