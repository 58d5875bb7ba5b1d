mod amortization;
mod coast;
mod error;
mod growth;
mod investment;
mod series;
mod types;
mod validation;

pub use amortization::{
    BALANCE_EPSILON, MAX_PAYOFF_MONTHS, compare_payoff, monthly_rate, payoff, required_payment,
    schedule,
};
pub use coast::{
    additional_savings_needed, age_at_readiness, coast_fire_number, coast_summary,
    expenses_from_target, is_ready, resolve_target, target_from_annual_expenses,
};
pub use error::{EngineError, EngineResult};
pub use growth::{future_value, inflation_adjust, present_value, real_return_rate, time_to_target};
pub use investment::{after_tax, better_strategy, compare_strategies, investment_value};
pub use series::{
    COAST_AGE_GRID, Granularity, MAX_CHART_POINTS, balance_series, decimate_indices,
    investment_vs_payoff, required_savings_by_age, savings_projection,
};
pub use types::{
    ChartSeries, CoastInputs, CoastSummary, Dataset, InvestmentResult, PaymentDetail,
    PayoffComparison, PayoffResult, ReadinessAge, Strategy, StrategyComparison, TargetLinkage,
    TargetSource, ValidationResult,
};
pub use validation::{
    CoastForm, MortgageForm, check_age, check_non_negative, check_positive, check_range,
    check_retirement_after_current, check_term_years, validate_coast_form, validate_mortgage_form,
};
