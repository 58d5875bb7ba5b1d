use super::error::{EngineError, EngineResult, require_non_negative};
use super::types::{PaymentDetail, PayoffComparison, PayoffResult};

/// Longest loan the engine will simulate (50 years).
pub const MAX_PAYOFF_MONTHS: u32 = 600;

/// Balances at or below this are treated as paid off.
pub const BALANCE_EPSILON: f64 = 0.01;

pub fn monthly_rate(annual_rate_percent: f64) -> EngineResult<f64> {
    require_non_negative("annual_rate_percent", annual_rate_percent)?;
    Ok(annual_rate_percent / 100.0 / 12.0)
}

pub fn payoff(
    principal: f64,
    monthly_payment: f64,
    monthly_rate: f64,
    lump_sum: f64,
) -> EngineResult<PayoffResult> {
    simulate(principal, monthly_payment, monthly_rate, lump_sum, |_| {})
}

pub fn schedule(
    principal: f64,
    monthly_payment: f64,
    monthly_rate: f64,
    lump_sum: f64,
) -> EngineResult<Vec<PaymentDetail>> {
    let mut details = Vec::new();
    simulate(principal, monthly_payment, monthly_rate, lump_sum, |detail| {
        details.push(detail)
    })?;
    Ok(details)
}

fn simulate(
    principal: f64,
    monthly_payment: f64,
    monthly_rate: f64,
    lump_sum: f64,
    mut on_month: impl FnMut(PaymentDetail),
) -> EngineResult<PayoffResult> {
    require_non_negative("principal", principal)?;
    require_non_negative("monthly_payment", monthly_payment)?;
    require_non_negative("monthly_rate", monthly_rate)?;
    require_non_negative("lump_sum", lump_sum)?;

    let mut balance = principal - lump_sum;
    let mut months = 0_u32;
    let mut total_interest = 0.0;
    let mut total_payments = 0.0;

    while balance > BALANCE_EPSILON {
        if months >= MAX_PAYOFF_MONTHS {
            tracing::debug!(
                limit = MAX_PAYOFF_MONTHS,
                remaining_balance = balance,
                "amortization hit iteration limit"
            );
            return Err(EngineError::IterationLimitExceeded {
                limit: MAX_PAYOFF_MONTHS,
                remaining_balance: balance,
            });
        }

        let interest = balance * monthly_rate;
        let covered = monthly_payment - interest;
        if covered <= 0.0 {
            tracing::debug!(
                month = months + 1,
                interest,
                monthly_payment,
                "payment does not cover accruing interest"
            );
            return Err(EngineError::NeverPaysOff {
                month: months + 1,
                interest,
                payment: monthly_payment,
            });
        }

        let mut principal_payment = covered.min(balance);
        balance -= principal_payment;
        if balance <= BALANCE_EPSILON {
            principal_payment += balance;
            balance = 0.0;
        }

        months += 1;
        total_interest += interest;
        total_payments += interest + principal_payment;
        on_month(PaymentDetail {
            month: months,
            balance,
            interest_payment: interest,
            principal_payment,
            total_interest,
        });
    }

    Ok(PayoffResult {
        months,
        total_interest,
        total_payments,
    })
}

/// Level payment that amortizes `principal` over `total_months`.
pub fn required_payment(principal: f64, monthly_rate: f64, total_months: u32) -> EngineResult<f64> {
    require_non_negative("principal", principal)?;
    require_non_negative("monthly_rate", monthly_rate)?;
    if total_months == 0 {
        return Err(EngineError::invalid("total_months", "must be > 0"));
    }

    let n = total_months as f64;
    if monthly_rate == 0.0 {
        return Ok(principal / n);
    }
    let growth = (1.0 + monthly_rate).powf(n);
    Ok(principal * (monthly_rate * growth) / (growth - 1.0))
}

/// Standard run (base payment only) against an accelerated run with the
/// extra monthly payment and the lump sum applied.
pub fn compare_payoff(
    principal: f64,
    monthly_payment: f64,
    extra_monthly_payment: f64,
    lump_sum: f64,
    monthly_rate: f64,
) -> EngineResult<PayoffComparison> {
    require_non_negative("extra_monthly_payment", extra_monthly_payment)?;
    let standard = payoff(principal, monthly_payment, monthly_rate, 0.0)?;
    let accelerated = payoff(
        principal,
        monthly_payment + extra_monthly_payment,
        monthly_rate,
        lump_sum,
    )?;

    Ok(PayoffComparison {
        standard,
        accelerated,
        interest_saved: standard.total_interest - accelerated.total_interest,
        months_saved: standard.months.saturating_sub(accelerated.months),
    })
}
