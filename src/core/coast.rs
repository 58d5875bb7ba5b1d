use super::error::{
    EngineError, EngineResult, require_finite, require_non_negative, require_positive,
};
use super::growth::{future_value, inflation_adjust, present_value, real_return_rate, time_to_target};
use super::types::{CoastInputs, CoastSummary, ReadinessAge, TargetLinkage, TargetSource};

/// Amount needed today to reach `target` by growth alone.
pub fn coast_fire_number(target: f64, rate: f64, years: f64) -> EngineResult<f64> {
    present_value(target, rate, years)
}

pub fn is_ready(current_savings: f64, target: f64, rate: f64, years: f64) -> EngineResult<bool> {
    require_non_negative("target", target)?;
    Ok(future_value(current_savings, rate, years)? >= target)
}

pub fn additional_savings_needed(
    current_savings: f64,
    target: f64,
    rate: f64,
    years: f64,
) -> EngineResult<f64> {
    if is_ready(current_savings, target, rate, years)? {
        return Ok(0.0);
    }
    if years == 0.0 {
        return Ok((target - current_savings).max(0.0));
    }
    let coast_number = coast_fire_number(target, rate, years)?;
    Ok((coast_number - current_savings).max(0.0))
}

/// Age (rounded up) at which `current_savings` grows into `target`.
///
/// `Ok(None)` means the target is never reached at this rate.
pub fn age_at_readiness(
    current_savings: f64,
    target: f64,
    rate: f64,
    current_age: u32,
) -> EngineResult<Option<u32>> {
    require_finite("current_savings", current_savings)?;
    if current_savings <= 0.0 {
        return Err(EngineError::UndefinedCoastAge { current_savings });
    }
    require_positive("target", target)?;

    if current_savings >= target {
        return Ok(Some(current_age));
    }

    let years = time_to_target(current_savings, target, rate)?;
    if !years.is_finite() {
        return Ok(None);
    }
    let age = (current_age as f64 + years).ceil();
    if age > u32::MAX as f64 {
        return Ok(None);
    }
    Ok(Some(age as u32))
}

fn require_withdrawal_rate(withdrawal_rate: f64) -> EngineResult<f64> {
    require_finite("withdrawal_rate", withdrawal_rate)?;
    if withdrawal_rate <= 0.0 || withdrawal_rate > 1.0 {
        return Err(EngineError::invalid(
            "withdrawal_rate",
            format!("must be > 0 and <= 1, got {withdrawal_rate}"),
        ));
    }
    Ok(withdrawal_rate)
}

pub fn target_from_annual_expenses(annual_expenses: f64, withdrawal_rate: f64) -> EngineResult<f64> {
    require_non_negative("annual_expenses", annual_expenses)?;
    require_withdrawal_rate(withdrawal_rate)?;
    if annual_expenses == 0.0 {
        return Ok(0.0);
    }
    Ok(annual_expenses / withdrawal_rate)
}

pub fn expenses_from_target(target: f64, withdrawal_rate: f64) -> EngineResult<f64> {
    require_non_negative("target", target)?;
    require_withdrawal_rate(withdrawal_rate)?;
    Ok(target * withdrawal_rate)
}

/// Derives all three linked fields from whichever one was edited last.
pub fn resolve_target(source: TargetSource, withdrawal_rate: f64) -> EngineResult<TargetLinkage> {
    let target = match source {
        TargetSource::Direct(target) => {
            require_non_negative("target", target)?;
            require_withdrawal_rate(withdrawal_rate)?;
            target
        }
        TargetSource::MonthlyExpenses(monthly) => {
            require_non_negative("monthly_expenses", monthly)?;
            target_from_annual_expenses(monthly * 12.0, withdrawal_rate)?
        }
        TargetSource::YearlyExpenses(yearly) => {
            target_from_annual_expenses(yearly, withdrawal_rate)?
        }
    };

    let yearly_expenses = match source {
        TargetSource::YearlyExpenses(yearly) => yearly,
        TargetSource::MonthlyExpenses(monthly) => monthly * 12.0,
        TargetSource::Direct(_) => expenses_from_target(target, withdrawal_rate)?,
    };
    let monthly_expenses = match source {
        TargetSource::MonthlyExpenses(monthly) => monthly,
        _ => yearly_expenses / 12.0,
    };

    Ok(TargetLinkage {
        target,
        monthly_expenses,
        yearly_expenses,
    })
}

/// Evaluates readiness in today's money: growth uses the inflation-adjusted
/// (real) rate and `nominal_target` reports the target in retirement-year money.
pub fn coast_summary(inputs: &CoastInputs) -> EngineResult<CoastSummary> {
    if inputs.retirement_age < inputs.current_age {
        return Err(EngineError::invalid(
            "retirement_age",
            format!(
                "must be >= current age {}, got {}",
                inputs.current_age, inputs.retirement_age
            ),
        ));
    }
    let years_to_retirement = inputs.retirement_age - inputs.current_age;
    let years = years_to_retirement as f64;
    let real_return = real_return_rate(inputs.annual_return, inputs.inflation_rate)?;

    let nominal_target = inflation_adjust(inputs.target, inputs.inflation_rate, years)?;
    let future_value = future_value(inputs.current_savings, real_return, years)?;
    let coast_fire_number = coast_fire_number(inputs.target, real_return, years)?;
    let is_ready = future_value >= inputs.target;
    let additional_savings_needed =
        additional_savings_needed(inputs.current_savings, inputs.target, real_return, years)?;

    let age_at_readiness = if inputs.target <= 0.0 {
        ReadinessAge::At(inputs.current_age)
    } else {
        match age_at_readiness(
            inputs.current_savings,
            inputs.target,
            real_return,
            inputs.current_age,
        ) {
            Ok(Some(age)) => ReadinessAge::At(age),
            Ok(None) => ReadinessAge::Unreachable,
            Err(EngineError::UndefinedCoastAge { .. }) => ReadinessAge::Undefined,
            Err(e) => return Err(e),
        }
    };

    Ok(CoastSummary {
        years_to_retirement,
        real_return,
        nominal_target,
        future_value,
        coast_fire_number,
        is_ready,
        additional_savings_needed,
        age_at_readiness,
    })
}
