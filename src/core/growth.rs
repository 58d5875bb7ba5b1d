use super::error::{
    EngineError, EngineResult, require_finite, require_non_negative, require_positive,
    require_rate,
};

pub fn future_value(principal: f64, rate: f64, years: f64) -> EngineResult<f64> {
    require_non_negative("principal", principal)?;
    require_rate("rate", rate)?;
    require_non_negative("years", years)?;

    if years == 0.0 || principal == 0.0 {
        return Ok(principal);
    }
    Ok(principal * (1.0 + rate).powf(years))
}

pub fn present_value(future_value: f64, rate: f64, years: f64) -> EngineResult<f64> {
    require_non_negative("future_value", future_value)?;
    require_rate("rate", rate)?;
    require_non_negative("years", years)?;

    if years == 0.0 || future_value == 0.0 {
        return Ok(future_value);
    }
    let growth = (1.0 + rate).powf(years);
    if growth <= 0.0 {
        // rate = -1 wipes out any principal, so no present amount grows into the target.
        return Err(EngineError::invalid(
            "rate",
            "must be > -1 to discount a positive future value",
        ));
    }
    Ok(future_value / growth)
}

/// Years for `principal` to grow into `target`.
///
/// Returns `f64::INFINITY` when the target is above the principal and the rate
/// cannot grow it there (`rate <= 0`). Callers treat non-finite as unreachable.
pub fn time_to_target(principal: f64, target: f64, rate: f64) -> EngineResult<f64> {
    require_positive("principal", principal)?;
    require_positive("target", target)?;
    require_finite("rate", rate)?;
    if rate <= -1.0 {
        return Err(EngineError::invalid(
            "rate",
            format!("must be > -1, got {rate}"),
        ));
    }

    if target <= principal {
        return Ok(0.0);
    }
    if rate <= 0.0 {
        return Ok(f64::INFINITY);
    }
    Ok((target / principal).ln() / (1.0 + rate).ln())
}

/// Fisher equation. Not the `nominal - inflation` approximation.
pub fn real_return_rate(nominal_rate: f64, inflation_rate: f64) -> EngineResult<f64> {
    require_rate("nominal_rate", nominal_rate)?;
    require_finite("inflation_rate", inflation_rate)?;
    if inflation_rate <= -1.0 {
        return Err(EngineError::invalid(
            "inflation_rate",
            format!("must be > -1, got {inflation_rate}"),
        ));
    }
    Ok((1.0 + nominal_rate) / (1.0 + inflation_rate) - 1.0)
}

pub fn inflation_adjust(target: f64, inflation_rate: f64, years: f64) -> EngineResult<f64> {
    require_non_negative("target", target)?;
    require_rate("inflation_rate", inflation_rate)?;
    require_non_negative("years", years)?;

    if years == 0.0 || inflation_rate == 0.0 {
        return Ok(target);
    }
    Ok(target * (1.0 + inflation_rate).powf(years))
}
